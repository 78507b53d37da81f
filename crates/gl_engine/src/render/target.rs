//! Render targets
//!
//! Only one target is active at a time. The active target is tracked by
//! identity in the [`Gpu`] context.

use super::api::{BindingId, Gpu};

/// Something the renderer can draw into
pub trait RenderTarget {
    /// Identity used for active-target comparisons
    fn binding_id(&self) -> BindingId;

    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Width / height ratio
    fn aspect_ratio(&self) -> f32 {
        if self.height() == 0 {
            1.0
        } else {
            self.width() as f32 / self.height() as f32
        }
    }

    /// Backend-specific activation (make context current, set viewport)
    fn activate_target(&self, gpu: &Gpu);

    /// Activate the target and record it as active
    fn activate(&self, gpu: &Gpu) {
        self.activate_target(gpu);
        gpu.set_active_target(Some(self.binding_id()));
    }

    /// Whether this target is the active one
    fn is_active(&self, gpu: &Gpu) -> bool {
        gpu.active_target() == Some(self.binding_id())
    }
}

/// Plain viewport over the default framebuffer
#[derive(Debug, Clone)]
pub struct Viewport {
    id: BindingId,
    width: u32,
    height: u32,
}

impl Viewport {
    /// Create a viewport of the given size
    pub fn new(gpu: &Gpu, width: u32, height: u32) -> Self {
        Self {
            id: gpu.next_binding_id(),
            width,
            height,
        }
    }

    /// Change the size; takes effect on the next activation
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

impl RenderTarget for Viewport {
    fn binding_id(&self) -> BindingId {
        self.id
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn activate_target(&self, gpu: &Gpu) {
        gpu.with(|api| api.set_viewport(0, 0, self.width, self.height));
    }
}
