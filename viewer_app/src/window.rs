//! Window management using GLFW
//!
//! Opens a window with an OpenGL 3.3 core context and exposes it to the
//! renderer as a [`RenderTarget`].

#![allow(unsafe_code)]

use glfw::Context;
use thiserror::Error;

use gl_engine::render::api::BindingId;
use gl_engine::render::backends::GlowApi;
use gl_engine::render::{Gpu, GpuContext, RenderTarget};

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    #[error("GLFW initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Window creation failed")]
    CreationFailed,
}

pub type WindowResult<T> = Result<T, WindowError>;

/// GLFW window owning the GL context the engine draws with
pub struct GlWindow {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    id: BindingId,
    width: u32,
    height: u32,
}

impl GlWindow {
    /// Open a window, make its context current and wrap it in a GPU context
    pub fn open(title: &str, width: u32, height: u32) -> WindowResult<(Self, GpuContext)> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|error| WindowError::InitializationFailed(error.to_string()))?;

        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
        glfw.window_hint(glfw::WindowHint::Resizable(true));

        let (mut window, events) = glfw
            .create_window(width, height, title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        window.make_current();
        window.set_key_polling(true);
        window.set_close_polling(true);
        window.set_framebuffer_size_polling(true);
        glfw.set_swap_interval(glfw::SwapInterval::Sync(1));

        // SAFETY: the context was made current above and lives as long as the window.
        let api = unsafe {
            let gl = glow::Context::from_loader_function(|name| {
                window.get_proc_address(name) as *const _
            });
            GlowApi::new(gl)
        };
        let gpu = Gpu::new(api);

        let (fb_width, fb_height) = window.get_framebuffer_size();
        let this = Self {
            glfw,
            window,
            events,
            id: gpu.next_binding_id(),
            width: u32::try_from(fb_width).unwrap_or(0),
            height: u32::try_from(fb_height).unwrap_or(0),
        };
        Ok((this, gpu))
    }

    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Poll events; returns true when the framebuffer was resized
    pub fn poll_events(&mut self) -> bool {
        self.glfw.poll_events();

        let mut resized = false;
        for (_, event) in glfw::flush_messages(&self.events) {
            match event {
                glfw::WindowEvent::Key(glfw::Key::Escape, _, glfw::Action::Press, _) => {
                    self.window.set_should_close(true);
                }
                glfw::WindowEvent::FramebufferSize(width, height) => {
                    self.width = u32::try_from(width).unwrap_or(0);
                    self.height = u32::try_from(height).unwrap_or(0);
                    resized = true;
                }
                _ => {}
            }
        }
        resized
    }

    pub fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }
}

impl RenderTarget for GlWindow {
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
