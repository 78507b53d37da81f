//! Scene renderer
//!
//! Each frame the renderer makes its shader and the target active (only if
//! they are not already), uploads the camera matrices once, then walks the
//! scene and renders every enabled model object.

use crate::assets::ResourceManager;
use crate::foundation::math::Mat4Ext;
use crate::scene::{ObjectKind, Scene};

use super::api::UniformValue;
use super::camera::Camera;
use super::shader::{upload_uniform, Shader};
use super::target::RenderTarget;

/// Draws scenes with a single shader program
#[derive(Debug)]
pub struct Renderer {
    shader: Shader,
}

impl Renderer {
    /// Create a renderer that owns `shader`
    pub fn new(shader: Shader) -> Self {
        shader.gpu().with(|api| api.enable_depth_and_culling());
        Self { shader }
    }

    /// Shader every object is drawn with
    pub fn shader(&self) -> &Shader {
        &self.shader
    }

    /// Activate `target` and clear it
    pub fn begin_frame(&self, target: &dyn RenderTarget, clear_color: [f32; 4]) {
        let gpu = self.shader.gpu();
        target.activate(gpu);
        gpu.with(|api| api.clear(clear_color));
    }

    /// Render every enabled model object in `scene` as seen by `camera`
    pub fn render(
        &self,
        camera: &Camera,
        scene: &Scene,
        target: &dyn RenderTarget,
        resources: &mut ResourceManager,
    ) {
        let gpu = self.shader.gpu();
        if !self.shader.is_active() {
            self.shader.activate();
        }
        if !target.is_active(gpu) {
            target.activate(gpu);
        }

        let uniforms = *self.shader.uniforms();
        let projection = camera.projection_matrix(target.aspect_ratio());
        let view = camera.view_matrix();
        gpu.with(|api| {
            upload_uniform(api, uniforms.projection, UniformValue::Mat4(projection.to_column_array()));
            upload_uniform(api, uniforms.view, UniformValue::Mat4(view.to_column_array()));
        });

        for object in scene.iter().filter(|object| object.is_enabled()) {
            let ObjectKind::Model { model, transform } = object.kind() else {
                continue;
            };
            if !resources.model(*model).is_some_and(|model| model.is_loaded()) {
                continue;
            }

            let model_matrix = transform.to_matrix();
            let normal_matrix = (view * model_matrix).normal_matrix();
            gpu.with(|api| {
                upload_uniform(api, uniforms.model, UniformValue::Mat4(model_matrix.to_column_array()));
                upload_uniform(api, uniforms.normal, UniformValue::Mat4(normal_matrix.to_column_array()));
            });
            resources.render_model(*model, &self.shader);
        }
        gpu.log_error("Renderer.render");
    }
}
