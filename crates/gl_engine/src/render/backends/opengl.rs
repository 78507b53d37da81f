//! OpenGL backend built on `glow`
//!
//! Translates [`GraphicsApi`] calls one-to-one into GL calls on a context
//! the window layer has already made current.

#![allow(unsafe_code)]

use glow::HasContext;

use crate::render::api::{
    AttributeLayout, BufferId, BufferTarget, GraphicsApi, PixelFormat, ProgramId, ShaderStage,
    TextureId, TextureImage, UniformLocation, UniformValue, VertexArrayId,
};

/// OpenGL implementation of [`GraphicsApi`]
pub struct GlowApi {
    gl: glow::Context,
}

impl GlowApi {
    /// Wrap a loaded GL context
    ///
    /// # Safety
    /// The context must be current on the calling thread for the lifetime of
    /// the returned value.
    pub unsafe fn new(gl: glow::Context) -> Self {
        log::info!(
            "OpenGL {} ({})",
            gl.get_parameter_string(glow::VERSION),
            gl.get_parameter_string(glow::RENDERER)
        );
        Self { gl }
    }
}

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn shader_type(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::TessControl => glow::TESS_CONTROL_SHADER,
        ShaderStage::TessEvaluation => glow::TESS_EVALUATION_SHADER,
        ShaderStage::Geometry => glow::GEOMETRY_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        ShaderStage::Compute => glow::COMPUTE_SHADER,
    }
}

// Layouts match the little-endian byte order the image decoder produces.
fn pixel_formats(format: PixelFormat) -> (i32, u32) {
    match format {
        PixelFormat::Luminance => (glow::R8 as i32, glow::RED),
        PixelFormat::Rgb => (glow::RGB8 as i32, glow::RGB),
        PixelFormat::Rgba => (glow::RGBA8 as i32, glow::RGBA),
    }
}

impl GraphicsApi for GlowApi {
    fn create_vertex_array(&mut self) -> Result<VertexArrayId, String> {
        unsafe { self.gl.create_vertex_array() }.map(|vao| VertexArrayId(vao.0))
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) {
        unsafe {
            self.gl
                .bind_vertex_array(vertex_array.map(|id| glow::NativeVertexArray(id.0)));
        }
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        unsafe { self.gl.delete_vertex_array(glow::NativeVertexArray(vertex_array.0)) }
    }

    fn create_buffer(&mut self) -> Result<BufferId, String> {
        unsafe { self.gl.create_buffer() }.map(|buffer| BufferId(buffer.0))
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        unsafe {
            self.gl
                .bind_buffer(buffer_target(target), buffer.map(|id| glow::NativeBuffer(id.0)));
        }
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(buffer_target(target), data, glow::STATIC_DRAW);
        }
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        unsafe { self.gl.delete_buffer(glow::NativeBuffer(buffer.0)) }
    }

    fn enable_vertex_attribute(&mut self, location: u32, layout: AttributeLayout) {
        unsafe {
            self.gl.enable_vertex_attrib_array(location);
            self.gl.vertex_attrib_pointer_f32(
                location,
                layout.components as i32,
                glow::FLOAT,
                false,
                layout.stride as i32,
                layout.offset as i32,
            );
        }
    }

    fn draw_indexed_triangles(&mut self, index_count: u32) {
        unsafe {
            self.gl
                .draw_elements(glow::TRIANGLES, index_count as i32, glow::UNSIGNED_INT, 0);
        }
    }

    fn create_texture(&mut self) -> Result<TextureId, String> {
        unsafe { self.gl.create_texture() }.map(|texture| TextureId(texture.0))
    }

    fn upload_texture(&mut self, texture: TextureId, image: &TextureImage<'_>) {
        let (internal_format, format) = pixel_formats(image.format);
        unsafe {
            self.gl
                .bind_texture(glow::TEXTURE_2D, Some(glow::NativeTexture(texture.0)));
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal_format,
                image.width as i32,
                image.height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                Some(image.pixels),
            );
            self.gl.generate_mipmap(glow::TEXTURE_2D);
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR_MIPMAP_LINEAR as i32,
            );
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl
                .bind_texture(glow::TEXTURE_2D, texture.map(|id| glow::NativeTexture(id.0)));
        }
    }

    fn delete_texture(&mut self, texture: TextureId) {
        unsafe { self.gl.delete_texture(glow::NativeTexture(texture.0)) }
    }

    fn create_program(&mut self, stages: &[(ShaderStage, String)]) -> Result<ProgramId, String> {
        unsafe {
            let program = self.gl.create_program()?;
            let mut shaders = Vec::with_capacity(stages.len());

            for (stage, source) in stages {
                let shader = self.gl.create_shader(shader_type(*stage))?;
                self.gl.shader_source(shader, source);
                self.gl.compile_shader(shader);
                if !self.gl.get_shader_compile_status(shader) {
                    let info = self.gl.get_shader_info_log(shader);
                    self.gl.delete_shader(shader);
                    for attached in shaders {
                        self.gl.delete_shader(attached);
                    }
                    self.gl.delete_program(program);
                    return Err(format!("{:?} stage failed to compile: {}", stage, info));
                }
                self.gl.attach_shader(program, shader);
                shaders.push(shader);
            }

            self.gl.link_program(program);
            let linked = self.gl.get_program_link_status(program);
            let info = self.gl.get_program_info_log(program);

            for shader in shaders {
                self.gl.detach_shader(program, shader);
                self.gl.delete_shader(shader);
            }

            if linked {
                Ok(ProgramId(program.0))
            } else {
                self.gl.delete_program(program);
                Err(format!("program failed to link: {}", info))
            }
        }
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        unsafe { self.gl.use_program(program.map(|id| glow::NativeProgram(id.0))) }
    }

    fn delete_program(&mut self, program: ProgramId) {
        unsafe { self.gl.delete_program(glow::NativeProgram(program.0)) }
    }

    fn attribute_location(&mut self, program: ProgramId, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(glow::NativeProgram(program.0), name) }
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        unsafe {
            self.gl
                .get_uniform_location(glow::NativeProgram(program.0), name)
                .map(|location| UniformLocation(location.0))
        }
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let location = glow::NativeUniformLocation(location.0);
        unsafe {
            match value {
                UniformValue::Vec3([x, y, z]) => self.gl.uniform_3_f32(Some(&location), x, y, z),
                UniformValue::Float(v) => self.gl.uniform_1_f32(Some(&location), v),
                UniformValue::UInt(v) => self.gl.uniform_1_u32(Some(&location), v),
                UniformValue::Int(v) => self.gl.uniform_1_i32(Some(&location), v),
                UniformValue::Mat4(m) => {
                    self.gl.uniform_matrix_4_f32_slice(Some(&location), false, &m);
                }
            }
        }
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        unsafe { self.gl.viewport(x, y, width as i32, height as i32) }
    }

    fn enable_depth_and_culling(&mut self) {
        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
            self.gl.enable(glow::CULL_FACE);
            self.gl.cull_face(glow::BACK);
        }
    }

    fn clear(&mut self, color: [f32; 4]) {
        unsafe {
            self.gl.clear_color(color[0], color[1], color[2], color[3]);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn last_error(&mut self) -> Option<u32> {
        match unsafe { self.gl.get_error() } {
            glow::NO_ERROR => None,
            code => Some(code),
        }
    }
}
