//! Backend abstraction traits for the rendering system
//!
//! This module defines the primitive GPU surface that the asset types drive:
//! create/upload/bind/delete for buffers, vertex arrays, textures and
//! programs, plus a query for the most recent error code. Backends never
//! own asset state; they only translate calls.

use std::num::NonZeroU32;

/// Handle to a vertex array object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub NonZeroU32);

/// Handle to a buffer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub NonZeroU32);

/// Handle to a texture object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub NonZeroU32);

/// Handle to a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub NonZeroU32);

/// Location of a uniform inside a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Buffer binding point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex data
    Array,
    /// Index data
    ElementArray,
}

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Tessellation control shader
    TessControl,
    /// Tessellation evaluation shader
    TessEvaluation,
    /// Geometry shader
    Geometry,
    /// Fragment shader
    Fragment,
    /// Compute shader
    Compute,
}

impl ShaderStage {
    /// All stages in pipeline order
    pub const ALL: [ShaderStage; 6] = [
        ShaderStage::Vertex,
        ShaderStage::TessControl,
        ShaderStage::TessEvaluation,
        ShaderStage::Geometry,
        ShaderStage::Fragment,
        ShaderStage::Compute,
    ];

    /// File name of the stage inside a shader set directory
    pub fn file_name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vert.glsl",
            ShaderStage::TessControl => "tesc.glsl",
            ShaderStage::TessEvaluation => "tese.glsl",
            ShaderStage::Geometry => "geom.glsl",
            ShaderStage::Fragment => "frag.glsl",
            ShaderStage::Compute => "comp.glsl",
        }
    }
}

/// CPU-side layout of uploaded pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Single 8-bit channel
    Luminance,
    /// Three 8-bit channels
    Rgb,
    /// Four 8-bit channels
    Rgba,
}

impl PixelFormat {
    /// Pick the layout matching a bits-per-pixel value
    pub fn from_bits_per_pixel(bits_per_pixel: u8) -> Option<Self> {
        match bits_per_pixel {
            8 => Some(PixelFormat::Luminance),
            24 => Some(PixelFormat::Rgb),
            32 => Some(PixelFormat::Rgba),
            _ => None,
        }
    }

    /// Bytes per pixel for this layout
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Luminance => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// A 2D image ready for upload
#[derive(Debug, Clone, Copy)]
pub struct TextureImage<'a> {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Layout of `pixels`
    pub format: PixelFormat,
    /// Tightly packed rows, bottom row first
    pub pixels: &'a [u8],
}

/// Vertex attribute wiring inside an interleaved vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeLayout {
    /// Number of float components
    pub components: u32,
    /// Size of one vertex record in bytes
    pub stride: u32,
    /// Byte offset of the attribute inside the record
    pub offset: u32,
}

/// Value uploaded to a uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Three floats
    Vec3([f32; 3]),
    /// Single float
    Float(f32),
    /// Unsigned integer
    UInt(u32),
    /// Signed integer (sampler units)
    Int(i32),
    /// Column-major 4x4 matrix
    Mat4([f32; 16]),
}

/// Primitive GPU surface
///
/// Every method maps onto one (or a short fixed sequence of) graphics API
/// calls. Only object creation and program linking report failure directly;
/// everything else is checked by querying [`GraphicsApi::last_error`]
/// opportunistically and logging what turns up.
pub trait GraphicsApi {
    /// Generate a vertex array object
    fn create_vertex_array(&mut self) -> Result<VertexArrayId, String>;

    /// Bind a vertex array object, or unbind with `None`
    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>);

    /// Delete a vertex array object
    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId);

    /// Generate a buffer object
    fn create_buffer(&mut self) -> Result<BufferId, String>;

    /// Bind a buffer to a target, or unbind with `None`
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>);

    /// Upload static data into the buffer bound to `target`
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]);

    /// Delete a buffer object
    fn delete_buffer(&mut self, buffer: BufferId);

    /// Enable an attribute location and point it at the bound array buffer
    fn enable_vertex_attribute(&mut self, location: u32, layout: AttributeLayout);

    /// Draw indexed triangles from the bound vertex array
    fn draw_indexed_triangles(&mut self, index_count: u32);

    /// Generate a texture object
    fn create_texture(&mut self) -> Result<TextureId, String>;

    /// Upload a 2D image with mip levels, repeat wrapping and trilinear filtering
    fn upload_texture(&mut self, texture: TextureId, image: &TextureImage<'_>);

    /// Activate a texture unit and bind a texture to it, or unbind with `None`
    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>);

    /// Delete a texture object
    fn delete_texture(&mut self, texture: TextureId);

    /// Compile and link a program from per-stage sources
    fn create_program(&mut self, stages: &[(ShaderStage, String)]) -> Result<ProgramId, String>;

    /// Make a program current, or clear with `None`
    fn use_program(&mut self, program: Option<ProgramId>);

    /// Delete a program
    fn delete_program(&mut self, program: ProgramId);

    /// Look up a vertex attribute location
    fn attribute_location(&mut self, program: ProgramId, name: &str) -> Option<u32>;

    /// Look up a uniform location
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Upload a uniform value into the current program
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Set the viewport rectangle
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Enable depth testing and back-face culling
    fn enable_depth_and_culling(&mut self);

    /// Clear colour and depth buffers
    fn clear(&mut self, color: [f32; 4]);

    /// Pop the most recent error code, if any
    fn last_error(&mut self) -> Option<u32>;
}
