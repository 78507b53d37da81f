//! Graphics API seam
//!
//! The asset types never talk to OpenGL directly. They issue primitive
//! calls through [`GraphicsApi`], reached via the shared [`Gpu`] context.

pub mod gpu;
pub mod graphics_api;
pub mod recording;

pub use gpu::{BindingId, Gpu, GpuContext};
pub use graphics_api::{
    AttributeLayout, BufferId, BufferTarget, GraphicsApi, PixelFormat, ProgramId, ShaderStage,
    TextureId, TextureImage, UniformLocation, UniformValue, VertexArrayId,
};
pub use recording::{CallLog, GpuCall, RecordingApi};
