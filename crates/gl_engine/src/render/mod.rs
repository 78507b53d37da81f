//! # Rendering
//!
//! The renderable asset graph and its GPU-residency state machine.
//!
//! Every asset moves through the same states:
//!
//! ```text
//! unloaded → loaded → on GPU → (bound ⇄ unbound) → on GPU → removed
//! ```
//!
//! `push`, `bind`, `unbind`, `render` and `remove` are idempotent and
//! silently ignore calls made in a state where they mean nothing. GPU
//! handles are owned by drop guards ([`mesh::GpuMesh`],
//! [`texture::GpuTexture`], [`Shader`]) so they are released on every path.

pub mod api;
pub mod backends;
pub mod camera;
pub mod material;
pub mod mesh;
pub mod model;
pub mod renderer;
pub mod shader;
pub mod target;
pub mod texture;

use std::path::PathBuf;

use thiserror::Error;

pub use api::{Gpu, GpuContext, GraphicsApi, RecordingApi};
pub use camera::Camera;
pub use material::{Material, MaterialBinding};
pub use mesh::{Mesh, Vertex};
pub use model::{Model, ModelHandle};
pub use renderer::Renderer;
pub use shader::Shader;
pub use target::{RenderTarget, Viewport};
pub use texture::{Texture, TextureFlags, TextureHandle, TextureStore, TextureType};

/// Shader loading errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// A stage source exists but could not be read
    #[error("Failed to read shader source {path}: {source}")]
    ShaderSource {
        /// Stage file
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The set directory holds no stage sources
    #[error("No shader stages found in {0}")]
    NoStages(PathBuf),

    /// Compilation or linking failed
    #[error("Shader set '{set}' failed to build: {message}")]
    Link {
        /// Shader set name
        set: String,
        /// Backend diagnostic
        message: String,
    },
}
