//! # GL Engine
//!
//! Asset residency and rendering core for a small OpenGL model viewer.
//!
//! ## Features
//!
//! - **Resource Manager**: identity-keyed caching of models and textures by resource id
//! - **Residency State Machine**: every renderable asset moves through
//!   loaded → pushed → bound → removed with idempotent, no-op-on-misuse operations
//! - **Backend Seam**: all GPU work goes through the [`render::GraphicsApi`] trait,
//!   with an OpenGL implementation and a recording implementation for headless use
//! - **Scoped GPU Guards**: GPU handles and material bindings release themselves on drop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gl_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gpu = Gpu::new(RecordingApi::new());
//!     let mut resources = ResourceManager::startup(
//!         ResourceConfig::new("resources"),
//!         Box::new(ObjImporter::new()),
//!         Box::new(FileImageDecoder),
//!     );
//!
//!     let shader = Shader::load(&gpu, "simple", "resources/shaders")?;
//!     let model = resources.load_model("models/box.obj")?;
//!     resources.push_model(model, &shader);
//!
//!     resources.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core configuration
pub mod core;
pub mod config;

pub mod foundation;
pub mod assets;
pub mod render;
pub mod scene;

#[cfg(test)]
mod testing;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{
            FileImageDecoder, ImageDecoder, ObjImporter, ResourceError, ResourceManager,
            SceneImporter,
        },
        core::config::{ResourceConfig, ViewerConfig},
        foundation::{
            math::{Mat4, Transform, Vec3},
            time::Clock,
        },
        render::{
            Camera, Gpu, GpuContext, GraphicsApi, Material, Mesh, Model, ModelHandle,
            RecordingApi, RenderTarget, Renderer, Shader, Texture, TextureHandle, TextureType,
            Vertex, Viewport,
        },
        scene::{ObjectKind, Scene, SceneObject},
    };
}
