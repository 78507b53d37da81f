//! Asset management system
//!
//! Importers and decoders read files; factories turn what they produce into
//! render assets; the [`ResourceManager`] caches the results by resource id.

pub mod image_loader;
pub mod import;
pub mod material_factory;
pub mod mesh_factory;
pub mod model_factory;
pub mod obj_importer;
pub mod resource_manager;
pub mod texture_factory;

pub use image_loader::{DecodedImage, FileImageDecoder, ImageDecoder, ImageError};
pub use import::{ImportError, ImportedScene, SceneImporter};
pub use material_factory::{MaterialFactory, TextureSource};
pub use mesh_factory::MeshFactory;
pub use model_factory::ModelFactory;
pub use obj_importer::ObjImporter;
pub use resource_manager::{ResourceError, ResourceManager};
pub use texture_factory::TextureFactory;

use thiserror::Error;

/// Factory failures
#[derive(Debug, Error)]
pub enum FactoryError {
    /// The model file could not be imported
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    /// A texture image could not be decoded
    #[error("Image decode failed: {0}")]
    Image(#[from] ImageError),

    /// A texture referenced by a material failed to load
    #[error("Texture load failed: {0}")]
    Texture(Box<ResourceError>),

    /// A mesh has more than one texture-coordinate channel
    #[error("Mesh '{mesh}' has {count} UV channels, at most one is supported")]
    TooManyUvChannels {
        /// Mesh name
        mesh: String,
        /// Channel count
        count: usize,
    },

    /// A mesh's UV channel is not two-dimensional
    #[error("Mesh '{mesh}' has {components}-component UVs, expected 2")]
    UvComponents {
        /// Mesh name
        mesh: String,
        /// Components per vertex
        components: u32,
    },

    /// A face is not a triangle
    #[error("Mesh '{mesh}' has a face with {corners} corners")]
    NonTriangularFace {
        /// Mesh name
        mesh: String,
        /// Corner count
        corners: usize,
    },

    /// A face references a vertex that does not exist
    #[error("Mesh '{mesh}' references vertex {index} of {vertex_count}")]
    IndexOutOfRange {
        /// Mesh name
        mesh: String,
        /// Offending index
        index: u32,
        /// Number of vertices
        vertex_count: usize,
    },

    /// A node references a mesh the scene does not contain
    #[error("Node '{node}' references missing mesh {index}")]
    MissingMesh {
        /// Node name
        node: String,
        /// Offending mesh index
        index: usize,
    },
}
