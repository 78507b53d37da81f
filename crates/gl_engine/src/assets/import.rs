//! Imported scene representation
//!
//! Importers turn a model file into an [`ImportedScene`]: a node hierarchy
//! referencing raw meshes, plus materials described as key/value properties
//! and texture references. The factories consume this structure and never
//! look at file formats themselves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Diffuse colour property key
pub const MATKEY_COLOR_DIFFUSE: &str = "$clr.diffuse";
/// Specular colour property key
pub const MATKEY_COLOR_SPECULAR: &str = "$clr.specular";
/// Shininess exponent property key
pub const MATKEY_SHININESS: &str = "$mat.shininess";

/// Import failures
#[derive(Debug, Error)]
pub enum ImportError {
    /// The model file does not exist
    #[error("Model file not found: {0}")]
    NotFound(PathBuf),

    /// The file could not be parsed
    #[error("Failed to import {path}: {message}")]
    Parse {
        /// Model file
        path: PathBuf,
        /// Importer diagnostic
        message: String,
    },

    /// The file parsed but produced no usable scene
    #[error("Incomplete scene in {0}")]
    Incomplete(PathBuf),
}

/// Node in the imported hierarchy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedNode {
    /// Node name
    pub name: String,
    /// Indices into [`ImportedScene::meshes`]
    pub meshes: Vec<usize>,
    /// Child nodes
    pub children: Vec<ImportedNode>,
}

/// One texture-coordinate channel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UvChannel {
    /// Components per vertex
    pub components: u32,
    /// Flattened coordinates, `components` per vertex
    pub coords: Vec<f32>,
}

/// Raw mesh data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedMesh {
    /// Mesh name
    pub name: String,
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals (may be empty)
    pub normals: Vec<[f32; 3]>,
    /// Texture-coordinate channels
    pub uv_channels: Vec<UvChannel>,
    /// Faces as vertex index lists
    pub faces: Vec<Vec<u32>>,
    /// Index into [`ImportedScene::materials`]
    pub material_index: Option<usize>,
}

/// Texture slot a material references a file for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportedTextureKind {
    /// Diffuse map
    Diffuse,
    /// Specular map
    Specular,
    /// Normal map
    Normals,
    /// Ambient map
    Ambient,
    /// Height map
    Height,
    /// Anything else the importer recognised
    Other(String),
}

/// Material property value
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialProperty {
    /// RGB colour
    Color([f32; 3]),
    /// Scalar
    Float(f32),
    /// Free text
    Text(String),
}

/// Raw material description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedMaterial {
    /// Material name
    pub name: String,
    /// Properties keyed by `$clr.*` / `$mat.*` names
    pub properties: HashMap<String, MaterialProperty>,
    /// Referenced texture files, relative to the model file
    pub textures: Vec<(ImportedTextureKind, String)>,
}

impl ImportedMaterial {
    /// Colour property, if present
    pub fn color(&self, key: &str) -> Option<[f32; 3]> {
        match self.properties.get(key) {
            Some(MaterialProperty::Color(color)) => Some(*color),
            _ => None,
        }
    }

    /// Scalar property, if present
    pub fn float(&self, key: &str) -> Option<f32> {
        match self.properties.get(key) {
            Some(MaterialProperty::Float(value)) => Some(*value),
            _ => None,
        }
    }

    /// First texture file for `kind`
    pub fn texture(&self, kind: &ImportedTextureKind) -> Option<&str> {
        self.textures
            .iter()
            .find(|(candidate, _)| candidate == kind)
            .map(|(_, path)| path.as_str())
    }
}

/// Whole imported file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedScene {
    /// Root of the node hierarchy
    pub root: ImportedNode,
    /// Every mesh in the file
    pub meshes: Vec<ImportedMesh>,
    /// Every material in the file
    pub materials: Vec<ImportedMaterial>,
    /// Set when the importer could not produce a complete scene
    pub incomplete: bool,
}

/// Model file importer
pub trait SceneImporter {
    /// Import the file at `path`
    fn import(&self, path: &Path) -> Result<ImportedScene, ImportError>;
}
