//! # Unified Configuration
//!
//! Configuration structures for the resource manager and the viewer
//! application. Both implement [`Config`] so they can be read from TOML or
//! RON files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use crate::config::{Config, ConfigError};

/// # Resource Configuration
///
/// Controls how logical resource ids are mapped onto the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Directory every resource id is resolved against
    pub resource_root: PathBuf,
}

impl ResourceConfig {
    /// Create a configuration rooted at `resource_root`
    pub fn new(resource_root: impl Into<PathBuf>) -> Self {
        Self {
            resource_root: resource_root.into(),
        }
    }

    /// Resolve a resource id (e.g. `models/box.obj`) to a filesystem path
    pub fn resolve(&self, resource_id: &str) -> PathBuf {
        self.resource_root.join(resource_id)
    }

    /// Directory holding the shader sets
    pub fn shader_root(&self) -> PathBuf {
        self.resource_root.join("shaders")
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self::new("resources")
    }
}

impl Config for ResourceConfig {}

/// Camera placement for the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Camera position
    pub eye: [f32; 3],
    /// Point the camera looks at
    pub target: [f32; 3],
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.0, 5.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 45.0,
            near: 0.01,
            far: 100.0,
        }
    }
}

/// # Viewer Configuration
///
/// Everything the model viewer needs to open a window and populate a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Clear colour (RGBA)
    pub clear_color: [f32; 4],
    /// Name of the shader set under `<resource_root>/shaders`
    pub shader_set: String,
    /// Resource ids of the models placed in the scene
    pub models: Vec<String>,
    /// Model spin in radians per second around each axis
    pub spin: [f32; 3],
    /// Camera placement
    pub camera: CameraConfig,
    /// Resource lookup
    pub resources: ResourceConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Model Viewer: Blinn-Phong".to_string(),
            width: 800,
            height: 600,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            shader_set: "simple".to_string(),
            models: vec!["models/box.obj".to_string()],
            spin: [0.0, 0.6, 0.0],
            camera: CameraConfig::default(),
            resources: ResourceConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Width / height ratio of the configured window
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Load the viewer config, defaulting when `path` does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_or_default(path)
    }
}

impl Config for ViewerConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_joins_resource_root() {
        let config = ResourceConfig::new("/data/res");
        assert_eq!(config.resolve("models/box.obj"), PathBuf::from("/data/res/models/box.obj"));
        assert_eq!(config.shader_root(), PathBuf::from("/data/res/shaders"));
    }

    #[test]
    fn test_viewer_config_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.toml");

        let mut config = ViewerConfig::default();
        config.models = vec!["models/teapot.obj".to_string()];
        config.save_to_file(&path).unwrap();

        let loaded = ViewerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_viewer_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.toml");
        std::fs::write(&path, "title = \"Custom\"\nwidth = 1024\n").unwrap();

        let loaded = ViewerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.title, "Custom");
        assert_eq!(loaded.width, 1024);
        assert_eq!(loaded.height, 600);
        assert_eq!(loaded.shader_set, "simple");
    }

    #[test]
    fn test_missing_config_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ViewerConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, ViewerConfig::default());
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.json");
        std::fs::write(&path, "{}").unwrap();

        assert!(matches!(
            ViewerConfig::load_from_file(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
