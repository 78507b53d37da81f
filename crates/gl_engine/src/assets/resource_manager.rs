//! Resource Manager - identity-keyed cache of models and textures
//!
//! The manager is the sole owner of every [`Model`] and [`Texture`] it loads.
//! Callers receive generation-checked handles; a resource id (a logical path
//! such as `models/box.obj`) maps to exactly one instance for the lifetime
//! of the manager and is never reloaded.
//!
//! Lifecycle is enforced by ownership: [`ResourceManager::startup`] is the
//! only constructor and [`ResourceManager::shutdown`] consumes the manager,
//! forcing every cached asset off the GPU before releasing it.

use std::collections::HashMap;

use slotmap::SlotMap;
use thiserror::Error;

use crate::core::config::ResourceConfig;
use crate::render::{Model, ModelHandle, Shader, Texture, TextureHandle, TextureStore, TextureType};

use super::image_loader::ImageDecoder;
use super::import::SceneImporter;
use super::material_factory::TextureSource;
use super::model_factory::ModelFactory;
use super::texture_factory::TextureFactory;
use super::FactoryError;

/// Resource Manager errors
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The factory for `id` failed
    #[error("Failed to load resource '{id}': {source}")]
    Load {
        /// Resource id that was requested
        id: String,
        /// Underlying factory failure
        source: FactoryError,
    },
}

/// Owner of every loaded model and texture
pub struct ResourceManager {
    config: ResourceConfig,
    importer: Box<dyn SceneImporter>,
    decoder: Box<dyn ImageDecoder>,
    models: SlotMap<ModelHandle, Model>,
    model_ids: HashMap<String, ModelHandle>,
    textures: TextureStore,
    texture_ids: HashMap<String, TextureHandle>,
}

impl ResourceManager {
    /// Start the manager with empty caches
    pub fn startup(
        config: ResourceConfig,
        importer: Box<dyn SceneImporter>,
        decoder: Box<dyn ImageDecoder>,
    ) -> Self {
        log::info!(
            "ResourceManager started (root: {})",
            config.resource_root.display()
        );
        Self {
            config,
            importer,
            decoder,
            models: SlotMap::with_key(),
            model_ids: HashMap::new(),
            textures: TextureStore::with_key(),
            texture_ids: HashMap::new(),
        }
    }

    /// Return the model for `resource_id`, loading it on first request
    ///
    /// The returned model is loaded but not resident; push it with
    /// [`push_model`](Self::push_model).
    pub fn load_model(&mut self, resource_id: &str) -> Result<ModelHandle, ResourceError> {
        if let Some(&handle) = self.model_ids.get(resource_id) {
            log::trace!("Model cache hit: {}", resource_id);
            return Ok(handle);
        }

        let path = self.config.resolve(resource_id);
        let mut loader = TextureLoader {
            config: &self.config,
            decoder: self.decoder.as_ref(),
            textures: &mut self.textures,
            texture_ids: &mut self.texture_ids,
        };
        let model = ModelFactory::create(self.importer.as_ref(), &path, resource_id, &mut loader)
            .map_err(|source| ResourceError::Load {
                id: resource_id.to_string(),
                source,
            })?;

        log::info!(
            "Loaded model '{}' ({} meshes, {} materials)",
            resource_id,
            model.meshes().len(),
            model.materials().len()
        );
        let handle = self.models.insert(model);
        self.model_ids.insert(resource_id.to_string(), handle);
        Ok(handle)
    }

    /// Return the texture for `resource_id`, loading it on first request
    ///
    /// A cached texture must have been loaded with the same `texture_type`.
    pub fn load_texture(
        &mut self,
        resource_id: &str,
        texture_type: TextureType,
    ) -> Result<TextureHandle, ResourceError> {
        self.texture_loader().load_texture(resource_id, texture_type)
    }

    /// Upload a model and its textures
    pub fn push_model(&mut self, handle: ModelHandle, shader: &Shader) {
        match self.models.get_mut(handle) {
            Some(model) => model.push(shader, &mut self.textures),
            None => log::warn!("push_model: stale model handle {:?}", handle),
        }
    }

    /// Draw a resident model with its materials bound
    pub fn render_model(&mut self, handle: ModelHandle, shader: &Shader) {
        if let Some(model) = self.models.get_mut(handle) {
            model.render(shader, &mut self.textures);
        }
    }

    /// Free a model's GPU buffers and release its texture holds
    ///
    /// A texture still held by another pushed model stays on the GPU.
    pub fn remove_model(&mut self, handle: ModelHandle) {
        if let Some(model) = self.models.get_mut(handle) {
            model.remove(&mut self.textures);
        }
    }

    /// Model behind `handle`
    pub fn model(&self, handle: ModelHandle) -> Option<&Model> {
        self.models.get(handle)
    }

    /// Mutable model behind `handle`
    pub fn model_mut(&mut self, handle: ModelHandle) -> Option<&mut Model> {
        self.models.get_mut(handle)
    }

    /// Texture behind `handle`
    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle)
    }

    /// Every cached texture
    pub fn textures(&self) -> &TextureStore {
        &self.textures
    }

    /// Handle of an already loaded model
    pub fn model_handle(&self, resource_id: &str) -> Option<ModelHandle> {
        self.model_ids.get(resource_id).copied()
    }

    /// Handle of an already loaded texture
    pub fn texture_handle(&self, resource_id: &str) -> Option<TextureHandle> {
        self.texture_ids.get(resource_id).copied()
    }

    /// Number of cached models
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Number of cached textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Configuration the manager resolves resource ids with
    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Remove every cached asset from the GPU, then release them all
    pub fn shutdown(mut self) {
        for model in self.models.values_mut() {
            model.remove(&mut self.textures);
        }
        for texture in self.textures.values_mut() {
            texture.remove();
        }

        log::info!(
            "ResourceManager shut down: released {} models, {} textures",
            self.models.len(),
            self.textures.len()
        );
    }

    fn texture_loader(&mut self) -> TextureLoader<'_> {
        TextureLoader {
            config: &self.config,
            decoder: self.decoder.as_ref(),
            textures: &mut self.textures,
            texture_ids: &mut self.texture_ids,
        }
    }
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("config", &self.config)
            .field("models", &self.model_ids.keys().collect::<Vec<_>>())
            .field("textures", &self.texture_ids.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Texture cache borrowed apart from the model cache
///
/// Lets the model factory load textures while the manager is mid-way
/// through loading a model.
struct TextureLoader<'a> {
    config: &'a ResourceConfig,
    decoder: &'a dyn ImageDecoder,
    textures: &'a mut TextureStore,
    texture_ids: &'a mut HashMap<String, TextureHandle>,
}

impl TextureSource for TextureLoader<'_> {
    fn load_texture(
        &mut self,
        resource_id: &str,
        texture_type: TextureType,
    ) -> Result<TextureHandle, ResourceError> {
        if let Some(&handle) = self.texture_ids.get(resource_id) {
            debug_assert!(
                self.textures
                    .get(handle)
                    .map_or(true, |texture| texture.texture_type() == texture_type),
                "texture '{}' requested as {} but cached with another type",
                resource_id,
                texture_type.name()
            );
            log::trace!("Texture cache hit: {}", resource_id);
            return Ok(handle);
        }

        let path = self.config.resolve(resource_id);
        let texture = TextureFactory::create(self.decoder, &path, texture_type).map_err(
            |source| ResourceError::Load {
                id: resource_id.to_string(),
                source,
            },
        )?;

        log::info!(
            "Loaded texture '{}' ({}x{}, {} bpp, {})",
            resource_id,
            texture.width(),
            texture.height(),
            texture.bits_per_pixel(),
            texture_type.name()
        );
        let handle = self.textures.insert(texture);
        self.texture_ids.insert(resource_id.to_string(), handle);
        Ok(handle)
    }

    fn store(&self) -> &TextureStore {
        &*self.textures
    }
}
