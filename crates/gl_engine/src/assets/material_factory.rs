//! Builds materials from imported material descriptions

use crate::foundation::math::Vec3;
use crate::render::{Material, TextureHandle, TextureStore, TextureType};

use super::import::{
    ImportedMaterial, ImportedTextureKind, MATKEY_COLOR_DIFFUSE, MATKEY_COLOR_SPECULAR,
    MATKEY_SHININESS,
};
use super::resource_manager::ResourceError;
use super::FactoryError;

/// Texture slots read from an imported material, in bind order
const TEXTURE_SLOTS: [(ImportedTextureKind, TextureType); 3] = [
    (ImportedTextureKind::Diffuse, TextureType::Diffuse),
    (ImportedTextureKind::Specular, TextureType::Specular),
    (ImportedTextureKind::Normals, TextureType::Bump),
];

/// Where the material factory gets its textures from
///
/// Implemented by the resource manager so texture references are cached by
/// resource id and shared between materials.
pub trait TextureSource {
    /// Load (or fetch the cached) texture for `resource_id`
    fn load_texture(
        &mut self,
        resource_id: &str,
        texture_type: TextureType,
    ) -> Result<TextureHandle, ResourceError>;

    /// Arena the returned handles point into
    fn store(&self) -> &TextureStore;
}

/// Resource id of a texture referenced by the model `model_id`
///
/// Texture references are relative to the model file's directory.
pub fn texture_resource_id(model_id: &str, reference: &str) -> String {
    let reference = reference.replace('\\', "/");
    match model_id.rsplit_once('/') {
        Some((directory, _)) if !directory.is_empty() => format!("{directory}/{reference}"),
        _ => reference,
    }
}

/// Converts an [`ImportedMaterial`] into a loaded [`Material`]
pub struct MaterialFactory;

impl MaterialFactory {
    /// Build a material, loading its textures through `textures`
    ///
    /// Colours default to white and shininess to zero when absent.
    pub fn create(
        imported: &ImportedMaterial,
        model_id: &str,
        textures: &mut dyn TextureSource,
    ) -> Result<Material, FactoryError> {
        let mut handles = Vec::new();
        for (kind, texture_type) in &TEXTURE_SLOTS {
            let Some(reference) = imported.texture(kind) else {
                continue;
            };
            let resource_id = texture_resource_id(model_id, reference);
            let handle = textures
                .load_texture(&resource_id, *texture_type)
                .map_err(|error| FactoryError::Texture(Box::new(error)))?;
            handles.push(handle);
        }

        let diffuse = imported.color(MATKEY_COLOR_DIFFUSE).unwrap_or([1.0; 3]);
        let specular = imported.color(MATKEY_COLOR_SPECULAR).unwrap_or([1.0; 3]);
        let shininess = imported.float(MATKEY_SHININESS).unwrap_or(0.0);

        let mut material = Material::new();
        material.load(
            handles,
            textures.store(),
            Vec3::from(diffuse),
            Vec3::from(specular),
            shininess,
        );
        Ok(material)
    }
}
