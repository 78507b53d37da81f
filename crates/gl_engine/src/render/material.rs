//! Materials: textures plus shading parameters
//!
//! A material references its textures by [`TextureHandle`]; the textures
//! themselves live in the resource manager's [`TextureStore`] and may be
//! shared between materials. A pushed material holds each of its textures
//! on the GPU until it is removed.

use crate::foundation::math::Vec3;

use super::api::UniformValue;
use super::shader::{upload_uniform, Shader};
use super::texture::{TextureFlags, TextureHandle, TextureStore, TextureType};

/// Textures and shading parameters applied to a mesh
///
/// A diffuse colour multiplies the diffuse texture, so untinted textures
/// need a white diffuse colour. When a specular map is present the shader
/// ignores the shininess value.
#[derive(Debug)]
pub struct Material {
    textures: Vec<TextureHandle>,
    diffuse_color: Vec3,
    specular_color: Vec3,
    shininess: f32,
    texture_flags: TextureFlags,
    loaded: bool,
    on_gpu: bool,
    bound: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            textures: Vec::new(),
            diffuse_color: Vec3::new(1.0, 1.0, 1.0),
            specular_color: Vec3::new(1.0, 1.0, 1.0),
            shininess: 0.0,
            texture_flags: TextureFlags::empty(),
            loaded: false,
            on_gpu: false,
            bound: false,
        }
    }
}

// A copy never shares the source's binding.
impl Clone for Material {
    fn clone(&self) -> Self {
        Self {
            textures: self.textures.clone(),
            diffuse_color: self.diffuse_color,
            specular_color: self.specular_color,
            shininess: self.shininess,
            texture_flags: self.texture_flags,
            loaded: self.loaded,
            on_gpu: false,
            bound: false,
        }
    }
}

impl Material {
    /// Create a blank material
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the material
    ///
    /// Must be called once; each texture type may appear at most once among
    /// `textures`.
    pub fn load(
        &mut self,
        textures: Vec<TextureHandle>,
        store: &TextureStore,
        diffuse_color: Vec3,
        specular_color: Vec3,
        shininess: f32,
    ) {
        debug_assert!(!self.loaded, "material loaded twice");

        let mut flags = TextureFlags::empty();
        for texture in textures.iter().filter_map(|handle| store.get(*handle)) {
            let flag = texture.texture_type().flag();
            debug_assert!(
                !flags.intersects(flag),
                "material holds two {} textures",
                texture.texture_type().name()
            );
            flags |= flag;
        }

        self.textures = textures;
        self.diffuse_color = diffuse_color;
        self.specular_color = specular_color;
        self.shininess = shininess;
        self.texture_flags = flags;
        self.bound = false;
        self.loaded = true;
    }

    /// Hold every texture on the GPU, uploading it if needed
    ///
    /// No-op if not loaded or already pushed. Returns whether the material
    /// is pushed; if any texture fails to upload, the holds taken so far
    /// are released.
    pub fn push(&mut self, shader: &Shader, store: &mut TextureStore) -> bool {
        if !self.loaded || self.on_gpu {
            return self.on_gpu;
        }

        for (index, handle) in self.textures.iter().enumerate() {
            let Some(texture) = store.get_mut(*handle) else {
                continue;
            };
            if !texture.retain(shader.gpu()) {
                log::warn!("Material.push: texture {} failed to upload", index);
                release_all(&self.textures[..index], store);
                return false;
            }
        }

        self.on_gpu = true;
        true
    }

    /// Release every texture hold; textures no other material holds leave the GPU
    pub fn remove(&mut self, store: &mut TextureStore) {
        if !self.loaded || !self.on_gpu {
            return;
        }

        release_all(&self.textures, store);
        self.on_gpu = false;
        self.bound = false;
    }

    /// Bind every texture in order, then upload the shading uniforms
    pub fn bind(&mut self, shader: &Shader, store: &mut TextureStore) {
        if !self.loaded {
            return;
        }

        for handle in &self.textures {
            if let Some(texture) = store.get_mut(*handle) {
                texture.bind();
            }
        }

        let uniforms = shader.uniforms();
        shader.gpu().with(|api| {
            upload_uniform(api, uniforms.color_diffuse, UniformValue::Vec3(self.diffuse_color.into()));
            upload_uniform(api, uniforms.color_specular, UniformValue::Vec3(self.specular_color.into()));
            upload_uniform(api, uniforms.shininess, UniformValue::Float(self.shininess));
            upload_uniform(api, uniforms.material_flags, UniformValue::UInt(self.texture_flags.bits()));
        });
        shader.gpu().log_error("Material.bind");
        self.bound = true;
    }

    /// Unbind every texture in the order they were bound
    pub fn unbind(&mut self, store: &mut TextureStore) {
        if !self.loaded {
            return;
        }

        for handle in &self.textures {
            if let Some(texture) = store.get_mut(*handle) {
                texture.unbind();
            }
        }
        self.bound = false;
    }

    /// Bind the material for the lifetime of the returned guard
    pub fn bind_scoped<'a>(
        &'a mut self,
        shader: &Shader,
        store: &'a mut TextureStore,
    ) -> MaterialBinding<'a> {
        self.bind(shader, store);
        MaterialBinding {
            material: self,
            store,
        }
    }

    /// Handles of the referenced textures, in bind order
    pub fn textures(&self) -> &[TextureHandle] {
        &self.textures
    }

    /// Whether a texture of `texture_type` is present
    pub fn has_texture(&self, texture_type: TextureType) -> bool {
        !texture_type.flag().is_empty() && self.texture_flags.contains(texture_type.flag())
    }

    /// Diffuse colour
    pub fn diffuse_color(&self) -> Vec3 {
        self.diffuse_color
    }

    /// Specular colour
    pub fn specular_color(&self) -> Vec3 {
        self.specular_color
    }

    /// Shininess exponent
    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    /// Texture types present
    pub fn texture_flags(&self) -> TextureFlags {
        self.texture_flags
    }

    /// Whether `load` has been called
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the material holds its textures on the GPU
    pub fn is_on_gpu(&self) -> bool {
        self.on_gpu
    }

    /// Whether the material is currently bound
    pub fn is_bound(&self) -> bool {
        self.bound
    }
}

fn release_all(handles: &[TextureHandle], store: &mut TextureStore) {
    for handle in handles {
        if let Some(texture) = store.get_mut(*handle) {
            texture.release();
        }
    }
}

/// Active material binding, unbound on drop
pub struct MaterialBinding<'a> {
    material: &'a mut Material,
    store: &'a mut TextureStore,
}

impl MaterialBinding<'_> {
    /// The bound material
    pub fn material(&self) -> &Material {
        self.material
    }
}

impl Drop for MaterialBinding<'_> {
    fn drop(&mut self) {
        self.material.unbind(self.store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::{CallLog, Gpu, GpuCall, GpuContext, RecordingApi};
    use crate::render::texture::Texture;
    use std::path::Path;

    fn shader(gpu: &GpuContext, root: &Path) -> Shader {
        let dir = root.join("simple");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("vert.glsl"), "void main() {}").unwrap();
        Shader::load(gpu, "simple", root).unwrap()
    }

    fn texture(store: &mut TextureStore, texture_type: TextureType) -> TextureHandle {
        let mut texture = Texture::new();
        texture.load(texture_type, vec![0; 3], 1, 1, 24);
        store.insert(texture)
    }

    fn setup() -> (GpuContext, CallLog, tempfile::TempDir) {
        let api = RecordingApi::new();
        let log = api.log();
        (Gpu::new(api), log, tempfile::tempdir().unwrap())
    }

    #[test]
    fn test_load_builds_flag_union() {
        let mut store = TextureStore::with_key();
        let diffuse = texture(&mut store, TextureType::Diffuse);
        let bump = texture(&mut store, TextureType::Bump);

        let mut material = Material::new();
        material.load(vec![diffuse, bump], &store, Vec3::new(1.0, 1.0, 1.0), Vec3::zeros(), 16.0);

        assert!(material.is_loaded());
        assert_eq!(material.texture_flags(), TextureFlags::DIFFUSE | TextureFlags::BUMP);
        assert!(material.has_texture(TextureType::Bump));
        assert!(!material.has_texture(TextureType::Specular));
    }

    #[test]
    #[should_panic(expected = "two diffuse textures")]
    #[cfg(debug_assertions)]
    fn test_duplicate_texture_type_asserts() {
        let mut store = TextureStore::with_key();
        let first = texture(&mut store, TextureType::Diffuse);
        let second = texture(&mut store, TextureType::Diffuse);

        let mut material = Material::new();
        material.load(vec![first, second], &store, Vec3::zeros(), Vec3::zeros(), 0.0);
    }

    #[test]
    fn test_bind_uploads_uniforms_and_unbind_restores_slots() {
        let (gpu, log, root) = setup();
        let shader = shader(&gpu, root.path());
        let mut store = TextureStore::with_key();
        let diffuse = texture(&mut store, TextureType::Diffuse);
        let specular = texture(&mut store, TextureType::Specular);

        let mut material = Material::new();
        material.load(
            vec![diffuse, specular],
            &store,
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(1.0, 1.0, 1.0),
            32.0,
        );
        material.push(&shader, &mut store);
        log.clear();

        material.bind(&shader, &mut store);
        assert!(material.is_bound());
        assert!(store[diffuse].is_bound() && store[specular].is_bound());
        assert!(log.calls().contains(&GpuCall::SetUniform {
            name: "valMatFlags".to_string(),
            value: UniformValue::UInt(0x3),
        }));
        assert!(log.calls().contains(&GpuCall::SetUniform {
            name: "colorDiffuse".to_string(),
            value: UniformValue::Vec3([0.5, 0.5, 0.5]),
        }));

        material.unbind(&mut store);
        assert!(!material.is_bound());
        assert!(!store[diffuse].is_bound() && !store[specular].is_bound());

        let unbinds = log.count(|call| matches!(call, GpuCall::BindTexture { texture: None, .. }));
        assert_eq!(unbinds, 2);
    }

    #[test]
    fn test_unloaded_material_ignores_bind() {
        let (gpu, log, root) = setup();
        let shader = shader(&gpu, root.path());
        let mut store = TextureStore::with_key();
        log.clear();

        let mut material = Material::new();
        material.bind(&shader, &mut store);

        assert!(!material.is_bound());
        assert!(log.is_empty());
    }

    #[test]
    fn test_scoped_binding_unbinds_on_drop() {
        let (gpu, _log, root) = setup();
        let shader = shader(&gpu, root.path());
        let mut store = TextureStore::with_key();
        let diffuse = texture(&mut store, TextureType::Diffuse);

        let mut material = Material::new();
        material.load(vec![diffuse], &store, Vec3::zeros(), Vec3::zeros(), 0.0);
        material.push(&shader, &mut store);

        {
            let binding = material.bind_scoped(&shader, &mut store);
            assert!(binding.material().is_bound());
        }
        assert!(!material.is_bound());
        assert!(!store[diffuse].is_bound());
    }

    #[test]
    fn test_clone_of_bound_material_starts_unbound() {
        let (gpu, _log, root) = setup();
        let shader = shader(&gpu, root.path());
        let mut store = TextureStore::with_key();

        let mut material = Material::new();
        material.load(Vec::new(), &store, Vec3::zeros(), Vec3::zeros(), 4.0);
        material.bind(&shader, &mut store);

        let copy = material.clone();
        assert!(material.is_bound());
        assert!(copy.is_loaded());
        assert!(!copy.is_bound());
        assert_eq!(copy.shininess(), 4.0);
    }

    #[test]
    fn test_default_colors_are_white() {
        let material = Material::new();
        assert_eq!(material.diffuse_color(), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(material.specular_color(), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(material.shininess(), 0.0);
    }

    #[test]
    fn test_unloaded_material_ignores_push_and_remove() {
        let (gpu, log, root) = setup();
        let shader = shader(&gpu, root.path());
        let mut store = TextureStore::with_key();
        log.clear();

        let mut material = Material::new();
        assert!(!material.push(&shader, &mut store));
        material.remove(&mut store);

        assert!(!material.is_on_gpu());
        assert!(log.is_empty());
    }

    #[test]
    fn test_shared_texture_survives_until_last_remove() {
        let (gpu, log, root) = setup();
        let shader = shader(&gpu, root.path());
        let mut store = TextureStore::with_key();
        let diffuse = texture(&mut store, TextureType::Diffuse);

        let mut first = Material::new();
        first.load(vec![diffuse], &store, Vec3::zeros(), Vec3::zeros(), 0.0);
        let mut second = first.clone();
        assert!(first.push(&shader, &mut store));
        assert!(second.push(&shader, &mut store));
        assert!(second.push(&shader, &mut store));
        assert_eq!(store[diffuse].holders(), 2);

        first.remove(&mut store);
        first.remove(&mut store);
        assert!(store[diffuse].is_on_gpu());

        second.remove(&mut store);
        assert!(!store[diffuse].is_on_gpu());
        assert_eq!(log.count(|call| matches!(call, GpuCall::CreateTexture(_))), 1);
        assert_eq!(log.count(|call| matches!(call, GpuCall::DeleteTexture(_))), 1);
    }

    #[test]
    fn test_failed_texture_upload_releases_earlier_holds() {
        let (gpu, log, root) = setup();
        let shader = shader(&gpu, root.path());
        let mut store = TextureStore::with_key();
        let diffuse = texture(&mut store, TextureType::Diffuse);
        let mut specular = Texture::new();
        specular.load(TextureType::Specular, vec![0; 2], 2, 2, 24);
        let specular = store.insert(specular);

        let mut material = Material::new();
        material.load(vec![diffuse, specular], &store, Vec3::zeros(), Vec3::zeros(), 0.0);

        assert!(!material.push(&shader, &mut store));
        assert!(!material.is_on_gpu());
        assert!(!store[diffuse].is_on_gpu());
        assert_eq!(log.count(|call| matches!(call, GpuCall::DeleteTexture(_))), 1);
    }
}
