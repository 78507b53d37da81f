//! Models: meshes plus the materials they reference

use slotmap::new_key_type;

use super::material::Material;
use super::mesh::Mesh;
use super::shader::Shader;
use super::texture::TextureStore;

new_key_type! {
    /// Generation-checked handle to a model owned by the resource manager
    pub struct ModelHandle;
}

/// Ordered meshes and a parallel material list
///
/// Residency is all-or-nothing: `push` and `remove` act on every mesh and
/// material together.
#[derive(Debug, Default)]
pub struct Model {
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    loaded: bool,
    on_gpu: bool,
}

// Copies never share GPU state.
impl Clone for Model {
    fn clone(&self) -> Self {
        Self {
            meshes: self.meshes.clone(),
            materials: self.materials.clone(),
            loaded: self.loaded,
            on_gpu: false,
        }
    }
}

impl Model {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace meshes and materials; the model must not be resident
    pub fn load(&mut self, meshes: Vec<Mesh>, materials: Vec<Material>) {
        debug_assert!(!self.on_gpu, "model reloaded while resident on the GPU");

        self.meshes = meshes;
        self.materials = materials;
        self.loaded = true;
        self.on_gpu = false;
    }

    /// Push every mesh, then every material
    ///
    /// The model becomes resident only if all of them succeed; otherwise
    /// whatever was pushed is removed again.
    pub fn push(&mut self, shader: &Shader, textures: &mut TextureStore) {
        if self.on_gpu {
            return;
        }

        let mut complete = true;
        for mesh in &mut self.meshes {
            mesh.push(shader);
            complete &= mesh.is_on_gpu() || !mesh.is_loaded();
        }
        if complete {
            for material in &mut self.materials {
                if !material.push(shader, textures) && material.is_loaded() {
                    complete = false;
                    break;
                }
            }
        }
        shader.gpu().log_error("Model.push");

        if complete {
            self.on_gpu = true;
        } else {
            log::warn!("Model.push: incomplete upload, model left off the GPU");
            self.release(textures);
        }
    }

    /// Draw every mesh, each wrapped in a binding of its material
    pub fn render(&mut self, shader: &Shader, textures: &mut TextureStore) {
        if !self.on_gpu {
            return;
        }

        let has_materials = !self.materials.is_empty();
        for mesh in &self.meshes {
            let material = mesh
                .material_index()
                .filter(|_| has_materials)
                .and_then(|index| self.materials.get_mut(index));

            match material {
                Some(material) => {
                    let _binding = material.bind_scoped(shader, textures);
                    mesh.render(shader);
                }
                None => mesh.render(shader),
            }
        }
        shader.gpu().log_error("Model.render");
    }

    /// Remove every mesh, then every material
    ///
    /// Textures shared with another pushed model stay on the GPU.
    pub fn remove(&mut self, textures: &mut TextureStore) {
        if !self.on_gpu {
            return;
        }

        self.release(textures);
        self.on_gpu = false;
    }

    fn release(&mut self, textures: &mut TextureStore) {
        let gpu = self
            .meshes
            .iter()
            .find_map(|mesh| mesh.gpu_context().cloned());
        for mesh in &mut self.meshes {
            mesh.remove();
        }
        for material in &mut self.materials {
            material.remove(textures);
        }
        if let Some(gpu) = gpu {
            gpu.log_error("Model.remove");
        }
    }

    /// Meshes in draw order
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Materials referenced by the meshes
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Whether `load` has been called
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the model is resident on the GPU
    pub fn is_on_gpu(&self) -> bool {
        self.on_gpu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::api::{CallLog, Gpu, GpuCall, RecordingApi};
    use crate::render::mesh::Vertex;
    use crate::render::texture::{Texture, TextureType};

    struct Fixture {
        log: CallLog,
        shader: Shader,
        textures: TextureStore,
        _root: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("simple");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("vert.glsl"), "void main() {}").unwrap();

        let api = RecordingApi::new();
        let log = api.log();
        let gpu = Gpu::new(api);
        let shader = Shader::load(&gpu, "simple", root.path()).unwrap();
        log.clear();

        Fixture {
            log,
            shader,
            textures: TextureStore::with_key(),
            _root: root,
        }
    }

    fn mesh(material_index: Option<usize>) -> Mesh {
        let mut mesh = Mesh::new();
        mesh.load(
            vec![Vertex::default(); 3],
            vec![0, 1, 2],
            material_index,
        );
        mesh
    }

    fn textured_material(textures: &mut TextureStore) -> Material {
        let mut texture = Texture::new();
        texture.load(TextureType::Diffuse, vec![0; 3], 1, 1, 24);
        let handle = textures.insert(texture);

        let mut material = Material::new();
        material.load(vec![handle], textures, Vec3::new(1.0, 1.0, 1.0), Vec3::zeros(), 8.0);
        material
    }

    fn material_binds(log: &CallLog) -> usize {
        log.count(|call| {
            matches!(call, GpuCall::SetUniform { name, .. } if name == "valMatFlags")
        })
    }

    #[test]
    fn test_push_and_remove_are_idempotent() {
        let mut f = fixture();
        let material = textured_material(&mut f.textures);
        let mut model = Model::new();
        model.load(vec![mesh(Some(0)), mesh(Some(0))], vec![material]);

        model.push(&f.shader, &mut f.textures);
        model.push(&f.shader, &mut f.textures);
        assert!(model.is_on_gpu());
        assert!(model.meshes().iter().all(Mesh::is_on_gpu));
        assert_eq!(f.log.count(|call| matches!(call, GpuCall::CreateVertexArray(_))), 2);
        assert_eq!(f.log.count(|call| matches!(call, GpuCall::CreateTexture(_))), 1);

        model.remove(&mut f.textures);
        model.remove(&mut f.textures);
        assert!(!model.is_on_gpu());
        assert!(model.meshes().iter().all(|mesh| !mesh.is_on_gpu()));
        assert_eq!(f.log.count(|call| matches!(call, GpuCall::DeleteVertexArray(_))), 2);
        assert_eq!(f.log.count(|call| matches!(call, GpuCall::DeleteTexture(_))), 1);
    }

    #[test]
    fn test_render_binds_once_per_mesh() {
        let mut f = fixture();
        let material = textured_material(&mut f.textures);
        let mut model = Model::new();
        model.load(vec![mesh(Some(0)), mesh(Some(0)), mesh(Some(0))], vec![material]);
        model.push(&f.shader, &mut f.textures);
        f.log.clear();

        model.render(&f.shader, &mut f.textures);

        assert_eq!(material_binds(&f.log), 3);
        assert_eq!(f.log.count(|call| matches!(call, GpuCall::DrawIndexedTriangles { .. })), 3);
        let binds = f.log.count(|call| matches!(call, GpuCall::BindTexture { texture: Some(_), .. }));
        let unbinds = f.log.count(|call| matches!(call, GpuCall::BindTexture { texture: None, .. }));
        assert_eq!((binds, unbinds), (3, 3));
        assert!(!model.materials()[0].is_bound());
    }

    #[test]
    fn test_render_without_materials_never_binds() {
        let mut f = fixture();
        let mut model = Model::new();
        model.load(vec![mesh(Some(0)), mesh(None)], Vec::new());
        model.push(&f.shader, &mut f.textures);
        f.log.clear();

        model.render(&f.shader, &mut f.textures);

        assert_eq!(material_binds(&f.log), 0);
        assert_eq!(f.log.count(|call| matches!(call, GpuCall::DrawIndexedTriangles { .. })), 2);
    }

    #[test]
    fn test_mesh_without_material_renders_unbound() {
        let mut f = fixture();
        let material = textured_material(&mut f.textures);
        let mut model = Model::new();
        model.load(vec![mesh(None), mesh(Some(0))], vec![material]);
        model.push(&f.shader, &mut f.textures);
        f.log.clear();

        model.render(&f.shader, &mut f.textures);
        assert_eq!(material_binds(&f.log), 1);
    }

    #[test]
    fn test_render_requires_push() {
        let mut f = fixture();
        let mut model = Model::new();
        model.load(vec![mesh(None)], Vec::new());

        model.render(&f.shader, &mut f.textures);
        assert!(f.log.is_empty());
    }

    #[test]
    fn test_clone_is_not_resident() {
        let mut f = fixture();
        let mut model = Model::new();
        model.load(vec![mesh(None)], Vec::new());
        model.push(&f.shader, &mut f.textures);

        let copy = model.clone();
        assert!(copy.is_loaded());
        assert!(!copy.is_on_gpu());
        assert!(!copy.meshes()[0].is_on_gpu());
    }

    #[test]
    fn test_failed_mesh_push_leaves_model_off_gpu() {
        let mut f = fixture();
        let material = textured_material(&mut f.textures);
        let handle = material.textures()[0];
        let mut model = Model::new();
        model.load(vec![mesh(Some(0))], vec![material]);

        f.log.fail_buffer_creation(true);
        model.push(&f.shader, &mut f.textures);
        assert!(!model.is_on_gpu());
        assert!(!model.meshes()[0].is_on_gpu());
        assert!(!f.textures[handle].is_on_gpu());
        assert_eq!(f.log.count(|call| matches!(call, GpuCall::DeleteVertexArray(_))), 1);

        f.log.fail_buffer_creation(false);
        model.push(&f.shader, &mut f.textures);
        assert!(model.is_on_gpu());
        assert!(model.meshes()[0].is_on_gpu());
        assert!(f.textures[handle].is_on_gpu());
    }

    #[test]
    fn test_failed_texture_push_rolls_back_meshes() {
        let mut f = fixture();
        let material = textured_material(&mut f.textures);
        let mut model = Model::new();
        model.load(vec![mesh(Some(0)), mesh(None)], vec![material]);

        f.log.fail_texture_creation(true);
        model.push(&f.shader, &mut f.textures);

        assert!(!model.is_on_gpu());
        assert!(model.meshes().iter().all(|mesh| !mesh.is_on_gpu()));
        assert!(!model.materials()[0].is_on_gpu());
        assert_eq!(f.log.count(|call| matches!(call, GpuCall::DeleteVertexArray(_))), 2);
    }

    #[test]
    fn test_shared_texture_outlives_one_model_removal() {
        let mut f = fixture();
        let material = textured_material(&mut f.textures);
        let handle = material.textures()[0];
        let mut first = Model::new();
        first.load(vec![mesh(Some(0))], vec![material.clone()]);
        let mut second = Model::new();
        second.load(vec![mesh(Some(0))], vec![material]);

        first.push(&f.shader, &mut f.textures);
        second.push(&f.shader, &mut f.textures);
        first.remove(&mut f.textures);
        second.push(&f.shader, &mut f.textures);
        assert!(f.textures[handle].is_on_gpu());
        f.log.clear();

        second.render(&f.shader, &mut f.textures);
        let binds = f.log.count(|call| matches!(call, GpuCall::BindTexture { texture: Some(_), .. }));
        assert_eq!(binds, 1);

        second.remove(&mut f.textures);
        assert!(!f.textures[handle].is_on_gpu());
        assert_eq!(f.log.count(|call| matches!(call, GpuCall::DeleteTexture(_))), 1);
    }

    #[test]
    #[should_panic(expected = "reloaded while resident")]
    #[cfg(debug_assertions)]
    fn test_reload_while_resident_asserts() {
        let mut f = fixture();
        let mut model = Model::new();
        model.load(vec![mesh(None)], Vec::new());
        model.push(&f.shader, &mut f.textures);

        model.load(vec![mesh(None)], Vec::new());
    }
}
