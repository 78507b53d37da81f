//! Builds models from model files

use std::path::Path;

use crate::render::{Mesh, Model};

use super::import::{ImportError, ImportedNode, ImportedScene, SceneImporter};
use super::material_factory::{MaterialFactory, TextureSource};
use super::mesh_factory::MeshFactory;
use super::FactoryError;

/// Imports a model file and converts it into a loaded, non-resident [`Model`]
pub struct ModelFactory;

impl ModelFactory {
    /// Import `path` and build its meshes and materials
    ///
    /// Meshes are collected depth-first from the root node. `model_id` is the
    /// resource id of the model, used to resolve texture references.
    pub fn create(
        importer: &dyn SceneImporter,
        path: &Path,
        model_id: &str,
        textures: &mut dyn TextureSource,
    ) -> Result<Model, FactoryError> {
        let scene = importer.import(path)?;
        if scene.incomplete {
            return Err(ImportError::Incomplete(path.to_path_buf()).into());
        }

        let mut meshes = Vec::with_capacity(scene.meshes.len());
        collect_meshes(&scene, &scene.root, &mut meshes)?;

        let mut materials = Vec::with_capacity(scene.materials.len());
        for material in &scene.materials {
            materials.push(MaterialFactory::create(material, model_id, textures)?);
        }

        log::debug!(
            "Built model '{}': {} meshes, {} materials",
            model_id,
            meshes.len(),
            materials.len()
        );

        let mut model = Model::new();
        model.load(meshes, materials);
        Ok(model)
    }
}

fn collect_meshes(
    scene: &ImportedScene,
    node: &ImportedNode,
    out: &mut Vec<Mesh>,
) -> Result<(), FactoryError> {
    for &index in &node.meshes {
        let imported = scene
            .meshes
            .get(index)
            .ok_or_else(|| FactoryError::MissingMesh {
                node: node.name.clone(),
                index,
            })?;
        out.push(MeshFactory::create(imported, scene.materials.len())?);
    }
    for child in &node.children {
        collect_meshes(scene, child, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::import::{ImportedMaterial, ImportedMesh, ImportedTextureKind};
    use crate::assets::resource_manager::ResourceError;
    use crate::render::{Texture, TextureHandle, TextureStore, TextureType};

    struct FixedImporter(ImportedScene);

    impl SceneImporter for FixedImporter {
        fn import(&self, _path: &Path) -> Result<ImportedScene, ImportError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct CountingSource {
        store: TextureStore,
        loads: usize,
    }

    impl TextureSource for CountingSource {
        fn load_texture(
            &mut self,
            _resource_id: &str,
            texture_type: TextureType,
        ) -> Result<TextureHandle, ResourceError> {
            self.loads += 1;
            let mut texture = Texture::new();
            texture.load(texture_type, vec![0; 3], 1, 1, 24);
            Ok(self.store.insert(texture))
        }

        fn store(&self) -> &TextureStore {
            &self.store
        }
    }

    fn triangle(name: &str, material_index: Option<usize>) -> ImportedMesh {
        ImportedMesh {
            name: name.to_string(),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            faces: vec![vec![0, 1, 2]],
            material_index,
            ..Default::default()
        }
    }

    fn nested_scene() -> ImportedScene {
        ImportedScene {
            root: ImportedNode {
                name: "root".to_string(),
                meshes: vec![1],
                children: vec![ImportedNode {
                    name: "child".to_string(),
                    meshes: vec![0],
                    children: Vec::new(),
                }],
            },
            meshes: vec![triangle("first", Some(0)), triangle("second", None)],
            materials: vec![ImportedMaterial {
                textures: vec![(ImportedTextureKind::Diffuse, "box.png".to_string())],
                ..Default::default()
            }],
            incomplete: false,
        }
    }

    #[test]
    fn test_meshes_collected_depth_first() {
        let importer = FixedImporter(nested_scene());
        let mut source = CountingSource::default();

        let model =
            ModelFactory::create(&importer, Path::new("box.obj"), "models/box.obj", &mut source)
                .unwrap();

        assert!(model.is_loaded());
        assert!(!model.is_on_gpu());
        assert_eq!(model.meshes().len(), 2);
        assert_eq!(model.meshes()[0].material_index(), None);
        assert_eq!(model.meshes()[1].material_index(), Some(0));
        assert_eq!(model.materials().len(), 1);
        assert_eq!(source.loads, 1);
    }

    #[test]
    fn test_incomplete_scene_rejected() {
        let mut scene = nested_scene();
        scene.incomplete = true;
        let mut source = CountingSource::default();

        let result = ModelFactory::create(
            &FixedImporter(scene),
            Path::new("box.obj"),
            "box.obj",
            &mut source,
        );
        assert!(matches!(result, Err(FactoryError::Import(ImportError::Incomplete(_)))));
        assert_eq!(source.loads, 0);
    }

    #[test]
    fn test_dangling_node_mesh_rejected() {
        let mut scene = nested_scene();
        scene.root.children[0].meshes.push(9);
        let mut source = CountingSource::default();

        let result = ModelFactory::create(
            &FixedImporter(scene),
            Path::new("box.obj"),
            "box.obj",
            &mut source,
        );
        assert!(matches!(result, Err(FactoryError::MissingMesh { index: 9, .. })));
    }
}
