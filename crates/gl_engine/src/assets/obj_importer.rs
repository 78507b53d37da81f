//! Wavefront OBJ importer built on `tobj`

use std::collections::HashMap;
use std::path::Path;

use super::import::{
    ImportError, ImportedMaterial, ImportedMesh, ImportedNode, ImportedScene, ImportedTextureKind,
    MaterialProperty, SceneImporter, UvChannel, MATKEY_COLOR_DIFFUSE, MATKEY_COLOR_SPECULAR,
    MATKEY_SHININESS,
};

/// Imports `.obj` files and their `.mtl` libraries
///
/// Faces are triangulated and positions, normals and texture coordinates
/// share one index stream. Each OBJ object becomes a child of the root node.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjImporter;

impl ObjImporter {
    /// Create an importer
    pub fn new() -> Self {
        Self
    }

    fn load_options() -> tobj::LoadOptions {
        tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        }
    }
}

impl SceneImporter for ObjImporter {
    fn import(&self, path: &Path) -> Result<ImportedScene, ImportError> {
        if !path.exists() {
            return Err(ImportError::NotFound(path.to_path_buf()));
        }

        let (models, materials) =
            tobj::load_obj(path, &Self::load_options()).map_err(|error| ImportError::Parse {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;

        let materials = materials.unwrap_or_else(|error| {
            log::warn!("No material library for {}: {}", path.display(), error);
            Vec::new()
        });

        let mut root = ImportedNode {
            name: path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
            ..Default::default()
        };
        let mut meshes = Vec::with_capacity(models.len());
        for (index, model) in models.into_iter().enumerate() {
            root.children.push(ImportedNode {
                name: model.name.clone(),
                meshes: vec![index],
                children: Vec::new(),
            });
            meshes.push(convert_mesh(model));
        }

        log::debug!(
            "Imported {}: {} meshes, {} materials",
            path.display(),
            meshes.len(),
            materials.len()
        );

        Ok(ImportedScene {
            root,
            incomplete: meshes.is_empty(),
            meshes,
            materials: materials.into_iter().map(convert_material).collect(),
        })
    }
}

fn convert_mesh(model: tobj::Model) -> ImportedMesh {
    let mesh = model.mesh;
    let triples = |values: &[f32]| -> Vec<[f32; 3]> {
        values.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
    };

    let uv_channels = if mesh.texcoords.is_empty() {
        Vec::new()
    } else {
        vec![UvChannel {
            components: 2,
            coords: mesh.texcoords,
        }]
    };

    let faces = if mesh.face_arities.is_empty() {
        mesh.indices.chunks(3).map(<[u32]>::to_vec).collect()
    } else {
        let mut faces = Vec::with_capacity(mesh.face_arities.len());
        let mut start = 0;
        for arity in &mesh.face_arities {
            let end = (start + *arity as usize).min(mesh.indices.len());
            faces.push(mesh.indices[start..end].to_vec());
            start = end;
        }
        faces
    };

    ImportedMesh {
        name: model.name,
        positions: triples(&mesh.positions),
        normals: triples(&mesh.normals),
        uv_channels,
        faces,
        material_index: mesh.material_id,
    }
}

fn convert_material(material: tobj::Material) -> ImportedMaterial {
    let mut properties = HashMap::new();
    if let Some(diffuse) = material.diffuse {
        properties.insert(MATKEY_COLOR_DIFFUSE.to_string(), MaterialProperty::Color(diffuse));
    }
    if let Some(specular) = material.specular {
        properties.insert(MATKEY_COLOR_SPECULAR.to_string(), MaterialProperty::Color(specular));
    }
    if let Some(shininess) = material.shininess {
        properties.insert(MATKEY_SHININESS.to_string(), MaterialProperty::Float(shininess));
    }
    for (key, value) in material.unknown_param {
        properties.insert(key, MaterialProperty::Text(value));
    }

    let textures = [
        (ImportedTextureKind::Diffuse, material.diffuse_texture),
        (ImportedTextureKind::Specular, material.specular_texture),
        (ImportedTextureKind::Normals, material.normal_texture),
        (ImportedTextureKind::Ambient, material.ambient_texture),
    ]
    .into_iter()
    .filter_map(|(kind, texture)| texture.map(|texture| (kind, texture)))
    .collect();

    ImportedMaterial {
        name: material.name,
        properties,
        textures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_OBJ: &str = "\
mtllib quad.mtl
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl painted
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    const QUAD_MTL: &str = "\
newmtl painted
Kd 0.5 0.25 1.0
Ks 1.0 1.0 1.0
Ns 32
map_Kd quad.png
";

    #[test]
    fn test_import_triangulates_and_reads_materials() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quad.obj"), QUAD_OBJ).unwrap();
        std::fs::write(dir.path().join("quad.mtl"), QUAD_MTL).unwrap();

        let scene = ObjImporter::new().import(&dir.path().join("quad.obj")).unwrap();

        assert!(!scene.incomplete);
        assert_eq!(scene.root.children.len(), 1);
        let mesh = &scene.meshes[0];
        assert_eq!(mesh.faces.len(), 2);
        assert!(mesh.faces.iter().all(|face| face.len() == 3));
        assert_eq!(mesh.uv_channels.len(), 1);
        assert_eq!(mesh.uv_channels[0].components, 2);
        assert_eq!(mesh.material_index, Some(0));

        let material = &scene.materials[0];
        assert_eq!(material.color(MATKEY_COLOR_DIFFUSE), Some([0.5, 0.25, 1.0]));
        assert_eq!(material.float(MATKEY_SHININESS), Some(32.0));
        assert_eq!(material.texture(&ImportedTextureKind::Diffuse), Some("quad.png"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = ObjImporter::new().import(&dir.path().join("absent.obj"));
        assert!(matches!(result, Err(ImportError::NotFound(_))));
    }

    #[test]
    fn test_empty_file_is_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.obj");
        std::fs::write(&path, "# nothing here\n").unwrap();

        let scene = ObjImporter::new().import(&path).unwrap();
        assert!(scene.incomplete);
    }
}
