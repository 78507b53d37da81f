//! Builds meshes from imported geometry

use nalgebra::Vector3;

use crate::render::{Mesh, Vertex};

use super::import::ImportedMesh;
use super::FactoryError;

/// Converts an [`ImportedMesh`] into a loaded, non-resident [`Mesh`]
///
/// The imported mesh must already be triangulated, carry at most one UV
/// channel, and that channel must have two components per vertex.
pub struct MeshFactory;

impl MeshFactory {
    /// Validate `imported` and flatten it into vertex and index buffers
    ///
    /// `material_count` is the number of materials in the owning model;
    /// a material index outside it is treated as "no material".
    pub fn create(imported: &ImportedMesh, material_count: usize) -> Result<Mesh, FactoryError> {
        if imported.uv_channels.len() > 1 {
            return Err(FactoryError::TooManyUvChannels {
                mesh: imported.name.clone(),
                count: imported.uv_channels.len(),
            });
        }
        let uv = imported.uv_channels.first();
        if let Some(channel) = uv {
            if channel.components != 2 {
                return Err(FactoryError::UvComponents {
                    mesh: imported.name.clone(),
                    components: channel.components,
                });
            }
        }

        let vertex_count = imported.positions.len();
        let mut indices = Vec::with_capacity(imported.faces.len() * 3);
        for face in &imported.faces {
            if face.len() != 3 {
                return Err(FactoryError::NonTriangularFace {
                    mesh: imported.name.clone(),
                    corners: face.len(),
                });
            }
            if let Some(&index) = face.iter().find(|&&index| index as usize >= vertex_count) {
                return Err(FactoryError::IndexOutOfRange {
                    mesh: imported.name.clone(),
                    index,
                    vertex_count,
                });
            }
            indices.extend_from_slice(face);
        }

        let normals = if imported.normals.len() == vertex_count {
            imported.normals.clone()
        } else {
            log::debug!("Mesh '{}' has no usable normals, computing them", imported.name);
            calculate_vertex_normals(&imported.positions, &indices)
        };

        let vertices = imported
            .positions
            .iter()
            .zip(&normals)
            .enumerate()
            .map(|(index, (position, normal))| {
                let tex_coord = uv
                    .and_then(|channel| channel.coords.get(index * 2..index * 2 + 2))
                    .map_or([0.0, 0.0], |coords| [coords[0], coords[1]]);
                Vertex::new(*position, *normal, tex_coord)
            })
            .collect();

        let material_index = match imported.material_index {
            Some(index) if index >= material_count => {
                log::warn!(
                    "Mesh '{}' references material {} of {}, rendering unbound",
                    imported.name,
                    index,
                    material_count
                );
                None
            }
            other => other,
        };

        let mut mesh = Mesh::new();
        mesh.load(vertices, indices, material_index);
        Ok(mesh)
    }
}

/// Area-weighted vertex normals from a triangle list
fn calculate_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut sums = vec![Vector3::<f32>::zeros(); positions.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let p = |i: usize| Vector3::from(positions[i]);
        let face = (p(b) - p(a)).cross(&(p(c) - p(a)));
        for corner in [a, b, c] {
            sums[corner] += face;
        }
    }

    sums.into_iter()
        .map(|sum| {
            sum.try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3::z)
                .into()
        })
        .collect()
}
