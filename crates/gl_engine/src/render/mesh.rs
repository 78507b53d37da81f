//! Triangle meshes and their GPU buffers

use bytemuck::{Pod, Zeroable};
use std::mem::{offset_of, size_of};

use super::api::{
    AttributeLayout, BindingId, BufferId, BufferTarget, GpuContext, GraphicsApi, VertexArrayId,
};
use super::shader::Shader;

/// Interleaved vertex record uploaded to the vertex buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Object-space normal
    pub normal: [f32; 3],
    /// Texture coordinate
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a vertex from its attributes
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }
}

/// Vertex array plus its vertex and element buffers, deleted on drop
#[derive(Debug)]
pub struct GpuMesh {
    gpu: GpuContext,
    vao: VertexArrayId,
    vbo: BufferId,
    ebo: BufferId,
    shader: BindingId,
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        self.gpu.with(|api| {
            api.delete_buffer(self.ebo);
            api.delete_buffer(self.vbo);
            api.delete_vertex_array(self.vao);
        });
    }
}

/// Pre-triangulated indexed geometry
///
/// `material_index` points into the owning model's material list; `None`
/// means the mesh renders without a material.
#[derive(Debug, Default)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    material_index: Option<usize>,
    gpu: Option<GpuMesh>,
    loaded: bool,
}

impl Clone for Mesh {
    fn clone(&self) -> Self {
        Self {
            vertices: self.vertices.clone(),
            indices: self.indices.clone(),
            material_index: self.material_index,
            gpu: None,
            loaded: self.loaded,
        }
    }
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the geometry, removing any GPU copy first
    pub fn load(&mut self, vertices: Vec<Vertex>, indices: Vec<u32>, material_index: Option<usize>) {
        self.remove();
        self.vertices = vertices;
        self.indices = indices;
        self.material_index = material_index;
        self.loaded = true;
    }

    /// Upload the buffers and wire attributes to `shader`'s locations
    ///
    /// No-op if not loaded or already resident. The same shader must be
    /// used for every later `render`. If an allocation fails, the handles
    /// created so far are deleted and the mesh stays off the GPU.
    pub fn push(&mut self, shader: &Shader) {
        if !self.loaded || self.gpu.is_some() {
            return;
        }

        let gpu = shader.gpu();
        let attributes = *shader.attributes();
        let created = gpu.with(|api| -> Result<_, String> {
            let vao = api.create_vertex_array()?;
            let vbo = match api.create_buffer() {
                Ok(vbo) => vbo,
                Err(message) => {
                    api.delete_vertex_array(vao);
                    return Err(message);
                }
            };
            let ebo = match api.create_buffer() {
                Ok(ebo) => ebo,
                Err(message) => {
                    api.delete_buffer(vbo);
                    api.delete_vertex_array(vao);
                    return Err(message);
                }
            };

            api.bind_vertex_array(Some(vao));
            api.bind_buffer(BufferTarget::Array, Some(vbo));
            api.buffer_data(BufferTarget::Array, bytemuck::cast_slice(&self.vertices));
            api.bind_buffer(BufferTarget::ElementArray, Some(ebo));
            api.buffer_data(BufferTarget::ElementArray, bytemuck::cast_slice(&self.indices));

            wire_attribute(api, attributes.position, 3, offset_of!(Vertex, position));
            wire_attribute(api, attributes.normal, 3, offset_of!(Vertex, normal));
            wire_attribute(api, attributes.tex_coord, 2, offset_of!(Vertex, tex_coord));

            api.bind_vertex_array(None);
            Ok((vao, vbo, ebo))
        });

        match created {
            Ok((vao, vbo, ebo)) => {
                self.gpu = Some(GpuMesh {
                    gpu: gpu.clone(),
                    vao,
                    vbo,
                    ebo,
                    shader: shader.id(),
                });
            }
            Err(message) => log::error!("Mesh.push: {}", message),
        }
        gpu.log_error("Mesh.push");
    }

    /// Draw the full index buffer; no-op unless resident
    pub fn render(&self, shader: &Shader) {
        let Some(resident) = &self.gpu else {
            return;
        };
        debug_assert_eq!(
            resident.shader,
            shader.id(),
            "mesh rendered with a different shader than it was pushed with"
        );

        let index_count = u32::try_from(self.indices.len()).unwrap_or(u32::MAX);
        resident.gpu.with(|api| {
            api.bind_vertex_array(Some(resident.vao));
            api.draw_indexed_triangles(index_count);
            api.bind_vertex_array(None);
        });
    }

    /// Free the GPU buffers; no-op unless resident
    pub fn remove(&mut self) {
        self.gpu = None;
    }

    /// Move the mesh out, leaving an unloaded mesh with no material behind
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Vertex records
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Flattened triangle indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Index into the owning model's materials
    pub fn material_index(&self) -> Option<usize> {
        self.material_index
    }

    /// Whether `load` has been called
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the buffers are resident on the GPU
    pub fn is_on_gpu(&self) -> bool {
        self.gpu.is_some()
    }

    /// Context the buffers live in, while resident
    pub fn gpu_context(&self) -> Option<&GpuContext> {
        self.gpu.as_ref().map(|resident| &resident.gpu)
    }
}

fn wire_attribute(api: &mut dyn GraphicsApi, location: Option<u32>, components: u32, offset: usize) {
    if let Some(location) = location {
        api.enable_vertex_attribute(
            location,
            AttributeLayout {
                components,
                stride: size_of::<Vertex>() as u32,
                offset: offset as u32,
            },
        );
    }
}
