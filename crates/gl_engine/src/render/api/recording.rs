//! Headless graphics backend
//!
//! `RecordingApi` hands out monotonically increasing handles and appends
//! every call to a shared [`CallLog`]. It backs `--headless` runs of the
//! viewer and every GPU-facing unit test.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::rc::Rc;

use super::graphics_api::{
    AttributeLayout, BufferId, BufferTarget, GraphicsApi, PixelFormat, ProgramId, ShaderStage,
    TextureId, TextureImage, UniformLocation, UniformValue, VertexArrayId,
};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    /// Vertex array generated
    CreateVertexArray(VertexArrayId),
    /// Vertex array bound or unbound
    BindVertexArray(Option<VertexArrayId>),
    /// Vertex array deleted
    DeleteVertexArray(VertexArrayId),
    /// Buffer generated
    CreateBuffer(BufferId),
    /// Buffer bound or unbound
    BindBuffer(BufferTarget, Option<BufferId>),
    /// Buffer data uploaded
    BufferData {
        /// Binding point
        target: BufferTarget,
        /// Uploaded byte count
        len: usize,
    },
    /// Buffer deleted
    DeleteBuffer(BufferId),
    /// Vertex attribute wired
    EnableVertexAttribute {
        /// Attribute location
        location: u32,
        /// Layout inside the vertex record
        layout: AttributeLayout,
    },
    /// Indexed draw issued
    DrawIndexedTriangles {
        /// Number of indices drawn
        index_count: u32,
    },
    /// Texture generated
    CreateTexture(TextureId),
    /// Texture image uploaded
    UploadTexture {
        /// Target texture
        texture: TextureId,
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
        /// Pixel layout
        format: PixelFormat,
    },
    /// Texture bound or unbound on a unit
    BindTexture {
        /// Texture unit
        unit: u32,
        /// Bound texture, `None` for unbind
        texture: Option<TextureId>,
    },
    /// Texture deleted
    DeleteTexture(TextureId),
    /// Program linked from the listed stages
    CreateProgram {
        /// Resulting program
        program: ProgramId,
        /// Stages that were supplied
        stages: Vec<ShaderStage>,
    },
    /// Program made current or cleared
    UseProgram(Option<ProgramId>),
    /// Program deleted
    DeleteProgram(ProgramId),
    /// Uniform uploaded
    SetUniform {
        /// Uniform name the location was queried with
        name: String,
        /// Uploaded value
        value: UniformValue,
    },
    /// Viewport changed
    SetViewport {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// Depth test and culling enabled
    EnableDepthAndCulling,
    /// Framebuffer cleared
    Clear([f32; 4]),
    /// Error state queried
    GetError,
}

#[derive(Default)]
struct LogState {
    calls: RefCell<Vec<GpuCall>>,
    pending_error: Cell<Option<u32>>,
    fail_buffers: Cell<bool>,
    fail_textures: Cell<bool>,
}

/// Shared view of the calls a [`RecordingApi`] has seen
///
/// Cloning the log shares the same underlying storage.
#[derive(Clone, Default)]
pub struct CallLog {
    state: Rc<LogState>,
}

impl CallLog {
    fn push(&self, call: GpuCall) {
        self.state.calls.borrow_mut().push(call);
    }

    /// Snapshot of every call recorded so far
    pub fn calls(&self) -> Vec<GpuCall> {
        self.state.calls.borrow().clone()
    }

    /// Number of recorded calls matching `predicate`
    pub fn count(&self, predicate: impl Fn(&GpuCall) -> bool) -> usize {
        self.state.calls.borrow().iter().filter(|call| predicate(call)).count()
    }

    /// Total number of recorded calls
    pub fn len(&self) -> usize {
        self.state.calls.borrow().len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every recorded call
    pub fn clear(&self) {
        self.state.calls.borrow_mut().clear();
    }

    /// Make the next error query report `code`
    pub fn inject_error(&self, code: u32) {
        self.state.pending_error.set(Some(code));
    }

    /// Make every following `create_buffer` fail until reset
    pub fn fail_buffer_creation(&self, fail: bool) {
        self.state.fail_buffers.set(fail);
    }

    /// Make every following `create_texture` fail until reset
    pub fn fail_texture_creation(&self, fail: bool) {
        self.state.fail_textures.set(fail);
    }
}

/// Recording implementation of [`GraphicsApi`]
pub struct RecordingApi {
    log: CallLog,
    next_handle: u32,
    uniform_names: Vec<String>,
    attribute_names: HashMap<String, u32>,
}

impl Default for RecordingApi {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingApi {
    /// Create a backend with an empty log
    pub fn new() -> Self {
        Self {
            log: CallLog::default(),
            next_handle: 0,
            uniform_names: Vec::new(),
            attribute_names: HashMap::new(),
        }
    }

    /// Handle to the shared call log
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Make the next error query report `code`
    pub fn inject_error(&self, code: u32) {
        self.log.inject_error(code);
    }

    fn next_handle(&mut self) -> NonZeroU32 {
        self.next_handle += 1;
        NonZeroU32::new(self.next_handle).unwrap_or(NonZeroU32::MAX)
    }
}

impl GraphicsApi for RecordingApi {
    fn create_vertex_array(&mut self) -> Result<VertexArrayId, String> {
        let id = VertexArrayId(self.next_handle());
        self.log.push(GpuCall::CreateVertexArray(id));
        Ok(id)
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) {
        self.log.push(GpuCall::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        self.log.push(GpuCall::DeleteVertexArray(vertex_array));
    }

    fn create_buffer(&mut self) -> Result<BufferId, String> {
        if self.log.state.fail_buffers.get() {
            return Err("buffer allocation refused".to_string());
        }
        let id = BufferId(self.next_handle());
        self.log.push(GpuCall::CreateBuffer(id));
        Ok(id)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        self.log.push(GpuCall::BindBuffer(target, buffer));
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        self.log.push(GpuCall::BufferData {
            target,
            len: data.len(),
        });
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.log.push(GpuCall::DeleteBuffer(buffer));
    }

    fn enable_vertex_attribute(&mut self, location: u32, layout: AttributeLayout) {
        self.log.push(GpuCall::EnableVertexAttribute { location, layout });
    }

    fn draw_indexed_triangles(&mut self, index_count: u32) {
        self.log.push(GpuCall::DrawIndexedTriangles { index_count });
    }

    fn create_texture(&mut self) -> Result<TextureId, String> {
        if self.log.state.fail_textures.get() {
            return Err("texture allocation refused".to_string());
        }
        let id = TextureId(self.next_handle());
        self.log.push(GpuCall::CreateTexture(id));
        Ok(id)
    }

    fn upload_texture(&mut self, texture: TextureId, image: &TextureImage<'_>) {
        self.log.push(GpuCall::UploadTexture {
            texture,
            width: image.width,
            height: image.height,
            format: image.format,
        });
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        self.log.push(GpuCall::BindTexture { unit, texture });
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.log.push(GpuCall::DeleteTexture(texture));
    }

    fn create_program(&mut self, stages: &[(ShaderStage, String)]) -> Result<ProgramId, String> {
        if stages.is_empty() {
            return Err("program has no attached stages".to_string());
        }
        let program = ProgramId(self.next_handle());
        self.log.push(GpuCall::CreateProgram {
            program,
            stages: stages.iter().map(|(stage, _)| *stage).collect(),
        });
        Ok(program)
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.log.push(GpuCall::UseProgram(program));
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.log.push(GpuCall::DeleteProgram(program));
    }

    fn attribute_location(&mut self, _program: ProgramId, name: &str) -> Option<u32> {
        let next = self.attribute_names.len() as u32;
        Some(*self.attribute_names.entry(name.to_string()).or_insert(next))
    }

    fn uniform_location(&mut self, _program: ProgramId, name: &str) -> Option<UniformLocation> {
        let index = match self.uniform_names.iter().position(|known| known == name) {
            Some(index) => index,
            None => {
                self.uniform_names.push(name.to_string());
                self.uniform_names.len() - 1
            }
        };
        Some(UniformLocation(index as u32))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let name = self
            .uniform_names
            .get(location.0 as usize)
            .cloned()
            .unwrap_or_default();
        self.log.push(GpuCall::SetUniform { name, value });
    }

    fn set_viewport(&mut self, _x: i32, _y: i32, width: u32, height: u32) {
        self.log.push(GpuCall::SetViewport { width, height });
    }

    fn enable_depth_and_culling(&mut self) {
        self.log.push(GpuCall::EnableDepthAndCulling);
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.log.push(GpuCall::Clear(color));
    }

    fn last_error(&mut self) -> Option<u32> {
        self.log.push(GpuCall::GetError);
        self.log.state.pending_error.take()
    }
}
