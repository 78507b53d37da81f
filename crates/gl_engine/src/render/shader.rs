//! Shader program sets
//!
//! A shader set is a directory holding up to six stage sources
//! (`vert.glsl`, `tesc.glsl`, `tese.glsl`, `geom.glsl`, `frag.glsl`,
//! `comp.glsl`). Missing stages are skipped. Once linked, the attribute and
//! uniform locations the asset types rely on are looked up by name.

use std::io;
use std::path::{Path, PathBuf};

use super::api::{
    BindingId, GpuContext, GraphicsApi, ProgramId, ShaderStage, UniformLocation, UniformValue,
};
use super::RenderError;

/// Texture unit sampled as `texDiffuse`
pub const TEXTURE_UNIT_DIFFUSE: u32 = 0;
/// Texture unit sampled as `texSpecular`
pub const TEXTURE_UNIT_SPECULAR: u32 = 1;
/// Texture unit sampled as `texBump`
pub const TEXTURE_UNIT_BUMP: u32 = 2;

/// Vertex attribute locations queried after link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeLocations {
    /// `vertPosition`
    pub position: Option<u32>,
    /// `vertNormal`
    pub normal: Option<u32>,
    /// `vertTangent`
    pub tangent: Option<u32>,
    /// `vertTexCoord`
    pub tex_coord: Option<u32>,
}

/// Uniform locations queried after link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniformLocations {
    /// `matProjection`
    pub projection: Option<UniformLocation>,
    /// `matView`
    pub view: Option<UniformLocation>,
    /// `matModel`
    pub model: Option<UniformLocation>,
    /// `matNormal`
    pub normal: Option<UniformLocation>,
    /// `colorDiffuse`
    pub color_diffuse: Option<UniformLocation>,
    /// `colorSpecular`
    pub color_specular: Option<UniformLocation>,
    /// `colorAmbient`
    pub color_ambient: Option<UniformLocation>,
    /// `valShininess`
    pub shininess: Option<UniformLocation>,
    /// `valMatFlags`
    pub material_flags: Option<UniformLocation>,
}

/// Upload `value` if the uniform exists in the program
pub fn upload_uniform(
    api: &mut dyn GraphicsApi,
    location: Option<UniformLocation>,
    value: UniformValue,
) {
    if let Some(location) = location {
        api.set_uniform(location, value);
    }
}

/// A linked shader program
///
/// Dropping the shader deletes the program and clears the active shader id
/// if this shader held it.
pub struct Shader {
    gpu: GpuContext,
    set_name: String,
    id: BindingId,
    program: ProgramId,
    attributes: AttributeLocations,
    uniforms: UniformLocations,
}

impl Shader {
    /// Load, compile and link the shader set `<shader_root>/<set_name>/`
    ///
    /// The program is left current and recorded as the active shader.
    pub fn load(
        gpu: &GpuContext,
        set_name: &str,
        shader_root: impl AsRef<Path>,
    ) -> Result<Self, RenderError> {
        let set_dir = shader_root.as_ref().join(set_name);
        let stages = read_stages(&set_dir)?;
        if stages.is_empty() {
            return Err(RenderError::NoStages(set_dir));
        }

        let program = gpu
            .with(|api| api.create_program(&stages))
            .map_err(|message| RenderError::Link {
                set: set_name.to_string(),
                message,
            })?;

        let (attributes, uniforms) = gpu.with(|api| {
            api.use_program(Some(program));
            let attributes = AttributeLocations {
                position: api.attribute_location(program, "vertPosition"),
                normal: api.attribute_location(program, "vertNormal"),
                tangent: api.attribute_location(program, "vertTangent"),
                tex_coord: api.attribute_location(program, "vertTexCoord"),
            };
            let uniforms = UniformLocations {
                projection: api.uniform_location(program, "matProjection"),
                view: api.uniform_location(program, "matView"),
                model: api.uniform_location(program, "matModel"),
                normal: api.uniform_location(program, "matNormal"),
                color_diffuse: api.uniform_location(program, "colorDiffuse"),
                color_specular: api.uniform_location(program, "colorSpecular"),
                color_ambient: api.uniform_location(program, "colorAmbient"),
                shininess: api.uniform_location(program, "valShininess"),
                material_flags: api.uniform_location(program, "valMatFlags"),
            };

            for (name, unit) in [
                ("texDiffuse", TEXTURE_UNIT_DIFFUSE),
                ("texSpecular", TEXTURE_UNIT_SPECULAR),
                ("texBump", TEXTURE_UNIT_BUMP),
            ] {
                let location = api.uniform_location(program, name);
                upload_uniform(api, location, UniformValue::Int(unit as i32));
            }

            (attributes, uniforms)
        });
        gpu.log_error("Shader.load");

        let id = gpu.next_binding_id();
        gpu.set_active_shader(Some(id));
        log::info!("Loaded shader set '{}' ({} stages)", set_name, stages.len());

        Ok(Self {
            gpu: gpu.clone(),
            set_name: set_name.to_string(),
            id,
            program,
            attributes,
            uniforms,
        })
    }

    /// Make this program current, recording it as the active shader
    pub fn activate(&self) {
        self.gpu.with(|api| api.use_program(Some(self.program)));
        self.gpu.set_active_shader(Some(self.id));
    }

    /// Whether this shader is the active one
    pub fn is_active(&self) -> bool {
        self.gpu.active_shader() == Some(self.id)
    }

    /// Identity used for active-shader comparisons
    pub fn id(&self) -> BindingId {
        self.id
    }

    /// Name of the shader set this program was built from
    pub fn set_name(&self) -> &str {
        &self.set_name
    }

    /// Vertex attribute locations
    pub fn attributes(&self) -> &AttributeLocations {
        &self.attributes
    }

    /// Uniform locations
    pub fn uniforms(&self) -> &UniformLocations {
        &self.uniforms
    }

    /// The GPU context the program lives in
    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        if self.is_active() {
            self.gpu.set_active_shader(None);
        }
        self.gpu.with(|api| api.delete_program(self.program));
    }
}

impl std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader")
            .field("set_name", &self.set_name)
            .field("id", &self.id)
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

fn read_stages(set_dir: &Path) -> Result<Vec<(ShaderStage, String)>, RenderError> {
    let mut stages = Vec::new();
    for stage in ShaderStage::ALL {
        let path: PathBuf = set_dir.join(stage.file_name());
        match std::fs::read_to_string(&path) {
            Ok(source) => stages.push((stage, source)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(RenderError::ShaderSource { path, source }),
        }
    }
    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::{Gpu, GpuCall, RecordingApi};

    fn write_set(root: &Path, name: &str, stages: &[&str]) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        for stage in stages {
            std::fs::write(dir.join(stage), "#version 330 core\nvoid main() {}\n").unwrap();
        }
    }

    #[test]
    fn test_missing_stages_are_skipped() {
        let root = tempfile::tempdir().unwrap();
        write_set(root.path(), "simple", &["vert.glsl", "frag.glsl"]);

        let api = RecordingApi::new();
        let log = api.log();
        let gpu = Gpu::new(api);
        let shader = Shader::load(&gpu, "simple", root.path()).unwrap();

        let stages = log.calls().into_iter().find_map(|call| match call {
            GpuCall::CreateProgram { stages, .. } => Some(stages),
            _ => None,
        });
        assert_eq!(stages, Some(vec![ShaderStage::Vertex, ShaderStage::Fragment]));
        assert!(shader.is_active());
        assert!(shader.uniforms().color_diffuse.is_some());
    }

    #[test]
    fn test_sampler_units_assigned() {
        let root = tempfile::tempdir().unwrap();
        write_set(root.path(), "simple", &["vert.glsl", "frag.glsl"]);

        let api = RecordingApi::new();
        let log = api.log();
        let gpu = Gpu::new(api);
        let _shader = Shader::load(&gpu, "simple", root.path()).unwrap();

        assert!(log.calls().contains(&GpuCall::SetUniform {
            name: "texSpecular".to_string(),
            value: UniformValue::Int(TEXTURE_UNIT_SPECULAR as i32),
        }));
    }

    #[test]
    fn test_empty_set_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let gpu = Gpu::new(RecordingApi::new());
        assert!(matches!(
            Shader::load(&gpu, "absent", root.path()),
            Err(RenderError::NoStages(_))
        ));
    }

    #[test]
    fn test_drop_deletes_program_and_clears_active() {
        let root = tempfile::tempdir().unwrap();
        write_set(root.path(), "simple", &["vert.glsl"]);

        let api = RecordingApi::new();
        let log = api.log();
        let gpu = Gpu::new(api);
        let shader = Shader::load(&gpu, "simple", root.path()).unwrap();
        drop(shader);

        assert_eq!(gpu.active_shader(), None);
        assert_eq!(log.count(|call| matches!(call, GpuCall::DeleteProgram(_))), 1);
    }
}
