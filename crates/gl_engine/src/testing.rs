//! Shared fixtures for unit tests

use std::path::Path;

use tempfile::TempDir;

use crate::render::api::{CallLog, Gpu, RecordingApi};
use crate::render::Shader;

/// Unit cube with one material and per-face normals
pub const BOX_OBJ: &str = "\
mtllib box.mtl
o box
v -0.5 -0.5  0.5
v  0.5 -0.5  0.5
v  0.5  0.5  0.5
v -0.5  0.5  0.5
v -0.5 -0.5 -0.5
v  0.5 -0.5 -0.5
v  0.5  0.5 -0.5
v -0.5  0.5 -0.5
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
vn 0 0 -1
vn 1 0 0
vn -1 0 0
vn 0 1 0
vn 0 -1 0
usemtl crate
f 1/1/1 2/2/1 3/3/1 4/4/1
f 6/1/2 5/2/2 8/3/2 7/4/2
f 2/1/3 6/2/3 7/3/3 3/4/3
f 5/1/4 1/2/4 4/3/4 8/4/4
f 4/1/5 3/2/5 7/3/5 8/4/5
f 5/1/6 6/2/6 2/3/6 1/4/6
";

/// Material library for [`BOX_OBJ`]
pub const BOX_MTL: &str = "\
newmtl crate
Kd 1.0 1.0 1.0
Ks 0.5 0.5 0.5
Ns 16
map_Kd box.png
";

/// Write `models/box.obj`, its material library and a 2x2 diffuse map under `root`
pub fn write_box_resources(root: &Path) {
    let models = root.join("models");
    std::fs::create_dir_all(&models).unwrap();
    std::fs::write(models.join("box.obj"), BOX_OBJ).unwrap();
    std::fs::write(models.join("box.mtl"), BOX_MTL).unwrap();
    image::RgbImage::from_pixel(2, 2, image::Rgb([200, 120, 40]))
        .save(models.join("box.png"))
        .unwrap();
}

/// Shader loaded from a scratch `simple` set on a recording backend
///
/// The call log is cleared after loading.
pub fn recording_shader() -> (CallLog, Shader, TempDir) {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("simple");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("vert.glsl"), "void main() {}").unwrap();
    std::fs::write(dir.join("frag.glsl"), "void main() {}").unwrap();

    let api = RecordingApi::new();
    let log = api.log();
    let gpu = Gpu::new(api);
    let shader = Shader::load(&gpu, "simple", root.path()).unwrap();
    log.clear();

    (log, shader, root)
}
