//! Model viewer
//!
//! Loads the configured models, pushes them to the GPU and renders them
//! spinning in front of a fixed camera until the window is closed.
//!
//! `--headless` runs a fixed number of frames against the recording backend
//! instead of opening a window. `--config <path>` selects the config file
//! (default `config/viewer.toml`).

mod window;

use std::path::PathBuf;
use std::time::Duration;

use clap::{value_parser, Arg, ArgAction, Command};
use gl_engine::assets::{FileImageDecoder, ObjImporter, ResourceError, ResourceManager};
use gl_engine::config::ConfigError;
use gl_engine::core::config::ViewerConfig;
use gl_engine::foundation::logging;
use gl_engine::foundation::math::Vec3;
use gl_engine::foundation::time::Clock;
use gl_engine::render::{
    Camera, Gpu, GpuContext, RecordingApi, RenderError, RenderTarget, Renderer, Shader, Viewport,
};
use gl_engine::scene::{Scene, SceneObject};
use thiserror::Error;

use window::{GlWindow, WindowError};

const DEFAULT_CONFIG: &str = "config/viewer.toml";
const HEADLESS_FRAMES: u32 = 120;
const HEADLESS_STEP: Duration = Duration::from_micros(16_667);

#[derive(Error, Debug)]
enum ViewerError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),
}

/// Everything one frame needs
struct Viewer {
    resources: ResourceManager,
    renderer: Renderer,
    scene: Scene,
    clear_color: [f32; 4],
}

impl Viewer {
    fn new(gpu: &GpuContext, config: &ViewerConfig) -> Result<Self, ViewerError> {
        let mut resources = ResourceManager::startup(
            config.resources.clone(),
            Box::new(ObjImporter::new()),
            Box::new(FileImageDecoder),
        );

        let shader = Shader::load(gpu, &config.shader_set, config.resources.shader_root())?;
        let renderer = Renderer::new(shader);

        let mut scene = Scene::new();
        scene.add(SceneObject::camera("main", Camera::from_config(&config.camera)));
        for resource_id in &config.models {
            let model = resources.load_model(resource_id)?;
            resources.push_model(model, renderer.shader());
            scene.add(SceneObject::model(resource_id.as_str(), model).with_spin(Vec3::from(config.spin)));
        }

        Ok(Self {
            resources,
            renderer,
            scene,
            clear_color: config.clear_color,
        })
    }

    fn frame(&mut self, target: &dyn RenderTarget, dt: f32) {
        self.scene.tick(dt);

        self.renderer.begin_frame(target, self.clear_color);
        if let Some(camera) = self.scene.camera() {
            self.renderer
                .render(camera, &self.scene, target, &mut self.resources);
        }
    }

    fn shutdown(self) {
        self.resources.shutdown();
        log::info!("Viewer shut down");
    }
}

fn run_windowed(config: &ViewerConfig) -> Result<(), ViewerError> {
    let (mut window, gpu) = GlWindow::open(&config.title, config.width, config.height)?;
    let mut viewer = Viewer::new(&gpu, config)?;
    let mut clock = Clock::new();

    log::info!("Entering render loop");
    while !window.should_close() {
        if window.poll_events() {
            window.activate(&gpu);
        }
        clock.tick();
        viewer.frame(&window, clock.delta_time());
        window.swap_buffers();
    }

    viewer.shutdown();
    Ok(())
}

fn run_headless(config: &ViewerConfig) -> Result<(), ViewerError> {
    let api = RecordingApi::new();
    let calls = api.log();
    let gpu = Gpu::new(api);
    let target = Viewport::new(&gpu, config.width, config.height);
    let mut viewer = Viewer::new(&gpu, config)?;
    let mut clock = Clock::new();

    for _ in 0..HEADLESS_FRAMES {
        clock.advance(HEADLESS_STEP);
        viewer.frame(&target, clock.delta_time());
    }
    viewer.shutdown();

    log::info!(
        "Headless run: {} frames, {} backend calls",
        HEADLESS_FRAMES,
        calls.len()
    );
    Ok(())
}

fn cli() -> Command {
    Command::new("model_viewer")
        .about("Render configured models spinning in front of a fixed camera")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Viewer config file")
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_CONFIG),
        )
        .arg(
            Arg::new("headless")
                .long("headless")
                .help("Run a fixed number of frames against the recording backend")
                .action(ArgAction::SetTrue),
        )
}

fn main() {
    logging::init();

    let matches = cli().get_matches();
    let headless = matches.get_flag("headless");
    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    let result = ViewerConfig::load(&config_path).map_err(ViewerError::from).and_then(|config| {
        if headless {
            run_headless(&config)
        } else {
            run_windowed(&config)
        }
    });

    if let Err(error) = result {
        log::error!("Model viewer failed: {}", error);
        std::process::exit(1);
    }
}
