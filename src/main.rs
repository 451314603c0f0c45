//! Lavatone - generative composition renderer and sonified lava lamp
//!
//! `compose` renders the fixed score offline to a WAV file; `lamp` opens a
//! window onto thirty heat-driven blobs, each singing at a pitch set by its
//! temperature.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use lavatone::audio::AudioSystem;
use lavatone::camera::{shared_pose, CameraSystem, Navigator, SharedPose};
use lavatone::cli::{Args, Command};
use lavatone::error::{Error, Result};
use lavatone::lamp::{SimulationSystem, SnapshotReader};
use lavatone::params::*;
use lavatone::rendering::{RenderSystem, SceneView, Uniforms};
use lavatone::score::render_composition;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    scene: SceneView,
    video: SnapshotReader,

    // Simulation systems
    simulation: SimulationSystem,
    navigator: Navigator,
    pose: SharedPose,
    camera: CameraSystem,
    audio: Option<AudioSystem>,
    mute: bool,

    // Configuration
    render_config: RenderConfig,
    recording_config: Option<RecordingConfig>,

    // Frame tracking
    frame_num: usize,
    last_frame: Instant,

    /// Set by the space bar; the simulation does not act on it
    reset_requested: bool,

    /// First fatal error raised inside the event loop
    failure: Option<Error>,
}

impl App {
    fn new(
        simulation_config: SimulationConfig,
        recording_config: Option<RecordingConfig>,
        mute: bool,
    ) -> Self {
        let render_config = RenderConfig::default();
        let navigator = Navigator::new(NavConfig::default());
        let pose = shared_pose(navigator.pose());

        let simulation =
            SimulationSystem::start(LampPhysics::default(), simulation_config, Arc::clone(&pose));
        let video = simulation.reader();

        Self {
            window: None,
            render_system: None,
            scene: SceneView::default(),
            video,
            simulation,
            navigator,
            pose,
            camera: CameraSystem::new(render_config.clone()),
            audio: None,
            mute,
            render_config,
            recording_config,
            frame_num: 0,
            last_frame: Instant::now(),
            reset_requested: false,
            failure: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Lavatone - Lava Lamp")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let size = window.inner_size();
        self.camera.set_aspect(size.width, size.height);

        let render_system = pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &self.render_config,
            self.recording_config.clone(),
        ))?;

        if self.mute {
            info!("Sonification muted");
        } else {
            match AudioSystem::new(
                AudioConfig::default(),
                self.simulation.reader(),
                self.recording_config.as_ref(),
            ) {
                Ok(audio) => self.audio = Some(audio),
                Err(e) => warn!("Audio unavailable, continuing silently: {}", e),
            }
        }

        info!("Lavatone is running: WASD/arrows to move, R/F to rise/sink, Q/E to turn, ESC to quit");

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode, pressed: bool) {
        match key {
            KeyCode::Escape if pressed => event_loop.exit(),
            KeyCode::Space if pressed => {
                if !self.reset_requested {
                    info!("Reset requested");
                }
                self.reset_requested = true;
            }
            _ => {
                self.navigator.handle_key(key, pressed);
            }
        }
    }

    /// Render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        // Recording advances at the capture rate regardless of wall-clock time
        let dt = match &self.recording_config {
            Some(config) => 1.0 / config.fps as f32,
            None => self.last_frame.elapsed().as_secs_f32(),
        };
        self.last_frame = Instant::now();

        self.pose.store(Arc::new(self.navigator.update(dt)));

        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };

        // View follows the pose carried by the simulation, like the audio
        if self.scene.on_render_local(&self.video.poll()) {
            render_system.update_instances(&self.scene.instances);
        }

        let (view_proj, camera_pos) = self.camera.create_view_proj_matrix(&self.scene.pose);
        render_system.update_uniforms(&Uniforms::new(view_proj, camera_pos));

        match render_system.render(self.frame_num) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    render_system.resize(size.width, size.height);
                }
            }
            Err(e) => error!("Render error: {:?}", e),
        }

        if let Some(config) = &self.recording_config {
            self.frame_num += 1;
            if self.frame_num >= config.total_frames() {
                info!("Recording complete: {} frames", self.frame_num);
                event_loop.exit();
            }
        }
    }

    /// Stop audio and simulation, surfacing any deferred error
    fn shutdown(mut self) -> Result<()> {
        if let Some(mut audio) = self.audio.take() {
            audio.finish()?;
        }
        self.simulation.stop();
        match self.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        if let Err(e) = self.init(event_loop) {
            error!("Initialization failed: {}", e);
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(code),
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, code, state == ElementState::Pressed),
            WindowEvent::Resized(size) => {
                self.camera.set_aspect(size.width, size.height);
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render_frame(event_loop);
            }
            _ => {}
        }
    }
}

fn run_lamp(
    simulation_config: SimulationConfig,
    recording_config: Option<RecordingConfig>,
    mute: bool,
) -> Result<()> {
    if let Some(config) = &recording_config {
        std::fs::create_dir_all(config.frames_dir())?;
        info!(
            "Recording {:.1}s ({} frames) to {}",
            config.duration_secs,
            config.total_frames(),
            config.output_dir.display()
        );
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(simulation_config, recording_config, mute);
    event_loop.run_app(&mut app)?;
    app.shutdown()
}

fn run(args: Args) -> Result<()> {
    match &args.command {
        Command::Compose { .. } => {
            let config = args
                .command
                .composition_config()
                .ok_or_else(|| Error::Config("missing composition settings".to_string()))?;
            let (_, summary) = render_composition(&config)?;
            info!(
                "Wrote {} ({:.1}s)",
                config.output_path.display(),
                summary.duration_s
            );
            Ok(())
        }
        Command::Lamp { mute, .. } => {
            let simulation_config = args
                .command
                .simulation_config()
                .ok_or_else(|| Error::Config("missing simulation settings".to_string()))?;
            if simulation_config.tick_rate_hz <= 0.0 {
                return Err(Error::Config(format!(
                    "simulation rate must be positive, got {}",
                    simulation_config.tick_rate_hz
                )));
            }
            run_lamp(simulation_config, args.command.recording_config(), *mute)
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
