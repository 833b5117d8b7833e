//! Core engine implementation
//!
//! [`Engine`] owns the subsystems every frame touches: the render device,
//! the input state, the resource manager, the technique registry, and the
//! frame timer. [`Engine::run`] drives an [`Application`] with a strict
//! per-frame order: drain queued events, advance the timer, sample input,
//! update, render.

use crate::application::{AppError, AppEvent, Application};
use crate::assets::ResourceManager;
use crate::config::{Deserialize, Serialize};
use crate::foundation::time::Timer;
use crate::input::{InputSource, InputState};
use crate::render::api::{PresentMode, RenderDevice};
use crate::render::pipeline::PipelineOptions;
use crate::render::technique::TechniqueRegistry;
use std::collections::VecDeque;
use thiserror::Error;

/// Coordinates all subsystems and runs the main loop
pub struct Engine {
    device: Box<dyn RenderDevice>,
    input_source: Box<dyn InputSource>,
    input: InputState,
    resources: ResourceManager,
    registry: TechniqueRegistry,
    timer: Timer,
    config: EngineConfig,
    events: VecDeque<AppEvent>,
    running: bool,
}

impl Engine {
    /// Create an engine around a device and an input source
    pub fn new(
        config: EngineConfig,
        mut device: Box<dyn RenderDevice>,
        input_source: Box<dyn InputSource>,
    ) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");

        let registry = TechniqueRegistry::load(device.as_mut())
            .map_err(|e| EngineError::InitializationFailed(format!("Technique registry: {e}")))?;
        let resources = ResourceManager::new(device.as_mut())
            .map_err(|e| EngineError::InitializationFailed(format!("Resource manager: {e}")))?;

        Ok(Self {
            device,
            input_source,
            input: InputState::new(),
            resources,
            registry,
            timer: Timer::new(),
            config,
            events: VecDeque::new(),
            running: true,
        })
    }

    /// Run the main loop with the given application
    ///
    /// Returns when the application or a close event requests exit. The
    /// frame that requests exit still finishes its render.
    pub fn run<T: Application>(
        config: EngineConfig,
        device: Box<dyn RenderDevice>,
        input_source: Box<dyn InputSource>,
        app: &mut T,
    ) -> Result<(), EngineError> {
        let mut engine = Self::new(config, device, input_source)?;

        app.initialize(&mut engine)
            .map_err(|e| EngineError::Application(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");

        while engine.running {
            engine.drain_events(app)?;
            if !engine.running {
                break;
            }

            engine.timer.update();
            let delta_time = engine.timer.delta_time();
            engine.input.update(engine.input_source.as_mut());

            app.update(&mut engine, delta_time)
                .map_err(|e| EngineError::Application(format!("App update: {e}")))?;
            app.render(&mut engine)
                .map_err(|e| EngineError::Application(format!("App render: {e}")))?;
        }

        app.cleanup(&mut engine);
        log::info!(
            "Engine shutdown after {} frames, {:.1} avg fps",
            engine.timer.frame_count(),
            engine.timer.average_fps()
        );
        Ok(())
    }

    /// Hand every queued event to the engine and then the application
    fn drain_events<T: Application>(&mut self, app: &mut T) -> Result<(), EngineError> {
        while let Some(event) = self.events.pop_front() {
            self.apply_event(event);
            app.handle_event(self, event)
                .map_err(|e| EngineError::Application(format!("App event handling: {e}")))?;
        }
        Ok(())
    }

    /// Engine-side reaction to an event
    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::WindowCloseRequested => {
                log::info!("Window close requested");
                self.running = false;
            }
            AppEvent::WindowUnfocused => {
                log::debug!("Window unfocused, pausing timer");
                self.timer.pause();
            }
            AppEvent::WindowFocused => {
                log::debug!("Window focused, resuming timer");
                self.timer.resume();
            }
            AppEvent::WindowResized { .. } => {}
        }
    }

    /// Queue an event for the start of the next frame
    ///
    /// Events never interrupt a frame in flight; resizes in particular
    /// must not tear down targets between passes.
    pub fn push_event(&mut self, event: AppEvent) {
        self.events.push_back(event);
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the main loop will continue
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The render device
    pub fn device_mut(&mut self) -> &mut dyn RenderDevice {
        self.device.as_mut()
    }

    /// The technique registry
    #[must_use]
    pub fn registry(&self) -> &TechniqueRegistry {
        &self.registry
    }

    /// The resource manager
    #[must_use]
    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    /// Sampled input state for the current frame
    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Frame timing
    #[must_use]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Split borrows for driving the frame pipeline
    ///
    /// The pipeline needs the device mutably while reading the registry
    /// and resources; one accessor hands out all three.
    pub fn render_context(
        &mut self,
    ) -> (&mut dyn RenderDevice, &TechniqueRegistry, &ResourceManager) {
        (self.device.as_mut(), &self.registry, &self.resources)
    }

    /// Split borrows for loading assets onto the device
    pub fn asset_context(&mut self) -> (&mut dyn RenderDevice, &mut ResourceManager) {
        (self.device.as_mut(), &mut self.resources)
    }
}

/// Engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window configuration
    pub window: WindowConfig,

    /// Renderer configuration
    pub render: RenderConfig,
}

impl EngineConfig {
    /// Pipeline options derived from this configuration
    #[must_use]
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            shadow_resolution: self.render.shadow.resolution,
            clear_color: self.render.clear_color,
            blur_sigma: self.render.blur_sigma,
            present_mode: if self.window.vsync {
                PresentMode::Fifo
            } else {
                PresentMode::Immediate
            },
        }
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,

    /// Window width in pixels
    pub width: u32,

    /// Window height in pixels
    pub height: u32,

    /// Whether the window is resizable
    pub resizable: bool,

    /// Whether presentation waits for the display interval
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Quartz Engine Application".to_string(),
            width: 1280,
            height: 720,
            resizable: true,
            vsync: false,
        }
    }
}

/// Renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Clear color for the offscreen scene target
    pub clear_color: [f32; 4],

    /// Gaussian sigma for the blur kernel
    pub blur_sigma: f32,

    /// Shadow mapping configuration
    pub shadow: ShadowConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.75, 0.75, 0.75, 1.0],
            blur_sigma: 2.5,
            shadow: ShadowConfig::default(),
        }
    }
}

/// Shadow mapping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Shadow map edge length in texels
    pub resolution: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self { resolution: 2048 }
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// A subsystem failed to initialize
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// The application returned an error from a lifecycle method
    #[error("Application error: {0}")]
    Application(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedInput;
    use crate::render::backends::HeadlessDevice;

    #[derive(Default)]
    struct CountingApp {
        initialized: u32,
        updates: u32,
        renders: u32,
        cleanups: u32,
        resizes: Vec<(u32, u32)>,
        paused_during_update: Vec<bool>,
        quit_after: u32,
    }

    impl Application for CountingApp {
        fn initialize(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
            self.initialized += 1;
            Ok(())
        }

        fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
            self.updates += 1;
            self.paused_during_update.push(engine.timer().is_paused());
            if self.updates >= self.quit_after {
                engine.quit();
            }
            Ok(())
        }

        fn render(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
            self.renders += 1;
            Ok(())
        }

        fn handle_event(&mut self, _engine: &mut Engine, event: AppEvent) -> Result<(), AppError> {
            if let AppEvent::WindowResized { width, height } = event {
                self.resizes.push((width, height));
            }
            Ok(())
        }

        fn cleanup(&mut self, _engine: &mut Engine) {
            self.cleanups += 1;
        }
    }

    fn run_app(app: &mut CountingApp) {
        let config = EngineConfig::default();
        let device = HeadlessDevice::new(config.window.width, config.window.height);
        let input = ScriptedInput::empty();
        Engine::run(config, Box::new(device), Box::new(input), app).unwrap();
    }

    #[test]
    fn test_quit_frame_still_renders() {
        let mut app = CountingApp {
            quit_after: 3,
            ..CountingApp::default()
        };
        run_app(&mut app);

        assert_eq!(app.initialized, 1);
        assert_eq!(app.updates, 3);
        assert_eq!(app.renders, 3);
        assert_eq!(app.cleanups, 1);
    }

    #[test]
    fn test_close_event_stops_before_next_update() {
        struct ClosingApp {
            inner: CountingApp,
        }

        impl Application for ClosingApp {
            fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
                self.inner.initialize(engine)
            }

            fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
                engine.push_event(AppEvent::WindowCloseRequested);
                self.inner.updates += 1;
                let _ = delta_time;
                Ok(())
            }

            fn render(&mut self, engine: &mut Engine) -> Result<(), AppError> {
                self.inner.render(engine)
            }

            fn cleanup(&mut self, engine: &mut Engine) {
                self.inner.cleanup(engine);
            }
        }

        let config = EngineConfig::default();
        let device = HeadlessDevice::new(config.window.width, config.window.height);
        let input = ScriptedInput::empty();
        let mut app = ClosingApp {
            inner: CountingApp::default(),
        };
        Engine::run(config, Box::new(device), Box::new(input), &mut app).unwrap();

        assert_eq!(app.inner.updates, 1);
        assert_eq!(app.inner.renders, 1);
        assert_eq!(app.inner.cleanups, 1);
    }

    #[test]
    fn test_unfocus_pauses_timer_before_update() {
        struct UnfocusApp {
            inner: CountingApp,
        }

        impl Application for UnfocusApp {
            fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
                engine.push_event(AppEvent::WindowUnfocused);
                Ok(())
            }

            fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
                self.inner.paused_during_update.push(engine.timer().is_paused());
                assert_eq!(delta_time, 0.0);
                engine.quit();
                Ok(())
            }

            fn render(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
                Ok(())
            }

            fn cleanup(&mut self, _engine: &mut Engine) {}
        }

        let config = EngineConfig::default();
        let device = HeadlessDevice::new(config.window.width, config.window.height);
        let input = ScriptedInput::empty();
        let mut app = UnfocusApp {
            inner: CountingApp::default(),
        };
        Engine::run(config, Box::new(device), Box::new(input), &mut app).unwrap();

        assert_eq!(app.inner.paused_during_update, vec![true]);
    }

    #[test]
    fn test_resize_events_reach_the_application() {
        struct ResizeApp {
            inner: CountingApp,
        }

        impl Application for ResizeApp {
            fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
                engine.push_event(AppEvent::WindowResized {
                    width: 1920,
                    height: 1080,
                });
                Ok(())
            }

            fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
                engine.quit();
                Ok(())
            }

            fn render(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
                Ok(())
            }

            fn handle_event(
                &mut self,
                engine: &mut Engine,
                event: AppEvent,
            ) -> Result<(), AppError> {
                self.inner.handle_event(engine, event)
            }

            fn cleanup(&mut self, _engine: &mut Engine) {}
        }

        let config = EngineConfig::default();
        let device = HeadlessDevice::new(config.window.width, config.window.height);
        let input = ScriptedInput::empty();
        let mut app = ResizeApp {
            inner: CountingApp::default(),
        };
        Engine::run(config, Box::new(device), Box::new(input), &mut app).unwrap();

        assert_eq!(app.inner.resizes, vec![(1920, 1080)]);
    }

    #[test]
    fn test_config_defaults_map_to_pipeline_options() {
        let config = EngineConfig::default();
        let options = config.pipeline_options();

        assert_eq!(options.shadow_resolution, 2048);
        assert_eq!(options.clear_color, [0.75, 0.75, 0.75, 1.0]);
        assert_eq!(options.present_mode, PresentMode::Immediate);
    }

    #[test]
    fn test_partial_toml_fills_missing_fields_with_defaults() {
        let parsed: EngineConfig =
            toml::from_str("[window]\nwidth = 800\nheight = 600\n").unwrap();

        assert_eq!(parsed.window.width, 800);
        assert_eq!(parsed.window.height, 600);
        assert_eq!(parsed.window.title, WindowConfig::default().title);
        assert_eq!(parsed.render.shadow.resolution, 2048);
    }
}
