//! Application glue between the engine and the game session
//!
//! `ReboundGame` implements the engine's [`Application`] trait: it loads
//! assets and the arena level during initialization, forwards input and
//! time to the session every frame, and drives the frame pipeline from
//! the session's camera, light, and draw list.

use crate::config::GameConfig;
use crate::level;
use crate::session::GameSession;

use quartz_engine::render::pipeline::{FramePipeline, SceneView, SkyDome};
use quartz_engine::scene::SceneInstance;
use quartz_engine::{AppError, AppEvent, Application, Engine};

use log::info;

/// The four-player arena game as an engine application
pub struct ReboundGame {
    config: GameConfig,
    session: Option<GameSession>,
    pipeline: Option<FramePipeline>,
    sky: SkyDome,
    draw_list: Vec<SceneInstance>,
    frames: u64,
}

impl ReboundGame {
    /// Create the application; assets load later in `initialize`
    pub fn new(config: GameConfig) -> Self {
        let sky = SkyDome {
            model: config.assets.sky_model.clone(),
            texture: config.assets.sky_texture.clone(),
        };
        Self {
            config,
            session: None,
            pipeline: None,
            sky,
            draw_list: Vec::new(),
            frames: 0,
        }
    }

    /// Session access for the demo harness
    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Application for ReboundGame {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let assets = self.config.assets.clone();

        let (device, resources) = engine.asset_context();
        let models = resources.load_model_folder(device, &assets.models)?;
        let textures = resources.load_texture_folder(device, &assets.textures)?;
        info!("Loaded {models} models and {textures} textures");

        let statics = level::load_level(&assets.level)
            .map_err(|e| AppError::Custom(format!("Level {}: {e}", assets.level.display())))?;

        let window = &engine.config().window;
        let aspect = window.width as f32 / window.height.max(1) as f32;
        self.session = Some(GameSession::new(
            self.config.gameplay.clone(),
            statics,
            aspect,
        )?);

        let options = engine.config().pipeline_options();
        let (device, registry, _) = engine.render_context();
        self.pipeline = Some(FramePipeline::new(device, registry, options)?);
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
        // The simulation halts while the window is unfocused; input edges
        // from that span are never observed.
        if engine.timer().is_paused() {
            return Ok(());
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        session.update(engine.input(), delta_time)?;
        if session.exit_requested() {
            engine.quit();
        }
        Ok(())
    }

    fn render(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let (Some(session), Some(pipeline)) = (self.session.as_ref(), self.pipeline.as_mut())
        else {
            return Ok(());
        };

        self.draw_list.clear();
        session.collect_instances(&mut self.draw_list);

        let view = SceneView {
            camera: session.active_camera(),
            light: session.light().clone(),
            shadow: session.shadow_frame(),
            instances: &self.draw_list,
            sky: Some(&self.sky),
            blur_iterations: session.blur_iterations(),
            fill_mode: session.fill_mode(),
        };

        let (device, registry, resources) = engine.render_context();
        pipeline.render(device, registry, resources, &view)?;
        self.frames += 1;
        Ok(())
    }

    fn handle_event(&mut self, engine: &mut Engine, event: AppEvent) -> Result<(), AppError> {
        if let AppEvent::WindowResized { width, height } = event {
            if let Some(pipeline) = self.pipeline.as_mut() {
                pipeline.resize(engine.device_mut(), width, height)?;
            }
            if let Some(session) = self.session.as_mut() {
                session.set_aspect(width as f32 / height.max(1) as f32);
            }
        }
        Ok(())
    }

    fn cleanup(&mut self, _engine: &mut Engine) {
        info!("Rebound shut down after {} frames", self.frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use quartz_engine::assets::AssetError;
    use quartz_engine::input::{Axis, Button, ScriptedInput, SlotSample};
    use quartz_engine::render::backends::HeadlessDevice;
    use quartz_engine::EngineConfig;
    use std::path::Path;

    fn demo_config() -> GameConfig {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        let mut config = GameConfig::default();
        config.assets.models = root.join("assets/models");
        config.assets.textures = root.join("assets/textures");
        config.assets.level = root.join("assets/levels/arena.ron");
        config
    }

    /// One player joins, starts a match, steers for a few frames, then
    /// backs out.
    fn demo_script() -> ScriptedInput {
        let mut source = ScriptedInput::empty();
        for _ in 0..3 {
            source.push_slot(0, SlotSample::connected());
        }
        source.push_slot(0, SlotSample::connected().with_button(Button::A));
        source.push_slot(0, SlotSample::connected());
        source.push_slot(0, SlotSample::connected().with_button(Button::Start));
        source.push_slot(0, SlotSample::connected());
        for _ in 0..8 {
            source.push_slot(0, SlotSample::connected().with_axis(Axis::LeftStickX, 0.5));
        }
        source.push_slot(0, SlotSample::connected().with_button(Button::Back));
        source.push_slot(0, SlotSample::connected());
        source
    }

    #[test]
    fn test_scripted_match_runs_and_exits() {
        let config = demo_config();
        let engine_config = config.engine.clone();
        let device = HeadlessDevice::new(engine_config.window.width, engine_config.window.height);
        let mut game = ReboundGame::new(config);

        Engine::run(
            engine_config,
            Box::new(device),
            Box::new(demo_script()),
            &mut game,
        )
        .unwrap();

        // 17 scripted frames; the back-button release ends the run.
        assert_eq!(game.frames(), 17);
        let session = game.session().unwrap();
        assert_eq!(session.state(), SessionState::InGame);
        assert_eq!(session.player_count(), 1);
        assert!(session.exit_requested());
    }

    #[test]
    fn test_missing_asset_folder_fails_initialization() {
        let mut config = demo_config();
        config.assets.models = Path::new("/nonexistent/rebound/models").to_path_buf();

        let engine_config = EngineConfig::default();
        let device = HeadlessDevice::new(640, 360);
        let mut engine = Engine::new(
            engine_config,
            Box::new(device),
            Box::new(ScriptedInput::empty()),
        )
        .unwrap();

        let mut game = ReboundGame::new(config);
        let result = game.initialize(&mut engine);
        assert!(matches!(
            result,
            Err(AppError::Asset(AssetError::MissingDirectory(_)))
        ));
    }

    #[test]
    fn test_missing_level_file_fails_initialization() {
        let mut config = demo_config();
        config.assets.level = Path::new("/nonexistent/rebound/arena.ron").to_path_buf();

        let engine_config = EngineConfig::default();
        let device = HeadlessDevice::new(640, 360);
        let mut engine = Engine::new(
            engine_config,
            Box::new(device),
            Box::new(ScriptedInput::empty()),
        )
        .unwrap();

        let mut game = ReboundGame::new(config);
        let result = game.initialize(&mut engine);
        assert!(matches!(result, Err(AppError::Custom(_))));
    }

    #[test]
    fn test_resize_updates_pipeline_and_cameras() {
        let config = demo_config();
        let engine_config = config.engine.clone();
        let device = HeadlessDevice::new(engine_config.window.width, engine_config.window.height);
        let mut engine = Engine::new(
            engine_config,
            Box::new(device),
            Box::new(ScriptedInput::empty()),
        )
        .unwrap();

        let mut game = ReboundGame::new(config);
        game.initialize(&mut engine).unwrap();
        game.handle_event(
            &mut engine,
            AppEvent::WindowResized {
                width: 640,
                height: 360,
            },
        )
        .unwrap();

        let session = game.session().unwrap();
        let aspect = session.active_camera().aspect;
        assert!((aspect - 640.0 / 360.0).abs() < 1e-6);
    }
}
