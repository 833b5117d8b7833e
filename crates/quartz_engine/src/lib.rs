//! # Quartz Engine
//!
//! A modular 3D game engine with a pass-based forward renderer.
//!
//! ## Features
//!
//! - **Pass-based rendering**: shadow map, offscreen color, compute blur,
//!   and composite passes behind one frame pipeline
//! - **Device abstraction**: all GPU work goes through [`render::api::RenderDevice`],
//!   so the whole pipeline runs against the in-repo headless device in tests
//! - **Owned technique registry**: no global shader state; parameter binding
//!   is table-driven per technique
//! - **Asset management**: model/texture stores with placeholder fallbacks
//! - **Configuration**: TOML/RON config and level data via serde
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quartz_engine::prelude::*;
//! use quartz_engine::render::backends::HeadlessDevice;
//! use quartz_engine::input::ScriptedInput;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn render(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let device = HeadlessDevice::new(config.window.width, config.window.height);
//!     let input = ScriptedInput::empty();
//!     let mut app = MyApp;
//!     Engine::run(config, Box::new(device), Box::new(input), &mut app)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod assets;
pub mod render;
pub mod scene;
pub mod input;

mod application;
mod engine;

pub use application::{AppError, AppEvent, Application};
pub use engine::{Engine, EngineConfig, EngineError, RenderConfig, ShadowConfig, WindowConfig};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        application::{AppError, AppEvent, Application},
        engine::{Engine, EngineConfig, EngineError},
        foundation::{
            math::{Mat4, Mat4Ext, Quat, Transform, Vec2, Vec3, Vec4},
            time::{Stopwatch, Timer},
        },
        input::{Axis, Button, InputState},
        render::{
            lighting::{DirectionalLight, LightRig},
            material::Material,
            passes::shadow::{SceneBounds, ShadowFrame},
            pipeline::{FramePipeline, SceneView},
            primitives::{camera::Camera, mesh::Mesh},
            technique::{ShaderKind, TechniqueRegistry},
            RenderError,
        },
        scene::instance::SceneInstance,
    };
}
