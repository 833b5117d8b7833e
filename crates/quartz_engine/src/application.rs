//! Application trait and lifecycle management

use crate::assets::AssetError;
use crate::config::ConfigError;
use crate::engine::{Engine, EngineError};
use crate::render::RenderError;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to build a game on the engine. The engine calls
/// the methods in a fixed per-frame order: queued events first, then
/// `update`, then `render`.
pub trait Application {
    /// Called once after the engine is initialized
    ///
    /// Load assets, build the frame pipeline, and set up initial game
    /// state here.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Called every frame before rendering
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Called every frame after `update`
    ///
    /// The application owns its frame pipeline and drives it from here.
    fn render(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Called for each queued event at the start of a frame
    ///
    /// The engine has already reacted to focus and close events by the
    /// time this runs; applications handle resizes and anything extra.
    fn handle_event(&mut self, _engine: &mut Engine, _event: AppEvent) -> Result<(), AppError> {
        Ok(())
    }

    /// Called once when the main loop exits
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Rendering error raised while driving the frame pipeline
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Asset loading error
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}

/// Events delivered to the application at frame start
///
/// Raw gamepad state never arrives as events; it is sampled through
/// [`crate::input::InputSource`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Window was resized
    WindowResized {
        /// New window width in pixels
        width: u32,
        /// New window height in pixels
        height: u32,
    },

    /// Window close requested
    WindowCloseRequested,

    /// Window gained focus
    WindowFocused,

    /// Window lost focus
    WindowUnfocused,
}
