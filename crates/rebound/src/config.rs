//! Game configuration
//!
//! Layered over [`EngineConfig`]: one file configures the engine, the
//! gameplay tunables, and the asset locations. Every section falls back
//! to defaults, so a partial file or no file at all still boots.

use quartz_engine::config::Config;
use quartz_engine::EngineConfig;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration for the game
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Engine settings (window, render targets)
    pub engine: EngineConfig,
    /// Gameplay tunables
    pub gameplay: GameplayConfig,
    /// Asset locations
    pub assets: AssetsConfig,
}

impl Config for GameConfig {}

/// Gameplay tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Health each player starts a match with
    pub player_health: i32,
    /// Seconds the end screen holds before the session resets
    pub end_screen_duration: f32,
    /// Paddle movement speed in units per second at full stick deflection
    pub player_speed: f32,
    /// Ball travel speed in units per second
    pub ball_speed: f32,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            player_health: 3,
            end_screen_duration: 5.0,
            player_speed: 25.0,
            ball_speed: 30.0,
        }
    }
}

/// Where game content lives on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory of model descriptors (`.ron`)
    pub models: PathBuf,
    /// Directory of textures (`.png`)
    pub textures: PathBuf,
    /// Level file describing the arena statics
    pub level: PathBuf,
    /// Model identifier for the sky dome
    pub sky_model: String,
    /// Texture identifier for the sky dome
    pub sky_texture: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            models: PathBuf::from("assets/models"),
            textures: PathBuf::from("assets/textures"),
            level: PathBuf::from("assets/levels/arena.ron"),
            sky_model: "sky".to_string(),
            sky_texture: "sky".to_string(),
        }
    }
}
