//! Scene content types
//!
//! A scene is a flat list of [`SceneInstance`] values referencing shared
//! models by identifier. Simulation code mutates instances; the frame
//! pipeline reads them.

pub mod instance;

pub use instance::{InstanceFlags, SceneInstance};
