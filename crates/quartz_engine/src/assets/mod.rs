//! Asset loading and resource management
//!
//! Models are described by RON descriptor files and realized into GPU
//! meshes; textures load from PNG files. The [`ResourceManager`] owns
//! every loaded resource and hands out placeholder defaults for unknown
//! identifiers, so draw code never deals with missing assets.

pub mod image_loader;
pub mod model;
pub mod resource_manager;

pub use image_loader::ImageData;
pub use model::{Model, ModelDesc, ModelPart, PartDesc, ShapeDesc};
pub use resource_manager::ResourceManager;

use crate::render::RenderError;

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading assets
#[derive(Error, Debug)]
pub enum AssetError {
    /// File could not be read
    #[error("Asset I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image data could not be decoded
    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    /// Model descriptor could not be parsed
    #[error("Model descriptor parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// An asset directory is missing entirely
    #[error("Asset directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// Resource creation failed on the device
    #[error(transparent)]
    Render(#[from] RenderError),
}
