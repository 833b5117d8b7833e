//! # Rendering System
//!
//! Pass-based forward renderer behind an abstract device.
//!
//! ## Architecture
//!
//! - **`api`**: the [`api::RenderDevice`] trait every backend implements,
//!   plus the handle and descriptor types shared across passes
//! - **`pipeline`**: the per-frame pass sequence (shadow, offscreen color,
//!   blur, composite) and the size-dependent targets it owns
//! - **`passes`**: shadow frustum fitting and the compute blur stage
//! - **`technique`**: the owned shader/technique registry with table-driven
//!   parameter binding
//! - **`primitives`**: camera, vertex, and mesh types
//! - **`backends`**: device implementations; the in-repo one is headless
//!   and backs the test suite
//!
//! All pipeline code takes `&mut dyn RenderDevice`, so the whole frame can
//! run against a test double.

pub mod api;
pub mod backends;
pub mod lighting;
pub mod material;
pub mod passes;
pub mod pipeline;
pub mod primitives;
pub mod targets;
pub mod technique;

pub use api::{
    DrawParams, FrameParams, MeshHandle, PassDesc, PresentMode, ProgramId, RenderDevice,
    TextureDesc, TextureFormat,
};
pub use lighting::{DirectionalLight, LightRig};
pub use material::Material;
pub use pipeline::{FramePipeline, PipelineOptions, SceneView, SkyDome};
pub use primitives::{Camera, Mesh, Vertex};
pub use targets::{OffscreenTarget, ShadowMapTarget};
pub use technique::{ShaderKind, TechniqueKind, TechniqueRegistry};

use thiserror::Error;

/// Errors produced by the rendering system
#[derive(Error, Debug)]
pub enum RenderError {
    /// Renderer initialization failed during setup
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// A rendering operation failed during execution
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// Resource creation or management failed
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// A required shader program is missing from the backend
    ///
    /// Raised during technique registry loading; fatal at startup, there
    /// is no fallback shader.
    #[error("Shader program not found: {0}")]
    ProgramNotFound(String),

    /// A handle referred to a resource the device does not know
    #[error("Invalid resource handle: {0}")]
    InvalidHandle(String),

    /// Shadow frustum inputs were degenerate
    ///
    /// Zero-radius scene bounds or a near-zero light direction would
    /// collapse the orthographic shadow frustum.
    #[error("Degenerate shadow bounds: {0}")]
    DegenerateShadowBounds(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
