//! Render pass building blocks
//!
//! `shadow` fits the light frustum to the scene bounds; `blur` runs the
//! separable compute blur over the offscreen buffer. The frame pipeline
//! sequences both.

pub mod blur;
pub mod shadow;

pub use blur::BlurStage;
pub use shadow::{SceneBounds, ShadowFrame};
