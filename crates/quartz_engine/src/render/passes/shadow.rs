//! Shadow frustum fitting
//!
//! The directional light gets an orthographic frustum fitted to a bounding
//! sphere around the scene. Recomputed every frame after the light
//! animates, the result feeds both the depth pass (light view-projection)
//! and the color pass (world-to-shadow-texture transform).

use crate::foundation::math::{Mat4, Mat4Ext, Point3, Vec3};
use crate::render::{RenderError, RenderResult};

/// Bounding sphere enclosing everything that casts or receives shadows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    center: Vec3,
    radius: f32,
}

impl SceneBounds {
    /// Create scene bounds, rejecting a non-positive radius
    pub fn new(center: Vec3, radius: f32) -> RenderResult<Self> {
        if radius <= 0.0 || !radius.is_finite() {
            return Err(RenderError::DegenerateShadowBounds(format!(
                "scene bounds radius {radius} must be positive"
            )));
        }
        Ok(Self { center, radius })
    }

    /// Sphere center
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Sphere radius
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// Per-frame shadow matrices
///
/// `view_proj` renders the depth pass; `transform` carries world positions
/// into shadow-texture space (uv in [0, 1], v flipped, depth in [0, 1])
/// for shadow sampling during the color pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowFrame {
    view: Mat4,
    proj: Mat4,
    transform: Mat4,
}

impl ShadowFrame {
    /// Fit the light frustum to the scene bounds
    ///
    /// The virtual light eye sits two radii from the sphere center, against
    /// the light direction, so the whole sphere is in front of it. Fails on
    /// a near-zero direction or one parallel to the world up axis, either
    /// of which collapses the frustum.
    pub fn compute(bounds: &SceneBounds, light_direction: Vec3) -> RenderResult<Self> {
        let norm = light_direction.norm();
        if norm < 1.0e-6 {
            return Err(RenderError::DegenerateShadowBounds(
                "light direction is near zero".to_string(),
            ));
        }
        let direction = light_direction / norm;

        let up = Vec3::new(0.0, 1.0, 0.0);
        if direction.cross(&up).norm() < 1.0e-6 {
            return Err(RenderError::DegenerateShadowBounds(
                "light direction is parallel to the up axis".to_string(),
            ));
        }

        let radius = bounds.radius();
        let center = bounds.center();
        let eye = center - direction * (2.0 * radius);
        let view = Mat4::look_at(eye, center, up);

        // Sphere center in light view space; the frustum extends one radius
        // out on every axis around it
        let center_ls = view.transform_point(&Point3::from(center));
        let proj = Mat4::orthographic(
            center_ls.x - radius,
            center_ls.x + radius,
            center_ls.y - radius,
            center_ls.y + radius,
            -center_ls.z - radius,
            -center_ls.z + radius,
        );

        // Maps clip space [-1, 1] to texture space [0, 1] with v flipped
        let bias = Mat4::new(
            0.5, 0.0, 0.0, 0.5, //
            0.0, -0.5, 0.0, 0.5, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        );

        Ok(Self {
            view,
            proj,
            transform: bias * proj * view,
        })
    }

    /// Light view matrix
    #[must_use]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Combined view-projection for the depth pass
    #[must_use]
    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view
    }

    /// World-to-shadow-texture transform for shadow sampling
    #[must_use]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }
}
