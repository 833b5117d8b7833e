//! # 3D Camera
//!
//! Perspective camera with on-demand matrix generation.
//!
//! ## Coordinate System
//! View space is right-handed Y-up: the camera looks down -Z. Projection
//! matrices map depth to [0, 1] (see `foundation::math::Mat4Ext`), so the
//! combined transform is simply P × V with no intermediate flip.

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};

/// 3D perspective camera
///
/// Matrices are computed on demand from position, target, up, and lens
/// parameters; nothing is cached, so a mutated camera can never serve a
/// stale matrix within a frame.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to the near clipping plane
    pub near: f32,

    /// Distance to the far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a perspective camera at `position` looking at the origin
    ///
    /// `fov` is the vertical field of view in radians.
    #[must_use]
    pub fn perspective(position: Vec3, fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov,
            aspect,
            near,
            far,
        }
    }

    /// Move the camera, preserving target and orientation
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Point the camera at `target` with the given up vector
    ///
    /// The up vector need not be perpendicular to the view direction; the
    /// view matrix orthonormalizes it.
    pub fn look_at(&mut self, position: Vec3, target: Vec3, up: Vec3) {
        self.position = position;
        self.target = target;
        self.up = up;
    }

    /// Reconfigure the projection, typically after a window resize
    pub fn set_lens(&mut self, fov: f32, aspect: f32, near: f32, far: f32) {
        if (self.aspect - aspect).abs() > 0.01 {
            log::debug!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.fov = fov;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
    }

    /// View matrix transforming world space to camera space
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// Perspective projection matrix with depth in [0, 1]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov, self.aspect, self.near, self.far)
    }

    /// Combined view-projection matrix (P × V)
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    /// A camera above and behind the origin with a 45 degree lens
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, 3.0),
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}
