//! Directional lighting and the per-frame light animation

use crate::foundation::math::{constants, Mat4, Mat4Ext, Vec3, Vec4};

/// A single directional light
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    /// Ambient contribution
    pub ambient: Vec4,
    /// Diffuse contribution
    pub diffuse: Vec4,
    /// Specular contribution; w is the specular power
    pub specular: Vec4,
    /// World-space direction the light shines toward
    pub direction: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            ambient: Vec4::new(0.3, 0.3, 0.3, 1.0),
            diffuse: Vec4::new(0.8, 0.8, 0.8, 1.0),
            specular: Vec4::new(0.6, 0.6, 0.6, 16.0),
            direction: Vec3::new(-0.577_35, -0.577_35, 0.577_35),
        }
    }
}

impl DirectionalLight {
    /// Create a light shining in `direction` with default colors
    #[must_use]
    pub fn with_direction(direction: Vec3) -> Self {
        Self {
            direction,
            ..Default::default()
        }
    }
}

/// Rotates a directional light about the world Y axis over time
///
/// The rig keeps the original reference direction immutable and derives
/// the current direction from it each frame, so error never accumulates
/// in the vector itself. The angle wraps modulo 2π.
#[derive(Debug, Clone)]
pub struct LightRig {
    light: DirectionalLight,
    reference_direction: Vec3,
    angle: f32,
    speed: f32,
}

impl Default for LightRig {
    fn default() -> Self {
        Self::new(DirectionalLight::default())
    }
}

impl LightRig {
    /// Default angular speed in radians per second
    pub const DEFAULT_SPEED: f32 = 0.1;

    /// Create a rig around the given light
    #[must_use]
    pub fn new(light: DirectionalLight) -> Self {
        let reference_direction = light.direction;
        Self {
            light,
            reference_direction,
            angle: 0.0,
            speed: Self::DEFAULT_SPEED,
        }
    }

    /// Advance the rotation and refresh the light's direction
    pub fn update(&mut self, delta_time: f32) {
        self.angle = (self.angle + self.speed * delta_time) % constants::TAU;
        let rotation = Mat4::rotation_y(self.angle);
        self.light.direction = rotation.transform_vector(&self.reference_direction);
    }

    /// The light with its current direction
    #[must_use]
    pub fn light(&self) -> &DirectionalLight {
        &self.light
    }

    /// Current direction of the rotated light
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.light.direction
    }

    /// Accumulated rotation angle in radians
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle
    }
}
