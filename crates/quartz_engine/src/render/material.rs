//! Surface material definition

use crate::foundation::math::Vec4;

use serde::{Deserialize, Serialize};

/// Phong-style surface material
///
/// `specular.w` carries the specular power, matching the packing the
/// lighting shaders consume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Ambient reflectance
    pub ambient: Vec4,
    /// Diffuse reflectance
    pub diffuse: Vec4,
    /// Specular reflectance; w is the specular power
    pub specular: Vec4,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec4::new(0.5, 0.5, 0.5, 1.0),
            diffuse: Vec4::new(1.0, 1.0, 1.0, 1.0),
            specular: Vec4::new(0.6, 0.6, 0.6, 16.0),
        }
    }
}

impl Material {
    /// Create a material from ambient, diffuse, and specular reflectance
    #[must_use]
    pub fn new(ambient: Vec4, diffuse: Vec4, specular: Vec4) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
        }
    }

    /// Replace the diffuse reflectance, keeping alpha
    #[must_use]
    pub fn with_diffuse_color(mut self, color: Vec4) -> Self {
        self.diffuse = color;
        self
    }
}
