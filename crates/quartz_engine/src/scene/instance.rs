//! Scene instances

use crate::foundation::math::{Mat4, Transform, Vec4};
use crate::render::technique::ShaderKind;

use bitflags::bitflags;

bitflags! {
    /// Per-instance draw flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InstanceFlags: u8 {
        /// Instance renders into the shadow map
        const CASTS_SHADOW = 1 << 0;
        /// Instance is skipped by the color pass
        const INVISIBLE = 1 << 1;
    }
}

impl Default for InstanceFlags {
    fn default() -> Self {
        Self::CASTS_SHADOW
    }
}

/// One drawable object in the scene
///
/// References a shared model by identifier; the model itself lives in the
/// resource manager. Texture overrides replace the model's own texture
/// references for this instance only.
#[derive(Debug, Clone)]
pub struct SceneInstance {
    /// World placement
    pub transform: Transform,
    /// Model identifier
    pub model: String,
    /// Shading selection
    pub shader: ShaderKind,
    /// Texture-coordinate transform
    pub tex_transform: Mat4,
    /// Flat color override, replaces the material diffuse when set
    pub color: Option<Vec4>,
    /// Diffuse texture override
    pub diffuse_override: Option<String>,
    /// Normal map override
    pub normal_override: Option<String>,
    /// Draw flags
    pub flags: InstanceFlags,
}

impl SceneInstance {
    /// Create a visible, shadow-casting instance of a model
    #[must_use]
    pub fn new(model: &str) -> Self {
        Self {
            transform: Transform::identity(),
            model: model.to_string(),
            shader: ShaderKind::default(),
            tex_transform: Mat4::identity(),
            color: None,
            diffuse_override: None,
            normal_override: None,
            flags: InstanceFlags::default(),
        }
    }

    /// Set the shading selection
    #[must_use]
    pub fn with_shader(mut self, shader: ShaderKind) -> Self {
        self.shader = shader;
        self
    }

    /// Set the world placement
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Whether the instance renders into the shadow map
    #[must_use]
    pub fn casts_shadow(&self) -> bool {
        self.flags.contains(InstanceFlags::CASTS_SHADOW)
    }

    /// Whether the color pass skips the instance
    #[must_use]
    pub fn is_invisible(&self) -> bool {
        self.flags.contains(InstanceFlags::INVISIBLE)
    }

    /// Show or hide the instance
    pub fn set_invisible(&mut self, invisible: bool) {
        self.flags.set(InstanceFlags::INVISIBLE, invisible);
    }

    /// Enable or disable shadow casting
    pub fn set_casts_shadow(&mut self, casts: bool) {
        self.flags.set(InstanceFlags::CASTS_SHADOW, casts);
    }
}
