//! Owned shader and technique registry
//!
//! One registry is constructed at startup and passed by reference to every
//! draw site. Each technique pairs a compiled program with a parameter
//! binder; dispatch is a table lookup on the technique kind, so adding a
//! technique means adding one row to [`TECHNIQUE_TABLE`].

use crate::foundation::math::{Mat4, Mat4Ext, Vec4};
use crate::render::api::{DrawParams, ProgramId, ProgramStage, RenderDevice, ShaderResourceView};
use crate::render::material::Material;
use crate::render::{RenderError, RenderResult};

use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};

/// Shading selection an entity or level record carries
///
/// Each kind resolves to one graphics technique; the renderer-internal
/// techniques (sky, shadow map, fullscreen, blur) are not selectable per
/// entity and have no kind here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShaderKind {
    /// Lit, textured, shadow-receiving
    #[default]
    BasicTextured,
    /// Lit, material color only, shadow-receiving
    BasicUntextured,
    /// Textured with no lighting or shadows
    BasicNoLighting,
    /// Flat color modulated by the shadow map
    BasicShadowOnly,
    /// Lit and textured with per-pixel normal mapping
    NormalMapped,
}

impl ShaderKind {
    /// The technique this kind renders with
    #[must_use]
    pub fn technique(self) -> TechniqueKind {
        match self {
            Self::BasicTextured => TechniqueKind::BasicTextured,
            Self::BasicUntextured => TechniqueKind::BasicUntextured,
            Self::BasicNoLighting => TechniqueKind::BasicNoLighting,
            Self::BasicShadowOnly => TechniqueKind::BasicShadowOnly,
            Self::NormalMapped => TechniqueKind::NormalMapped,
        }
    }
}

/// Every program variant the renderer can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TechniqueKind {
    /// Lit, textured, shadow-receiving
    BasicTextured,
    /// Lit, material color only, shadow-receiving
    BasicUntextured,
    /// Textured with no lighting or shadows
    BasicNoLighting,
    /// Flat color modulated by the shadow map
    BasicShadowOnly,
    /// Lit and textured with per-pixel normal mapping
    NormalMapped,
    /// Sky sphere centered on the eye, drawn at far depth
    Sky,
    /// Depth-only draw into the shadow map
    ShadowMap,
    /// Composite quad sampling the offscreen buffer
    Fullscreen,
    /// Horizontal compute blur
    BlurHorizontal,
    /// Vertical compute blur
    BlurVertical,
}

/// Everything a binder may pull from to fill a parameter block
///
/// Draw sites fill this once per object; the technique's binder picks the
/// fields that technique consumes and ignores the rest.
#[derive(Debug, Clone)]
pub struct ObjectInputs {
    /// Object-to-world matrix
    pub world: Mat4,
    /// View-projection of the active camera, or of the light for depth draws
    pub view_proj: Mat4,
    /// Texture-coordinate transform
    pub tex_transform: Mat4,
    /// World-to-shadow-texture transform for the frame
    pub shadow_transform: Mat4,
    /// Surface material
    pub material: Material,
    /// Flat color override
    pub color: Option<Vec4>,
    /// Diffuse texture
    pub diffuse_map: Option<ShaderResourceView>,
    /// Normal map texture
    pub normal_map: Option<ShaderResourceView>,
    /// Shadow depth map
    pub shadow_map: Option<ShaderResourceView>,
}

impl ObjectInputs {
    /// Inputs with identity transforms and nothing bound
    #[must_use]
    pub fn new() -> Self {
        Self {
            world: Mat4::identity(),
            view_proj: Mat4::identity(),
            tex_transform: Mat4::identity(),
            shadow_transform: Mat4::identity(),
            material: Material::default(),
            color: None,
            diffuse_map: None,
            normal_map: None,
            shadow_map: None,
        }
    }
}

impl Default for ObjectInputs {
    fn default() -> Self {
        Self::new()
    }
}

type BinderFn = fn(&ObjectInputs) -> DrawParams;

struct TechniqueDef {
    kind: TechniqueKind,
    program: &'static str,
    stage: ProgramStage,
    binder: BinderFn,
}

/// The full technique table: kind, program name, stage, parameter binder
static TECHNIQUE_TABLE: &[TechniqueDef] = &[
    TechniqueDef {
        kind: TechniqueKind::BasicTextured,
        program: "basic_textured",
        stage: ProgramStage::Graphics,
        binder: bind_basic_textured,
    },
    TechniqueDef {
        kind: TechniqueKind::BasicUntextured,
        program: "basic_untextured",
        stage: ProgramStage::Graphics,
        binder: bind_basic_untextured,
    },
    TechniqueDef {
        kind: TechniqueKind::BasicNoLighting,
        program: "basic_no_lighting",
        stage: ProgramStage::Graphics,
        binder: bind_basic_no_lighting,
    },
    TechniqueDef {
        kind: TechniqueKind::BasicShadowOnly,
        program: "basic_shadow_only",
        stage: ProgramStage::Graphics,
        binder: bind_basic_shadow_only,
    },
    TechniqueDef {
        kind: TechniqueKind::NormalMapped,
        program: "normal_mapped",
        stage: ProgramStage::Graphics,
        binder: bind_normal_mapped,
    },
    TechniqueDef {
        kind: TechniqueKind::Sky,
        program: "sky",
        stage: ProgramStage::Graphics,
        binder: bind_sky,
    },
    TechniqueDef {
        kind: TechniqueKind::ShadowMap,
        program: "shadow_map",
        stage: ProgramStage::Graphics,
        binder: bind_shadow_map,
    },
    TechniqueDef {
        kind: TechniqueKind::Fullscreen,
        program: "fullscreen",
        stage: ProgramStage::Graphics,
        binder: bind_fullscreen,
    },
    TechniqueDef {
        kind: TechniqueKind::BlurHorizontal,
        program: "blur_horizontal",
        stage: ProgramStage::Compute,
        binder: bind_nothing,
    },
    TechniqueDef {
        kind: TechniqueKind::BlurVertical,
        program: "blur_vertical",
        stage: ProgramStage::Compute,
        binder: bind_nothing,
    },
];

fn bind_basic_textured(inputs: &ObjectInputs) -> DrawParams {
    DrawParams {
        world: inputs.world,
        world_view_proj: inputs.view_proj * inputs.world,
        world_inv_transpose: Some(inputs.world.inverse_transpose()),
        tex_transform: inputs.tex_transform,
        shadow_transform: Some(inputs.shadow_transform * inputs.world),
        material: Some(inputs.material),
        color: inputs.color,
        diffuse_map: inputs.diffuse_map,
        normal_map: None,
        shadow_map: inputs.shadow_map,
    }
}

fn bind_basic_untextured(inputs: &ObjectInputs) -> DrawParams {
    DrawParams {
        world: inputs.world,
        world_view_proj: inputs.view_proj * inputs.world,
        world_inv_transpose: Some(inputs.world.inverse_transpose()),
        shadow_transform: Some(inputs.shadow_transform * inputs.world),
        material: Some(inputs.material),
        color: inputs.color,
        shadow_map: inputs.shadow_map,
        ..DrawParams::default()
    }
}

fn bind_basic_no_lighting(inputs: &ObjectInputs) -> DrawParams {
    DrawParams {
        world: inputs.world,
        world_view_proj: inputs.view_proj * inputs.world,
        tex_transform: inputs.tex_transform,
        color: inputs.color,
        diffuse_map: inputs.diffuse_map,
        ..DrawParams::default()
    }
}

fn bind_basic_shadow_only(inputs: &ObjectInputs) -> DrawParams {
    // Unlit but still textured and shadow-modulated
    DrawParams {
        world: inputs.world,
        world_view_proj: inputs.view_proj * inputs.world,
        tex_transform: inputs.tex_transform,
        shadow_transform: Some(inputs.shadow_transform * inputs.world),
        color: inputs.color,
        diffuse_map: inputs.diffuse_map,
        shadow_map: inputs.shadow_map,
        ..DrawParams::default()
    }
}

fn bind_normal_mapped(inputs: &ObjectInputs) -> DrawParams {
    DrawParams {
        world: inputs.world,
        world_view_proj: inputs.view_proj * inputs.world,
        world_inv_transpose: Some(inputs.world.inverse_transpose()),
        tex_transform: inputs.tex_transform,
        shadow_transform: Some(inputs.shadow_transform * inputs.world),
        material: Some(inputs.material),
        color: inputs.color,
        diffuse_map: inputs.diffuse_map,
        normal_map: inputs.normal_map,
        shadow_map: inputs.shadow_map,
    }
}

fn bind_sky(inputs: &ObjectInputs) -> DrawParams {
    DrawParams {
        world: inputs.world,
        world_view_proj: inputs.view_proj * inputs.world,
        diffuse_map: inputs.diffuse_map,
        ..DrawParams::default()
    }
}

fn bind_shadow_map(inputs: &ObjectInputs) -> DrawParams {
    // Depth only; view_proj here is the light's
    DrawParams {
        world: inputs.world,
        world_view_proj: inputs.view_proj * inputs.world,
        ..DrawParams::default()
    }
}

fn bind_fullscreen(inputs: &ObjectInputs) -> DrawParams {
    DrawParams {
        diffuse_map: inputs.diffuse_map,
        ..DrawParams::default()
    }
}

fn bind_nothing(_inputs: &ObjectInputs) -> DrawParams {
    DrawParams::default()
}

/// One loaded technique
#[derive(Debug)]
pub struct Technique {
    /// Compiled program handle
    pub program: ProgramId,
    binder: BinderFn,
}

/// Registry of every loaded technique
///
/// Constructed once at startup; a missing program aborts loading, there is
/// no fallback program to substitute.
#[derive(Debug)]
pub struct TechniqueRegistry {
    techniques: HashMap<TechniqueKind, Technique>,
}

impl TechniqueRegistry {
    /// Compile-load every technique in the table
    pub fn load(device: &mut dyn RenderDevice) -> RenderResult<Self> {
        let mut techniques = HashMap::with_capacity(TECHNIQUE_TABLE.len());
        for def in TECHNIQUE_TABLE {
            let program = device.create_program(def.program, def.stage)?;
            techniques.insert(
                def.kind,
                Technique {
                    program,
                    binder: def.binder,
                },
            );
        }
        info!("Loaded {} shader techniques", techniques.len());
        Ok(Self { techniques })
    }

    /// Program handle for a technique
    pub fn program(&self, kind: TechniqueKind) -> RenderResult<ProgramId> {
        self.techniques
            .get(&kind)
            .map(|t| t.program)
            .ok_or_else(|| RenderError::ProgramNotFound(format!("{kind:?}")))
    }

    /// Fill a parameter block for a technique from the given inputs
    pub fn bind(&self, kind: TechniqueKind, inputs: &ObjectInputs) -> RenderResult<DrawParams> {
        let technique = self
            .techniques
            .get(&kind)
            .ok_or_else(|| RenderError::ProgramNotFound(format!("{kind:?}")))?;
        Ok((technique.binder)(inputs))
    }

    /// Number of loaded techniques
    #[must_use]
    pub fn len(&self) -> usize {
        self.techniques.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.techniques.is_empty()
    }
}
