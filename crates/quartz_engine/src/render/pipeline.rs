//! Per-frame pass sequence
//!
//! [`FramePipeline`] owns every size-dependent target and runs the fixed
//! pass order each frame: depth into the shadow map, lit scene into the
//! offscreen buffer with the sky drawn last, optional blur iterations,
//! then the composite quad onto the backbuffer and an immediate present.

use crate::assets::ResourceManager;
use crate::foundation::math::Mat4;
use crate::render::api::{
    FillMode, FrameParams, MeshHandle, PassDesc, PresentMode, RenderDevice, TextureFormat,
};
use crate::render::lighting::DirectionalLight;
use crate::render::passes::{BlurStage, ShadowFrame};
use crate::render::primitives::{Camera, Mesh};
use crate::render::targets::{OffscreenTarget, ShadowMapTarget};
use crate::render::technique::{ObjectInputs, TechniqueKind, TechniqueRegistry};
use crate::render::RenderResult;
use crate::scene::SceneInstance;

use log::{debug, info};

/// Fixed pipeline settings chosen at startup
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Shadow map edge length in texels
    pub shadow_resolution: u32,
    /// Clear color for the offscreen buffer
    pub clear_color: [f32; 4],
    /// Gaussian sigma for the blur kernel
    pub blur_sigma: f32,
    /// Presentation mode; the game loop runs unsynchronized
    pub present_mode: PresentMode,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            shadow_resolution: 2048,
            clear_color: [0.75, 0.75, 0.75, 1.0],
            blur_sigma: 2.5,
            present_mode: PresentMode::Immediate,
        }
    }
}

/// Sky backdrop drawn last in the color pass
#[derive(Debug, Clone)]
pub struct SkyDome {
    /// Sphere model identifier
    pub model: String,
    /// Sky texture identifier
    pub texture: String,
}

/// Everything the pipeline reads to render one frame
///
/// Borrowed from the game state; the pipeline never retains any of it.
pub struct SceneView<'a> {
    /// Active camera
    pub camera: &'a Camera,
    /// Global directional light
    pub light: DirectionalLight,
    /// Shadow matrices for this frame
    pub shadow: ShadowFrame,
    /// Draw list
    pub instances: &'a [SceneInstance],
    /// Sky backdrop, if any
    pub sky: Option<&'a SkyDome>,
    /// Blur iterations to run; zero skips the blur stage entirely
    pub blur_iterations: u32,
    /// Rasterizer fill mode for the scene draws
    pub fill_mode: FillMode,
}

/// Owns the render targets and runs the frame
pub struct FramePipeline {
    offscreen: OffscreenTarget,
    shadow_map: ShadowMapTarget,
    blur: BlurStage,
    screen_quad: MeshHandle,
    options: PipelineOptions,
}

impl FramePipeline {
    /// Build the pipeline's targets at the current backbuffer size
    pub fn new(
        device: &mut dyn RenderDevice,
        registry: &TechniqueRegistry,
        options: PipelineOptions,
    ) -> RenderResult<Self> {
        let (width, height) = device.backbuffer_size();
        let offscreen = OffscreenTarget::new(device, width, height)?;
        let shadow_map = ShadowMapTarget::new(device, options.shadow_resolution)?;

        let mut blur = BlurStage::new(registry)?;
        blur.initialize(device, width, height, TextureFormat::Rgba8Unorm)?;
        blur.set_sigma(options.blur_sigma)?;

        let quad = Mesh::screen_quad();
        let screen_quad = device.create_mesh(&quad.vertices, &quad.indices)?;

        info!(
            "Frame pipeline ready: {}x{} offscreen, {} shadow map",
            width, height, options.shadow_resolution
        );

        Ok(Self {
            offscreen,
            shadow_map,
            blur,
            screen_quad,
            options,
        })
    }

    /// Rebuild every size-dependent target for a new window size
    ///
    /// The shadow map keeps its fixed resolution and is left alone.
    pub fn resize(
        &mut self,
        device: &mut dyn RenderDevice,
        width: u32,
        height: u32,
    ) -> RenderResult<()> {
        debug!("Pipeline resize to {}x{}", width, height);
        device.resize_backbuffer(width, height)?;
        self.offscreen.resize(device, width, height)?;
        self.blur
            .initialize(device, width, height, TextureFormat::Rgba8Unorm)?;
        Ok(())
    }

    /// Change the blur kernel sigma
    pub fn set_blur_sigma(&mut self, sigma: f32) -> RenderResult<()> {
        self.blur.set_sigma(sigma)
    }

    /// The offscreen color target
    #[must_use]
    pub fn offscreen(&self) -> &OffscreenTarget {
        &self.offscreen
    }

    /// The shadow map target
    #[must_use]
    pub fn shadow_map(&self) -> &ShadowMapTarget {
        &self.shadow_map
    }

    /// Render one frame and present it
    pub fn render(
        &mut self,
        device: &mut dyn RenderDevice,
        registry: &TechniqueRegistry,
        resources: &ResourceManager,
        view: &SceneView<'_>,
    ) -> RenderResult<()> {
        self.shadow_pass(device, registry, resources, view)?;
        self.color_pass(device, registry, resources, view)?;
        self.composite_pass(device, registry, view)?;
        Ok(())
    }

    /// Depth-only pass from the light's point of view
    fn shadow_pass(
        &mut self,
        device: &mut dyn RenderDevice,
        registry: &TechniqueRegistry,
        resources: &ResourceManager,
        view: &SceneView<'_>,
    ) -> RenderResult<()> {
        let resolution = self.shadow_map.resolution();
        device.begin_pass(&PassDesc {
            label: "shadow",
            color: None,
            depth: Some(self.shadow_map.dsv()),
            clear_color: None,
            clear_depth: Some(1.0),
            viewport: (resolution, resolution),
        })?;

        let program = registry.program(TechniqueKind::ShadowMap)?;
        let light_view_proj = view.shadow.view_proj();

        for instance in view.instances {
            if !instance.casts_shadow() {
                continue;
            }
            let model = resources.model(&instance.model);
            let inputs = ObjectInputs {
                world: instance.transform.to_matrix_with_axis(&model.axis_correction),
                view_proj: light_view_proj,
                ..ObjectInputs::new()
            };
            let params = registry.bind(TechniqueKind::ShadowMap, &inputs)?;
            for part in &model.parts {
                device.draw(program, part.mesh, &params)?;
            }
        }
        Ok(())
    }

    /// Lit scene into the offscreen buffer, sky last
    fn color_pass(
        &mut self,
        device: &mut dyn RenderDevice,
        registry: &TechniqueRegistry,
        resources: &ResourceManager,
        view: &SceneView<'_>,
    ) -> RenderResult<()> {
        let (width, height) = device.backbuffer_size();
        device.begin_pass(&PassDesc {
            label: "color",
            color: Some(self.offscreen.rtv()),
            depth: Some(device.depth_stencil()),
            clear_color: Some(self.options.clear_color),
            clear_depth: Some(1.0),
            viewport: (width, height),
        })?;

        device.set_fill_mode(view.fill_mode);
        device.set_frame_params(&FrameParams {
            eye_position: view.camera.position,
            light: view.light.clone(),
        });

        let camera_view_proj = view.camera.view_projection_matrix();
        let shadow_transform = view.shadow.transform();
        let shadow_srv = self.shadow_map.srv();

        for instance in view.instances {
            if instance.is_invisible() {
                continue;
            }
            let model = resources.model(&instance.model);
            let world = instance.transform.to_matrix_with_axis(&model.axis_correction);
            let kind = instance.shader.technique();
            let program = registry.program(kind)?;

            for part in &model.parts {
                let diffuse_id = instance
                    .diffuse_override
                    .as_deref()
                    .or(part.diffuse_map.as_deref());
                let normal_id = instance
                    .normal_override
                    .as_deref()
                    .or(part.normal_map.as_deref());

                let inputs = ObjectInputs {
                    world,
                    view_proj: camera_view_proj,
                    tex_transform: instance.tex_transform,
                    shadow_transform,
                    material: part.material,
                    color: instance.color,
                    diffuse_map: Some(resources.texture_or_default(diffuse_id)),
                    normal_map: normal_id.map(|id| resources.texture(id)),
                    shadow_map: Some(shadow_srv),
                };
                let params = registry.bind(kind, &inputs)?;
                device.draw(program, part.mesh, &params)?;
            }
        }

        // Sky renders after everything else so it only fills the far plane
        if let Some(sky) = view.sky {
            let model = resources.model(&sky.model);
            let inputs = ObjectInputs {
                world: Mat4::new_translation(&view.camera.position),
                view_proj: camera_view_proj,
                diffuse_map: Some(resources.texture(&sky.texture)),
                ..ObjectInputs::new()
            };
            let params = registry.bind(TechniqueKind::Sky, &inputs)?;
            let program = registry.program(TechniqueKind::Sky)?;
            for part in &model.parts {
                device.draw(program, part.mesh, &params)?;
            }
        }
        Ok(())
    }

    /// Blur, composite quad, present
    fn composite_pass(
        &mut self,
        device: &mut dyn RenderDevice,
        registry: &TechniqueRegistry,
        view: &SceneView<'_>,
    ) -> RenderResult<()> {
        let (width, height) = device.backbuffer_size();

        // The backbuffer must be bound before the blur dispatches so the
        // offscreen target is no longer a render target when the compute
        // stage writes it
        device.begin_pass(&PassDesc {
            label: "composite",
            color: Some(device.backbuffer()),
            depth: None,
            clear_color: None,
            clear_depth: None,
            viewport: (width, height),
        })?;
        device.set_fill_mode(FillMode::Solid);

        if view.blur_iterations > 0 {
            self.blur.apply(
                device,
                self.offscreen.srv(),
                self.offscreen.uav(),
                view.blur_iterations,
            )?;
        }

        let inputs = ObjectInputs {
            diffuse_map: Some(self.offscreen.srv()),
            ..ObjectInputs::new()
        };
        let params = registry.bind(TechniqueKind::Fullscreen, &inputs)?;
        let program = registry.program(TechniqueKind::Fullscreen)?;
        device.draw(program, self.screen_quad, &params)?;

        device.unbind_shader_resources();
        device.present(self.options.present_mode)?;
        Ok(())
    }
}
