//! Headless render device
//!
//! Implements [`RenderDevice`] with no GPU behind it. Resources are rows
//! in slot maps, draws and dispatches append to an operation log, and
//! every handle is validated on use. The pipeline tests replay a frame
//! against this device and assert on the recorded sequence.

use crate::foundation::collections::{key_from_raw, key_to_raw, DefaultKey, HandleMap};
use crate::render::api::{
    BackendResult, ComputeDesc, DepthStencilView, DrawParams, FillMode, FrameParams, MeshHandle,
    PassDesc, PresentMode, ProgramId, ProgramStage, RenderDevice, RenderTargetView,
    ShaderResourceView, TextureDesc, TextureFormat, TextureId, TextureUsage, UnorderedAccessView,
};
use crate::render::primitives::Vertex;
use crate::render::RenderError;

use log::{trace, warn};

/// Program names the default headless device resolves
///
/// Mirrors the compiled program set a hardware backend would load from
/// disk at startup.
pub const DEFAULT_PROGRAMS: &[&str] = &[
    "basic_textured",
    "basic_untextured",
    "basic_no_lighting",
    "basic_shadow_only",
    "normal_mapped",
    "sky",
    "shadow_map",
    "fullscreen",
    "blur_horizontal",
    "blur_vertical",
];

/// One recorded device operation
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceOp {
    /// A pass began with these targets
    BeginPass {
        /// Pass label from the descriptor
        label: String,
        /// Bound color target, if any
        color: Option<RenderTargetView>,
        /// Bound depth target, if any
        depth: Option<DepthStencilView>,
        /// Whether the color target was cleared
        cleared_color: bool,
        /// Viewport dimensions
        viewport: (u32, u32),
    },
    /// Rasterizer fill mode changed
    SetFillMode(FillMode),
    /// Per-frame constants uploaded
    SetFrameParams,
    /// An indexed draw ran
    Draw {
        /// Program used
        program: ProgramId,
        /// Mesh drawn
        mesh: MeshHandle,
        /// Whether the draw bound a shadow map
        bound_shadow_map: bool,
    },
    /// A compute dispatch ran
    Dispatch {
        /// Program used
        program: ProgramId,
        /// Thread group counts
        groups: [u32; 3],
    },
    /// Shader resource slots were cleared
    UnbindShaderResources,
    /// The backbuffer was presented
    Present(PresentMode),
    /// The swapchain was resized
    Resize {
        /// New width
        width: u32,
        /// New height
        height: u32,
    },
}

/// In-memory device used by the test suite and the demo binary
#[derive(Debug)]
pub struct HeadlessDevice {
    textures: HandleMap<TextureDesc>,
    render_targets: HandleMap<DefaultKey>,
    shader_resources: HandleMap<DefaultKey>,
    unordered_accesses: HandleMap<DefaultKey>,
    depth_stencils: HandleMap<DefaultKey>,
    meshes: HandleMap<(usize, usize)>,
    programs: HandleMap<(String, ProgramStage)>,
    available_programs: Vec<String>,
    backbuffer_rtv: RenderTargetView,
    backbuffer_dsv: DepthStencilView,
    size: (u32, u32),
    fill_mode: FillMode,
    in_pass: bool,
    frame_params: Option<FrameParams>,
    ops: Vec<DeviceOp>,
}

impl HeadlessDevice {
    /// Create a device with the default program set
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_programs(width, height, DEFAULT_PROGRAMS)
    }

    /// Create a device that only resolves the given program names
    ///
    /// Used to exercise startup failure when a required program is absent.
    #[must_use]
    pub fn with_programs(width: u32, height: u32, programs: &[&str]) -> Self {
        let mut device = Self {
            textures: HandleMap::default(),
            render_targets: HandleMap::default(),
            shader_resources: HandleMap::default(),
            unordered_accesses: HandleMap::default(),
            depth_stencils: HandleMap::default(),
            meshes: HandleMap::default(),
            programs: HandleMap::default(),
            available_programs: programs.iter().map(|s| (*s).to_string()).collect(),
            backbuffer_rtv: RenderTargetView(0),
            backbuffer_dsv: DepthStencilView(0),
            size: (width, height),
            fill_mode: FillMode::Solid,
            in_pass: false,
            frame_params: None,
            ops: Vec::new(),
        };
        device.create_swapchain_targets(width, height);
        device
    }

    fn create_swapchain_targets(&mut self, width: u32, height: u32) {
        let color = TextureDesc {
            width,
            height,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsage::RENDER_TARGET,
        };
        let depth = TextureDesc {
            width,
            height,
            format: TextureFormat::Depth32Float,
            usage: TextureUsage::DEPTH_STENCIL,
        };
        let color_key = self.textures.insert(color);
        let depth_key = self.textures.insert(depth);

        let rtv = self.render_targets.insert(color_key);
        let dsv = self.depth_stencils.insert(depth_key);
        self.backbuffer_rtv = RenderTargetView(key_to_raw(rtv));
        self.backbuffer_dsv = DepthStencilView(key_to_raw(dsv));
    }

    /// Recorded operations since creation or the last [`Self::clear_ops`]
    #[must_use]
    pub fn ops(&self) -> &[DeviceOp] {
        &self.ops
    }

    /// Forget the recorded operations
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Labels of every pass begun, in order
    #[must_use]
    pub fn pass_labels(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DeviceOp::BeginPass { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of live textures, not counting the two swapchain-owned ones
    #[must_use]
    pub fn live_texture_count(&self) -> usize {
        self.textures.len() - 2
    }

    /// Whether a render-target view is still live
    #[must_use]
    pub fn is_rtv_live(&self, view: RenderTargetView) -> bool {
        self.render_targets.contains_key(key_from_raw(view.0))
    }

    /// Whether a shader-resource view is still live
    #[must_use]
    pub fn is_srv_live(&self, view: ShaderResourceView) -> bool {
        self.shader_resources.contains_key(key_from_raw(view.0))
    }

    /// Description of the texture behind a render-target view
    #[must_use]
    pub fn texture_desc_for_rtv(&self, view: RenderTargetView) -> Option<TextureDesc> {
        let texture = self.render_targets.get(key_from_raw(view.0))?;
        self.textures.get(*texture).copied()
    }

    /// Description of the texture behind a depth-stencil view
    #[must_use]
    pub fn texture_desc_for_dsv(&self, view: DepthStencilView) -> Option<TextureDesc> {
        let texture = self.depth_stencils.get(key_from_raw(view.0))?;
        self.textures.get(*texture).copied()
    }

    /// Description of the texture behind a shader-resource view
    #[must_use]
    pub fn texture_desc_for_srv(&self, view: ShaderResourceView) -> Option<TextureDesc> {
        let texture = self.shader_resources.get(key_from_raw(view.0))?;
        self.textures.get(*texture).copied()
    }

    /// Name of a loaded program
    #[must_use]
    pub fn program_name(&self, program: ProgramId) -> Option<&str> {
        self.programs
            .get(key_from_raw(program.0))
            .map(|(name, _)| name.as_str())
    }

    /// The frame constants most recently uploaded
    #[must_use]
    pub fn frame_params(&self) -> Option<&FrameParams> {
        self.frame_params.as_ref()
    }

    /// Current fill mode
    #[must_use]
    pub fn fill_mode(&self) -> FillMode {
        self.fill_mode
    }

    fn texture_usage(&self, texture: TextureId) -> BackendResult<TextureUsage> {
        self.textures
            .get(key_from_raw(texture.0))
            .map(|desc| desc.usage)
            .ok_or_else(|| RenderError::InvalidHandle(format!("texture {}", texture.0)))
    }
}

impl RenderDevice for HeadlessDevice {
    fn create_texture(&mut self, desc: &TextureDesc) -> BackendResult<TextureId> {
        if desc.width == 0 || desc.height == 0 {
            return Err(RenderError::ResourceCreationFailed(format!(
                "zero-sized texture {}x{}",
                desc.width, desc.height
            )));
        }
        let key = self.textures.insert(*desc);
        trace!(
            "Created texture {} ({}x{})",
            key_to_raw(key),
            desc.width,
            desc.height
        );
        Ok(TextureId(key_to_raw(key)))
    }

    fn create_texture_with_data(
        &mut self,
        desc: &TextureDesc,
        data: &[u8],
    ) -> BackendResult<TextureId> {
        let expected = desc.width as usize * desc.height as usize * 4;
        if desc.format == TextureFormat::Rgba8Unorm && data.len() != expected {
            return Err(RenderError::ResourceCreationFailed(format!(
                "texture data is {} bytes, expected {}",
                data.len(),
                expected
            )));
        }
        self.create_texture(desc)
    }

    fn create_render_target_view(&mut self, texture: TextureId) -> BackendResult<RenderTargetView> {
        if !self.texture_usage(texture)?.contains(TextureUsage::RENDER_TARGET) {
            return Err(RenderError::ResourceCreationFailed(format!(
                "texture {} not created with RENDER_TARGET usage",
                texture.0
            )));
        }
        let key = self.render_targets.insert(key_from_raw(texture.0));
        Ok(RenderTargetView(key_to_raw(key)))
    }

    fn create_shader_resource_view(
        &mut self,
        texture: TextureId,
    ) -> BackendResult<ShaderResourceView> {
        if !self
            .texture_usage(texture)?
            .contains(TextureUsage::SHADER_RESOURCE)
        {
            return Err(RenderError::ResourceCreationFailed(format!(
                "texture {} not created with SHADER_RESOURCE usage",
                texture.0
            )));
        }
        let key = self.shader_resources.insert(key_from_raw(texture.0));
        Ok(ShaderResourceView(key_to_raw(key)))
    }

    fn create_unordered_access_view(
        &mut self,
        texture: TextureId,
    ) -> BackendResult<UnorderedAccessView> {
        if !self
            .texture_usage(texture)?
            .contains(TextureUsage::UNORDERED_ACCESS)
        {
            return Err(RenderError::ResourceCreationFailed(format!(
                "texture {} not created with UNORDERED_ACCESS usage",
                texture.0
            )));
        }
        let key = self.unordered_accesses.insert(key_from_raw(texture.0));
        Ok(UnorderedAccessView(key_to_raw(key)))
    }

    fn create_depth_stencil_view(&mut self, texture: TextureId) -> BackendResult<DepthStencilView> {
        if !self.texture_usage(texture)?.contains(TextureUsage::DEPTH_STENCIL) {
            return Err(RenderError::ResourceCreationFailed(format!(
                "texture {} not created with DEPTH_STENCIL usage",
                texture.0
            )));
        }
        let key = self.depth_stencils.insert(key_from_raw(texture.0));
        Ok(DepthStencilView(key_to_raw(key)))
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if self.textures.remove(key_from_raw(texture.0)).is_none() {
            warn!("Destroying unknown texture {}", texture.0);
        }
    }

    fn destroy_render_target_view(&mut self, view: RenderTargetView) {
        self.render_targets.remove(key_from_raw(view.0));
    }

    fn destroy_shader_resource_view(&mut self, view: ShaderResourceView) {
        self.shader_resources.remove(key_from_raw(view.0));
    }

    fn destroy_unordered_access_view(&mut self, view: UnorderedAccessView) {
        self.unordered_accesses.remove(key_from_raw(view.0));
    }

    fn destroy_depth_stencil_view(&mut self, view: DepthStencilView) {
        self.depth_stencils.remove(key_from_raw(view.0));
    }

    fn create_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> BackendResult<MeshHandle> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(RenderError::ResourceCreationFailed(
                "empty mesh".to_string(),
            ));
        }
        if let Some(&out_of_bounds) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(RenderError::ResourceCreationFailed(format!(
                "index {} out of bounds for {} vertices",
                out_of_bounds,
                vertices.len()
            )));
        }
        let key = self.meshes.insert((vertices.len(), indices.len()));
        Ok(MeshHandle(key_to_raw(key)))
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) {
        self.meshes.remove(key_from_raw(mesh.0));
    }

    fn create_program(&mut self, name: &str, stage: ProgramStage) -> BackendResult<ProgramId> {
        if !self.available_programs.iter().any(|p| p == name) {
            return Err(RenderError::ProgramNotFound(name.to_string()));
        }
        let key = self.programs.insert((name.to_string(), stage));
        Ok(ProgramId(key_to_raw(key)))
    }

    fn backbuffer(&self) -> RenderTargetView {
        self.backbuffer_rtv
    }

    fn depth_stencil(&self) -> DepthStencilView {
        self.backbuffer_dsv
    }

    fn backbuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn resize_backbuffer(&mut self, width: u32, height: u32) -> BackendResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::ResourceCreationFailed(format!(
                "zero-sized backbuffer {width}x{height}"
            )));
        }
        // Swapchain views keep their handles; only the textures change size
        if let Some(&texture) = self.render_targets.get(key_from_raw(self.backbuffer_rtv.0)) {
            if let Some(desc) = self.textures.get_mut(texture) {
                desc.width = width;
                desc.height = height;
            }
        }
        if let Some(&texture) = self.depth_stencils.get(key_from_raw(self.backbuffer_dsv.0)) {
            if let Some(desc) = self.textures.get_mut(texture) {
                desc.width = width;
                desc.height = height;
            }
        }
        self.size = (width, height);
        self.ops.push(DeviceOp::Resize { width, height });
        Ok(())
    }

    fn begin_pass(&mut self, desc: &PassDesc<'_>) -> BackendResult<()> {
        if let Some(color) = desc.color {
            if !self.render_targets.contains_key(key_from_raw(color.0)) {
                return Err(RenderError::InvalidHandle(format!(
                    "render target view {} in pass '{}'",
                    color.0, desc.label
                )));
            }
        }
        if let Some(depth) = desc.depth {
            if !self.depth_stencils.contains_key(key_from_raw(depth.0)) {
                return Err(RenderError::InvalidHandle(format!(
                    "depth stencil view {} in pass '{}'",
                    depth.0, desc.label
                )));
            }
        }
        if desc.color.is_none() && desc.depth.is_none() {
            return Err(RenderError::RenderingFailed(format!(
                "pass '{}' binds no targets",
                desc.label
            )));
        }
        self.in_pass = true;
        self.ops.push(DeviceOp::BeginPass {
            label: desc.label.to_string(),
            color: desc.color,
            depth: desc.depth,
            cleared_color: desc.clear_color.is_some(),
            viewport: desc.viewport,
        });
        Ok(())
    }

    fn set_fill_mode(&mut self, mode: FillMode) {
        self.fill_mode = mode;
        self.ops.push(DeviceOp::SetFillMode(mode));
    }

    fn set_frame_params(&mut self, params: &FrameParams) {
        self.frame_params = Some(params.clone());
        self.ops.push(DeviceOp::SetFrameParams);
    }

    fn draw(
        &mut self,
        program: ProgramId,
        mesh: MeshHandle,
        params: &DrawParams,
    ) -> BackendResult<()> {
        if !self.in_pass {
            return Err(RenderError::RenderingFailed(
                "draw outside a pass".to_string(),
            ));
        }
        match self.programs.get(key_from_raw(program.0)) {
            None => {
                return Err(RenderError::InvalidHandle(format!(
                    "program {}",
                    program.0
                )))
            }
            Some((name, ProgramStage::Compute)) => {
                return Err(RenderError::RenderingFailed(format!(
                    "compute program '{name}' used in a draw"
                )))
            }
            Some((_, ProgramStage::Graphics)) => {}
        }
        if !self.meshes.contains_key(key_from_raw(mesh.0)) {
            return Err(RenderError::InvalidHandle(format!("mesh {}", mesh.0)));
        }
        if let Some(map) = params.shadow_map {
            if !self.shader_resources.contains_key(key_from_raw(map.0)) {
                return Err(RenderError::InvalidHandle(format!(
                    "shadow map view {}",
                    map.0
                )));
            }
        }
        self.ops.push(DeviceOp::Draw {
            program,
            mesh,
            bound_shadow_map: params.shadow_map.is_some(),
        });
        Ok(())
    }

    fn dispatch(&mut self, desc: &ComputeDesc<'_>) -> BackendResult<()> {
        match self.programs.get(key_from_raw(desc.program.0)) {
            None => {
                return Err(RenderError::InvalidHandle(format!(
                    "program {}",
                    desc.program.0
                )))
            }
            Some((name, ProgramStage::Graphics)) => {
                return Err(RenderError::RenderingFailed(format!(
                    "graphics program '{name}' used in a dispatch"
                )))
            }
            Some((_, ProgramStage::Compute)) => {}
        }
        if !self.shader_resources.contains_key(key_from_raw(desc.input.0)) {
            return Err(RenderError::InvalidHandle(format!(
                "dispatch input view {}",
                desc.input.0
            )));
        }
        if !self.unordered_accesses.contains_key(key_from_raw(desc.output.0)) {
            return Err(RenderError::InvalidHandle(format!(
                "dispatch output view {}",
                desc.output.0
            )));
        }
        if desc.groups.iter().any(|&g| g == 0) {
            return Err(RenderError::RenderingFailed(format!(
                "dispatch with zero-sized group count {:?}",
                desc.groups
            )));
        }
        self.ops.push(DeviceOp::Dispatch {
            program: desc.program,
            groups: desc.groups,
        });
        Ok(())
    }

    fn unbind_shader_resources(&mut self) {
        self.ops.push(DeviceOp::UnbindShaderResources);
    }

    fn present(&mut self, mode: PresentMode) -> BackendResult<()> {
        self.in_pass = false;
        self.ops.push(DeviceOp::Present(mode));
        Ok(())
    }

    fn texture_desc(&self, texture: TextureId) -> Option<TextureDesc> {
        self.textures.get(key_from_raw(texture.0)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Vec<Vertex>, Vec<u32>) {
        let vertices = vec![
            Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0], [1.0, 0.0, 0.0]),
            Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0], [1.0, 0.0, 0.0]),
            Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0], [1.0, 0.0, 0.0]),
        ];
        (vertices, vec![0, 1, 2])
    }

    #[test]
    fn test_unknown_program_name_is_rejected() {
        let mut device = HeadlessDevice::with_programs(640, 480, &["basic_textured"]);
        assert!(device.create_program("basic_textured", ProgramStage::Graphics).is_ok());
        let err = device
            .create_program("normal_mapped", ProgramStage::Graphics)
            .unwrap_err();
        assert!(matches!(err, RenderError::ProgramNotFound(name) if name == "normal_mapped"));
    }

    #[test]
    fn test_view_creation_checks_usage() {
        let mut device = HeadlessDevice::new(640, 480);
        let texture = device
            .create_texture(&TextureDesc {
                width: 16,
                height: 16,
                format: TextureFormat::Rgba8Unorm,
                usage: TextureUsage::SHADER_RESOURCE,
            })
            .unwrap();
        assert!(device.create_shader_resource_view(texture).is_ok());
        assert!(matches!(
            device.create_render_target_view(texture),
            Err(RenderError::ResourceCreationFailed(_))
        ));
    }

    #[test]
    fn test_draw_requires_an_open_pass() {
        let mut device = HeadlessDevice::new(640, 480);
        let program = device
            .create_program("basic_untextured", ProgramStage::Graphics)
            .unwrap();
        let (vertices, indices) = triangle();
        let mesh = device.create_mesh(&vertices, &indices).unwrap();

        let err = device.draw(program, mesh, &DrawParams::default()).unwrap_err();
        assert!(matches!(err, RenderError::RenderingFailed(_)));

        device
            .begin_pass(&PassDesc {
                label: "color",
                color: Some(device.backbuffer()),
                depth: Some(device.depth_stencil()),
                clear_color: Some([0.0; 4]),
                clear_depth: Some(1.0),
                viewport: (640, 480),
            })
            .unwrap();
        assert!(device.draw(program, mesh, &DrawParams::default()).is_ok());
    }

    #[test]
    fn test_destroyed_mesh_handle_is_invalid() {
        let mut device = HeadlessDevice::new(640, 480);
        let program = device
            .create_program("basic_untextured", ProgramStage::Graphics)
            .unwrap();
        let (vertices, indices) = triangle();
        let mesh = device.create_mesh(&vertices, &indices).unwrap();
        device.destroy_mesh(mesh);

        device
            .begin_pass(&PassDesc {
                label: "color",
                color: Some(device.backbuffer()),
                depth: None,
                clear_color: None,
                clear_depth: None,
                viewport: (640, 480),
            })
            .unwrap();
        assert!(matches!(
            device.draw(program, mesh, &DrawParams::default()),
            Err(RenderError::InvalidHandle(_))
        ));
    }

    #[test]
    fn test_mesh_with_out_of_bounds_index_is_rejected() {
        let mut device = HeadlessDevice::new(640, 480);
        let (vertices, _) = triangle();
        assert!(matches!(
            device.create_mesh(&vertices, &[0, 1, 3]),
            Err(RenderError::ResourceCreationFailed(_))
        ));
    }

    #[test]
    fn test_resize_updates_swapchain_descs_in_place() {
        let mut device = HeadlessDevice::new(800, 600);
        let rtv = device.backbuffer();
        let dsv = device.depth_stencil();

        device.resize_backbuffer(1920, 1080).unwrap();

        assert_eq!(device.backbuffer(), rtv);
        assert_eq!(device.backbuffer_size(), (1920, 1080));
        let color = device.texture_desc_for_rtv(rtv).unwrap();
        let depth = device.texture_desc_for_dsv(dsv).unwrap();
        assert_eq!((color.width, color.height), (1920, 1080));
        assert_eq!((depth.width, depth.height), (1920, 1080));
        assert_eq!(depth.format, TextureFormat::Depth32Float);
    }

    #[test]
    fn test_op_log_records_frame_sequence() {
        let mut device = HeadlessDevice::new(640, 480);
        device
            .begin_pass(&PassDesc {
                label: "shadow",
                color: None,
                depth: Some(device.depth_stencil()),
                clear_color: None,
                clear_depth: Some(1.0),
                viewport: (2048, 2048),
            })
            .unwrap();
        device.present(PresentMode::Immediate).unwrap();

        assert_eq!(device.pass_labels(), vec!["shadow"]);
        assert_eq!(device.ops().last(), Some(&DeviceOp::Present(PresentMode::Immediate)));
    }
}
