//! Device abstraction traits for the rendering system
//!
//! This module defines the trait a rendering backend must implement to
//! drive the frame pipeline, plus the handle and descriptor types shared
//! between passes. Everything above this boundary is backend-agnostic;
//! the in-repo headless backend and a windowed hardware backend are
//! interchangeable behind `&mut dyn RenderDevice`.

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::lighting::DirectionalLight;
use crate::render::material::Material;
use crate::render::primitives::Vertex;
use crate::render::RenderError;

use bitflags::bitflags;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a texture resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Handle to a render-target view over a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetView(pub u64);

/// Handle to a shader-resource (sampled) view over a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderResourceView(pub u64);

/// Handle to an unordered-access (writable) view over a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnorderedAccessView(pub u64);

/// Handle to a depth-stencil view over a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilView(pub u64);

/// Handle to a mesh (vertex + index buffer pair) stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Handle to a compiled GPU program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u64);

/// Texture formats the pipeline uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGBA, unsigned normalized
    Rgba8Unorm,
    /// 32-bit float depth
    Depth32Float,
}

bitflags! {
    /// How a texture may be bound
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TextureUsage: u8 {
        /// Bindable as a render target
        const RENDER_TARGET = 1 << 0;
        /// Bindable as a sampled shader resource
        const SHADER_RESOURCE = 1 << 1;
        /// Bindable as a writable compute resource
        const UNORDERED_ACCESS = 1 << 2;
        /// Bindable as a depth-stencil target
        const DEPTH_STENCIL = 1 << 3;
    }
}

/// Immutable description of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Texel format
    pub format: TextureFormat,
    /// Permitted bindings
    pub usage: TextureUsage,
}

/// Presentation synchronization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentMode {
    /// Present without waiting on the display interval
    Immediate,
    /// Wait for the next vertical blank
    Fifo,
}

/// Rasterizer fill mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    /// Filled triangles
    #[default]
    Solid,
    /// Wireframe triangles (debug aid)
    Wireframe,
}

/// Pipeline stage a program runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramStage {
    /// Vertex + pixel stages
    Graphics,
    /// Compute stage
    Compute,
}

/// Targets, clears, and viewport for one render pass
#[derive(Debug, Clone, Copy)]
pub struct PassDesc<'a> {
    /// Name used for device logs and diagnostics
    pub label: &'a str,
    /// Color target, if the pass writes color
    pub color: Option<RenderTargetView>,
    /// Depth target, if the pass tests or writes depth
    pub depth: Option<DepthStencilView>,
    /// Clear value for the color target, applied at pass begin
    pub clear_color: Option<[f32; 4]>,
    /// Clear value for the depth target, applied at pass begin
    pub clear_depth: Option<f32>,
    /// Viewport dimensions in pixels
    pub viewport: (u32, u32),
}

/// Shared constants set once per frame, before any color-pass draw
#[derive(Debug, Clone)]
pub struct FrameParams {
    /// World-space eye position of the active camera
    pub eye_position: Vec3,
    /// The global directional light
    pub light: DirectionalLight,
}

/// Per-draw parameter block
///
/// Binder functions in the technique registry fill exactly the fields a
/// technique consumes; the rest stay `None`.
#[derive(Debug, Clone)]
pub struct DrawParams {
    /// Object-to-world matrix
    pub world: Mat4,
    /// Combined world-view-projection matrix
    pub world_view_proj: Mat4,
    /// Inverse transpose of the world matrix, for normal transforms
    pub world_inv_transpose: Option<Mat4>,
    /// Texture-coordinate transform
    pub tex_transform: Mat4,
    /// Object-to-shadow-texture transform for shadow sampling
    pub shadow_transform: Option<Mat4>,
    /// Surface material
    pub material: Option<Material>,
    /// Flat color override, replaces the material diffuse
    pub color: Option<Vec4>,
    /// Diffuse texture binding
    pub diffuse_map: Option<ShaderResourceView>,
    /// Normal map binding
    pub normal_map: Option<ShaderResourceView>,
    /// Shadow depth map binding
    pub shadow_map: Option<ShaderResourceView>,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            world: Mat4::identity(),
            world_view_proj: Mat4::identity(),
            world_inv_transpose: None,
            tex_transform: Mat4::identity(),
            shadow_transform: None,
            material: None,
            color: None,
            diffuse_map: None,
            normal_map: None,
            shadow_map: None,
        }
    }
}

/// One compute dispatch: read `input`, write `output`
#[derive(Debug, Clone, Copy)]
pub struct ComputeDesc<'a> {
    /// Compute program to run
    pub program: ProgramId,
    /// Sampled input view
    pub input: ShaderResourceView,
    /// Writable output view
    pub output: UnorderedAccessView,
    /// Filter kernel constants uploaded with the dispatch
    pub kernel: &'a [f32],
    /// Thread group counts per dimension
    pub groups: [u32; 3],
}

/// Main rendering device trait
///
/// Resource creation returns opaque handles; every view over a texture is
/// created and destroyed explicitly, so owners can pair lifetimes (see
/// `render::targets`). Pass state is set through [`RenderDevice::begin_pass`];
/// draws and dispatches happen inside a pass, present ends the frame.
pub trait RenderDevice {
    /// Create an uninitialized texture
    fn create_texture(&mut self, desc: &TextureDesc) -> BackendResult<TextureId>;

    /// Create a texture filled with the given texel data
    fn create_texture_with_data(&mut self, desc: &TextureDesc, data: &[u8])
        -> BackendResult<TextureId>;

    /// Create a render-target view over a texture
    fn create_render_target_view(&mut self, texture: TextureId) -> BackendResult<RenderTargetView>;

    /// Create a shader-resource view over a texture
    fn create_shader_resource_view(
        &mut self,
        texture: TextureId,
    ) -> BackendResult<ShaderResourceView>;

    /// Create an unordered-access view over a texture
    fn create_unordered_access_view(
        &mut self,
        texture: TextureId,
    ) -> BackendResult<UnorderedAccessView>;

    /// Create a depth-stencil view over a texture
    fn create_depth_stencil_view(&mut self, texture: TextureId)
        -> BackendResult<DepthStencilView>;

    /// Release a texture; its views must already be destroyed
    fn destroy_texture(&mut self, texture: TextureId);

    /// Release a render-target view
    fn destroy_render_target_view(&mut self, view: RenderTargetView);

    /// Release a shader-resource view
    fn destroy_shader_resource_view(&mut self, view: ShaderResourceView);

    /// Release an unordered-access view
    fn destroy_unordered_access_view(&mut self, view: UnorderedAccessView);

    /// Release a depth-stencil view
    fn destroy_depth_stencil_view(&mut self, view: DepthStencilView);

    /// Upload a mesh and return its handle
    fn create_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> BackendResult<MeshHandle>;

    /// Release a mesh
    fn destroy_mesh(&mut self, mesh: MeshHandle);

    /// Load a compiled program by name
    ///
    /// Fails with [`RenderError::ProgramNotFound`] when the backend has no
    /// program of that name; the caller treats this as fatal.
    fn create_program(&mut self, name: &str, stage: ProgramStage) -> BackendResult<ProgramId>;

    /// The swapchain color target
    fn backbuffer(&self) -> RenderTargetView;

    /// The device-owned depth-stencil target matching the backbuffer
    fn depth_stencil(&self) -> DepthStencilView;

    /// Current backbuffer dimensions
    fn backbuffer_size(&self) -> (u32, u32);

    /// Resize the swapchain and the device-owned depth target
    fn resize_backbuffer(&mut self, width: u32, height: u32) -> BackendResult<()>;

    /// Bind targets and viewport for a pass, applying requested clears
    fn begin_pass(&mut self, desc: &PassDesc<'_>) -> BackendResult<()>;

    /// Set the rasterizer fill mode for subsequent draws
    fn set_fill_mode(&mut self, mode: FillMode);

    /// Upload the per-frame shared constants
    fn set_frame_params(&mut self, params: &FrameParams);

    /// Draw an indexed mesh with the given program and parameters
    fn draw(&mut self, program: ProgramId, mesh: MeshHandle, params: &DrawParams)
        -> BackendResult<()>;

    /// Run a compute dispatch
    fn dispatch(&mut self, desc: &ComputeDesc<'_>) -> BackendResult<()>;

    /// Clear every bound shader-resource slot
    ///
    /// Called at frame end so no pass starts with stale bindings.
    fn unbind_shader_resources(&mut self);

    /// Present the backbuffer
    fn present(&mut self, mode: PresentMode) -> BackendResult<()>;

    /// Look up the description of a live texture
    fn texture_desc(&self, texture: TextureId) -> Option<TextureDesc>;
}
