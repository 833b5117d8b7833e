//! Owned render target bundles
//!
//! A target owns a texture together with every view created over it, so
//! release and recreate always happen as a unit. The offscreen color
//! buffer follows the window size; the shadow map keeps a fixed square
//! resolution independent of the window.

use crate::render::api::{
    BackendResult, DepthStencilView, RenderDevice, RenderTargetView, ShaderResourceView,
    TextureDesc, TextureFormat, TextureId, TextureUsage, UnorderedAccessView,
};

use log::debug;

/// Window-sized color buffer the scene renders into
///
/// Bound as a render target during the color pass, sampled and written by
/// the blur stage, then sampled again by the composite pass. All three
/// views alias one texture.
#[derive(Debug)]
pub struct OffscreenTarget {
    texture: TextureId,
    rtv: RenderTargetView,
    srv: ShaderResourceView,
    uav: UnorderedAccessView,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    /// Create the offscreen buffer at the given size
    pub fn new(device: &mut dyn RenderDevice, width: u32, height: u32) -> BackendResult<Self> {
        let (texture, rtv, srv, uav) = Self::create_views(device, width, height)?;
        Ok(Self {
            texture,
            rtv,
            srv,
            uav,
            width,
            height,
        })
    }

    fn create_views(
        device: &mut dyn RenderDevice,
        width: u32,
        height: u32,
    ) -> BackendResult<(
        TextureId,
        RenderTargetView,
        ShaderResourceView,
        UnorderedAccessView,
    )> {
        let desc = TextureDesc {
            width,
            height,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsage::RENDER_TARGET
                | TextureUsage::SHADER_RESOURCE
                | TextureUsage::UNORDERED_ACCESS,
        };
        let texture = device.create_texture(&desc)?;
        let rtv = device.create_render_target_view(texture)?;
        let srv = device.create_shader_resource_view(texture)?;
        let uav = device.create_unordered_access_view(texture)?;
        Ok((texture, rtv, srv, uav))
    }

    /// Release the old texture and views, then recreate them at the new size
    ///
    /// Safe to call with the current size; the buffer is rebuilt either way
    /// so the views never dangle after a swapchain resize.
    pub fn resize(
        &mut self,
        device: &mut dyn RenderDevice,
        width: u32,
        height: u32,
    ) -> BackendResult<()> {
        self.release(device);
        let (texture, rtv, srv, uav) = Self::create_views(device, width, height)?;
        self.texture = texture;
        self.rtv = rtv;
        self.srv = srv;
        self.uav = uav;
        self.width = width;
        self.height = height;
        debug!("Offscreen target resized to {}x{}", width, height);
        Ok(())
    }

    /// Release the texture and all views
    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        device.destroy_render_target_view(self.rtv);
        device.destroy_shader_resource_view(self.srv);
        device.destroy_unordered_access_view(self.uav);
        device.destroy_texture(self.texture);
    }

    /// Render-target view for the color pass
    #[must_use]
    pub fn rtv(&self) -> RenderTargetView {
        self.rtv
    }

    /// Sampled view for blur input and the composite pass
    #[must_use]
    pub fn srv(&self) -> ShaderResourceView {
        self.srv
    }

    /// Writable view for the blur stage
    #[must_use]
    pub fn uav(&self) -> UnorderedAccessView {
        self.uav
    }

    /// Current buffer dimensions
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Fixed-resolution depth map rendered from the light's point of view
#[derive(Debug)]
pub struct ShadowMapTarget {
    texture: TextureId,
    dsv: DepthStencilView,
    srv: ShaderResourceView,
    resolution: u32,
}

impl ShadowMapTarget {
    /// Create a square depth-only target at the given resolution
    pub fn new(device: &mut dyn RenderDevice, resolution: u32) -> BackendResult<Self> {
        let desc = TextureDesc {
            width: resolution,
            height: resolution,
            format: TextureFormat::Depth32Float,
            usage: TextureUsage::DEPTH_STENCIL | TextureUsage::SHADER_RESOURCE,
        };
        let texture = device.create_texture(&desc)?;
        let dsv = device.create_depth_stencil_view(texture)?;
        let srv = device.create_shader_resource_view(texture)?;
        Ok(Self {
            texture,
            dsv,
            srv,
            resolution,
        })
    }

    /// Release the texture and views
    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        device.destroy_depth_stencil_view(self.dsv);
        device.destroy_shader_resource_view(self.srv);
        device.destroy_texture(self.texture);
    }

    /// Depth view bound during the shadow pass
    #[must_use]
    pub fn dsv(&self) -> DepthStencilView {
        self.dsv
    }

    /// Sampled view bound during the color pass
    #[must_use]
    pub fn srv(&self) -> ShaderResourceView {
        self.srv
    }

    /// Square edge length in texels
    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }
}
