//! Separable Gaussian blur over the offscreen buffer
//!
//! Each iteration runs a horizontal dispatch from the input into an
//! internal scratch texture, then a vertical dispatch from the scratch
//! back into the input, so the blurred result lands in place. The scratch
//! texture matches the input's dimensions and format and is rebuilt
//! through [`BlurStage::initialize`] whenever the window resizes.

use crate::render::api::{
    ComputeDesc, ProgramId, RenderDevice, ShaderResourceView, TextureDesc, TextureId,
    TextureUsage, UnorderedAccessView,
};
use crate::render::technique::{TechniqueKind, TechniqueRegistry};
use crate::render::{RenderError, RenderResult};

/// Texels handled per thread group along the blurred axis
const THREAD_GROUP_SIZE: u32 = 256;

/// Kernel radius; the kernel holds `2 * BLUR_RADIUS + 1` weights
pub const BLUR_RADIUS: usize = 5;

/// Default kernel sigma
const DEFAULT_SIGMA: f32 = 2.5;

/// Normalized Gaussian kernel weights for the given sigma
///
/// Weights beyond the fixed radius are cut off, so the remainder is
/// renormalized to sum to one.
#[must_use]
pub fn gaussian_weights(sigma: f32) -> [f32; 2 * BLUR_RADIUS + 1] {
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut weights = [0.0f32; 2 * BLUR_RADIUS + 1];
    let mut sum = 0.0f32;

    for (i, weight) in weights.iter_mut().enumerate() {
        let x = i as f32 - BLUR_RADIUS as f32;
        *weight = (-x * x / two_sigma_sq).exp();
        sum += *weight;
    }
    for weight in &mut weights {
        *weight /= sum;
    }
    weights
}

struct Scratch {
    texture: TextureId,
    srv: ShaderResourceView,
    uav: UnorderedAccessView,
    desc: TextureDesc,
}

/// Compute blur stage
pub struct BlurStage {
    horizontal: ProgramId,
    vertical: ProgramId,
    weights: [f32; 2 * BLUR_RADIUS + 1],
    scratch: Option<Scratch>,
}

impl BlurStage {
    /// Look up the blur programs; resources follow in [`Self::initialize`]
    pub fn new(registry: &TechniqueRegistry) -> RenderResult<Self> {
        Ok(Self {
            horizontal: registry.program(TechniqueKind::BlurHorizontal)?,
            vertical: registry.program(TechniqueKind::BlurVertical)?,
            weights: gaussian_weights(DEFAULT_SIGMA),
            scratch: None,
        })
    }

    /// Build the scratch texture at the given size and format
    ///
    /// Releases any previous scratch first; called at startup and again on
    /// every window resize.
    pub fn initialize(
        &mut self,
        device: &mut dyn RenderDevice,
        width: u32,
        height: u32,
        format: crate::render::api::TextureFormat,
    ) -> RenderResult<()> {
        self.release(device);

        let desc = TextureDesc {
            width,
            height,
            format,
            usage: TextureUsage::SHADER_RESOURCE | TextureUsage::UNORDERED_ACCESS,
        };
        let texture = device.create_texture(&desc)?;
        let srv = device.create_shader_resource_view(texture)?;
        let uav = device.create_unordered_access_view(texture)?;
        self.scratch = Some(Scratch {
            texture,
            srv,
            uav,
            desc,
        });
        Ok(())
    }

    /// Release the scratch texture and its views
    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        if let Some(scratch) = self.scratch.take() {
            device.destroy_shader_resource_view(scratch.srv);
            device.destroy_unordered_access_view(scratch.uav);
            device.destroy_texture(scratch.texture);
        }
    }

    /// Recompute the kernel for a new sigma
    pub fn set_sigma(&mut self, sigma: f32) -> RenderResult<()> {
        if sigma <= 0.0 || !sigma.is_finite() {
            return Err(RenderError::RenderingFailed(format!(
                "blur sigma {sigma} must be positive"
            )));
        }
        self.weights = gaussian_weights(sigma);
        Ok(())
    }

    /// Current kernel weights
    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Blur the input in place for the given number of iterations
    ///
    /// The input's sampled and writable views must alias one texture. The
    /// output keeps the input's dimensions and format. Callers skip the
    /// call entirely when the iteration count is zero.
    pub fn apply(
        &self,
        device: &mut dyn RenderDevice,
        input: ShaderResourceView,
        input_writable: UnorderedAccessView,
        iterations: u32,
    ) -> RenderResult<()> {
        let scratch = self.scratch.as_ref().ok_or_else(|| {
            RenderError::RenderingFailed("blur stage used before initialize".to_string())
        })?;

        let width = scratch.desc.width;
        let height = scratch.desc.height;
        let horizontal_groups = [width.div_ceil(THREAD_GROUP_SIZE), height, 1];
        let vertical_groups = [width, height.div_ceil(THREAD_GROUP_SIZE), 1];

        for _ in 0..iterations {
            device.dispatch(&ComputeDesc {
                program: self.horizontal,
                input,
                output: scratch.uav,
                kernel: &self.weights,
                groups: horizontal_groups,
            })?;
            device.dispatch(&ComputeDesc {
                program: self.vertical,
                input: scratch.srv,
                output: input_writable,
                kernel: &self.weights,
                groups: vertical_groups,
            })?;
        }
        Ok(())
    }

    /// Dimensions and format of the scratch texture, if initialized
    #[must_use]
    pub fn scratch_desc(&self) -> Option<TextureDesc> {
        self.scratch.as_ref().map(|s| s.desc)
    }
}
