//! Device abstraction for the rendering system

mod device;

pub use device::{
    BackendResult, ComputeDesc, DepthStencilView, DrawParams, FillMode, FrameParams, MeshHandle,
    PassDesc, PresentMode, ProgramId, ProgramStage, RenderDevice, RenderTargetView,
    ShaderResourceView, TextureDesc, TextureFormat, TextureId, TextureUsage, UnorderedAccessView,
};
