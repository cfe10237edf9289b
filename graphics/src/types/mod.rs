//! Common types and descriptors for graphics resources.
//!
//! This module contains format enums, usage flags, and the descriptor structs
//! consumed by [`GraphicsDevice`](crate::GraphicsDevice) factory calls.

mod buffer;
mod common;
mod sampler;
mod state;
mod texture;

pub use buffer::{BufferDescriptor, BufferUsage};
pub use common::{Extent3d, Viewport};
pub use sampler::{AddressMode, FilterMode, SamplerDescriptor};
pub use state::{
    BlendComponent, BlendFactor, BlendOperation, BlendStateDescriptor, CompareFunction,
    CullMode, DepthStencilStateDescriptor, FillMode, PrimitiveTopology,
    RasterizerStateDescriptor, ShaderStage, StencilFaceState, StencilOperation,
};
pub use texture::{TextureDescriptor, TextureDimension, TextureFormat, TextureUsage};
