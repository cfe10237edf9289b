//! GPU resources.
//!
//! This module contains the object types created by [`GraphicsDevice`]:
//! - [`Buffer`] and [`Texture`]: state-tracked memory resources
//! - [`Sampler`], [`Shader`] and the fixed-function state objects
//! - [`PipelineState`]: a baked pipeline object
//!
//! Every type wraps a [`GpuObject`], whose drop routes destruction to the
//! owning backend. Resources are reference-counted with [`Arc`] and can be
//! shared across threads.
//!
//! [`GraphicsDevice`]: crate::GraphicsDevice
//! [`Arc`]: std::sync::Arc

mod buffer;
mod object;
mod pipeline;
mod sampler;
mod shader;
mod state;
mod texture;

pub use buffer::Buffer;
pub use object::{GpuObject, GpuObjectKind, GpuResource, RawHandle, ResourceId};
pub use pipeline::{PipelineId, PipelineState, PipelineStateDescriptor};
pub use sampler::Sampler;
pub use shader::Shader;
pub use state::{BlendState, DepthStencilState, RasterizerState};
pub use texture::Texture;
