//! GPU backend abstraction layer.
//!
//! The engine never talks to a native graphics API directly. Everything it
//! needs from the device (object creation and destruction, command list
//! allocation, submission and a few fixed platform facts) goes through the
//! [`GpuBackend`] trait.
//!
//! # Available Backends
//!
//! - [`DummyBackend`]: records every call without touching a GPU. Used by the
//!   test suite and benchmarks.

mod dummy;
mod error;

pub use dummy::{DummyBackend, SubmittedList};
pub use error::BackendError;

use std::fmt;

use crate::command::{CommandList, CommandListId};
use crate::resources::{GpuObjectKind, PipelineStateDescriptor, RawHandle};
use crate::types::{
    BlendStateDescriptor, BufferDescriptor, DepthStencilStateDescriptor,
    RasterizerStateDescriptor, SamplerDescriptor, ShaderStage, TextureDescriptor,
    TextureDimension, TextureFormat,
};

/// Monotonic position of a command list in the device queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionId(pub u64);

/// A request to create one device object.
#[derive(Debug, Clone, Copy)]
pub enum CreateRequest<'a> {
    /// Linear buffer.
    Buffer(&'a BufferDescriptor),
    /// Texture of any dimension.
    Texture(&'a TextureDescriptor),
    /// Sampler.
    Sampler(&'a SamplerDescriptor),
    /// Shader loaded by name.
    Shader {
        /// Stage the shader runs in.
        stage: ShaderStage,
        /// Content path or name.
        name: &'a str,
    },
    /// Blend state.
    BlendState(&'a BlendStateDescriptor),
    /// Depth/stencil state.
    DepthStencilState(&'a DepthStencilStateDescriptor),
    /// Rasterizer state.
    RasterizerState(&'a RasterizerStateDescriptor),
    /// Pipeline state baked from previously created objects.
    PipelineState(&'a PipelineStateDescriptor),
}

impl CreateRequest<'_> {
    /// The kind of object this request produces.
    pub fn kind(&self) -> GpuObjectKind {
        match self {
            Self::Buffer(_) => GpuObjectKind::Buffer,
            Self::Texture(desc) => match desc.dimension {
                TextureDimension::D1 => GpuObjectKind::Texture1D,
                TextureDimension::D2 => GpuObjectKind::Texture2D,
                TextureDimension::D3 => GpuObjectKind::Texture3D,
            },
            Self::Sampler(_) => GpuObjectKind::Sampler,
            Self::Shader { stage, .. } => match stage {
                ShaderStage::Vertex => GpuObjectKind::VertexShader,
                ShaderStage::Pixel => GpuObjectKind::PixelShader,
                ShaderStage::Geometry => GpuObjectKind::GeometryShader,
                ShaderStage::Compute => GpuObjectKind::ComputeShader,
            },
            Self::BlendState(_) => GpuObjectKind::BlendState,
            Self::DepthStencilState(_) => GpuObjectKind::DepthStencilState,
            Self::RasterizerState(_) => GpuObjectKind::RasterizerState,
            Self::PipelineState(_) => GpuObjectKind::PipelineState,
        }
    }
}

/// Device capability consumed by the engine.
///
/// Implementations must be thread-safe: objects may be dropped on job system
/// worker threads. Command lists are opened on the executor thread while a
/// frame is planned and submitted from it after the join.
pub trait GpuBackend: Send + Sync + fmt::Debug {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Create a device object.
    fn create_object(&self, request: &CreateRequest<'_>) -> Result<RawHandle, BackendError>;

    /// Request destruction of a device object.
    ///
    /// Called exactly once per bound handle. Destroying the same handle twice
    /// is a usage error.
    fn destroy_object(&self, kind: GpuObjectKind, raw: RawHandle);

    /// Allocate a command list id. May reset a per-thread command allocator.
    fn begin_command_list(&self, name: &str) -> CommandListId;

    /// Submit a closed command list to the queue.
    ///
    /// Submitting the same list twice is a usage error.
    fn submit(&self, list: &CommandList) -> Result<SubmissionId, BackendError>;

    /// Format of the presentable back buffer.
    fn back_buffer_format(&self) -> TextureFormat;

    /// MSAA sample counts the device supports, ascending.
    fn supported_sample_counts(&self) -> &[u32];
}
