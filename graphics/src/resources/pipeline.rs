//! Baked pipeline state objects.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::{PrimitiveTopology, TextureFormat};

use super::object::{GpuObject, RawHandle};
use super::shader::Shader;
use super::state::{BlendState, DepthStencilState, RasterizerState};

static NEXT_PIPELINE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a pipeline object, recorded by bind commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineId(u64);

impl PipelineId {
    fn next() -> Self {
        Self(NEXT_PIPELINE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Everything a pipeline object is baked from.
#[derive(Debug, Clone)]
pub struct PipelineStateDescriptor {
    /// Debug label.
    pub label: Option<String>,
    /// Vertex stage.
    pub vertex_shader: Arc<Shader>,
    /// Pixel stage.
    pub pixel_shader: Arc<Shader>,
    /// Blend state.
    pub blend: Arc<BlendState>,
    /// Depth/stencil state.
    pub depth_stencil: Arc<DepthStencilState>,
    /// Rasterizer state.
    pub rasterizer: Arc<RasterizerState>,
    /// Primitive topology.
    pub topology: PrimitiveTopology,
    /// Format of the single color target.
    pub color_format: TextureFormat,
    /// Depth/stencil target format, `None` if the pipeline draws without one.
    pub depth_stencil_format: Option<TextureFormat>,
    /// MSAA sample count.
    pub sample_count: u32,
}

/// An immutable pipeline object.
///
/// Keeps its component objects alive for as long as it exists.
#[derive(Debug)]
pub struct PipelineState {
    id: PipelineId,
    object: GpuObject,
    descriptor: PipelineStateDescriptor,
}

impl PipelineState {
    pub(crate) fn new(object: GpuObject, descriptor: PipelineStateDescriptor) -> Self {
        Self {
            id: PipelineId::next(),
            object,
            descriptor,
        }
    }

    /// Pipeline identity.
    pub fn id(&self) -> PipelineId {
        self.id
    }

    /// Backend handle.
    pub fn raw(&self) -> RawHandle {
        self.object.raw()
    }

    /// The descriptor this pipeline was baked from.
    pub fn descriptor(&self) -> &PipelineStateDescriptor {
        &self.descriptor
    }

    /// Get the pipeline label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }
}

static_assertions::assert_impl_all!(PipelineState: Send, Sync);
