//! Command recording.
//!
//! A [`CommandContext`] is an append-only command sequence with exactly one
//! producer. Closing it with [`CommandContext::close`] consumes the context
//! and yields an immutable [`CommandList`] ready for submission, so recording
//! into a closed context cannot be expressed.

mod context;

pub use context::{CommandContext, CommandList, CommandListId, GpuRange};

use crate::graph::StateTransition;
use crate::resources::{PipelineId, RawHandle, ResourceId};
use crate::types::Viewport;

/// A single recorded GPU command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Bind a pipeline object.
    BindPipeline(PipelineId),
    /// Bind a resource for shader reads.
    BindResource {
        /// Shader slot.
        slot: u32,
        /// Bound resource.
        resource: ResourceId,
    },
    /// Bind a buffer as shader constants.
    BindConstantBuffer {
        /// Shader slot.
        slot: u32,
        /// Bound buffer.
        buffer: ResourceId,
    },
    /// Bind a sampler.
    BindSampler {
        /// Shader slot.
        slot: u32,
        /// Sampler handle.
        sampler: RawHandle,
    },
    /// Set the stencil reference value.
    BindStencilRef(u8),
    /// Bind color and depth/stencil targets.
    BindRenderTargets {
        /// Color targets in slot order.
        colors: Vec<ResourceId>,
        /// Optional depth/stencil target.
        depth_stencil: Option<ResourceId>,
    },
    /// Set the viewport.
    BindViewport(Viewport),
    /// Clear a color target.
    ClearRenderTarget {
        /// Cleared target.
        target: ResourceId,
        /// Clear color.
        color: [f32; 4],
    },
    /// Clear a depth/stencil target.
    ClearDepthStencil {
        /// Cleared target.
        target: ResourceId,
        /// Depth clear value.
        depth: f32,
        /// Stencil clear value.
        stencil: u8,
    },
    /// Upload bytes into a buffer.
    UpdateBuffer {
        /// Destination buffer.
        buffer: ResourceId,
        /// Uploaded bytes.
        data: Vec<u8>,
    },
    /// Non-indexed draw.
    Draw {
        /// Vertex count.
        vertex_count: u32,
        /// First vertex.
        start_vertex: u32,
    },
    /// Indexed draw.
    DrawIndexed {
        /// Index count.
        index_count: u32,
        /// First index.
        start_index: u32,
        /// Value added to each index.
        base_vertex: i32,
    },
    /// Compute dispatch.
    Dispatch {
        /// Thread groups along x.
        x: u32,
        /// Thread groups along y.
        y: u32,
        /// Thread groups along z.
        z: u32,
    },
    /// Whole-resource texture copy.
    CopyTexture {
        /// Source, must be in `CopySource`.
        src: ResourceId,
        /// Destination, must be in `CopyDest`.
        dst: ResourceId,
    },
    /// Multisample resolve.
    ResolveTexture {
        /// Multisampled source.
        src: ResourceId,
        /// Single-sampled destination.
        dst: ResourceId,
    },
    /// Resource state transitions, executed as one barrier.
    Barrier(Vec<StateTransition>),
    /// Unordered-access barrier between back-to-back writes.
    UavBarrier(Vec<ResourceId>),
    /// Open a named GPU timing range.
    BeginRange(String),
    /// Close the innermost GPU timing range.
    EndRange,
}

impl Command {
    /// Returns true for [`Command::Barrier`].
    pub fn is_barrier(&self) -> bool {
        matches!(self, Self::Barrier(_))
    }
}
