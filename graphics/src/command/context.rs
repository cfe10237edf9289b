//! Command contexts and closed command lists.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::graph::StateTransition;
use crate::resources::{GpuResource, PipelineState, ResourceId, Sampler};
use crate::types::Viewport;

use super::Command;

/// Global order in which command lists were closed.
static CLOSE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Backend-assigned identity of a command list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandListId(pub u64);

/// An open GPU timing range.
///
/// Returned by [`CommandContext::begin_range`] and handed back to
/// [`CommandContext::end_range`]. Inactive when GPU profiling is disabled.
#[must_use = "a GPU range must be closed with CommandContext::end_range"]
#[derive(Debug)]
pub struct GpuRange {
    active: bool,
}

/// Single-producer command recorder for one pass.
///
/// Obtained from [`GraphicsDevice::open_context`](crate::GraphicsDevice::open_context).
/// All recording methods take `&mut self`, so only one thread can append at a
/// time; the context itself is `Send` and moves into the task that records it.
#[derive(Debug)]
pub struct CommandContext {
    id: CommandListId,
    name: String,
    profiling: bool,
    open_ranges: u32,
    commands: Vec<Command>,
}

impl CommandContext {
    pub(crate) fn new(id: CommandListId, name: impl Into<String>, profiling: bool) -> Self {
        Self {
            id,
            name: name.into(),
            profiling,
            open_ranges: 0,
            commands: Vec::new(),
        }
    }

    /// The command list id.
    pub fn id(&self) -> CommandListId {
        self.id
    }

    /// The context name (usually the pass name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Commands recorded so far.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Bind a pipeline object.
    pub fn bind_pipeline(&mut self, pipeline: &PipelineState) {
        self.commands.push(Command::BindPipeline(pipeline.id()));
    }

    /// Bind a buffer or texture for shader reads.
    pub fn bind_resource(&mut self, slot: u32, resource: &impl GpuResource) {
        self.commands.push(Command::BindResource {
            slot,
            resource: resource.resource_id(),
        });
    }

    /// Bind a buffer as shader constants.
    pub fn bind_constant_buffer(&mut self, slot: u32, buffer: &impl GpuResource) {
        self.commands.push(Command::BindConstantBuffer {
            slot,
            buffer: buffer.resource_id(),
        });
    }

    /// Bind a sampler.
    pub fn bind_sampler(&mut self, slot: u32, sampler: &Sampler) {
        self.commands.push(Command::BindSampler {
            slot,
            sampler: sampler.raw(),
        });
    }

    /// Set the stencil reference value.
    pub fn bind_stencil_ref(&mut self, value: u8) {
        self.commands.push(Command::BindStencilRef(value));
    }

    /// Bind color targets and an optional depth/stencil target.
    pub fn bind_render_targets(&mut self, colors: &[ResourceId], depth_stencil: Option<ResourceId>) {
        self.commands.push(Command::BindRenderTargets {
            colors: colors.to_vec(),
            depth_stencil,
        });
    }

    /// Set the viewport.
    pub fn bind_viewport(&mut self, viewport: Viewport) {
        self.commands.push(Command::BindViewport(viewport));
    }

    /// Clear a color target.
    pub fn clear_render_target(&mut self, target: &impl GpuResource, color: [f32; 4]) {
        self.commands.push(Command::ClearRenderTarget {
            target: target.resource_id(),
            color,
        });
    }

    /// Clear a depth/stencil target.
    pub fn clear_depth_stencil(&mut self, target: &impl GpuResource, depth: f32, stencil: u8) {
        self.commands.push(Command::ClearDepthStencil {
            target: target.resource_id(),
            depth,
            stencil,
        });
    }

    /// Upload a plain-old-data value into a buffer.
    ///
    /// Uploads emit no barrier and need no tracked state.
    pub fn update_buffer<T: bytemuck::Pod>(&mut self, buffer: &impl GpuResource, data: &T) {
        self.commands.push(Command::UpdateBuffer {
            buffer: buffer.resource_id(),
            data: bytemuck::bytes_of(data).to_vec(),
        });
    }

    /// Non-indexed draw.
    pub fn draw(&mut self, vertex_count: u32, start_vertex: u32) {
        self.commands.push(Command::Draw {
            vertex_count,
            start_vertex,
        });
    }

    /// Indexed draw.
    pub fn draw_indexed(&mut self, index_count: u32, start_index: u32, base_vertex: i32) {
        self.commands.push(Command::DrawIndexed {
            index_count,
            start_index,
            base_vertex,
        });
    }

    /// Compute dispatch.
    pub fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        self.commands.push(Command::Dispatch { x, y, z });
    }

    /// Copy a whole texture.
    pub fn copy_texture(&mut self, src: &impl GpuResource, dst: &impl GpuResource) {
        self.commands.push(Command::CopyTexture {
            src: src.resource_id(),
            dst: dst.resource_id(),
        });
    }

    /// Resolve a multisampled texture.
    pub fn resolve_texture(&mut self, src: &impl GpuResource, dst: &impl GpuResource) {
        self.commands.push(Command::ResolveTexture {
            src: src.resource_id(),
            dst: dst.resource_id(),
        });
    }

    /// Open a named GPU timing range. Records nothing when profiling is off.
    pub fn begin_range(&mut self, name: &str) -> GpuRange {
        if !self.profiling {
            return GpuRange { active: false };
        }
        self.open_ranges += 1;
        self.commands.push(Command::BeginRange(name.to_string()));
        GpuRange { active: true }
    }

    /// Close a range opened by [`begin_range`](Self::begin_range).
    pub fn end_range(&mut self, range: GpuRange) {
        if range.active {
            assert!(self.open_ranges > 0, "end_range without matching begin_range");
            self.open_ranges -= 1;
            self.commands.push(Command::EndRange);
        }
    }

    /// Append a barrier. Only the state tracker emits transitions.
    pub(crate) fn push_barrier(&mut self, transitions: Vec<StateTransition>) {
        debug_assert!(!transitions.is_empty());
        self.commands.push(Command::Barrier(transitions));
    }

    pub(crate) fn push_uav_barrier(&mut self, resources: Vec<ResourceId>) {
        self.commands.push(Command::UavBarrier(resources));
    }

    /// Close the context, producing an immutable command list.
    ///
    /// # Panics
    ///
    /// Panics if a GPU range is still open.
    pub fn close(self) -> CommandList {
        assert_eq!(
            self.open_ranges, 0,
            "context '{}' closed with {} open GPU range(s)",
            self.name, self.open_ranges
        );
        let close_sequence = CLOSE_SEQUENCE.fetch_add(1, Ordering::SeqCst);
        log::trace!(
            "CommandContext: closed '{}' with {} commands",
            self.name,
            self.commands.len()
        );
        CommandList {
            id: self.id,
            name: self.name,
            commands: self.commands,
            close_sequence,
        }
    }
}

/// A closed, immutable command list.
#[derive(Debug, Clone)]
pub struct CommandList {
    id: CommandListId,
    name: String,
    commands: Vec<Command>,
    close_sequence: u64,
}

impl CommandList {
    /// The command list id.
    pub fn id(&self) -> CommandListId {
        self.id
    }

    /// The name of the context it was recorded in.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recorded commands.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if the list holds no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Process-wide order in which this list was closed. Recording threads
    /// close lists in completion order, not submission order.
    pub fn close_sequence(&self) -> u64 {
        self.close_sequence
    }

    /// Number of barrier commands in the list.
    pub fn barrier_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_barrier()).count()
    }

    /// All state transitions in the list, in order.
    pub fn transitions(&self) -> impl Iterator<Item = &StateTransition> {
        self.commands.iter().flat_map(|c| match c {
            Command::Barrier(transitions) => transitions.as_slice(),
            _ => &[][..],
        })
    }
}

static_assertions::assert_impl_all!(CommandContext: Send);
static_assertions::assert_impl_all!(CommandList: Send, Sync);
