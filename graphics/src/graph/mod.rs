//! Frame pass graph.
//!
//! A frame is described as an ordered list of passes. Each pass declares
//! the resources it touches and the state each must be in, then records its
//! commands into its own context. The
//! [`FrameExecutor`](crate::scheduler::FrameExecutor) plans barriers in
//! declaration order, records all passes in parallel and submits the
//! resulting command lists in declaration order.
//!
//! There is no automatic dependency analysis: declaration order *is* the
//! hazard order. A pass that needs CPU-side results of another pass must fork
//! that work itself (see [`PassRecorder::jobs`]).
//!
//! # Example
//!
//! ```ignore
//! let mut graph = RenderGraph::new();
//! graph.add_pass(
//!     "depth_prepass",
//!     PassResourceUsage::new()
//!         .write(&depth, ResourceState::DepthWrite)
//!         .release(&depth, ResourceState::DepthRead),
//!     |rec| {
//!         rec.context().clear_depth_stencil(&depth, 0.0, 0);
//!     },
//! );
//! graph.add_pass(
//!     "opaque",
//!     PassResourceUsage::new().read(&depth, ResourceState::DepthRead),
//!     |rec| { /* ... */ },
//! );
//! let report = executor.execute(graph)?;
//! ```

mod barriers;
mod pass;
mod resource_usage;
mod state;
mod tracker;

pub use barriers::BarrierBatch;
pub use pass::{Pass, PassBody, PassRecorder};
pub use resource_usage::{PassResourceUsage, ResourceAccess, ResourceUsageDecl};
pub use state::{ResourceState, StateTransition};
pub use tracker::ResourceStateTracker;

/// Handle to a pass in the render graph.
///
/// `PassHandle` is `Copy` and cheap to pass around. It is only valid within
/// the `RenderGraph` that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassHandle(u32);

impl PassHandle {
    fn new(index: u32) -> Self {
        Self(index)
    }

    /// Declaration index of the pass.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The ordered pass list of one frame.
///
/// Passes borrow frame data for `'a`; the graph is consumed by
/// [`FrameExecutor::execute`](crate::scheduler::FrameExecutor::execute).
#[derive(Debug, Default)]
pub struct RenderGraph<'a> {
    passes: Vec<Pass<'a>>,
}

impl<'a> RenderGraph<'a> {
    /// Create a new empty render graph.
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Append a pass. Passes are submitted in the order they are added.
    pub fn add_pass(
        &mut self,
        name: impl Into<String>,
        usage: PassResourceUsage,
        body: impl FnOnce(&mut PassRecorder<'_>) + Send + 'a,
    ) -> PassHandle {
        let index = self.passes.len() as u32;
        self.passes
            .push(Pass::new(name.into(), usage, Box::new(body)));
        PassHandle::new(index)
    }

    /// Get a pass by handle.
    pub fn pass(&self, handle: PassHandle) -> Option<&Pass<'a>> {
        self.passes.get(handle.index())
    }

    /// Number of passes.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Returns true if the graph has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Pass names in declaration order.
    pub fn pass_names(&self) -> impl Iterator<Item = &str> {
        self.passes.iter().map(Pass::name)
    }

    pub(crate) fn into_passes(self) -> Vec<Pass<'a>> {
        self.passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceId;

    #[test]
    fn test_add_pass_order() {
        let r = ResourceId::new();
        let mut graph = RenderGraph::new();
        let a = graph.add_pass("a", PassResourceUsage::new(), |_| {});
        let b = graph.add_pass(
            "b",
            PassResourceUsage::new().read(&r, ResourceState::ShaderResource),
            |_| {},
        );

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(graph.pass_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(graph.pass(b).map(|p| p.usage().len()), Some(1));
    }
}
