//! Authoritative per-resource state record.
//!
//! The tracker owns the `ResourceId -> ResourceState` map and is the only
//! code that emits barriers. The record persists across frames, so long-lived
//! resources such as depth buffers keep their state between frames.

use std::collections::HashMap;

use crate::command::CommandContext;
use crate::resources::{GpuResource, ResourceId};

use super::barriers::BarrierBatch;
use super::state::ResourceState;

/// Per-resource state record and barrier emitter.
///
/// # Panics
///
/// Every transition method panics on usage errors: an untracked resource, a
/// `from` state that does not match the record, or an illegal edge.
#[derive(Debug, Default, Clone)]
pub struct ResourceStateTracker {
    states: HashMap<ResourceId, ResourceState>,
}

impl ResourceStateTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a resource in `state`, replacing any previous record.
    pub fn register(&mut self, resource: &impl GpuResource, state: ResourceState) {
        let id = resource.resource_id();
        if let Some(previous) = self.states.insert(id, state) {
            log::debug!("ResourceStateTracker: re-registered {id} ({previous} -> {state})");
        }
    }

    /// Stop tracking a resource. Returns its last recorded state.
    pub fn forget(&mut self, resource: &impl GpuResource) -> Option<ResourceState> {
        self.states.remove(&resource.resource_id())
    }

    /// The recorded state of a resource, if tracked.
    pub fn state(&self, resource: &impl GpuResource) -> Option<ResourceState> {
        self.states.get(&resource.resource_id()).copied()
    }

    /// Returns true if the resource is tracked.
    pub fn is_tracked(&self, resource: &impl GpuResource) -> bool {
        self.states.contains_key(&resource.resource_id())
    }

    /// Number of tracked resources.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true if no resource is tracked.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The recorded state, panicking if the resource is untracked.
    pub(crate) fn expect_state(&self, id: ResourceId) -> ResourceState {
        match self.states.get(&id) {
            Some(state) => *state,
            None => panic!("resource {id} has no recorded state; register it before use"),
        }
    }

    fn check_from(&self, id: ResourceId, from: ResourceState) {
        let recorded = self.expect_state(id);
        assert_eq!(
            recorded, from,
            "resource {id} is recorded as {recorded} but a transition expected {from}"
        );
    }

    /// Overwrite the record without emitting anything.
    pub(crate) fn set(&mut self, id: ResourceId, state: ResourceState) {
        self.states.insert(id, state);
    }

    /// Transition one resource from `from` to `to`.
    ///
    /// Appends a barrier to `ctx` and updates the record only when
    /// `from != to`. Returns true if a barrier was recorded.
    pub fn transition(
        &mut self,
        resource: &impl GpuResource,
        from: ResourceState,
        to: ResourceState,
        ctx: &mut CommandContext,
    ) -> bool {
        let id = resource.resource_id();
        self.check_from(id, from);
        let mut batch = BarrierBatch::new();
        batch.add(id, from, to);
        if batch.flush(ctx) {
            self.states.insert(id, to);
            true
        } else {
            false
        }
    }

    /// Transition a resource from its recorded state to `to`.
    pub fn transition_to(
        &mut self,
        resource: &impl GpuResource,
        to: ResourceState,
        ctx: &mut CommandContext,
    ) -> bool {
        let from = self.expect_state(resource.resource_id());
        self.transition(resource, from, to, ctx)
    }

    /// Transition several resources with a single barrier command.
    ///
    /// Entries are `(resource, from, to)`. No-op entries are skipped; if every
    /// entry is a no-op nothing is recorded. Returns the number of transitions
    /// in the emitted barrier.
    pub fn transition_batch(
        &mut self,
        transitions: &[(ResourceId, ResourceState, ResourceState)],
        ctx: &mut CommandContext,
    ) -> usize {
        let mut batch = BarrierBatch::new();
        for &(id, from, to) in transitions {
            batch.add(id, from, to);
        }
        // Validate against the record before mutating it.
        let mut staged: Vec<(ResourceId, ResourceState)> = Vec::new();
        for &(id, from, to) in transitions {
            match staged.iter_mut().rev().find(|(staged_id, _)| *staged_id == id) {
                Some(entry) => {
                    assert_eq!(entry.1, from, "resource {id} transitioned from {from} out of order");
                    entry.1 = to;
                }
                None => {
                    self.check_from(id, from);
                    staged.push((id, to));
                }
            }
        }
        let count = batch.len();
        if batch.flush(ctx) {
            for (id, state) in staged {
                self.states.insert(id, state);
            }
        }
        count
    }

    /// Order back-to-back unordered-access writes to the given resources.
    ///
    /// Every resource must be recorded as [`ResourceState::UnorderedAccess`].
    pub fn uav_barrier(&self, resources: &[ResourceId], ctx: &mut CommandContext) {
        for &id in resources {
            let state = self.expect_state(id);
            assert_eq!(
                state,
                ResourceState::UnorderedAccess,
                "uav barrier on resource {id} which is in {state}"
            );
        }
        if !resources.is_empty() {
            ctx.push_uav_barrier(resources.to_vec());
        }
    }
}
