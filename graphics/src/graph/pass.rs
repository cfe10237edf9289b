//! Passes and the per-pass recorder.

use std::fmt;

use crate::command::{CommandContext, CommandList};
use crate::resources::{GpuResource, ResourceId};
use crate::scheduler::JobSystem;

use super::barriers::BarrierBatch;
use super::resource_usage::PassResourceUsage;
use super::state::ResourceState;
use super::tracker::ResourceStateTracker;

/// Recording body of a pass.
pub type PassBody<'a> = Box<dyn FnOnce(&mut PassRecorder<'_>) + Send + 'a>;

/// A declared unit of rendering work.
pub struct Pass<'a> {
    name: String,
    usage: PassResourceUsage,
    body: PassBody<'a>,
}

impl<'a> Pass<'a> {
    pub(crate) fn new(name: String, usage: PassResourceUsage, body: PassBody<'a>) -> Self {
        Self { name, usage, body }
    }

    /// The pass name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared resource footprint.
    pub fn usage(&self) -> &PassResourceUsage {
        &self.usage
    }

    pub(crate) fn into_parts(self) -> (String, PassResourceUsage, PassBody<'a>) {
        (self.name, self.usage, self.body)
    }
}

impl fmt::Debug for Pass<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pass")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

/// What a pass body records into.
///
/// Owns the pass's [`CommandContext`] and a pass-local view of resource
/// states, seeded with the states the pass declared. In-body transitions go
/// through the recorder and panic for a resource the pass did not declare.
///
/// Commands recorded through [`context`](Self::context) are not checked
/// against the declaration. Constant uploads with
/// [`CommandContext::update_buffer`] are outside state tracking: the buffers
/// are never registered and the upload is ordered within its own list.
pub struct PassRecorder<'r> {
    name: String,
    context: CommandContext,
    local: ResourceStateTracker,
    usage: PassResourceUsage,
    jobs: &'r JobSystem,
}

impl<'r> PassRecorder<'r> {
    pub(crate) fn new(
        name: String,
        context: CommandContext,
        usage: PassResourceUsage,
        jobs: &'r JobSystem,
    ) -> Self {
        let mut local = ResourceStateTracker::new();
        for decl in usage.decls() {
            local.set(decl.resource, decl.entry);
        }
        Self {
            name,
            context,
            local,
            usage,
            jobs,
        }
    }

    /// The pass name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The command context of this pass.
    pub fn context(&mut self) -> &mut CommandContext {
        &mut self.context
    }

    /// The job system, for nested forks inside the pass.
    pub fn jobs(&self) -> &'r JobSystem {
        self.jobs
    }

    /// Current state of a declared resource.
    pub fn state(&self, resource: &impl GpuResource) -> ResourceState {
        let id = self.check_declared(resource);
        self.local.expect_state(id)
    }

    /// Transition a declared resource. See [`ResourceStateTracker::transition`].
    pub fn transition(
        &mut self,
        resource: &impl GpuResource,
        from: ResourceState,
        to: ResourceState,
    ) -> bool {
        self.check_declared(resource);
        self.local.transition(resource, from, to, &mut self.context)
    }

    /// Transition a declared resource from its current state.
    pub fn transition_to(&mut self, resource: &impl GpuResource, to: ResourceState) -> bool {
        self.check_declared(resource);
        self.local.transition_to(resource, to, &mut self.context)
    }

    /// Transition several declared resources with one barrier.
    pub fn transition_batch(
        &mut self,
        transitions: &[(ResourceId, ResourceState, ResourceState)],
    ) -> usize {
        for (id, _, _) in transitions {
            self.check_declared(id);
        }
        self.local.transition_batch(transitions, &mut self.context)
    }

    /// Unordered-access barrier on declared resources.
    pub fn uav_barrier(&mut self, resources: &[ResourceId]) {
        for id in resources {
            self.check_declared(id);
        }
        self.local.uav_barrier(resources, &mut self.context);
    }

    fn check_declared(&self, resource: &impl GpuResource) -> ResourceId {
        let id = resource.resource_id();
        assert!(
            self.usage.declares(id),
            "resource {id} is not declared by pass '{}'",
            self.name
        );
        id
    }

    /// Emit the closing barrier and close the context.
    pub(crate) fn finish(mut self) -> CommandList {
        let mut closing = BarrierBatch::new();
        for decl in self.usage.decls() {
            let current = self.local.expect_state(decl.resource);
            closing.add(decl.resource, current, decl.exit_state());
        }
        if closing.flush(&mut self.context) {
            log::trace!("PassRecorder: '{}' closing barrier", self.name);
        }
        self.context.close()
    }
}

impl fmt::Debug for PassRecorder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassRecorder")
            .field("name", &self.name)
            .field("commands", &self.context.len())
            .finish_non_exhaustive()
    }
}
