//! Barrier batching.
//!
//! Transitions for all resources needed at one point in a command stream are
//! collected and emitted as a single barrier command.

use crate::command::CommandContext;
use crate::resources::ResourceId;

use super::state::{ResourceState, StateTransition};

/// An ordered batch of state transitions to emit together.
///
/// Entries keep insertion order so the emitted command is deterministic.
/// Adding a second transition for a resource already in the batch folds the
/// two into one entry when the combined edge is legal, and appends it
/// otherwise. A chain that returns to its starting state drops out.
#[derive(Debug, Default, Clone)]
pub struct BarrierBatch {
    transitions: Vec<StateTransition>,
}

impl BarrierBatch {
    /// Create a new empty barrier batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transition. Transitions where `before == after` are skipped.
    ///
    /// # Panics
    ///
    /// Panics if the transition is illegal, or if it does not start where a
    /// previous entry for the same resource ended.
    pub fn add(&mut self, resource: ResourceId, before: ResourceState, after: ResourceState) {
        if before == after {
            return;
        }

        let transition = StateTransition::new(resource, before, after);
        transition.validate();

        if let Some(pos) = self.transitions.iter().rposition(|t| t.resource == resource) {
            let existing = self.transitions[pos];
            assert_eq!(
                existing.after, before,
                "barrier batch for resource {resource} chains {} -> {} after {} -> {}",
                before, after, existing.before, existing.after
            );
            if existing.before == after {
                self.transitions.remove(pos);
                return;
            }
            if existing.before.can_transition_to(after) {
                self.transitions[pos].after = after;
                return;
            }
        }

        self.transitions.push(transition);
    }

    /// Check if the batch has any transitions.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Get the number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// The batched transitions in insertion order.
    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    /// Emit all transitions as one barrier command and clear the batch.
    ///
    /// Does nothing if the batch is empty. Returns true if a command was
    /// recorded.
    pub fn flush(&mut self, ctx: &mut CommandContext) -> bool {
        if self.is_empty() {
            return false;
        }
        ctx.push_barrier(std::mem::take(&mut self.transitions));
        true
    }
}
