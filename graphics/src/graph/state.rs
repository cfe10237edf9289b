//! Resource states and legal transitions.

use std::fmt;

use crate::resources::ResourceId;

/// The usage state a resource is in on the GPU timeline.
///
/// A command that accesses a resource requires it to be in a specific state.
/// Moving between states requires a barrier, emitted by the
/// [`ResourceStateTracker`](super::ResourceStateTracker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResourceState {
    /// Contents undefined. Newly created resources start here.
    #[default]
    Undefined,
    /// Bound as a color render target.
    RenderTarget,
    /// Bound as a writable depth/stencil target.
    DepthWrite,
    /// Bound as a read-only depth/stencil target.
    DepthRead,
    /// Sampled by pixel shaders.
    ShaderResource,
    /// Sampled by non-pixel shader stages.
    NonPixelShaderResource,
    /// Read and written as an unordered-access view.
    UnorderedAccess,
    /// Source of a copy or resolve.
    CopySource,
    /// Destination of a copy or resolve.
    CopyDest,
    /// Ready for presentation.
    Present,
}

impl ResourceState {
    /// Every state, in declaration order.
    pub const ALL: [ResourceState; 10] = [
        Self::Undefined,
        Self::RenderTarget,
        Self::DepthWrite,
        Self::DepthRead,
        Self::ShaderResource,
        Self::NonPixelShaderResource,
        Self::UnorderedAccess,
        Self::CopySource,
        Self::CopyDest,
        Self::Present,
    ];

    /// States every other state may move to and from.
    fn is_hub(self) -> bool {
        matches!(
            self,
            Self::ShaderResource | Self::NonPixelShaderResource | Self::CopySource | Self::CopyDest
        )
    }

    /// Returns true if a barrier from `self` to `to` is legal.
    ///
    /// Staying in the same state is always legal (and emits nothing).
    pub fn can_transition_to(self, to: ResourceState) -> bool {
        use ResourceState::*;

        if self == to {
            return true;
        }
        match (self, to) {
            (_, Undefined) => false,
            (Undefined, _) => true,
            (a, b) if a.is_hub() || b.is_hub() => true,
            (DepthWrite, DepthRead) | (DepthRead, DepthWrite) => true,
            (RenderTarget, Present) | (Present, RenderTarget) => true,
            (UnorderedAccess, RenderTarget) | (RenderTarget, UnorderedAccess) => true,
            _ => false,
        }
    }

    /// Returns true if the state allows GPU writes.
    pub fn is_write(self) -> bool {
        matches!(
            self,
            Self::RenderTarget | Self::DepthWrite | Self::UnorderedAccess | Self::CopyDest
        )
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single resource state change inside a barrier command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateTransition {
    /// The transitioned resource.
    pub resource: ResourceId,
    /// State before the barrier.
    pub before: ResourceState,
    /// State after the barrier.
    pub after: ResourceState,
}

impl StateTransition {
    /// Create a transition.
    pub fn new(resource: ResourceId, before: ResourceState, after: ResourceState) -> Self {
        Self {
            resource,
            before,
            after,
        }
    }

    /// Panic unless the transition is legal.
    pub(crate) fn validate(&self) {
        assert!(
            self.before.can_transition_to(self.after),
            "illegal state transition for resource {}: {} -> {}",
            self.resource,
            self.before,
            self.after
        );
    }
}
