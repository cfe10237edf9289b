//! Resource usage declarations for barrier planning.
//!
//! Each pass declares the resources it touches, the state each one must be
//! in when the pass starts, and optionally the state the pass leaves it in.
//! The frame executor turns these declarations into barriers.

use crate::resources::{GpuResource, ResourceId};

use super::state::ResourceState;

/// How a pass accesses a declared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceAccess {
    /// Read only.
    Read,
    /// Written (possibly also read).
    Write,
}

/// A single resource declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceUsageDecl {
    /// The declared resource.
    pub resource: ResourceId,
    /// How the pass accesses it.
    pub access: ResourceAccess,
    /// State required when the pass starts.
    pub entry: ResourceState,
    /// State the pass leaves the resource in. `None` means the entry state.
    pub exit: Option<ResourceState>,
}

impl ResourceUsageDecl {
    /// The state the resource is in once the pass completes.
    pub fn exit_state(&self) -> ResourceState {
        self.exit.unwrap_or(self.entry)
    }
}

/// Resource usage declarations for a pass.
///
/// # Panics
///
/// Declaring the same resource twice in one pass panics.
///
/// # Example
///
/// ```ignore
/// let usage = PassResourceUsage::new()
///     .write(&depth, ResourceState::DepthWrite)
///     .release(&depth, ResourceState::DepthRead)
///     .read(&shadow_map, ResourceState::ShaderResource);
/// ```
#[derive(Debug, Default, Clone)]
pub struct PassResourceUsage {
    decls: Vec<ResourceUsageDecl>,
}

impl PassResourceUsage {
    /// Create a new empty resource usage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a resource read in `state`.
    pub fn read(mut self, resource: &impl GpuResource, state: ResourceState) -> Self {
        self.add(resource.resource_id(), ResourceAccess::Read, state);
        self
    }

    /// Declare a resource written in `state`.
    pub fn write(mut self, resource: &impl GpuResource, state: ResourceState) -> Self {
        self.add(resource.resource_id(), ResourceAccess::Write, state);
        self
    }

    /// Set the state a previously declared resource is left in.
    ///
    /// The pass ends with a barrier moving the resource into `exit`.
    pub fn release(mut self, resource: &impl GpuResource, exit: ResourceState) -> Self {
        let id = resource.resource_id();
        match self.decls.iter_mut().find(|d| d.resource == id) {
            Some(decl) => decl.exit = Some(exit),
            None => panic!("release of resource {id} which the pass does not declare"),
        }
        self
    }

    /// Add a declaration.
    pub fn add(&mut self, resource: ResourceId, access: ResourceAccess, entry: ResourceState) {
        assert!(
            !self.declares(resource),
            "resource {resource} declared twice in one pass"
        );
        self.decls.push(ResourceUsageDecl {
            resource,
            access,
            entry,
            exit: None,
        });
    }

    /// Returns true if the resource is declared.
    pub fn declares(&self, resource: ResourceId) -> bool {
        self.decls.iter().any(|d| d.resource == resource)
    }

    /// Declarations in insertion order.
    pub fn decls(&self) -> &[ResourceUsageDecl] {
        &self.decls
    }

    /// Number of declared resources.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Returns true if the pass declares nothing.
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Number of written resources.
    pub fn write_count(&self) -> usize {
        self.decls
            .iter()
            .filter(|d| d.access == ResourceAccess::Write)
            .count()
    }
}
