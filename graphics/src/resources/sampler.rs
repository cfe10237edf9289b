//! GPU sampler resource.

use crate::types::SamplerDescriptor;

use super::object::{GpuObject, RawHandle};

/// A GPU texture sampler.
///
/// Samplers are created by [`GraphicsDevice::create_sampler`] and are reference-counted.
/// Samplers are immutable and never state-tracked.
///
/// # Example
///
/// ```ignore
/// let sampler = device.create_sampler(&SamplerDescriptor::linear())?;
/// ```
///
/// [`GraphicsDevice::create_sampler`]: crate::GraphicsDevice::create_sampler
pub struct Sampler {
    object: GpuObject,
    descriptor: SamplerDescriptor,
}

impl Sampler {
    /// Create a new sampler (called by GraphicsDevice).
    pub(crate) fn new(object: GpuObject, descriptor: SamplerDescriptor) -> Self {
        Self { object, descriptor }
    }

    /// Get the backend handle.
    pub fn raw(&self) -> RawHandle {
        self.object.raw()
    }

    /// Get the sampler descriptor.
    pub fn descriptor(&self) -> &SamplerDescriptor {
        &self.descriptor
    }

    /// Get the sampler label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("raw", &self.object.raw())
            .field("address_mode", &self.descriptor.address_mode)
            .field("min_filter", &self.descriptor.min_filter)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

static_assertions::assert_impl_all!(Sampler: Send, Sync);
