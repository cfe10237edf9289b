//! GPU buffer resource.

use crate::types::BufferDescriptor;

use super::object::{GpuObject, GpuResource, ResourceId};

/// A GPU buffer resource.
///
/// Buffers are created by [`GraphicsDevice::create_buffer`] and are reference-counted.
/// The underlying device object is destroyed when the last reference drops.
///
/// # Example
///
/// ```ignore
/// let buffer = device.create_buffer(&BufferDescriptor::new(1024, BufferUsage::VERTEX))?;
/// println!("Buffer size: {}", buffer.size());
/// ```
///
/// [`GraphicsDevice::create_buffer`]: crate::GraphicsDevice::create_buffer
pub struct Buffer {
    id: ResourceId,
    object: GpuObject,
    descriptor: BufferDescriptor,
}

impl Buffer {
    /// Create a new buffer (called by GraphicsDevice).
    pub(crate) fn new(object: GpuObject, descriptor: BufferDescriptor) -> Self {
        Self {
            id: ResourceId::new(),
            object,
            descriptor,
        }
    }

    /// Get the tracked resource id.
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Get the device object handle.
    pub fn object(&self) -> &GpuObject {
        &self.object
    }

    /// Get the buffer descriptor.
    pub fn descriptor(&self) -> &BufferDescriptor {
        &self.descriptor
    }

    /// Get the buffer size in bytes.
    pub fn size(&self) -> u64 {
        self.descriptor.size
    }

    /// Get the buffer label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }
}

impl GpuResource for Buffer {
    fn resource_id(&self) -> ResourceId {
        self.id
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.id)
            .field("size", &self.descriptor.size)
            .field("usage", &self.descriptor.usage)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

// Ensure Buffer is Send + Sync
static_assertions::assert_impl_all!(Buffer: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::GpuObjectKind;
    use crate::types::BufferUsage;

    #[test]
    fn test_buffer_debug() {
        let desc = BufferDescriptor::new(1024, BufferUsage::VERTEX);
        let buffer = Buffer::new(GpuObject::unbound(GpuObjectKind::Buffer), desc);
        let debug = format!("{:?}", buffer);
        assert!(debug.contains("Buffer"));
        assert!(debug.contains("1024"));
    }

    #[test]
    fn test_buffer_size() {
        let desc = BufferDescriptor::new(2048, BufferUsage::CONSTANT).with_label("frame_cb");
        let buffer = Buffer::new(GpuObject::unbound(GpuObjectKind::Buffer), desc);
        assert_eq!(buffer.size(), 2048);
        assert_eq!(buffer.label(), Some("frame_cb"));
        assert_eq!(buffer.resource_id(), buffer.id());
    }
}
