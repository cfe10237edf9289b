//! GPU texture resource.

use crate::types::{Extent3d, TextureDescriptor, TextureFormat};

use super::object::{GpuObject, GpuResource, ResourceId};

/// A GPU texture resource.
///
/// Textures are created by [`GraphicsDevice::create_texture`] and are
/// reference-counted. Before a texture is referenced by any pass its state
/// must be registered with the frame executor's state tracker.
///
/// # Example
///
/// ```ignore
/// let texture = device.create_texture(&TextureDescriptor::new_2d(
///     1920, 1080,
///     TextureFormat::Rgba8Unorm,
///     TextureUsage::RENDER_TARGET,
/// ))?;
/// println!("Texture size: {}x{}", texture.width(), texture.height());
/// ```
///
/// [`GraphicsDevice::create_texture`]: crate::GraphicsDevice::create_texture
pub struct Texture {
    id: ResourceId,
    object: GpuObject,
    descriptor: TextureDescriptor,
}

impl Texture {
    /// Create a new texture (called by GraphicsDevice).
    pub(crate) fn new(object: GpuObject, descriptor: TextureDescriptor) -> Self {
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

    /// Get the texture descriptor.
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    /// Get the texture size.
    pub fn size(&self) -> Extent3d {
        self.descriptor.size
    }

    /// Get the texture width.
    pub fn width(&self) -> u32 {
        self.descriptor.size.width
    }

    /// Get the texture height.
    pub fn height(&self) -> u32 {
        self.descriptor.size.height
    }

    /// Get the texture format.
    pub fn format(&self) -> TextureFormat {
        self.descriptor.format
    }

    /// Get the MSAA sample count.
    pub fn sample_count(&self) -> u32 {
        self.descriptor.sample_count
    }

    /// Get the texture label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }
}

impl GpuResource for Texture {
    fn resource_id(&self) -> ResourceId {
        self.id
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("size", &self.descriptor.size)
            .field("format", &self.descriptor.format)
            .field("samples", &self.descriptor.sample_count)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

static_assertions::assert_impl_all!(Texture: Send, Sync);
