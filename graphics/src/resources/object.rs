//! Device-bound object handles.
//!
//! Every device-side object the engine owns is wrapped in a [`GpuObject`]: a
//! tagged handle that remembers its kind and the backend that created it. The
//! single [`Drop`] implementation routes destruction back to that backend, so
//! no resource type needs its own destroy path.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::backend::GpuBackend;

/// The kind of a device-side object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GpuObjectKind {
    /// Linear memory buffer.
    #[default]
    Buffer,
    /// One-dimensional texture.
    Texture1D,
    /// Two-dimensional texture.
    Texture2D,
    /// Three-dimensional texture.
    Texture3D,
    /// Texture sampler.
    Sampler,
    /// Vertex shader.
    VertexShader,
    /// Pixel shader.
    PixelShader,
    /// Geometry shader.
    GeometryShader,
    /// Compute shader.
    ComputeShader,
    /// Blend state object.
    BlendState,
    /// Depth/stencil state object.
    DepthStencilState,
    /// Rasterizer state object.
    RasterizerState,
    /// Baked pipeline state object.
    PipelineState,
}

/// Opaque backend handle value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RawHandle(pub u64);

impl RawHandle {
    /// The null handle. Backends never hand it out.
    pub const NULL: Self = Self(0);

    /// Returns true if this is the null handle.
    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

/// A device object handle with exactly-once destruction.
///
/// A handle created by [`GraphicsDevice`](crate::GraphicsDevice) is *bound*:
/// dropping it asks the owning backend to destroy the raw object. An
/// *unbound* handle (see [`GpuObject::unbound`]) never touches a device.
///
/// Destruction is a request; the backend is free to defer the GPU-side
/// release until in-flight work completes.
#[derive(Default)]
pub struct GpuObject {
    kind: GpuObjectKind,
    raw: RawHandle,
    device: Option<Arc<dyn GpuBackend>>,
}

impl GpuObject {
    /// Bind a raw handle to the backend that created it.
    pub(crate) fn bound(kind: GpuObjectKind, raw: RawHandle, device: Arc<dyn GpuBackend>) -> Self {
        Self {
            kind,
            raw,
            device: Some(device),
        }
    }

    /// A handle that owns nothing. Dropping it is a no-op.
    pub fn unbound(kind: GpuObjectKind) -> Self {
        Self {
            kind,
            raw: RawHandle::NULL,
            device: None,
        }
    }

    /// The object kind.
    pub fn kind(&self) -> GpuObjectKind {
        self.kind
    }

    /// The backend handle value.
    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    /// Returns true if dropping this handle will notify a device.
    pub fn is_bound(&self) -> bool {
        self.device.is_some()
    }
}

impl Drop for GpuObject {
    fn drop(&mut self) {
        if let Some(device) = self.device.take() {
            log::trace!("GpuObject: destroying {:?} {:?}", self.kind, self.raw);
            device.destroy_object(self.kind, self.raw);
        }
    }
}

impl fmt::Debug for GpuObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuObject")
            .field("kind", &self.kind)
            .field("raw", &self.raw)
            .field("bound", &self.is_bound())
            .finish()
    }
}

static_assertions::assert_impl_all!(GpuObject: Send, Sync);

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a state-tracked resource.
///
/// Ids are unique for the lifetime of the process and never reused, so a
/// state record entry can never alias a resource created later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Allocate a fresh id.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id value.
    pub fn index(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything whose state is tracked across passes.
pub trait GpuResource {
    /// The resource identity used by the state tracker.
    fn resource_id(&self) -> ResourceId;
}

impl GpuResource for ResourceId {
    fn resource_id(&self) -> ResourceId {
        *self
    }
}

impl<T: GpuResource + ?Sized> GpuResource for Arc<T> {
    fn resource_id(&self) -> ResourceId {
        (**self).resource_id()
    }
}

impl<T: GpuResource + ?Sized> GpuResource for &T {
    fn resource_id(&self) -> ResourceId {
        (**self).resource_id()
    }
}
