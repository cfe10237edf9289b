//! Fixed-function state objects.

use crate::types::{BlendStateDescriptor, DepthStencilStateDescriptor, RasterizerStateDescriptor};

use super::object::{GpuObject, RawHandle};

macro_rules! state_object {
    ($(#[$meta:meta])* $name:ident, $descriptor:ty) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            object: GpuObject,
            descriptor: $descriptor,
        }

        impl $name {
            pub(crate) fn new(object: GpuObject, descriptor: $descriptor) -> Self {
                Self { object, descriptor }
            }

            /// The descriptor this object was created from.
            pub fn descriptor(&self) -> &$descriptor {
                &self.descriptor
            }

            /// Backend handle.
            pub fn raw(&self) -> RawHandle {
                self.object.raw()
            }
        }

        static_assertions::assert_impl_all!($name: Send, Sync);
    };
}

state_object!(
    /// Immutable blend state.
    BlendState,
    BlendStateDescriptor
);

state_object!(
    /// Immutable depth/stencil state.
    DepthStencilState,
    DepthStencilStateDescriptor
);

state_object!(
    /// Immutable rasterizer state.
    RasterizerState,
    RasterizerStateDescriptor
);
