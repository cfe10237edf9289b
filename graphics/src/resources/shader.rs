//! Shader objects.

use crate::types::ShaderStage;

use super::object::{GpuObject, RawHandle};

/// A loaded shader stage.
///
/// Shaders are opaque to the engine: it only needs to know which stage a
/// shader runs in when baking it into a pipeline.
pub struct Shader {
    object: GpuObject,
    stage: ShaderStage,
    name: String,
}

impl Shader {
    pub(crate) fn new(object: GpuObject, stage: ShaderStage, name: String) -> Self {
        Self {
            object,
            stage,
            name,
        }
    }

    /// Stage this shader runs in.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Content name the shader was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend handle.
    pub fn raw(&self) -> RawHandle {
        self.object.raw()
    }
}

impl std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader")
            .field("stage", &self.stage)
            .field("name", &self.name)
            .finish()
    }
}

static_assertions::assert_impl_all!(Shader: Send, Sync);
