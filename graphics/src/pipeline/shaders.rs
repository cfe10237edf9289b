//! Shader lookup for the pipeline cache.

use std::collections::HashMap;
use std::sync::Arc;

use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::resources::Shader;
use crate::types::ShaderStage;

use super::key::{PipelineAxis, SamplingQuality, ShaderFamily};

/// Vertex shader drawing a transformed quad.
pub const IMAGE_VERTEX_SHADER: &str = "imageVS";
/// Vertex shader emitting a fullscreen triangle.
pub const SCREEN_VERTEX_SHADER: &str = "screenVS";

impl ShaderFamily {
    /// Name of the vertex shader this family draws with.
    pub fn vertex_shader_name(self) -> &'static str {
        match self {
            Self::Fullscreen => SCREEN_VERTEX_SHADER,
            _ => IMAGE_VERTEX_SHADER,
        }
    }

    /// Name of the pixel shader for this family at the given quality.
    pub fn pixel_shader_name(self, sampling: SamplingQuality) -> &'static str {
        match (self, sampling) {
            (Self::Image, SamplingQuality::Simple) => "imagePS",
            (Self::Image, SamplingQuality::Bicubic) => "imagePS_bicubic",
            (Self::SeparateNormalMap, SamplingQuality::Simple) => "imagePS_separatenormalmap",
            (Self::SeparateNormalMap, SamplingQuality::Bicubic) => {
                "imagePS_separatenormalmap_bicubic"
            }
            (Self::Masked, SamplingQuality::Simple) => "imagePS_masked",
            (Self::Masked, SamplingQuality::Bicubic) => "imagePS_masked_bicubic",
            (Self::Fullscreen, SamplingQuality::Simple) => "screenPS",
            (Self::Fullscreen, SamplingQuality::Bicubic) => "screenPS_bicubic",
        }
    }
}

/// Source of compiled shaders, looked up by content name.
///
/// Returning `None` means the shader is not available; the cache decides
/// whether that is fatal.
pub trait ShaderProvider {
    /// Look up the shader called `name` for `stage`.
    fn load(&self, name: &str, stage: ShaderStage) -> Option<Arc<Shader>>;
}

/// A [`ShaderProvider`] backed by an in-memory table.
#[derive(Debug, Default, Clone)]
pub struct MapShaderProvider {
    shaders: HashMap<String, Arc<Shader>>,
}

impl MapShaderProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create every shader used by the image pipelines through `device`.
    ///
    /// # Errors
    ///
    /// Returns the device error if a shader cannot be created.
    pub fn image_shaders(device: &GraphicsDevice) -> Result<Self, GraphicsError> {
        let mut provider = Self::new();
        for name in [IMAGE_VERTEX_SHADER, SCREEN_VERTEX_SHADER] {
            provider.insert(device.create_shader(ShaderStage::Vertex, name)?);
        }
        for &family in ShaderFamily::ALL {
            for &sampling in SamplingQuality::ALL {
                let name = family.pixel_shader_name(sampling);
                provider.insert(device.create_shader(ShaderStage::Pixel, name)?);
            }
        }
        Ok(provider)
    }

    /// Add or replace a shader, keyed by its name.
    pub fn insert(&mut self, shader: Arc<Shader>) {
        self.shaders.insert(shader.name().to_string(), shader);
    }

    /// Remove a shader by name.
    pub fn remove(&mut self, name: &str) -> Option<Arc<Shader>> {
        self.shaders.remove(name)
    }

    /// Number of shaders held.
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    /// Returns true if no shaders are held.
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}

impl ShaderProvider for MapShaderProvider {
    fn load(&self, name: &str, stage: ShaderStage) -> Option<Arc<Shader>> {
        self.shaders
            .get(name)
            .filter(|shader| shader.stage() == stage)
            .cloned()
    }
}
