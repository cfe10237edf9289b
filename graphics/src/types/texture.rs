//! Texture types and descriptors.

use super::Extent3d;
use bitflags::bitflags;

/// Texture format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum TextureFormat {
    /// 8-bit red channel, unsigned normalized.
    R8Unorm,
    /// 32-bit red channel, float.
    R32Float,
    /// 8-bit RGBA channels, unsigned normalized.
    #[default]
    Rgba8Unorm,
    /// 8-bit RGBA channels, sRGB.
    Rgba8UnormSrgb,
    /// 8-bit BGRA channels, unsigned normalized.
    Bgra8Unorm,
    /// 10-bit RGB with 2-bit alpha, unsigned normalized.
    Rgb10A2Unorm,
    /// 11/11/10-bit RGB, float.
    Rg11B10Float,
    /// 16-bit RGBA channels, float.
    Rgba16Float,
    /// 32-bit RGBA channels, float.
    Rgba32Float,
    /// 32-bit depth, float.
    Depth32Float,
    /// 24-bit depth with 8-bit stencil.
    Depth24PlusStencil8,
    /// 32-bit depth float with 8-bit stencil.
    Depth32FloatStencil8,
}

impl TextureFormat {
    /// Returns true if this is a depth or stencil format.
    pub fn is_depth_stencil(&self) -> bool {
        matches!(
            self,
            Self::Depth32Float | Self::Depth24PlusStencil8 | Self::Depth32FloatStencil8
        )
    }

    /// Returns true if this format has a stencil component.
    pub fn has_stencil(&self) -> bool {
        matches!(self, Self::Depth24PlusStencil8 | Self::Depth32FloatStencil8)
    }

    /// Returns the size in bytes per texel.
    pub fn block_size(&self) -> u32 {
        match self {
            Self::R8Unorm => 1,
            Self::R32Float
            | Self::Rgba8Unorm
            | Self::Rgba8UnormSrgb
            | Self::Bgra8Unorm
            | Self::Rgb10A2Unorm
            | Self::Rg11B10Float
            | Self::Depth32Float
            | Self::Depth24PlusStencil8 => 4,
            Self::Rgba16Float | Self::Depth32FloatStencil8 => 8,
            Self::Rgba32Float => 16,
        }
    }
}

bitflags! {
    /// Usage flags for textures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Texture can be copied from.
        const COPY_SRC = 1 << 0;
        /// Texture can be copied to.
        const COPY_DST = 1 << 1;
        /// Texture can be sampled in a shader.
        const SHADER_RESOURCE = 1 << 2;
        /// Texture can be bound for unordered access.
        const UNORDERED_ACCESS = 1 << 3;
        /// Texture can be used as a color render target.
        const RENDER_TARGET = 1 << 4;
        /// Texture can be used as a depth/stencil target.
        const DEPTH_STENCIL = 1 << 5;
    }
}

impl Default for TextureUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Dimensionality of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureDimension {
    /// One-dimensional texture.
    D1,
    /// Two-dimensional texture.
    #[default]
    D2,
    /// Three-dimensional (volume) texture.
    D3,
}

/// Descriptor for creating a texture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Debug label for the texture.
    pub label: Option<String>,
    /// Size of the texture.
    pub size: Extent3d,
    /// Dimensionality.
    pub dimension: TextureDimension,
    /// Mip level count.
    pub mip_level_count: u32,
    /// Sample count for multisampling.
    pub sample_count: u32,
    /// Texture format.
    pub format: TextureFormat,
    /// Usage flags.
    pub usage: TextureUsage,
}

impl TextureDescriptor {
    /// Create a new 1D texture descriptor.
    pub fn new_1d(width: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            size: Extent3d::new_1d(width),
            dimension: TextureDimension::D1,
            format,
            usage,
            ..Default::default()
        }
    }

    /// Create a new 2D texture descriptor.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            size: Extent3d::new_2d(width, height),
            dimension: TextureDimension::D2,
            format,
            usage,
            ..Default::default()
        }
    }

    /// Create a new 3D texture descriptor.
    pub fn new_3d(
        width: u32,
        height: u32,
        depth: u32,
        format: TextureFormat,
        usage: TextureUsage,
    ) -> Self {
        Self {
            size: Extent3d::new(width, height, depth),
            dimension: TextureDimension::D3,
            format,
            usage,
            ..Default::default()
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the mip level count.
    pub fn with_mip_levels(mut self, count: u32) -> Self {
        self.mip_level_count = count;
        self
    }

    /// Set the sample count for multisampling.
    pub fn with_sample_count(mut self, count: u32) -> Self {
        self.sample_count = count;
        self
    }

    /// Returns true if the texture is multisampled.
    pub fn is_multisampled(&self) -> bool {
        self.sample_count > 1
    }
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            size: Extent3d::default(),
            dimension: TextureDimension::D2,
            mip_level_count: 1,
            sample_count: 1,
            format: TextureFormat::default(),
            usage: TextureUsage::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_formats() {
        assert!(TextureFormat::Depth32Float.is_depth_stencil());
        assert!(!TextureFormat::Depth32Float.has_stencil());
        assert!(TextureFormat::Depth24PlusStencil8.has_stencil());
        assert!(!TextureFormat::Rgba16Float.is_depth_stencil());
    }

    #[test]
    fn test_descriptor_dimensions() {
        let tex1d = TextureDescriptor::new_1d(256, TextureFormat::R32Float, TextureUsage::COPY_DST);
        assert_eq!(tex1d.dimension, TextureDimension::D1);
        assert_eq!(tex1d.size.height, 1);

        let tex3d = TextureDescriptor::new_3d(
            32,
            32,
            32,
            TextureFormat::Rgba8Unorm,
            TextureUsage::SHADER_RESOURCE,
        );
        assert_eq!(tex3d.dimension, TextureDimension::D3);
        assert_eq!(tex3d.size.depth, 32);

        let msaa = TextureDescriptor::new_2d(
            64,
            64,
            TextureFormat::Rgba16Float,
            TextureUsage::RENDER_TARGET,
        )
        .with_sample_count(4);
        assert!(msaa.is_multisampled());
    }
}
