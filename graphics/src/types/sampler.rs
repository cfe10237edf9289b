//! Sampler types and descriptors.

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest neighbour.
    #[default]
    Nearest,
    /// Linear interpolation.
    Linear,
}

/// Texture coordinate addressing outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// Clamp to the edge texel.
    #[default]
    Clamp,
    /// Repeat the texture.
    Wrap,
    /// Repeat the texture, mirroring every other tile.
    Mirror,
}

impl AddressMode {
    /// All address modes, in declaration order.
    pub const ALL: [AddressMode; 3] = [Self::Clamp, Self::Wrap, Self::Mirror];
}

/// Descriptor for creating a sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerDescriptor {
    /// Debug label for the sampler.
    pub label: Option<String>,
    /// Address mode for all coordinates.
    pub address_mode: AddressMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Mipmap filter.
    pub mipmap_filter: FilterMode,
    /// Maximum anisotropy level (1 disables anisotropic filtering).
    pub anisotropy_clamp: u16,
    /// Maximum LOD clamp.
    pub lod_max_clamp: f32,
}

impl SamplerDescriptor {
    /// Create a nearest neighbour filtering sampler.
    pub fn nearest() -> Self {
        Self::default()
    }

    /// Create a linear filtering sampler.
    pub fn linear() -> Self {
        Self {
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: FilterMode::Linear,
            ..Default::default()
        }
    }

    /// Create an anisotropic filtering sampler.
    pub fn anisotropic(level: u16) -> Self {
        Self {
            anisotropy_clamp: level.max(1),
            ..Self::linear()
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the address mode.
    pub fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.address_mode = mode;
        self
    }
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            address_mode: AddressMode::Clamp,
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            mipmap_filter: FilterMode::Nearest,
            anisotropy_clamp: 1,
            lod_max_clamp: 32.0,
        }
    }
}
