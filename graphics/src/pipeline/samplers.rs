//! Fixed sampler table used by the image draw path.

use std::sync::Arc;

use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::resources::Sampler;
use crate::types::{AddressMode, SamplerDescriptor};

/// Anisotropy level of the anisotropic samplers.
pub const MAX_ANISOTROPY: u16 = 16;

/// Hardware filter quality of a cached sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerFilter {
    /// Point sampling.
    Point,
    /// Trilinear filtering.
    Linear,
    /// Anisotropic filtering.
    Anisotropic,
}

impl SamplerFilter {
    /// All filters, in table order.
    pub const ALL: [SamplerFilter; 3] = [Self::Point, Self::Linear, Self::Anisotropic];

    fn descriptor(self) -> SamplerDescriptor {
        match self {
            Self::Point => SamplerDescriptor::nearest(),
            Self::Linear => SamplerDescriptor::linear(),
            Self::Anisotropic => SamplerDescriptor::anisotropic(MAX_ANISOTROPY),
        }
    }
}

/// One sampler per filter × address mode, created once.
#[derive(Debug)]
pub struct SamplerCache {
    samplers: Vec<Arc<Sampler>>,
}

impl SamplerCache {
    /// Create all nine samplers.
    ///
    /// # Errors
    ///
    /// Returns the device error if a sampler cannot be created.
    pub fn build(device: &GraphicsDevice) -> Result<Self, GraphicsError> {
        let mut samplers = Vec::with_capacity(SamplerFilter::ALL.len() * AddressMode::ALL.len());
        for filter in SamplerFilter::ALL {
            for mode in AddressMode::ALL {
                let descriptor = filter
                    .descriptor()
                    .with_address_mode(mode)
                    .with_label(format!("{filter:?}/{mode:?}"));
                samplers.push(device.create_sampler(&descriptor)?);
            }
        }
        Ok(Self { samplers })
    }

    /// The sampler for `filter` and `mode`.
    pub fn get(&self, filter: SamplerFilter, mode: AddressMode) -> &Arc<Sampler> {
        &self.samplers[filter as usize * AddressMode::ALL.len() + mode as usize]
    }

    /// Number of samplers held.
    pub fn len(&self) -> usize {
        self.samplers.len()
    }

    /// Always false once built.
    pub fn is_empty(&self) -> bool {
        self.samplers.is_empty()
    }
}
