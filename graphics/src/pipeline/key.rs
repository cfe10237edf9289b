//! Pipeline configuration axes and keys.

use std::fmt::Debug;
use std::hash::Hash;

/// One axis of the pipeline permutation table.
pub trait PipelineAxis: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Every value of the axis, in index order.
    const ALL: &'static [Self];

    /// Position of this value in [`ALL`](Self::ALL).
    fn index(self) -> usize;
}

macro_rules! pipeline_axis {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl PipelineAxis for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn index(self) -> usize {
                self as usize
            }
        }
    };
}

pipeline_axis! {
    /// Which image shader pair a pipeline uses.
    ShaderFamily {
        /// Plain textured quad.
        Image,
        /// Quad that extracts a normal map (`texel * 2 - 1`).
        SeparateNormalMap,
        /// Quad modulated by a mask texture.
        Masked,
        /// Fullscreen triangle.
        Fullscreen,
    }
}

pipeline_axis! {
    /// Output blending.
    BlendMode {
        /// Source-alpha blending; destination alpha accumulates.
        Alpha,
        /// Premultiplied alpha.
        Premultiplied,
        /// No blending.
        Opaque,
        /// Additive color, destination alpha kept.
        Additive,
    }
}

pipeline_axis! {
    /// Stencil comparison applied while drawing.
    StencilMode {
        /// No stencil test and no depth/stencil target.
        Disabled,
        /// Pass if equal.
        Equal,
        /// Pass if less.
        Less,
        /// Pass if less or equal.
        LessEqual,
        /// Pass if greater.
        Greater,
        /// Pass if greater or equal.
        GreaterEqual,
        /// Pass if not equal.
        NotEqual,
    }
}

pipeline_axis! {
    /// Which bits of the stencil value the test reads.
    StencilRefMode {
        /// Low nibble, written by the engine.
        Engine,
        /// High nibble, free for user content.
        User,
        /// All eight bits.
        All,
    }
}

pipeline_axis! {
    /// Color target encoding.
    OutputEncoding {
        /// Back-buffer format.
        Standard,
        /// Floating-point target for HDR composition.
        ExtendedRange,
    }
}

pipeline_axis! {
    /// Texture reconstruction filter implemented in the pixel shader.
    SamplingQuality {
        /// Hardware filtering.
        Simple,
        /// Bicubic filtering in the shader.
        Bicubic,
    }
}

/// Stencil read mask covering the engine bits.
pub const STENCIL_MASK_ENGINE: u8 = 0x0F;
/// Stencil read mask covering the user bits.
pub const STENCIL_MASK_USER: u8 = 0xF0;
/// Stencil read mask covering all bits.
pub const STENCIL_MASK_ALL: u8 = 0xFF;

impl StencilRefMode {
    /// Read mask used by the depth/stencil state for this mode.
    pub fn read_mask(self) -> u8 {
        match self {
            Self::Engine => STENCIL_MASK_ENGINE,
            Self::User => STENCIL_MASK_USER,
            Self::All => STENCIL_MASK_ALL,
        }
    }
}

/// Full configuration key of one pipeline object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineKey {
    /// Shader family.
    pub family: ShaderFamily,
    /// Blend mode.
    pub blend: BlendMode,
    /// Stencil comparison.
    pub stencil: StencilMode,
    /// Stencil read mask selection.
    pub stencil_ref: StencilRefMode,
    /// Output encoding.
    pub output: OutputEncoding,
    /// Sampling quality.
    pub sampling: SamplingQuality,
}

impl Default for PipelineKey {
    fn default() -> Self {
        Self {
            family: ShaderFamily::Image,
            blend: BlendMode::Alpha,
            stencil: StencilMode::Disabled,
            stencil_ref: StencilRefMode::All,
            output: OutputEncoding::Standard,
            sampling: SamplingQuality::Simple,
        }
    }
}

/// The declared value set of every axis.
///
/// The cache is built for the Cartesian product of these sets. Values keep
/// the order they were declared in; duplicates are ignored.
///
/// # Example
///
/// ```ignore
/// let axes = PipelineAxes::new()
///     .with_shader_families(&[ShaderFamily::Image, ShaderFamily::Fullscreen])
///     .with_blend_modes(&[BlendMode::Alpha, BlendMode::Opaque]);
/// assert_eq!(axes.permutation_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineAxes {
    pub(crate) families: Vec<ShaderFamily>,
    pub(crate) blends: Vec<BlendMode>,
    pub(crate) stencils: Vec<StencilMode>,
    pub(crate) stencil_refs: Vec<StencilRefMode>,
    pub(crate) outputs: Vec<OutputEncoding>,
    pub(crate) samplings: Vec<SamplingQuality>,
}

impl Default for PipelineAxes {
    fn default() -> Self {
        Self::new()
    }
}

fn dedup<T: PipelineAxis>(values: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(values.len());
    for &value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

impl PipelineAxes {
    /// One value per axis: the values of [`PipelineKey::default`].
    pub fn new() -> Self {
        let key = PipelineKey::default();
        Self {
            families: vec![key.family],
            blends: vec![key.blend],
            stencils: vec![key.stencil],
            stencil_refs: vec![key.stencil_ref],
            outputs: vec![key.output],
            samplings: vec![key.sampling],
        }
    }

    /// Every value of every axis.
    pub fn full() -> Self {
        Self {
            families: ShaderFamily::ALL.to_vec(),
            blends: BlendMode::ALL.to_vec(),
            stencils: StencilMode::ALL.to_vec(),
            stencil_refs: StencilRefMode::ALL.to_vec(),
            outputs: OutputEncoding::ALL.to_vec(),
            samplings: SamplingQuality::ALL.to_vec(),
        }
    }

    /// Declare the shader families.
    pub fn with_shader_families(mut self, values: &[ShaderFamily]) -> Self {
        self.families = dedup(values);
        self
    }

    /// Declare the blend modes.
    pub fn with_blend_modes(mut self, values: &[BlendMode]) -> Self {
        self.blends = dedup(values);
        self
    }

    /// Declare the stencil modes.
    pub fn with_stencil_modes(mut self, values: &[StencilMode]) -> Self {
        self.stencils = dedup(values);
        self
    }

    /// Declare the stencil ref modes.
    pub fn with_stencil_ref_modes(mut self, values: &[StencilRefMode]) -> Self {
        self.stencil_refs = dedup(values);
        self
    }

    /// Declare the output encodings.
    pub fn with_output_encodings(mut self, values: &[OutputEncoding]) -> Self {
        self.outputs = dedup(values);
        self
    }

    /// Declare the sampling qualities.
    pub fn with_sampling_qualities(mut self, values: &[SamplingQuality]) -> Self {
        self.samplings = dedup(values);
        self
    }

    /// Declared shader families.
    pub fn shader_families(&self) -> &[ShaderFamily] {
        &self.families
    }

    /// Declared blend modes.
    pub fn blend_modes(&self) -> &[BlendMode] {
        &self.blends
    }

    /// Declared stencil modes.
    pub fn stencil_modes(&self) -> &[StencilMode] {
        &self.stencils
    }

    /// Declared stencil ref modes.
    pub fn stencil_ref_modes(&self) -> &[StencilRefMode] {
        &self.stencil_refs
    }

    /// Declared output encodings.
    pub fn output_encodings(&self) -> &[OutputEncoding] {
        &self.outputs
    }

    /// Declared sampling qualities.
    pub fn sampling_qualities(&self) -> &[SamplingQuality] {
        &self.samplings
    }

    /// Number of pipelines the axes describe.
    pub fn permutation_count(&self) -> usize {
        self.families.len()
            * self.blends.len()
            * self.stencils.len()
            * self.stencil_refs.len()
            * self.outputs.len()
            * self.samplings.len()
    }

    /// Returns true if every component of `key` is declared.
    pub fn contains(&self, key: &PipelineKey) -> bool {
        self.families.contains(&key.family)
            && self.blends.contains(&key.blend)
            && self.stencils.contains(&key.stencil)
            && self.stencil_refs.contains(&key.stencil_ref)
            && self.outputs.contains(&key.output)
            && self.samplings.contains(&key.sampling)
    }

    /// Every declared key, in table order.
    pub fn keys(&self) -> impl Iterator<Item = PipelineKey> + '_ {
        self.families.iter().flat_map(move |&family| {
            self.blends.iter().flat_map(move |&blend| {
                self.stencils.iter().flat_map(move |&stencil| {
                    self.stencil_refs.iter().flat_map(move |&stencil_ref| {
                        self.outputs.iter().flat_map(move |&output| {
                            self.samplings.iter().map(move |&sampling| PipelineKey {
                                family,
                                blend,
                                stencil,
                                stencil_ref,
                                output,
                                sampling,
                            })
                        })
                    })
                })
            })
        })
    }
}
