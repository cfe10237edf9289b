//! Dense pipeline permutation table.

use std::collections::HashMap;
use std::sync::Arc;

use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::resources::{
    BlendState, DepthStencilState, PipelineState, PipelineStateDescriptor, Shader,
};
use crate::types::{
    BlendStateDescriptor, CompareFunction, DepthStencilStateDescriptor, PrimitiveTopology,
    RasterizerStateDescriptor, ShaderStage, TextureFormat,
};

use super::key::{
    BlendMode, OutputEncoding, PipelineAxes, PipelineAxis, PipelineKey, SamplingQuality,
    ShaderFamily, StencilMode, StencilRefMode,
};
use super::shaders::ShaderProvider;

/// Depth/stencil format of pipelines that test stencil.
pub const DEPTH_STENCIL_FORMAT: TextureFormat = TextureFormat::Depth32FloatStencil8;

/// Color format of extended-range (HDR) pipelines.
pub const EXTENDED_RANGE_FORMAT: TextureFormat = TextureFormat::Rgba16Float;

impl BlendMode {
    /// Blend state descriptor for this mode.
    pub fn descriptor(self) -> BlendStateDescriptor {
        match self {
            Self::Alpha => BlendStateDescriptor::alpha_blending(),
            Self::Premultiplied => BlendStateDescriptor::premultiplied_alpha(),
            Self::Opaque => BlendStateDescriptor::opaque(),
            Self::Additive => BlendStateDescriptor::additive(),
        }
    }
}

impl StencilMode {
    /// Comparison function, `None` when the stencil test is disabled.
    pub fn compare_function(self) -> Option<CompareFunction> {
        match self {
            Self::Disabled => None,
            Self::Equal => Some(CompareFunction::Equal),
            Self::Less => Some(CompareFunction::Less),
            Self::LessEqual => Some(CompareFunction::LessEqual),
            Self::Greater => Some(CompareFunction::Greater),
            Self::GreaterEqual => Some(CompareFunction::GreaterEqual),
            Self::NotEqual => Some(CompareFunction::NotEqual),
        }
    }

    /// Depth/stencil state descriptor for this mode with the given read mask.
    pub fn descriptor(self, ref_mode: StencilRefMode) -> DepthStencilStateDescriptor {
        match self.compare_function() {
            Some(compare) => DepthStencilStateDescriptor::stencil_test(compare, ref_mode.read_mask()),
            None => DepthStencilStateDescriptor::disabled(),
        }
    }

    /// Depth/stencil target format pipelines of this mode are built for.
    pub fn target_format(self) -> Option<TextureFormat> {
        match self {
            Self::Disabled => None,
            _ => Some(DEPTH_STENCIL_FORMAT),
        }
    }
}

/// Maps axis values to their position among the declared values.
#[derive(Debug, Clone)]
struct SlotTable {
    slots: Vec<Option<usize>>,
    len: usize,
}

impl SlotTable {
    fn new<T: PipelineAxis>(declared: &[T]) -> Self {
        let mut slots = vec![None; T::ALL.len()];
        for (slot, value) in declared.iter().enumerate() {
            slots[value.index()] = Some(slot);
        }
        Self {
            slots,
            len: declared.len(),
        }
    }

    #[inline]
    fn slot<T: PipelineAxis>(&self, value: T) -> Option<usize> {
        self.slots[value.index()]
    }
}

/// Immutable table holding one pipeline object per declared [`PipelineKey`].
///
/// Built once before the first frame; afterwards lookups are pure index
/// arithmetic over a flat vector, so the cache can be shared by every
/// recording thread without locking.
#[derive(Debug)]
pub struct PipelineCache {
    axes: PipelineAxes,
    families: SlotTable,
    blends: SlotTable,
    stencils: SlotTable,
    stencil_refs: SlotTable,
    outputs: SlotTable,
    samplings: SlotTable,
    pipelines: Vec<Arc<PipelineState>>,
}

static_assertions::assert_impl_all!(PipelineCache: Send, Sync);

impl PipelineCache {
    /// Build every pipeline the axes describe.
    ///
    /// A family without a bicubic pixel shader falls back to its simple
    /// shader for the bicubic slot.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::PipelineBuild`] if an axis declares no
    /// values or a required shader is missing, and the device error if an
    /// object cannot be created.
    pub fn build(
        device: &GraphicsDevice,
        shaders: &dyn ShaderProvider,
        axes: &PipelineAxes,
    ) -> Result<Self, GraphicsError> {
        cinder_core::profile_function!();

        check_declared("shader family", axes.shader_families())?;
        check_declared("blend mode", axes.blend_modes())?;
        check_declared("stencil mode", axes.stencil_modes())?;
        check_declared("stencil ref mode", axes.stencil_ref_modes())?;
        check_declared("output encoding", axes.output_encodings())?;
        check_declared("sampling quality", axes.sampling_qualities())?;

        let mut vertex_shaders: HashMap<ShaderFamily, Arc<Shader>> = HashMap::new();
        let mut pixel_shaders: HashMap<(ShaderFamily, SamplingQuality), Arc<Shader>> =
            HashMap::new();
        for &family in axes.shader_families() {
            let vs_name = family.vertex_shader_name();
            let vs = shaders
                .load(vs_name, ShaderStage::Vertex)
                .ok_or_else(|| missing_shader(vs_name, family))?;
            vertex_shaders.insert(family, vs);

            let simple_name = family.pixel_shader_name(SamplingQuality::Simple);
            let simple = shaders.load(simple_name, ShaderStage::Pixel);
            for &sampling in axes.sampling_qualities() {
                let shader = match sampling {
                    SamplingQuality::Simple => simple.clone(),
                    SamplingQuality::Bicubic => {
                        let name = family.pixel_shader_name(SamplingQuality::Bicubic);
                        match shaders.load(name, ShaderStage::Pixel) {
                            Some(shader) => Some(shader),
                            None => {
                                log::warn!(
                                    "PipelineCache: '{name}' is missing, {family:?} falls back to '{simple_name}'"
                                );
                                simple.clone()
                            }
                        }
                    }
                };
                let shader = shader.ok_or_else(|| missing_shader(simple_name, family))?;
                pixel_shaders.insert((family, sampling), shader);
            }
        }

        let rasterizer = device.create_rasterizer_state(&RasterizerStateDescriptor::overlay())?;

        let mut blend_states: HashMap<BlendMode, Arc<BlendState>> = HashMap::new();
        for &blend in axes.blend_modes() {
            blend_states.insert(blend, device.create_blend_state(&blend.descriptor())?);
        }

        let mut depth_stencil_states: HashMap<(StencilMode, StencilRefMode), Arc<DepthStencilState>> =
            HashMap::new();
        for &stencil in axes.stencil_modes() {
            for &stencil_ref in axes.stencil_ref_modes() {
                let state = device.create_depth_stencil_state(&stencil.descriptor(stencil_ref))?;
                depth_stencil_states.insert((stencil, stencil_ref), state);
            }
        }

        let back_buffer_format = device.back_buffer_format();
        let mut pipelines = Vec::with_capacity(axes.permutation_count());
        for key in axes.keys() {
            let descriptor = PipelineStateDescriptor {
                label: Some(format!(
                    "image/{:?}/{:?}/{:?}/{:?}/{:?}/{:?}",
                    key.family, key.blend, key.stencil, key.stencil_ref, key.output, key.sampling
                )),
                vertex_shader: Arc::clone(&vertex_shaders[&key.family]),
                pixel_shader: Arc::clone(&pixel_shaders[&(key.family, key.sampling)]),
                blend: Arc::clone(&blend_states[&key.blend]),
                depth_stencil: Arc::clone(&depth_stencil_states[&(key.stencil, key.stencil_ref)]),
                rasterizer: Arc::clone(&rasterizer),
                topology: PrimitiveTopology::TriangleStrip,
                color_format: match key.output {
                    OutputEncoding::Standard => back_buffer_format,
                    OutputEncoding::ExtendedRange => EXTENDED_RANGE_FORMAT,
                },
                depth_stencil_format: key.stencil.target_format(),
                sample_count: 1,
            };
            pipelines.push(device.create_pipeline_state(&descriptor)?);
        }

        log::debug!(
            "PipelineCache: built {} pipelines on '{}'",
            pipelines.len(),
            device.name()
        );

        Ok(Self {
            axes: axes.clone(),
            families: SlotTable::new(axes.shader_families()),
            blends: SlotTable::new(axes.blend_modes()),
            stencils: SlotTable::new(axes.stencil_modes()),
            stencil_refs: SlotTable::new(axes.stencil_ref_modes()),
            outputs: SlotTable::new(axes.output_encodings()),
            samplings: SlotTable::new(axes.sampling_qualities()),
            pipelines,
        })
    }

    #[inline]
    fn flat_index(&self, key: &PipelineKey) -> Option<usize> {
        let mut index = self.families.slot(key.family)?;
        index = index * self.blends.len + self.blends.slot(key.blend)?;
        index = index * self.stencils.len + self.stencils.slot(key.stencil)?;
        index = index * self.stencil_refs.len + self.stencil_refs.slot(key.stencil_ref)?;
        index = index * self.outputs.len + self.outputs.slot(key.output)?;
        index = index * self.samplings.len + self.samplings.slot(key.sampling)?;
        Some(index)
    }

    /// The pipeline for `key`, or `None` if the key is outside the declared axes.
    #[inline]
    pub fn get(&self, key: &PipelineKey) -> Option<&Arc<PipelineState>> {
        self.flat_index(key).map(|index| &self.pipelines[index])
    }

    /// The pipeline for `key`.
    ///
    /// # Panics
    ///
    /// Panics if any component of `key` was not declared when the cache was built.
    #[inline]
    pub fn lookup(&self, key: &PipelineKey) -> &Arc<PipelineState> {
        match self.get(key) {
            Some(pipeline) => pipeline,
            None => panic!("pipeline key {key:?} is outside the declared axes"),
        }
    }

    /// The axes the cache was built for.
    pub fn axes(&self) -> &PipelineAxes {
        &self.axes
    }

    /// Number of pipelines held.
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Returns true if the cache holds no pipelines.
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Every pipeline, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (PipelineKey, &Arc<PipelineState>)> {
        self.axes.keys().zip(self.pipelines.iter())
    }
}

fn check_declared<T: PipelineAxis>(axis: &str, values: &[T]) -> Result<(), GraphicsError> {
    if values.is_empty() {
        return Err(GraphicsError::PipelineBuild(format!(
            "no {axis} values declared"
        )));
    }
    Ok(())
}

fn missing_shader(name: &str, family: ShaderFamily) -> GraphicsError {
    GraphicsError::PipelineBuild(format!(
        "shader '{name}' required by {family:?} is not available"
    ))
}
