//! Textured quad and fullscreen image drawing.
//!
//! [`ImageRenderer`] is the hot-path consumer of the [`PipelineCache`]: every
//! draw resolves an [`ImageParams`] to a [`PipelineKey`], picks a sampler,
//! uploads [`ImageConstants`] and records a 3-vertex (fullscreen) or
//! 4-vertex (quad strip) draw.

use std::sync::Arc;

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::command::CommandContext;
use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::pipeline::{
    BlendMode, OutputEncoding, PipelineAxes, PipelineCache, PipelineKey, STENCIL_MASK_ENGINE,
    SamplerCache, SamplerFilter, SamplingQuality, ShaderFamily, ShaderProvider, StencilMode,
    StencilRefMode,
};
use crate::resources::{Buffer, ResourceId, Texture};
use crate::types::{AddressMode, BufferDescriptor};

/// Shader slot of the drawn texture.
pub const TEXTURE_SLOT: u32 = 0;
/// Shader slot of the mask texture.
pub const MASK_SLOT: u32 = 1;
/// Sampler slot used by image shaders.
pub const SAMPLER_SLOT: u32 = 0;
/// Constant buffer slot of [`ImageConstants`].
pub const CONSTANT_SLOT: u32 = 0;

/// Stencil reference of pixels the engine has not tagged.
pub const STENCIL_REF_EMPTY: u8 = 0;

/// Pack an engine and a user stencil reference into one value.
///
/// The engine owns the low nibble and user content the high nibble; see
/// [`StencilRefMode`].
pub fn combine_stencil_refs(engine: u8, user: u8) -> u8 {
    (user << 4) | (engine & STENCIL_MASK_ENGINE)
}

bitflags! {
    /// Optional features of an image draw.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ImageFlags: u32 {
        /// Sample a sub-rectangle of the texture.
        const DRAW_RECT = 1 << 0;
        /// Sample a sub-rectangle of the mask.
        const DRAW_RECT2 = 1 << 1;
        /// Mirror horizontally.
        const MIRROR = 1 << 2;
        /// Decode the texture as a normal map.
        const EXTRACT_NORMAL_MAP = 1 << 3;
        /// Render into the extended-range target.
        const HDR = 1 << 4;
        /// Cover the whole target with a single triangle.
        const FULLSCREEN = 1 << 5;
    }
}

/// Texture filtering requested by an image draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageQuality {
    /// Point sampling.
    Nearest,
    /// Trilinear filtering.
    #[default]
    Linear,
    /// Anisotropic filtering.
    Anisotropic,
    /// Bicubic filtering done in the pixel shader.
    Bicubic,
}

impl ImageQuality {
    /// Sampling axis of the pipeline key.
    pub fn sampling(self) -> SamplingQuality {
        match self {
            Self::Bicubic => SamplingQuality::Bicubic,
            _ => SamplingQuality::Simple,
        }
    }

    /// Hardware filter bound alongside the shader.
    pub fn sampler_filter(self) -> SamplerFilter {
        match self {
            Self::Nearest => SamplerFilter::Point,
            Self::Linear | Self::Bicubic => SamplerFilter::Linear,
            Self::Anisotropic => SamplerFilter::Anisotropic,
        }
    }
}

/// Everything that describes one image draw.
///
/// Positions and sizes are in screen pixels with the origin in the top-left
/// corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageParams {
    /// Position of the pivot.
    pub pos: Vec3,
    /// Size in pixels.
    pub size: Vec2,
    /// Additional scale applied to `size`.
    pub scale: Vec2,
    /// Pivot in normalized quad coordinates.
    pub pivot: Vec2,
    /// Quad corners in normalized coordinates (top-left, top-right, bottom-left, bottom-right).
    pub corners: [Vec2; 4],
    /// Rotation around the pivot in radians.
    pub rotation: f32,
    /// Tint color.
    pub color: Vec4,
    /// Fade towards black, `0` is none.
    pub fade: f32,
    /// Alpha multiplier.
    pub opacity: f32,
    /// Mip level sampled by the shader.
    pub mip_level: f32,
    /// Texture sub-rectangle in pixels: x, y, width, height.
    pub draw_rect: Vec4,
    /// Mask sub-rectangle in pixels: x, y, width, height.
    pub draw_rect2: Vec4,
    /// Texture coordinate offset in pixels.
    pub tex_offset: Vec2,
    /// Mask coordinate offset in pixels.
    pub tex_offset2: Vec2,
    /// Optional features.
    pub flags: ImageFlags,
    /// Blend mode.
    pub blend: BlendMode,
    /// Stencil comparison.
    pub stencil_compare: StencilMode,
    /// Stencil reference value.
    pub stencil_ref: u8,
    /// Which stencil bits `stencil_ref` is compared against.
    pub stencil_ref_mode: StencilRefMode,
    /// Addressing outside the texture.
    pub sample_mode: AddressMode,
    /// Filtering.
    pub quality: ImageQuality,
    /// Optional mask texture.
    pub mask: Option<ResourceId>,
}

impl Default for ImageParams {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            size: Vec2::ONE,
            scale: Vec2::ONE,
            pivot: Vec2::ZERO,
            corners: [
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 1.0),
            ],
            rotation: 0.0,
            color: Vec4::ONE,
            fade: 0.0,
            opacity: 1.0,
            mip_level: 0.0,
            draw_rect: Vec4::ZERO,
            draw_rect2: Vec4::ZERO,
            tex_offset: Vec2::ZERO,
            tex_offset2: Vec2::ZERO,
            flags: ImageFlags::empty(),
            blend: BlendMode::Alpha,
            stencil_compare: StencilMode::Disabled,
            stencil_ref: 0,
            stencil_ref_mode: StencilRefMode::All,
            sample_mode: AddressMode::Mirror,
            quality: ImageQuality::Linear,
            mask: None,
        }
    }
}

impl ImageParams {
    /// A quad at `(x, y)` of `width` x `height` pixels.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec3::new(x, y, 0.0),
            size: Vec2::new(width, height),
            ..Default::default()
        }
    }

    /// A fullscreen draw.
    pub fn fullscreen() -> Self {
        Self::default().with_fullscreen()
    }

    /// Cover the whole target.
    pub fn with_fullscreen(mut self) -> Self {
        self.flags |= ImageFlags::FULLSCREEN;
        self
    }

    /// Render into the extended-range target.
    pub fn with_hdr(mut self) -> Self {
        self.flags |= ImageFlags::HDR;
        self
    }

    /// Mirror horizontally.
    pub fn with_mirror(mut self) -> Self {
        self.flags |= ImageFlags::MIRROR;
        self
    }

    /// Decode the texture as a normal map.
    pub fn with_normal_map_extraction(mut self) -> Self {
        self.flags |= ImageFlags::EXTRACT_NORMAL_MAP;
        self
    }

    /// Sample only `rect` (x, y, width, height in pixels) of the texture.
    pub fn with_draw_rect(mut self, rect: Vec4) -> Self {
        self.draw_rect = rect;
        self.flags |= ImageFlags::DRAW_RECT;
        self
    }

    /// Sample only `rect` of the mask.
    pub fn with_draw_rect2(mut self, rect: Vec4) -> Self {
        self.draw_rect2 = rect;
        self.flags |= ImageFlags::DRAW_RECT2;
        self
    }

    /// Modulate the texture by `mask`.
    pub fn with_mask(mut self, mask: impl crate::resources::GpuResource) -> Self {
        self.mask = Some(mask.resource_id());
        self
    }

    /// Set the blend mode.
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    /// Draw only where the stencil value compares to `reference`.
    pub fn with_stencil(mut self, compare: StencilMode, reference: u8) -> Self {
        self.stencil_compare = compare;
        self.stencil_ref = reference;
        self
    }

    /// Select the stencil bits the reference is compared against.
    pub fn with_stencil_ref_mode(mut self, mode: StencilRefMode) -> Self {
        self.stencil_ref_mode = mode;
        self
    }

    /// Set the filtering quality.
    pub fn with_quality(mut self, quality: ImageQuality) -> Self {
        self.quality = quality;
        self
    }

    /// Set the address mode.
    pub fn with_sample_mode(mut self, mode: AddressMode) -> Self {
        self.sample_mode = mode;
        self
    }

    /// Set the tint color.
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    /// Set the fade amount.
    pub fn with_fade(mut self, fade: f32) -> Self {
        self.fade = fade;
        self
    }

    /// Set the opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set the pivot in normalized quad coordinates.
    pub fn with_pivot(mut self, pivot: Vec2) -> Self {
        self.pivot = pivot;
        self
    }

    /// Set the rotation in radians.
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the scale.
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Returns true if the draw covers the whole target.
    pub fn is_fullscreen(&self) -> bool {
        self.flags.contains(ImageFlags::FULLSCREEN)
    }

    /// Shader family this draw uses.
    pub fn shader_family(&self) -> ShaderFamily {
        if self.is_fullscreen() {
            ShaderFamily::Fullscreen
        } else if self.flags.contains(ImageFlags::EXTRACT_NORMAL_MAP) {
            ShaderFamily::SeparateNormalMap
        } else if self.mask.is_some() {
            ShaderFamily::Masked
        } else {
            ShaderFamily::Image
        }
    }

    /// The pipeline this draw binds.
    pub fn pipeline_key(&self) -> PipelineKey {
        PipelineKey {
            family: self.shader_family(),
            blend: self.blend,
            stencil: self.stencil_compare,
            stencil_ref: self.stencil_ref_mode,
            output: if self.flags.contains(ImageFlags::HDR) {
                OutputEncoding::ExtendedRange
            } else {
                OutputEncoding::Standard
            },
            sampling: self.quality.sampling(),
        }
    }

    /// Stencil reference bound for the draw.
    pub fn effective_stencil_ref(&self) -> u8 {
        match self.stencil_ref_mode {
            StencilRefMode::User => combine_stencil_refs(STENCIL_REF_EMPTY, self.stencil_ref),
            _ => self.stencil_ref,
        }
    }
}

/// Per-draw shader constants.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ImageConstants {
    /// Clip-space position of each quad corner.
    pub corners: [[f32; 4]; 4],
    /// Texture coordinate multiply (xy) and add (zw).
    pub tex_mul_add: [f32; 4],
    /// Mask coordinate multiply (xy) and add (zw).
    pub tex_mul_add2: [f32; 4],
    /// Final tint.
    pub color: [f32; 4],
    /// Non-zero to mirror horizontally.
    pub mirror: u32,
    /// Sampled mip level.
    pub mip_level: f32,
    /// Padding to a 16-byte multiple.
    pub _padding: [f32; 2],
}

static_assertions::const_assert_eq!(std::mem::size_of::<ImageConstants>(), 128);

impl ImageConstants {
    /// Constants of a fullscreen draw: only color, mirror and mip level matter.
    pub fn fullscreen(params: &ImageParams) -> Self {
        let darken = 1.0 - params.fade;
        let color = Vec4::new(
            params.color.x * darken,
            params.color.y * darken,
            params.color.z * darken,
            params.color.w * params.opacity,
        );
        Self {
            color: color.to_array(),
            mirror: u32::from(params.flags.contains(ImageFlags::MIRROR)),
            mip_level: params.mip_level,
            ..Zeroable::zeroed()
        }
    }

    /// Constants of a quad draw of a `texture_size` texture on a `screen_size` target.
    pub fn quad(params: &ImageParams, texture_size: Vec2, screen_size: Vec2) -> Self {
        let mut constants = Self::fullscreen(params);

        let projection = Mat4::orthographic_lh(0.0, screen_size.x, screen_size.y, 0.0, -1.0, 1.0);
        let transform = projection
            * Mat4::from_translation(params.pos)
            * Mat4::from_rotation_z(params.rotation)
            * Mat4::from_scale(Vec3::new(
                params.scale.x * params.size.x,
                params.scale.y * params.size.y,
                1.0,
            ));
        for (out, corner) in constants.corners.iter_mut().zip(params.corners) {
            let local = corner - params.pivot;
            *out = (transform * Vec4::new(local.x, local.y, 0.0, 1.0)).to_array();
        }

        let inv_size = Vec2::ONE / texture_size.max(Vec2::ONE);
        constants.tex_mul_add = tex_mul_add(
            params.flags.contains(ImageFlags::DRAW_RECT).then_some(params.draw_rect),
            params.tex_offset,
            inv_size,
        );
        constants.tex_mul_add2 = tex_mul_add(
            params.flags.contains(ImageFlags::DRAW_RECT2).then_some(params.draw_rect2),
            params.tex_offset2,
            inv_size,
        );
        constants
    }
}

fn tex_mul_add(rect: Option<Vec4>, offset: Vec2, inv_size: Vec2) -> [f32; 4] {
    let mut mul_add = match rect {
        Some(rect) => Vec4::new(
            rect.z * inv_size.x,
            rect.w * inv_size.y,
            rect.x * inv_size.x,
            rect.y * inv_size.y,
        ),
        None => Vec4::new(1.0, 1.0, 0.0, 0.0),
    };
    mul_add.z += offset.x * inv_size.x;
    mul_add.w += offset.y * inv_size.y;
    mul_add.to_array()
}

/// Records image draws.
///
/// Owns the pipeline and sampler tables and the constant buffer the draws
/// upload into. Shared by reference between recording threads.
#[derive(Debug)]
pub struct ImageRenderer {
    pipelines: PipelineCache,
    samplers: SamplerCache,
    constants: Arc<Buffer>,
    screen_size: Vec2,
}

static_assertions::assert_impl_all!(ImageRenderer: Send, Sync);

impl ImageRenderer {
    /// Build the pipeline and sampler tables for `axes`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::PipelineBuild`] if a required shader is
    /// missing, or the device error if an object cannot be created.
    pub fn new(
        device: &GraphicsDevice,
        shaders: &dyn ShaderProvider,
        axes: &PipelineAxes,
    ) -> Result<Self, GraphicsError> {
        let pipelines = PipelineCache::build(device, shaders, axes)?;
        let samplers = SamplerCache::build(device)?;
        let constants = device.create_buffer(
            &BufferDescriptor::constants::<ImageConstants>().with_label("image constants"),
        )?;
        log::info!(
            "ImageRenderer: {} pipelines, {} samplers",
            pipelines.len(),
            samplers.len()
        );
        Ok(Self {
            pipelines,
            samplers,
            constants,
            screen_size: Vec2::ONE,
        })
    }

    /// The pipeline table.
    pub fn pipelines(&self) -> &PipelineCache {
        &self.pipelines
    }

    /// The sampler table.
    pub fn samplers(&self) -> &SamplerCache {
        &self.samplers
    }

    /// The constant buffer draws upload into.
    pub fn constant_buffer(&self) -> &Arc<Buffer> {
        &self.constants
    }

    /// Set the target size used to project quad corners.
    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    /// Record a draw of `texture` described by `params`.
    ///
    /// # Panics
    ///
    /// Panics if the draw resolves to a pipeline key outside the axes the
    /// renderer was built for.
    pub fn draw(&self, ctx: &mut CommandContext, texture: &Texture, params: &ImageParams) {
        let range = ctx.begin_range("Image");

        ctx.bind_resource(TEXTURE_SLOT, texture);
        ctx.bind_stencil_ref(params.effective_stencil_ref());
        ctx.bind_sampler(
            SAMPLER_SLOT,
            self.samplers
                .get(params.quality.sampler_filter(), params.sample_mode),
        );

        let pipeline = self.pipelines.lookup(&params.pipeline_key());

        if params.is_fullscreen() {
            ctx.bind_pipeline(pipeline);
            ctx.update_buffer(&self.constants, &ImageConstants::fullscreen(params));
            ctx.bind_constant_buffer(CONSTANT_SLOT, &self.constants);
            ctx.draw(3, 0);
            ctx.end_range(range);
            return;
        }

        let texture_size = Vec2::new(texture.width() as f32, texture.height() as f32);
        let constants = ImageConstants::quad(params, texture_size, self.screen_size);
        ctx.update_buffer(&self.constants, &constants);
        ctx.bind_pipeline(pipeline);
        ctx.bind_constant_buffer(CONSTANT_SLOT, &self.constants);
        if let Some(mask) = params.mask {
            ctx.bind_resource(MASK_SLOT, &mask);
        }
        ctx.draw(4, 0);

        ctx.end_range(range);
    }
}
