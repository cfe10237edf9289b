//! Pipeline state permutation cache.
//!
//! Image and fullscreen draws select one of many pipeline objects by six
//! independent render-state axes. All of them are built up front by
//! [`PipelineCache::build`]; the hot path only does index arithmetic.
//!
//! ```text
//! ┌──────────────────────┐   ┌────────────────────┐
//! │ PipelineAxes         │   │ ShaderProvider     │
//! │  declared values     │   │  name -> Shader    │
//! └──────────┬───────────┘   └─────────┬──────────┘
//!            └────────────┬────────────┘
//!                         ▼
//!            ┌─────────────────────────┐
//!            │ PipelineCache::build    │  blend state per mode,
//!            │  Cartesian product      │  depth/stencil per mode x ref,
//!            └────────────┬────────────┘  one shared rasterizer
//!                         ▼
//!            ┌─────────────────────────┐
//!            │ lookup(&PipelineKey)    │  flat Vec, per-axis slot tables
//!            └─────────────────────────┘
//! ```
//!
//! # Axes
//!
//! | Axis | Values |
//! |------|--------|
//! | [`ShaderFamily`] | image, separate normal map, masked, fullscreen |
//! | [`BlendMode`] | alpha, premultiplied, opaque, additive |
//! | [`StencilMode`] | disabled, `==`, `<`, `<=`, `>`, `>=`, `!=` |
//! | [`StencilRefMode`] | engine (`0x0F`), user (`0xF0`), all (`0xFF`) |
//! | [`OutputEncoding`] | back-buffer format, `Rgba16Float` |
//! | [`SamplingQuality`] | hardware filtering, bicubic |
//!
//! # Example
//!
//! ```ignore
//! let shaders = MapShaderProvider::image_shaders(&device)?;
//! let cache = PipelineCache::build(&device, &shaders, &PipelineAxes::full())?;
//! let pipeline = cache.lookup(&PipelineKey {
//!     blend: BlendMode::Additive,
//!     ..Default::default()
//! });
//! ctx.bind_pipeline(pipeline);
//! ```

mod cache;
mod key;
mod samplers;
mod shaders;

pub use cache::{DEPTH_STENCIL_FORMAT, EXTENDED_RANGE_FORMAT, PipelineCache};
pub use key::{
    BlendMode, OutputEncoding, PipelineAxes, PipelineAxis, PipelineKey, STENCIL_MASK_ALL,
    STENCIL_MASK_ENGINE, STENCIL_MASK_USER, SamplingQuality, ShaderFamily, StencilMode,
    StencilRefMode,
};
pub use samplers::{MAX_ANISOTROPY, SamplerCache, SamplerFilter};
pub use shaders::{IMAGE_VERTEX_SHADER, MapShaderProvider, SCREEN_VERTEX_SHADER, ShaderProvider};
