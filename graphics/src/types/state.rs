//! Fixed-function state descriptors.
//!
//! These describe the blend, depth/stencil and rasterizer state objects that
//! the device bakes into pipeline objects. They are plain values; the device
//! turns them into [`GpuObject`](crate::resources::GpuObject)-backed handles.

/// Shader stage in the graphics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Geometry shader.
    Geometry,
    /// Pixel (fragment) shader.
    Pixel,
    /// Compute shader.
    Compute,
}

/// Primitive assembly topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Independent triangles.
    #[default]
    TriangleList,
    /// Triangle strip (used by quad draws).
    TriangleStrip,
    /// Independent lines.
    LineList,
}

/// Blend factor for blending operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendFactor {
    /// 0.0
    #[default]
    Zero,
    /// 1.0
    One,
    /// Source alpha
    SrcAlpha,
    /// 1 - source alpha
    OneMinusSrcAlpha,
    /// Destination alpha
    DstAlpha,
    /// 1 - destination alpha
    OneMinusDstAlpha,
}

/// Blend operation for combining colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOperation {
    /// source + destination
    #[default]
    Add,
    /// source - destination
    Subtract,
    /// destination - source
    ReverseSubtract,
    /// min(source, destination)
    Min,
    /// max(source, destination)
    Max,
}

/// Blend component configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponent {
    /// Source factor.
    pub src_factor: BlendFactor,
    /// Destination factor.
    pub dst_factor: BlendFactor,
    /// Blend operation.
    pub operation: BlendOperation,
}

impl Default for BlendComponent {
    fn default() -> Self {
        Self::new(BlendFactor::One, BlendFactor::Zero)
    }
}

impl BlendComponent {
    /// Create a component using [`BlendOperation::Add`].
    pub const fn new(src_factor: BlendFactor, dst_factor: BlendFactor) -> Self {
        Self {
            src_factor,
            dst_factor,
            operation: BlendOperation::Add,
        }
    }
}

/// Blend state for the first render target.
///
/// `None` components mean blending is disabled and the source is written as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlendStateDescriptor {
    /// Color blend component, `None` when blending is disabled.
    pub color: Option<BlendComponent>,
    /// Alpha blend component, `None` when blending is disabled.
    pub alpha: Option<BlendComponent>,
}

impl BlendStateDescriptor {
    /// Blending disabled.
    pub const fn opaque() -> Self {
        Self {
            color: None,
            alpha: None,
        }
    }

    /// Standard alpha blending; destination alpha accumulates.
    pub const fn alpha_blending() -> Self {
        Self {
            color: Some(BlendComponent::new(
                BlendFactor::SrcAlpha,
                BlendFactor::OneMinusSrcAlpha,
            )),
            alpha: Some(BlendComponent::new(BlendFactor::One, BlendFactor::One)),
        }
    }

    /// Premultiplied alpha blending.
    pub const fn premultiplied_alpha() -> Self {
        Self {
            color: Some(BlendComponent::new(
                BlendFactor::One,
                BlendFactor::OneMinusSrcAlpha,
            )),
            alpha: Some(BlendComponent::new(BlendFactor::One, BlendFactor::One)),
        }
    }

    /// Additive blending that leaves destination alpha untouched.
    pub const fn additive() -> Self {
        Self {
            color: Some(BlendComponent::new(BlendFactor::SrcAlpha, BlendFactor::One)),
            alpha: Some(BlendComponent::new(BlendFactor::Zero, BlendFactor::One)),
        }
    }

    /// Returns true if blending is enabled.
    pub fn is_enabled(&self) -> bool {
        self.color.is_some()
    }
}

/// Comparison function used by depth and stencil tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    /// Never passes.
    Never,
    /// Passes if the reference is less than the stored value.
    Less,
    /// Passes if equal.
    Equal,
    /// Passes if less or equal.
    LessEqual,
    /// Passes if greater.
    Greater,
    /// Passes if not equal.
    NotEqual,
    /// Passes if greater or equal.
    GreaterEqual,
    /// Always passes.
    #[default]
    Always,
}

/// Operation applied to the stencil buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOperation {
    /// Keep the current value.
    #[default]
    Keep,
    /// Set to zero.
    Zero,
    /// Replace with the reference value.
    Replace,
}

/// Stencil behaviour for one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StencilFaceState {
    /// Comparison against the reference value.
    pub compare: CompareFunction,
    /// Operation when the stencil test fails.
    pub fail_op: StencilOperation,
    /// Operation when stencil passes but depth fails.
    pub depth_fail_op: StencilOperation,
    /// Operation when both tests pass.
    pub pass_op: StencilOperation,
}

impl StencilFaceState {
    /// Compare with `compare` and never modify the stencil buffer.
    pub const fn read_only(compare: CompareFunction) -> Self {
        Self {
            compare,
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            pass_op: StencilOperation::Keep,
        }
    }
}

/// Depth/stencil state descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DepthStencilStateDescriptor {
    /// Whether the depth test is enabled.
    pub depth_test: bool,
    /// Whether depth writes are enabled.
    pub depth_write: bool,
    /// Depth comparison.
    pub depth_compare: CompareFunction,
    /// Whether the stencil test is enabled.
    pub stencil_enabled: bool,
    /// Bits of the stored stencil value visible to the test.
    pub stencil_read_mask: u8,
    /// Bits of the stencil value that may be written.
    pub stencil_write_mask: u8,
    /// Front face stencil behaviour.
    pub front: StencilFaceState,
    /// Back face stencil behaviour.
    pub back: StencilFaceState,
}

impl DepthStencilStateDescriptor {
    /// Depth and stencil both disabled.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Read-only stencil test with the given compare function and read mask.
    pub fn stencil_test(compare: CompareFunction, read_mask: u8) -> Self {
        Self {
            stencil_enabled: true,
            stencil_read_mask: read_mask,
            stencil_write_mask: 0,
            front: StencilFaceState::read_only(compare),
            back: StencilFaceState::read_only(compare),
            ..Default::default()
        }
    }
}

/// Polygon fill mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillMode {
    /// Filled triangles.
    #[default]
    Solid,
    /// Wireframe.
    Wireframe,
}

/// Face culling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// No culling.
    #[default]
    None,
    /// Cull front faces.
    Front,
    /// Cull back faces.
    Back,
}

/// Rasterizer state descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RasterizerStateDescriptor {
    /// Fill mode.
    pub fill: FillMode,
    /// Cull mode.
    pub cull: CullMode,
    /// Whether counter-clockwise triangles are front facing.
    pub front_counter_clockwise: bool,
    /// Constant depth bias.
    pub depth_bias: i32,
    /// Whether primitives are clipped against the depth range.
    pub depth_clip: bool,
    /// Whether multisample rasterization is enabled.
    pub multisample: bool,
}

impl RasterizerStateDescriptor {
    /// Solid fill without culling or depth clipping, as used by 2D overlays.
    pub fn overlay() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_presets() {
        assert!(!BlendStateDescriptor::opaque().is_enabled());
        let alpha = BlendStateDescriptor::alpha_blending();
        assert_eq!(alpha.color.unwrap().src_factor, BlendFactor::SrcAlpha);
        let additive = BlendStateDescriptor::additive();
        assert_eq!(additive.alpha.unwrap().src_factor, BlendFactor::Zero);
    }

    #[test]
    fn test_stencil_test_is_read_only() {
        let desc = DepthStencilStateDescriptor::stencil_test(CompareFunction::Equal, 0xF0);
        assert!(desc.stencil_enabled);
        assert!(!desc.depth_test);
        assert_eq!(desc.stencil_write_mask, 0);
        assert_eq!(desc.front.pass_op, StencilOperation::Keep);
        assert_eq!(desc.back.compare, CompareFunction::Equal);
    }
}
