//! Common types shared across the graphics system.

/// 3D extent (width, height, depth or array layers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent3d {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth in texels (3D) or array layer count.
    pub depth: u32,
}

impl Default for Extent3d {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl Extent3d {
    /// Create a new extent.
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Create a 1D extent.
    pub const fn new_1d(width: u32) -> Self {
        Self::new(width, 1, 1)
    }

    /// Create a 2D extent.
    pub const fn new_2d(width: u32, height: u32) -> Self {
        Self::new(width, height, 1)
    }
}

/// Viewport rectangle with a `[0, 1]` depth range by default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// X coordinate of the top-left corner.
    pub x: f32,
    /// Y coordinate of the top-left corner.
    pub y: f32,
    /// Width of the viewport.
    pub width: f32,
    /// Height of the viewport.
    pub height: f32,
    /// Minimum depth value.
    pub min_depth: f32,
    /// Maximum depth value.
    pub max_depth: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

impl Viewport {
    /// Viewport covering a `width` x `height` target from the origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_from_size() {
        let vp = Viewport::from_size(1920, 1080);
        assert_eq!(vp.width, 1920.0);
        assert_eq!(vp.height, 1080.0);
        assert_eq!(vp.max_depth, 1.0);
    }
}
