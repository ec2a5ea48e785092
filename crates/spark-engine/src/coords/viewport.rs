/// Drawable surface size in physical pixels.
///
/// Renderers size their depth and multisample targets from this and derive the
/// projection aspect ratio from it.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width over height. A zero height yields `1.0` so projections stay finite
    /// while the window is minimized.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_of_full_hd() {
        let vp = Viewport::new(1920, 1080);
        assert!((vp.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn zero_height_is_invalid_but_finite() {
        let vp = Viewport::new(800, 0);
        assert!(!vp.is_valid());
        assert_eq!(vp.aspect(), 1.0);
    }
}
