/// RGBA color with `f32` channels in linear space.
///
/// The sRGB surface format encodes it on write.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: f64::from(self.r),
            g: f64::from(self.g),
            b: f64::from(self.b),
            a: f64::from(self.a),
        }
    }
}

impl From<[f32; 4]> for ColorRgba {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_converts_channel_by_channel() {
        let c = ColorRgba::from([0.25, 0.5, 0.75, 1.0]);
        assert_eq!(c, ColorRgba::new(0.25, 0.5, 0.75, 1.0));
        assert_eq!(c.to_wgpu().g, 0.5);
    }
}
