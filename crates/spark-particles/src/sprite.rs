//! Particle sprite image: decoded from disk or generated as a soft disc.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Edge length of the generated sprite.
pub const PROCEDURAL_SIZE: u32 = 64;

/// wgpu's default `max_texture_dimension_2d`.
pub const MAX_SPRITE_DIMENSION: u32 = 8192;

/// CPU-side RGBA8 sprite, ready to upload as a mipmapped texture.
#[derive(Debug, Clone)]
pub struct SpriteImage {
    image: RgbaImage,
}

impl SpriteImage {
    /// Decodes any format the `image` crate was built with. Grayscale, RGB and
    /// palette sources are expanded to RGBA8.
    pub fn load(path: &Path) -> Result<Self> {
        let decoded = image::open(path)
            .with_context(|| format!("failed to decode sprite image {}", path.display()))?;
        let sprite = Self { image: decoded.to_rgba8() };
        check_dimensions(sprite.width(), sprite.height())
            .with_context(|| format!("sprite image {} cannot be uploaded", path.display()))?;
        log::info!(
            "loaded sprite {} ({}x{})",
            path.display(),
            sprite.width(),
            sprite.height()
        );
        Ok(sprite)
    }

    pub fn from_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let image = RgbaImage::from_raw(width, height, rgba)
            .with_context(|| format!("pixel buffer does not match {width}x{height} RGBA8"))?;
        Ok(Self { image })
    }

    /// White disc with a one pixel anti-aliased rim on a transparent background.
    pub fn procedural_circle(size: u32) -> Self {
        let size = size.max(2);
        let center = size as f32 * 0.5;
        let radius = center - 1.0;

        let image = RgbaImage::from_fn(size, size, |x, y| {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let coverage = (radius - (dx * dx + dy * dy).sqrt() + 0.5).clamp(0.0, 1.0);
            image::Rgba([255, 255, 255, (coverage * 255.0).round() as u8])
        });

        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn rgba(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Full chain down to 1x1.
    pub fn mip_level_count(&self) -> u32 {
        u32::BITS - self.width().max(self.height()).leading_zeros()
    }

    /// Every mip level, largest first, concatenated as tightly packed RGBA8.
    pub fn mip_chain(&self) -> Vec<u8> {
        let mut out = self.rgba().to_vec();
        for level in 1..self.mip_level_count() {
            let w = (self.width() >> level).max(1);
            let h = (self.height() >> level).max(1);
            let scaled = imageops::resize(&self.image, w, h, FilterType::Triangle);
            out.extend_from_slice(scaled.as_raw());
        }
        out
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    ensure!(width > 0 && height > 0, "sprite must not be empty");
    ensure!(
        width <= MAX_SPRITE_DIMENSION && height <= MAX_SPRITE_DIMENSION,
        "sprite is {width}x{height}, larger than the {MAX_SPRITE_DIMENSION} px texture limit"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_at(sprite: &SpriteImage, x: u32, y: u32) -> u8 {
        sprite.image.get_pixel(x, y).0[3]
    }

    #[test]
    fn procedural_circle_is_opaque_in_the_middle() {
        let s = SpriteImage::procedural_circle(PROCEDURAL_SIZE);
        assert_eq!(alpha_at(&s, 32, 32), 255);
        assert_eq!(alpha_at(&s, 31, 31), 255);
        assert_eq!(s.image.get_pixel(32, 32).0, [255, 255, 255, 255]);
    }

    #[test]
    fn procedural_circle_corners_are_transparent() {
        let s = SpriteImage::procedural_circle(PROCEDURAL_SIZE);
        let last = PROCEDURAL_SIZE - 1;
        for (x, y) in [(0, 0), (last, 0), (0, last), (last, last)] {
            assert_eq!(alpha_at(&s, x, y), 0, "corner ({x}, {y})");
        }
    }

    #[test]
    fn procedural_circle_has_soft_rim() {
        let s = SpriteImage::procedural_circle(PROCEDURAL_SIZE);
        let row: Vec<u8> = (0..PROCEDURAL_SIZE).map(|x| alpha_at(&s, x, 32)).collect();
        assert!(row.iter().any(|a| *a > 0 && *a < 255));
    }

    #[test]
    fn mip_level_count_reaches_one_pixel() {
        assert_eq!(SpriteImage::procedural_circle(64).mip_level_count(), 7);
        let odd = SpriteImage::from_rgba8(100, 50, vec![0; 100 * 50 * 4]).unwrap();
        assert_eq!(odd.mip_level_count(), 7);
    }

    #[test]
    fn mip_chain_concatenates_all_levels() {
        let s = SpriteImage::from_rgba8(4, 4, vec![200; 4 * 4 * 4]).unwrap();
        let chain = s.mip_chain();
        assert_eq!(chain.len(), (16 + 4 + 1) * 4);
        // A flat image stays flat at every level.
        assert!(chain.iter().all(|b| *b == 200));
    }

    #[test]
    fn mismatched_pixel_buffer_is_rejected() {
        assert!(SpriteImage::from_rgba8(4, 4, vec![0; 10]).is_err());
        assert!(SpriteImage::from_rgba8(0, 4, Vec::new()).is_err());
    }

    #[test]
    fn oversized_sprite_is_rejected() {
        let wide = MAX_SPRITE_DIMENSION + 1;
        let err = SpriteImage::from_rgba8(wide, 1, vec![0; wide as usize * 4]).unwrap_err();
        assert!(err.to_string().contains("texture limit"), "{err}");
        assert!(SpriteImage::from_rgba8(1, wide, vec![0; wide as usize * 4]).is_err());

        let edge = MAX_SPRITE_DIMENSION;
        assert!(SpriteImage::from_rgba8(edge, 1, vec![0; edge as usize * 4]).is_ok());
    }

    #[test]
    fn oversized_file_fails_at_load() {
        let path = std::env::temp_dir()
            .join(format!("spark-particles-oversized-{}.png", std::process::id()));
        RgbaImage::new(MAX_SPRITE_DIMENSION + 1, 1).save(&path).unwrap();

        let result = SpriteImage::load(&path);
        std::fs::remove_file(&path).unwrap();

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("texture limit"), "{err:#}");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = SpriteImage::load(Path::new("/nonexistent/sprite.png")).unwrap_err();
        assert!(format!("{err:#}").contains("sprite.png"));
    }
}
