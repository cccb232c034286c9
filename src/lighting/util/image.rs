//! Image utilities
//! Our own RGBA image keeps us from having to use specific bevy types in the lighting core.
//! Only [`RawImage::to_bevy_image`] crosses over into the engine.

use bevy::{
    math::Rect,
    render::{
        color::Color,
        render_resource::{Extent3d, TextureDimension, TextureFormat},
        texture::Image,
    },
};

use super::grid::Grid;

/// Representing a raw RGBA image, 8 bits per channel, rows top to bottom
/// Game engine agnostic, full ownership, no lifetimes, not a component
#[derive(Clone, Debug, PartialEq)]
pub struct RawImage {
    pub bounds: Rect,
    pub pixels: Vec<u8>,
}

/// Create an empty image
impl Default for RawImage {
    fn default() -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, 0.0, 0.0),
            pixels: Vec::new(),
        }
    }
}

/// Converts a color into straight-alpha RGBA bytes
pub fn color_to_bytes(color: Color) -> [u8; 4] {
    color
        .as_rgba_f32()
        .map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/* Initialization */
impl RawImage {
    /// Create an image of the given size filled with one color
    pub fn new_filled(width: usize, height: usize, color: Color) -> Self {
        let mut out = Self {
            bounds: Rect::new(0.0, 0.0, width as f32, height as f32),
            pixels: vec![0; width * height * 4],
        };
        out.fill(color);
        out
    }

    /// Create an image from a grid of RGBA pixels
    pub fn from_rgba_grid(grid: &Grid<[u8; 4]>) -> Self {
        let mut pixels = Vec::with_capacity(grid.total_size() * 4);
        for rgba in grid.iter() {
            pixels.extend_from_slice(rgba);
        }
        Self {
            bounds: Rect::new(0.0, 0.0, grid.get_width() as f32, grid.get_height() as f32),
            pixels,
        }
    }

    /// Create an opaque grayscale image from a grid of intensities in [0, 1]
    pub fn from_grayscale(grid: &Grid<f32>) -> Self {
        let mut pixels = Vec::with_capacity(grid.total_size() * 4);
        for value in grid.iter() {
            let v = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
        Self {
            bounds: Rect::new(0.0, 0.0, grid.get_width() as f32, grid.get_height() as f32),
            pixels,
        }
    }
}

/* Getters & Setters */
impl RawImage {
    pub fn get_width(&self) -> usize {
        self.bounds.width() as usize
    }
    pub fn get_height(&self) -> usize {
        self.bounds.height() as usize
    }

    /// Byte offset of a pixel, None if outside the image
    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.get_width() || y >= self.get_height() {
            return None;
        }
        Some((y * self.get_width() + x) * 4)
    }

    /// Get a pixel, None if outside the image
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        let offset = self.offset(x, y)?;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(out)
    }

    /// Overwrite a pixel. Writes outside the image are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        if let Some(offset) = self.offset(x, y) {
            self.pixels[offset..offset + 4].copy_from_slice(&rgba);
        }
    }

    /// Overwrite every pixel with one color
    pub fn fill(&mut self, color: Color) {
        let rgba = color_to_bytes(color);
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }

    /// Copy `src` into this image with its top left corner at (x, y).
    /// Pixels landing outside this image are dropped.
    pub fn blit(&mut self, src: &RawImage, x: i64, y: i64) {
        for src_y in 0..src.get_height() {
            let dst_y = src_y as i64 + y;
            if dst_y < 0 || dst_y >= self.get_height() as i64 {
                continue;
            }
            for src_x in 0..src.get_width() {
                let dst_x = src_x as i64 + x;
                if dst_x < 0 || dst_x >= self.get_width() as i64 {
                    continue;
                }
                if let Some(rgba) = src.get_pixel(src_x, src_y) {
                    self.set_pixel(dst_x as usize, dst_y as usize, rgba);
                }
            }
        }
    }

    /// Alpha blend a straight-alpha color over a pixel ("source over").
    /// Writes outside the image are ignored.
    pub fn blend_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let Some(offset) = self.offset(x, y) else {
            return;
        };
        let src_a = rgba[3] as f32 / 255.0;
        if src_a <= 0.0 {
            return;
        }
        let dst = &mut self.pixels[offset..offset + 4];
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        for channel in 0..3 {
            let src_c = rgba[channel] as f32 / 255.0;
            let dst_c = dst[channel] as f32 / 255.0;
            let out_c = (src_c * src_a + dst_c * dst_a * (1.0 - src_a)) / out_a;
            dst[channel] = (out_c.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        dst[3] = (out_a.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
}

/* Conversion */
impl RawImage {
    /// Convert to a bevy image
    /// Load this into an asset server to get a texture like the following
    /// ```ignore
    /// let image: RawImage = RawImage::default();
    /// let image_handle: Handle<Image> = images.add(image.to_bevy_image());
    /// ```
    pub fn to_bevy_image(self) -> Image {
        let size = Extent3d {
            width: self.bounds.width() as u32,
            height: self.bounds.height() as u32,
            depth_or_array_layers: 1,
        };

        Image::new(
            size,
            TextureDimension::D2,
            self.pixels,
            TextureFormat::Rgba8UnormSrgb,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_filled() {
        let image = RawImage::new_filled(3, 2, Color::WHITE);
        assert_eq!(image.get_width(), 3);
        assert_eq!(image.get_height(), 2);
        assert_eq!(image.pixels.len(), 3 * 2 * 4);
        assert!(image.pixels.iter().all(|&b| b == 255));
    }

    #[test]
    fn test_get_set_pixel() {
        let mut image = RawImage::new_filled(2, 2, Color::BLACK);
        image.set_pixel(1, 0, [1, 2, 3, 4]);
        assert_eq!(image.get_pixel(1, 0), Some([1, 2, 3, 4]));
        assert_eq!(image.get_pixel(0, 1), Some([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(2, 0), None);
        // Out of bounds writes are ignored
        image.set_pixel(5, 5, [9, 9, 9, 9]);
        assert_eq!(image.pixels.len(), 16);
    }

    #[test]
    fn test_blend_half_black_over_white() {
        let mut image = RawImage::new_filled(1, 1, Color::WHITE);
        image.blend_pixel(0, 0, [0, 0, 0, 128]);
        let pixel = image.get_pixel(0, 0).unwrap();
        assert!((pixel[0] as i32 - 127).abs() <= 1);
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn test_blend_transparent_is_noop() {
        let mut image = RawImage::new_filled(1, 1, Color::RED);
        let before = image.clone();
        image.blend_pixel(0, 0, [0, 0, 0, 0]);
        assert_eq!(image, before);
    }

    #[test]
    fn test_from_grayscale() {
        let grid = Grid::from_fn(2, 1, |_, col| col as f32);
        let image = RawImage::from_grayscale(&grid);
        assert_eq!(image.get_pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(1, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_fill() {
        let mut image = RawImage::new_filled(2, 2, Color::WHITE);
        image.fill(Color::BLUE);
        assert!((0..2).all(|y| (0..2).all(|x| image.get_pixel(x, y) == Some([0, 0, 255, 255]))));
    }

    #[test]
    fn test_blit_clips() {
        let mut image = RawImage::new_filled(3, 3, Color::WHITE);
        let src = RawImage::new_filled(2, 2, Color::BLACK);
        image.blit(&src, 2, -1);
        assert_eq!(image.get_pixel(2, 0), Some([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(1, 0), Some([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(2, 1), Some([255, 255, 255, 255]));
        // Copies rather than blends
        let clear = RawImage::new_filled(1, 1, Color::rgba(0.0, 0.0, 0.0, 0.0));
        image.blit(&clear, 0, 0);
        assert_eq!(image.get_pixel(0, 0), Some([0, 0, 0, 0]));
    }
}
