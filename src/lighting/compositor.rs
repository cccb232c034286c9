//! Puts the shadow overlay on top of the world image.

use bevy::math::Vec2;

use super::util::image::RawImage;

/// Copies the world image and alpha blends `overlay` over it with the overlay's top left
/// corner at `origin` in world pixels. Parts of the overlay outside the world are dropped.
///
/// `origin` is rounded to whole pixels, so with the light at a fractional position the
/// overlay can sit up to half a pixel away from where the occlusion map was rasterized.
pub fn composite(world: &RawImage, overlay: &RawImage, origin: Vec2) -> RawImage {
    let mut out = world.clone();
    let offset_x = origin.x.round() as i64;
    let offset_y = origin.y.round() as i64;
    for y in 0..overlay.get_height() {
        let world_y = y as i64 + offset_y;
        if world_y < 0 || world_y >= out.get_height() as i64 {
            continue;
        }
        for x in 0..overlay.get_width() {
            let world_x = x as i64 + offset_x;
            if world_x < 0 || world_x >= out.get_width() as i64 {
                continue;
            }
            if let Some(rgba) = overlay.get_pixel(x, y) {
                out.blend_pixel(world_x as usize, world_y as usize, rgba);
            }
        }
    }
    out
}
