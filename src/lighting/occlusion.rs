//! The occlusion rasterizer.
//!
//! Occluders are stroked into a square occupancy map centered on the light, so that
//! the polar transform can always march outward from the middle of the map.
//! The world image shown underneath the shadows is drawn here as well, it is the same
//! kind of stroke rasterization just with colors instead of occupancy.

use bevy::{
    log::trace,
    math::Vec2,
    render::color::Color,
};

use super::config::ShadowConfig;
use super::polar::OcclusionSource;
use super::scene::Scene;
use super::util::grid::Grid;
use super::util::image::{color_to_bytes, RawImage};

/// Occupancy of every texel around the light, 0 is free and 1 is fully occluded
#[derive(Debug, Clone, PartialEq)]
pub struct OcclusionMap {
    grid: Grid<f32>,
    /// The world position of the map's center
    origin: Vec2,
}

impl OcclusionMap {
    /// A map with nothing in it
    pub fn new_empty(size: usize, origin: Vec2) -> Self {
        Self {
            grid: Grid::new_fill(size, size, 0.0),
            origin,
        }
    }

    /// Rasterizes every occluder segment of the scene around the scene's light.
    /// The whole map is overwritten, nothing carries over from a previous frame.
    pub fn rasterize(scene: &Scene, config: &ShadowConfig) -> Self {
        let size = config.canvas_size;
        let origin = scene.light.position;
        let to_local = Vec2::splat(config.half_extent()) - origin
            + Vec2::from_array(config.occluder_offset);
        let segments: Vec<(Vec2, Vec2)> = scene
            .occluders
            .iter()
            .flat_map(|occluder| occluder.segments())
            .map(|(a, b)| (a + to_local, b + to_local))
            .collect();
        let half_width = config.stroke_width * 0.5;

        let grid = Grid::par_from_fn(size, size, |row, col| {
            let center = Vec2::new(col as f32 + 0.5, row as f32 + 0.5);
            segments
                .iter()
                .map(|&(a, b)| stroke_coverage(center, a, b, half_width))
                .fold(0.0, f32::max)
        });

        let out = Self { grid, origin };
        trace!(
            "Rasterized {} segments, {} occluded texels",
            segments.len(),
            out.count_occluded(config.hit_threshold)
        );
        out
    }

    pub fn get_grid(&self) -> &Grid<f32> {
        &self.grid
    }

    /// The side length of the map in texels
    pub fn get_size(&self) -> usize {
        self.grid.get_width()
    }

    /// The world position the map is centered on
    pub fn get_origin(&self) -> Vec2 {
        self.origin
    }

    /// World position of the map's top left corner
    pub fn get_top_left(&self) -> Vec2 {
        self.origin - Vec2::splat(self.get_size() as f32 * 0.5)
    }

    /// Occupancy of the texel at a row and column
    pub fn get(&self, row: usize, col: usize) -> f32 {
        *self.grid.get(row, col)
    }

    /// Number of texels at or above the given occupancy
    pub fn count_occluded(&self, threshold: f32) -> usize {
        self.grid.iter().filter(|&&v| v >= threshold).count()
    }

    /// Black occluders on a white background
    pub fn to_raw_image(&self) -> RawImage {
        let inverted = Grid::from_fn(self.get_size(), self.get_size(), |row, col| {
            1.0 - self.get(row, col)
        });
        RawImage::from_grayscale(&inverted)
    }
}

impl OcclusionSource for OcclusionMap {
    fn opacity_at(&self, coord: Vec2) -> f32 {
        *self.grid.sample_nearest(coord)
    }
}

/// Shortest distance from a point to a segment, works for zero length segments
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Anti-aliased coverage of a pixel center by a stroke with round caps
pub fn stroke_coverage(p: Vec2, a: Vec2, b: Vec2, half_width: f32) -> f32 {
    (half_width + 0.5 - distance_to_segment(p, a, b)).clamp(0.0, 1.0)
}

/// Linear mix of two colors
fn mix(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Draws the lit world: background, walls and a disk at the light.
/// World pixels map one to one onto the image.
pub fn render_world(scene: &Scene, config: &ShadowConfig) -> RawImage {
    let size = config.canvas_size;
    let segments: Vec<(Vec2, Vec2)> = scene
        .occluders
        .iter()
        .flat_map(|occluder| occluder.segments())
        .collect();
    let wall_half_width = config.wall_stroke_width * 0.5;
    let background = config.background_color.as_rgba_f32();
    let wall = config.wall_color.as_rgba_f32();
    let light = config.light_color.as_rgba_f32();
    let light_position = scene.light.position;
    let light_radius = config.light_radius;

    let grid = Grid::par_from_fn(size, size, |row, col| {
        let center = Vec2::new(col as f32 + 0.5, row as f32 + 0.5);
        let wall_coverage = segments
            .iter()
            .map(|&(a, b)| stroke_coverage(center, a, b, wall_half_width))
            .fold(0.0, f32::max);
        let light_coverage =
            (light_radius + 0.5 - center.distance(light_position)).clamp(0.0, 1.0);
        let rgba = mix(mix(background, wall, wall_coverage), light, light_coverage);
        color_to_bytes(Color::rgba(rgba[0], rgba[1], rgba[2], rgba[3]))
    });
    RawImage::from_rgba_grid(&grid)
}
