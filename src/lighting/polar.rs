//! The polar distance transform.
//!
//! Every column of the polar map is a ray leaving the center of the occlusion map.
//! The column index is first treated as a horizontal texture coordinate, then swept
//! into an angle, so a plain rectangular pass computes a radial quantity.
//! Rays march outward one step at a time and the first step landing on an
//! occluded texel wins.
//!
//! $$\theta = \tfrac{3}{2}\pi + (2u - 1)\pi \qquad r = \tfrac{y}{Y}$$
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::f32::consts::PI;

use bevy::{log::trace, math::Vec2, render::color::Color};
use ndarray::Array1;
use rayon::prelude::*;

use super::config::ShadowConfig;
use super::error::ShadowError;
use super::util::functions::wrap_unit;
use super::util::grid::Grid;
use super::util::image::RawImage;

/// Anything that can be ray marched.
/// `coord` is in normalized texture space, (0.5, 0.5) is the light and Y grows downward.
pub trait OcclusionSource: Sync {
    /// Occupancy at the coordinate, in [0, 1]
    fn opacity_at(&self, coord: Vec2) -> f32;
}

/// Closures make handy analytic occlusion fields
impl<F> OcclusionSource for F
where
    F: Fn(Vec2) -> f32 + Sync,
{
    fn opacity_at(&self, coord: Vec2) -> f32 {
        self(coord)
    }
}

/// Distance to the nearest occluder for every angular sample around the light.
/// 1.0 means nothing was hit within range.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarMap {
    /// One normalized distance per column
    distances: Array1<f32>,
}

impl PolarMap {
    /// Wrap existing distances, values are clamped into [0, 1]
    pub fn new(distances: Array1<f32>) -> Self {
        debug_assert!(!distances.is_empty(), "A polar map needs at least one column");
        Self {
            distances: distances.mapv(|d| d.clamp(0.0, 1.0)),
        }
    }

    /// A map where nothing is occluded
    pub fn unoccluded(resolution: usize) -> Self {
        Self::new(Array1::from_elem(resolution, 1.0))
    }

    /// Number of angular samples
    pub fn get_resolution(&self) -> usize {
        self.distances.len()
    }

    /// The stored distance of one column
    pub fn column(&self, idx: usize) -> f32 {
        self.distances[idx]
    }

    /// All the distances
    pub fn get_distances(&self) -> &Array1<f32> {
        &self.distances
    }

    /// Nearest column lookup of a horizontal coordinate.
    /// The map covers a full turn so coordinates wrap around instead of clamping.
    pub fn sample(&self, coord: f32) -> f32 {
        self.distances[self.column_for_coord(coord)]
    }

    /// The column a horizontal coordinate falls into, with wraparound
    pub fn column_for_coord(&self, coord: f32) -> usize {
        let n = self.get_resolution();
        if !coord.is_finite() {
            return 0;
        }
        ((wrap_unit(coord) * n as f32) as usize).min(n - 1)
    }

    /// The column holding the ray at `theta`, measured counterclockwise from +X
    /// with Y pointing up
    pub fn column_for_angle(&self, theta: f32) -> usize {
        self.column_for_coord(angle_to_coord(theta))
    }

    /// Number of columns that hit something
    pub fn count_hits(&self) -> usize {
        self.distances.iter().filter(|&&d| d < 1.0).count()
    }

    /// Grayscale strip, one pixel per column, the row repeated `height` times
    pub fn to_raw_image(&self, height: usize) -> RawImage {
        let row = RawImage::from_grayscale(&Grid::from_fn(self.get_resolution(), 1, |_, col| {
            self.distances[col]
        }));
        let mut out = RawImage::new_filled(self.get_resolution(), height.max(1), Color::BLACK);
        for y in 0..out.get_height() {
            out.blit(&row, 0, y as i64);
        }
        out
    }
}

/// Maps an angle in (-pi, pi] to the horizontal polar map coordinate
pub fn angle_to_coord(theta: f32) -> f32 {
    (theta + PI) / (2.0 * PI)
}

/// The ray marching stage with its parameters resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarTransform {
    /// Number of columns produced
    resolution: usize,
    /// Number of radial steps per column
    march_steps: usize,
    /// Occupancy above which a step counts as a hit
    hit_threshold: f32,
}

impl PolarTransform {
    /// Prepare the stage, errors if the parameters cannot produce a map
    pub fn new(config: &ShadowConfig) -> Result<Self, ShadowError> {
        if config.polar_resolution == 0 || config.march_steps == 0 {
            return Err(ShadowError::KernelLoad {
                stage: "polar transform",
                reason: format!(
                    "needs at least one column and one step, got {}x{}",
                    config.polar_resolution, config.march_steps
                ),
            });
        }
        if !(config.hit_threshold > 0.0 && config.hit_threshold <= 1.0) {
            return Err(ShadowError::KernelLoad {
                stage: "polar transform",
                reason: format!("hit threshold {} is outside (0, 1]", config.hit_threshold),
            });
        }
        Ok(Self {
            resolution: config.polar_resolution,
            march_steps: config.march_steps,
            hit_threshold: config.hit_threshold,
        })
    }

    /// Number of columns produced
    pub fn get_resolution(&self) -> usize {
        self.resolution
    }

    /// Marches every column in parallel. Columns only read the source, so they
    /// never have to wait on each other.
    pub fn build<S>(&self, source: &S) -> PolarMap
    where
        S: OcclusionSource + ?Sized,
    {
        let distances: Vec<f32> = (0..self.resolution)
            .into_par_iter()
            .map(|idx| self.march_column(source, idx))
            .collect();
        let out = PolarMap::new(Array1::from(distances));
        trace!(
            "Polar map built, {}/{} columns hit",
            out.count_hits(),
            out.get_resolution()
        );
        out
    }

    /// Marches a single column outward from the light
    pub fn march_column<S>(&self, source: &S, idx: usize) -> f32
    where
        S: OcclusionSource + ?Sized,
    {
        let u = idx as f32 / self.resolution as f32;
        let steps = self.march_steps as f32;
        for y in 0..self.march_steps {
            let dst = y as f32 / steps;
            let norm = Vec2::new(u, dst) * 2.0 - Vec2::ONE;
            let theta = PI * 1.5 + norm.x * PI;
            let r = (1.0 + norm.y) * 0.5;
            let coord = Vec2::splat(0.5) - r * Vec2::new(theta.sin(), theta.cos()) * 0.5;
            if source.opacity_at(coord) > self.hit_threshold {
                return dst;
            }
        }
        1.0
    }
}

/// Convenience for a one off transform
pub fn build_polar_map<S>(source: &S, config: &ShadowConfig) -> Result<PolarMap, ShadowError>
where
    S: OcclusionSource + ?Sized,
{
    Ok(PolarTransform::new(config)?.build(source))
}
