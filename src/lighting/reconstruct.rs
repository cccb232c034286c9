//! The shadow reconstructor.
//!
//! Every output pixel looks up the polar map at its own angle around the light and
//! compares its radius to the stored distance. Neighboring angles are blended with a
//! small 1D kernel whose width grows with the radius, which gives soft penumbrae that
//! widen away from the light. Past the map radius the shadow fades out.
#![warn(missing_docs)]

use bevy::{log::trace, math::Vec2, render::color::Color};

use super::config::ShadowConfig;
use super::error::ShadowError;
use super::polar::{angle_to_coord, PolarMap};
use super::util::functions::{smoothstep, step};
use super::util::grid::Grid;
use super::util::image::{color_to_bytes, RawImage};

/// An odd-length set of blur weights, the middle one is the center tap
#[derive(Debug, Clone, PartialEq)]
pub struct BlurKernel {
    weights: Vec<f32>,
    total: f32,
}

impl BlurKernel {
    /// Validates the weights, this is the only way a reconstructor can fail to load
    pub fn new(weights: Vec<f32>) -> Result<Self, ShadowError> {
        let fail = |reason: String| ShadowError::KernelLoad {
            stage: "shadow reconstruction",
            reason,
        };
        if weights.len() % 2 == 0 {
            return Err(fail(format!(
                "blur kernel needs an odd number of taps, got {}",
                weights.len()
            )));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(fail(format!("blur weight {} is not a finite non-negative", bad)));
        }
        let total: f32 = weights.iter().sum();
        if total <= 0.0 {
            return Err(fail("blur weights sum to zero".to_string()));
        }
        Ok(Self { weights, total })
    }

    /// Taps on each side of the center
    pub fn radius(&self) -> usize {
        self.weights.len() / 2
    }

    /// The raw weights, not normalized
    pub fn get_weights(&self) -> &[f32] {
        &self.weights
    }

    /// The largest weight after normalization, the most a single tap can move `lit`
    pub fn max_normalized_weight(&self) -> f32 {
        self.weights.iter().copied().fold(0.0, f32::max) / self.total
    }

    /// Normalized weighted sum of `f(offset)` over the taps, offsets in -radius..=radius
    fn weighted_sum(&self, f: impl Fn(f32) -> f32) -> f32 {
        let radius = self.radius() as isize;
        let sum: f32 = self
            .weights
            .iter()
            .enumerate()
            .map(|(idx, weight)| weight * f((idx as isize - radius) as f32))
            .sum();
        sum / self.total
    }
}

/// Shadow opacity of every pixel of the map region, 1 is fully shadowed
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowField {
    alpha: Grid<f32>,
}

impl ShadowField {
    /// The alphas, row 0 at the top
    pub fn get_grid(&self) -> &Grid<f32> {
        &self.alpha
    }

    /// Side length in pixels
    pub fn get_size(&self) -> usize {
        self.alpha.get_width()
    }

    /// The shadow opacity at a pixel
    pub fn get(&self, row: usize, col: usize) -> f32 {
        *self.alpha.get(row, col)
    }

    /// The overlay to composite over the world: the tint at each pixel's opacity
    pub fn to_raw_image(&self, tint: Color) -> RawImage {
        let [r, g, b, a] = tint.as_rgba_f32();
        let grid = Grid::from_fn(self.get_size(), self.alpha.get_height(), |row, col| {
            color_to_bytes(Color::rgba(r, g, b, a * self.get(row, col)))
        });
        RawImage::from_rgba_grid(&grid)
    }
}

/// The reconstruction stage with its kernel loaded
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowReconstructor {
    kernel: BlurKernel,
}

impl ShadowReconstructor {
    /// Loads the blur kernel from the config
    pub fn new(config: &ShadowConfig) -> Result<Self, ShadowError> {
        Ok(Self {
            kernel: BlurKernel::new(config.blur_kernel.clone())?,
        })
    }

    /// The loaded blur kernel
    pub fn get_kernel(&self) -> &BlurKernel {
        &self.kernel
    }

    /// How lit a point is, 1 fully lit and 0 fully shadowed.
    /// `coord` is the horizontal polar map coordinate, `r` the normalized radius.
    pub fn lit_at(&self, polar: &PolarMap, coord: f32, r: f32) -> f32 {
        // The blur is one column wide at the map edge and shrinks toward the light,
        // so it can never skip over columns
        let blur = (1.0 / polar.get_resolution() as f32) * smoothstep(0.0, 1.0, r);
        self.kernel
            .weighted_sum(|offset| step(r, polar.sample(coord + offset * blur)))
    }

    /// Shadow opacity of a point given in polar map coordinates
    pub fn alpha_at_polar(&self, polar: &PolarMap, coord: f32, r: f32) -> f32 {
        let lit = self.lit_at(polar, coord, r);
        (1.0 - lit) * smoothstep(1.0, 0.0, r)
    }

    /// Shadow opacity at a texture coordinate of the map region.
    /// Texture rows grow downward while angles are measured with Y up, hence the flip.
    pub fn alpha_at(&self, polar: &PolarMap, s: f32, t: f32) -> f32 {
        let norm = Vec2::new(s * 2.0 - 1.0, t * -2.0 + 1.0);
        let theta = norm.y.atan2(norm.x);
        let r = norm.length();
        self.alpha_at_polar(polar, angle_to_coord(theta), r)
    }

    /// Evaluates every pixel of a `size` square region centered on the light, in parallel
    pub fn render(&self, polar: &PolarMap, size: usize) -> ShadowField {
        let extent = size as f32;
        let alpha = Grid::par_from_fn(size, size, |row, col| {
            self.alpha_at(
                polar,
                (col as f32 + 0.5) / extent,
                (row as f32 + 0.5) / extent,
            )
        });
        trace!("Reconstructed {}x{} shadow field", size, size);
        ShadowField { alpha }
    }
}
