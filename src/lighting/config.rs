//! Tunable constants of the shadow pipeline.
//!
//! Every value here directly changes what ends up on screen: the polar resolution
//! and blur kernel set the shadow sharpness, the stroke width and hit threshold
//! decide whether light leaks through thin walls.
#![warn(missing_docs)]

use bevy::render::color::Color;
use serde::{Deserialize, Serialize};

use super::error::ShadowError;
use super::reconstruct::BlurKernel;

/// The reference 9-tap blur, an approximate gaussian
pub const DEFAULT_BLUR_KERNEL: [f32; 9] = [0.05, 0.09, 0.12, 0.15, 0.16, 0.15, 0.12, 0.09, 0.05];

/// All tunable parameters of the shadow pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Width and height of the occlusion map and shadow field, in pixels
    pub canvas_size: usize,
    /// Number of angular samples in the polar map
    pub polar_resolution: usize,
    /// Number of radial steps each polar ray marches
    pub march_steps: usize,
    /// Width of occluder strokes in the occlusion map, in pixels
    pub stroke_width: f32,
    /// Occupancy above which a marching ray counts as hit
    pub hit_threshold: f32,
    /// Angular blur weights, center tap in the middle
    pub blur_kernel: Vec<f32>,
    /// Shift applied to occluders when rasterizing the occlusion map, in pixels
    pub occluder_offset: [f32; 2],
    /// Width of the walls drawn into the world image, in pixels
    pub wall_stroke_width: f32,
    /// Radius of the light disk drawn into the world image, in pixels
    pub light_radius: f32,
    /// Color the world image is cleared to
    pub background_color: Color,
    /// Color of the walls in the world image
    pub wall_color: Color,
    /// Color of the light disk in the world image
    pub light_color: Color,
    /// Tint of the shadow overlay
    pub shadow_color: Color,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            canvas_size: 400,
            polar_resolution: 180,
            march_steps: 180,
            stroke_width: 4.0,
            hit_threshold: 0.75,
            blur_kernel: DEFAULT_BLUR_KERNEL.to_vec(),
            occluder_offset: [1.0, 1.0],
            wall_stroke_width: 6.0,
            light_radius: 30.0,
            background_color: Color::WHITE,
            wall_color: Color::RED,
            light_color: Color::GREEN,
            shadow_color: Color::BLACK,
        }
    }
}

impl ShadowConfig {
    /// Parse a config from TOML, missing keys fall back to the defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ShadowError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Half the canvas size, which is the pixel distance normalized radius 1 maps to
    pub fn half_extent(&self) -> f32 {
        self.canvas_size as f32 * 0.5
    }

    /// Width of the band around an occluder's center line whose texels count as hits.
    /// Stroke coverage is `half_width + 0.5 - distance`, so a texel is hit when it is
    /// closer than `stroke_width / 2 + 0.5 - hit_threshold` to the line.
    pub fn occluded_band_width(&self) -> f32 {
        self.stroke_width + 1.0 - 2.0 * self.hit_threshold
    }

    /// Distance in texels between two consecutive samples of a polar ray
    pub fn march_step_texels(&self) -> f32 {
        self.canvas_size as f32 / (2 * self.march_steps) as f32
    }

    /// Checks every value is usable by the stages
    pub fn validate(&self) -> Result<(), ShadowError> {
        if self.canvas_size == 0 {
            return Err(ShadowError::invalid_config("canvas_size", "must be > 0"));
        }
        if self.polar_resolution == 0 {
            return Err(ShadowError::invalid_config(
                "polar_resolution",
                "must be > 0",
            ));
        }
        if self.march_steps == 0 {
            return Err(ShadowError::invalid_config("march_steps", "must be > 0"));
        }
        if !(self.hit_threshold > 0.0 && self.hit_threshold <= 1.0) {
            return Err(ShadowError::invalid_config(
                "hit_threshold",
                format!("must be in (0, 1], got {}", self.hit_threshold),
            ));
        }
        // A ray has to land at least one sample inside every wall it crosses
        let required = self.march_step_texels().max(1.0);
        if !(self.occluded_band_width() >= required) {
            return Err(ShadowError::invalid_config(
                "stroke_width",
                format!(
                    "stroke_width {} with hit_threshold {} leaves a {} texel wall, \
                     needs {} for a {} canvas marched in {} steps",
                    self.stroke_width,
                    self.hit_threshold,
                    self.occluded_band_width(),
                    required,
                    self.canvas_size,
                    self.march_steps
                ),
            ));
        }
        if !(self.wall_stroke_width >= 0.0) {
            return Err(ShadowError::invalid_config(
                "wall_stroke_width",
                format!("must not be negative, got {}", self.wall_stroke_width),
            ));
        }
        if !(self.light_radius >= 0.0) {
            return Err(ShadowError::invalid_config(
                "light_radius",
                format!("must not be negative, got {}", self.light_radius),
            ));
        }
        BlurKernel::new(self.blur_kernel.clone())?;
        Ok(())
    }
}

/// A builder for ShadowConfig
/// Starts from the defaults, `build` validates
#[derive(Debug, Clone, Default)]
pub struct ShadowConfigBuilder {
    /// The config being assembled
    config: ShadowConfig,
}

impl ShadowConfigBuilder {
    /// Start here
    pub fn new() -> Self {
        Self::default()
    }
    /// The size of the square occlusion map
    pub fn canvas_size(mut self, canvas_size: usize) -> Self {
        self.config.canvas_size = canvas_size;
        self
    }
    /// The number of columns in the polar map
    pub fn polar_resolution(mut self, polar_resolution: usize) -> Self {
        self.config.polar_resolution = polar_resolution;
        self
    }
    /// The number of radial steps per polar column
    pub fn march_steps(mut self, march_steps: usize) -> Self {
        self.config.march_steps = march_steps;
        self
    }
    /// The occluder stroke width in the occlusion map
    pub fn stroke_width(mut self, stroke_width: f32) -> Self {
        self.config.stroke_width = stroke_width;
        self
    }
    /// The occupancy at which a ray counts as hit
    pub fn hit_threshold(mut self, hit_threshold: f32) -> Self {
        self.config.hit_threshold = hit_threshold;
        self
    }
    /// The angular blur weights
    pub fn blur_kernel(mut self, blur_kernel: Vec<f32>) -> Self {
        self.config.blur_kernel = blur_kernel;
        self
    }
    /// The shift applied to occluders in the occlusion map
    pub fn occluder_offset(mut self, occluder_offset: [f32; 2]) -> Self {
        self.config.occluder_offset = occluder_offset;
        self
    }
    /// The wall stroke width in the world image
    pub fn wall_stroke_width(mut self, wall_stroke_width: f32) -> Self {
        self.config.wall_stroke_width = wall_stroke_width;
        self
    }
    /// The radius of the light disk in the world image
    pub fn light_radius(mut self, light_radius: f32) -> Self {
        self.config.light_radius = light_radius;
        self
    }
    /// The tint of the shadow overlay
    pub fn shadow_color(mut self, shadow_color: Color) -> Self {
        self.config.shadow_color = shadow_color;
        self
    }
    /// Validates and returns the config
    pub fn build(self) -> Result<ShadowConfig, ShadowError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
