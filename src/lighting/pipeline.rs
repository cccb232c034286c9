//! The per-frame shadow pipeline.
//!
//! Rasterize -> polar transform -> reconstruct -> composite, strictly in that order.
//! Each stage reads only the finished output of the one before it, and a [`Frame`]
//! owns everything it produced, so nothing carries over between frames.

use std::time::Instant;

use bevy::log::{debug, info};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use super::compositor::composite;
use super::config::ShadowConfig;
use super::error::ShadowError;
use super::occlusion::{render_world, OcclusionMap};
use super::polar::{PolarMap, PolarTransform};
use super::reconstruct::{ShadowField, ShadowReconstructor};
use super::scene::Scene;
use super::util::image::RawImage;

/// The intermediate images of a frame, in debug display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum DebugView {
    World,
    Occlusion,
    PolarMap,
    Final,
}

/// Everything one frame produced
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub world: RawImage,
    pub occlusion: OcclusionMap,
    pub polar: PolarMap,
    pub shadow: ShadowField,
    pub final_image: RawImage,
}

impl Frame {
    /// The image shown for a debug view.
    /// The polar map is a single row so it is stretched to `polar_height` rows.
    pub fn image_for(&self, view: DebugView, polar_height: usize) -> RawImage {
        match view {
            DebugView::World => self.world.clone(),
            DebugView::Occlusion => self.occlusion.to_raw_image(),
            DebugView::PolarMap => self.polar.to_raw_image(polar_height),
            DebugView::Final => self.final_image.clone(),
        }
    }

    /// Every debug view with its image, in display order
    pub fn debug_images(&self, polar_height: usize) -> Vec<(DebugView, RawImage)> {
        DebugView::iter()
            .map(|view| (view, self.image_for(view, polar_height)))
            .collect()
    }
}

/// Both stage kernels loaded and ready to run frames
#[derive(Debug, Clone)]
pub struct ShadowPipeline {
    config: ShadowConfig,
    polar_transform: PolarTransform,
    reconstructor: ShadowReconstructor,
}

impl ShadowPipeline {
    /// Validates the config and prepares both kernels.
    /// Without either kernel no frame can be produced, so any failure is fatal.
    pub fn new(config: ShadowConfig) -> Result<Self, ShadowError> {
        config.validate()?;
        let polar_transform = PolarTransform::new(&config)?;
        let reconstructor = ShadowReconstructor::new(&config)?;
        info!(
            "Shadow pipeline ready: {0}x{0} canvas, {1} angular samples, {2} march steps, {3} blur taps",
            config.canvas_size,
            config.polar_resolution,
            config.march_steps,
            config.blur_kernel.len()
        );
        Ok(Self {
            config,
            polar_transform,
            reconstructor,
        })
    }

    pub fn get_config(&self) -> &ShadowConfig {
        &self.config
    }

    pub fn get_reconstructor(&self) -> &ShadowReconstructor {
        &self.reconstructor
    }

    /// Runs every stage for the scene
    pub fn render_frame(&self, scene: &Scene) -> Frame {
        let start = Instant::now();

        let occlusion = OcclusionMap::rasterize(scene, &self.config);
        let polar = self.polar_transform.build(&occlusion);
        let shadow = self.reconstructor.render(&polar, occlusion.get_size());

        let world = render_world(scene, &self.config);
        let overlay = shadow.to_raw_image(self.config.shadow_color);
        let final_image = composite(&world, &overlay, occlusion.get_top_left());

        debug!(
            "Frame with {} segments took {:?}, {}/{} rays hit",
            scene.num_segments(),
            start.elapsed(),
            polar.count_hits(),
            polar.get_resolution()
        );
        Frame {
            world,
            occlusion,
            polar,
            shadow,
            final_image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::config::ShadowConfigBuilder;
    use crate::lighting::scene::{Light, Occluder, SceneBuilder};
    use crate::lighting::polar::angle_to_coord;
    use crate::lighting::util::functions::smoothstep;
    use bevy::math::Vec2;
    use std::f32::consts::PI;

    macro_rules! assert_approx_eq {
        ($a:expr, $b:expr) => {
            assert_approx_eq!($a, $b, 1e-5);
        };
        ($a:expr, $b:expr, $epsilon:expr) => {
            assert!(
                ($a - $b).abs() <= $epsilon,
                "assertion failed: `(left approx== right)`\n  left: `{}`,\n right: `{}`",
                $a,
                $b
            );
        };
    }

    const N: usize = 180;
    const LIGHT: Vec2 = Vec2::new(200.0, 200.0);

    fn pipeline() -> ShadowPipeline {
        let config = ShadowConfigBuilder::new()
            .occluder_offset([0.0, 0.0])
            .build()
            .unwrap();
        ShadowPipeline::new(config).unwrap()
    }

    /// A horizontal wall spanning the canvas, `distance` pixels above the light
    fn wall_above(distance: f32) -> Scene {
        SceneBuilder::new()
            .occluder(Occluder::segment(
                Vec2::new(-1000.0, LIGHT.y - distance),
                Vec2::new(1000.0, LIGHT.y - distance),
            ))
            .light(Light { position: LIGHT })
            .build()
    }

    /// Normalized radius of a shadow field pixel, the same way the reconstructor sees it
    fn pixel_radius(row: usize, col: usize, size: usize) -> f32 {
        let s = (col as f32 + 0.5) / size as f32;
        let t = (row as f32 + 0.5) / size as f32;
        Vec2::new(s * 2.0 - 1.0, t * -2.0 + 1.0).length()
    }

    #[test]
    fn test_invalid_kernel_is_fatal() {
        let mut config = ShadowConfig::default();
        config.blur_kernel = vec![0.5, 0.5];
        assert!(matches!(
            ShadowPipeline::new(config),
            Err(ShadowError::KernelLoad { .. })
        ));
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let mut config = ShadowConfig::default();
        config.stroke_width = 0.0;
        assert!(matches!(
            ShadowPipeline::new(config),
            Err(ShadowError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_empty_scene_is_fully_lit() {
        let pipeline = pipeline();
        let scene = SceneBuilder::new().light(Light { position: LIGHT }).build();
        let frame = pipeline.render_frame(&scene);
        assert!(frame.polar.get_distances().iter().all(|&d| d == 1.0));
        let size = frame.shadow.get_size();
        for row in 0..size {
            for col in 0..size {
                if pixel_radius(row, col, size) < 1.0 {
                    assert_eq!(frame.shadow.get(row, col), 0.0);
                }
            }
        }
        assert_eq!(frame.final_image, frame.world);
    }

    /// Upward component of the ray a polar column marches along
    fn column_up(idx: usize) -> f32 {
        let u = idx as f32 / N as f32;
        let theta = PI * 1.5 + (u * 2.0 - 1.0) * PI;
        theta.cos()
    }

    #[test]
    fn test_wall_distance_is_recorded() {
        let frame = pipeline().render_frame(&wall_above(100.0));
        let polar = &frame.polar;
        assert_eq!(polar.get_resolution(), N);
        let up = polar.column_for_angle(PI * 0.5);
        assert_approx_eq!(column_up(up), 1.0);
        assert_approx_eq!(polar.column(up), 0.5, 1.0 / N as f32 + 1e-4);

        // The stroke is hit once a ray climbs 98 px, so every column that climbs
        // that far within range stops there and every other one sees nothing
        for idx in 0..N {
            let climb = column_up(idx);
            let d = polar.column(idx);
            if climb < 0.49 {
                assert_eq!(d, 1.0, "column {} climbs {} but hit at {}", idx, climb, d);
            } else if climb >= 0.5 {
                let entry = 0.49 / climb;
                assert!(
                    d > entry - 1e-3 && d <= entry + 1.0 / N as f32 + 1e-3,
                    "column {} climbs {}, expected about {} got {}",
                    idx,
                    climb,
                    entry,
                    d
                );
            }
        }
    }

    #[test]
    fn test_farther_wall_is_never_closer() {
        let pipeline = pipeline();
        let step = 1.0 / pipeline.get_config().march_steps as f32;
        let mut last = 0.0;
        for distance in [40.0, 60.0, 80.0, 100.0, 120.0, 140.0, 160.0, 180.0, 220.0] {
            let polar = pipeline.render_frame(&wall_above(distance)).polar;
            let up = polar.column(polar.column_for_angle(PI * 0.5));
            assert!(up + step >= last, "{} px gave {} after {}", distance, up, last);
            last = up;
        }
        // Past the map radius nothing is recorded
        assert_eq!(last, 1.0);
    }

    #[test]
    fn test_light_in_closed_box() {
        let pipeline = pipeline();
        let scene = Scene::closed_box(LIGHT, 75.0);
        let frame = pipeline.render_frame(&scene);
        assert_eq!(frame.polar.count_hits(), N);

        let size = frame.shadow.get_size();
        for row in (0..size).step_by(7) {
            for col in (0..size).step_by(7) {
                let r = pixel_radius(row, col, size);
                let alpha = frame.shadow.get(row, col);
                let fade = smoothstep(1.0, 0.0, r);
                if r <= 0.3 {
                    // Inside the box
                    assert_eq!(alpha, 0.0, "lit pixel ({}, {}) was shadowed", row, col);
                } else if r < 0.6 {
                    // Across the walls, somewhere between lit and the full fade
                    assert!(
                        (0.0..=fade + 1e-6).contains(&alpha),
                        "pixel ({}, {}) at r {} got {}",
                        row,
                        col,
                        r,
                        alpha
                    );
                } else if r <= 0.95 {
                    // Past every wall, as dark as the fade allows
                    assert_approx_eq!(alpha, fade, 1e-4);
                }
            }
        }

        // Outside the box the final image is darker than the world
        let world = frame.world.get_pixel(330, 200).unwrap();
        let shaded = frame.final_image.get_pixel(330, 200).unwrap();
        assert!(shaded[0] < world[0]);
        // The light's surroundings are untouched
        assert_eq!(
            frame.final_image.get_pixel(240, 240),
            frame.world.get_pixel(240, 240)
        );
    }

    /// Penumbra only forms where neighboring columns disagree, which in a box
    /// is toward the corners
    #[test]
    fn test_closed_box_penumbra_at_corners() {
        let pipeline = pipeline();
        let frame = pipeline.render_frame(&Scene::closed_box(LIGHT, 75.0));
        let reconstructor = pipeline.get_reconstructor();
        let graded_along = |theta: f32| {
            (300..600)
                .map(|i| i as f32 / 1000.0)
                .map(|r| reconstructor.lit_at(&frame.polar, angle_to_coord(theta), r))
                .filter(|&lit| lit > 0.0 && lit < 1.0)
                .count()
        };
        // Facing a wall the columns agree and the edge is hard
        assert!(graded_along(PI * 0.5 + PI / N as f32) <= 2);
        assert!(graded_along(PI / N as f32) <= 2);
        // Toward a corner the distance changes quickly between columns
        let corner = graded_along(PI * 0.25);
        assert!(corner >= 10, "only {} graded samples toward the corner", corner);
    }

    /// The default one pixel offset shifts occluders down and right in the map
    #[test]
    fn test_default_occluder_offset() {
        let plain = pipeline().render_frame(&Scene::closed_box(LIGHT, 75.0));
        let default_pipeline = ShadowPipeline::new(ShadowConfig::default()).unwrap();
        let shifted = default_pipeline.render_frame(&Scene::closed_box(LIGHT, 75.0));

        let size = plain.occlusion.get_size();
        for row in 0..size - 1 {
            for col in 0..size - 1 {
                assert_eq!(
                    shifted.occlusion.get(row + 1, col + 1),
                    plain.occlusion.get(row, col),
                    "texel ({}, {})",
                    row,
                    col
                );
            }
        }
        assert_eq!(shifted.polar.count_hits(), N);
        // The top wall ends up one pixel closer to the light
        let up = shifted.polar.column_for_angle(PI * 0.5);
        assert!(shifted.polar.column(up) <= plain.polar.column(up));
        // The overlay is still placed on the light
        assert_eq!(shifted.occlusion.get_top_left(), plain.occlusion.get_top_left());
        assert_eq!(shifted.world, plain.world);
    }

    #[test]
    fn test_frames_do_not_carry_state() {
        let pipeline = pipeline();
        let first = pipeline.render_frame(&Scene::open_box());
        let mut moved = Scene::open_box();
        moved.light.translate(Vec2::new(30.0, 20.0));
        let _ = pipeline.render_frame(&moved);
        let again = pipeline.render_frame(&Scene::open_box());
        assert_eq!(first, again);
    }

    #[test]
    fn test_debug_views() {
        let frame = pipeline().render_frame(&Scene::open_box());
        let images = frame.debug_images(400);
        let views: Vec<_> = images.iter().map(|(view, _)| *view).collect();
        assert_eq!(
            views,
            vec![
                DebugView::World,
                DebugView::Occlusion,
                DebugView::PolarMap,
                DebugView::Final
            ]
        );
        for (_, image) in &images {
            assert_eq!(image.get_height(), 400);
        }
        assert_eq!(frame.image_for(DebugView::PolarMap, 400).get_width(), N);
    }
}
