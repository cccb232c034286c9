//! Runs the shadow pipeline every frame and shows its stages.
//!
//! The window is split in four quadrants, each one a sprite whose texture is replaced
//! every frame: the lit world, the occlusion map, the polar map and the final image.

use bevy::app::{App, Plugin, Startup, Update};
use bevy::asset::{Assets, Handle};
use bevy::core_pipeline::core_2d::Camera2dBundle;
use bevy::ecs::component::Component;
use bevy::ecs::schedule::IntoSystemConfigs;
use bevy::ecs::system::{Commands, Query, Res, ResMut, Resource};
use bevy::gizmos::gizmos::Gizmos;
use bevy::math::Vec2;
use bevy::render::color::Color;
use bevy::render::texture::Image;
use bevy::sprite::{Sprite, SpriteBundle};
use bevy::transform::components::Transform;
use strum::IntoEnumIterator;

use crate::lighting::pipeline::{DebugView, ShadowPipeline};
use crate::lighting::scene::Scene;

use super::light_controls::move_light_system;

/// Gap between quadrants, in pixels
const SEPARATOR: f32 = 1.0;

/// The pipeline, built once at startup and rebuilt when the config is edited
#[derive(Resource)]
pub struct ShadowPipelineResource(pub ShadowPipeline);

/// The scene handed to the pipeline every frame
#[derive(Resource, Default)]
pub struct SceneResource(pub Scene);

/// Marks the sprite that displays one stage of the pipeline
#[derive(Component, Debug, Clone, Copy)]
pub struct DebugQuadrant(pub DebugView);

impl DebugQuadrant {
    /// Where the quadrant's center sits, with the window center at the origin
    pub fn center(self, canvas: f32) -> Vec2 {
        let offset = (canvas + SEPARATOR) * 0.5;
        match self.0 {
            DebugView::World => Vec2::new(-offset, offset),
            DebugView::Occlusion => Vec2::new(offset, offset),
            DebugView::PolarMap => Vec2::new(-offset, -offset),
            DebugView::Final => Vec2::new(offset, -offset),
        }
    }
}

pub struct ShadowViewPlugin;

impl Plugin for ShadowViewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneResource>();
        app.add_systems(Startup, setup_quadrants_system);
        app.add_systems(Update, render_frame_system.after(move_light_system));
        app.add_systems(Update, draw_separators_system);
    }
}

/// Bevy Systems
/// Spawns the camera and one sprite per debug view
pub fn setup_quadrants_system(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    pipeline: Res<ShadowPipelineResource>,
) {
    commands.spawn(Camera2dBundle::default());
    let canvas = pipeline.0.get_config().canvas_size as f32;
    for view in DebugView::iter() {
        let quadrant = DebugQuadrant(view);
        let texture = images.add(Image::default());
        commands.spawn((
            quadrant,
            SpriteBundle {
                texture,
                sprite: Sprite {
                    custom_size: Some(Vec2::splat(canvas)),
                    ..Default::default()
                },
                transform: Transform::from_translation(quadrant.center(canvas).extend(0.0)),
                ..Default::default()
            },
        ));
    }
}

/// Runs the whole pipeline and swaps every quadrant's texture
pub fn render_frame_system(
    pipeline: Res<ShadowPipelineResource>,
    scene: Res<SceneResource>,
    mut images: ResMut<Assets<Image>>,
    quadrants: Query<(&DebugQuadrant, &Handle<Image>)>,
) {
    let frame = pipeline.0.render_frame(&scene.0);
    // The sprite stretches the single polar row over the quadrant
    for (view, debug_image) in frame.debug_images(1) {
        for (quadrant, handle) in quadrants.iter() {
            if quadrant.0 != view {
                continue;
            }
            if let Some(image) = images.get_mut(handle) {
                *image = debug_image.clone().to_bevy_image();
            }
        }
    }
}

/// Red lines between the quadrants
pub fn draw_separators_system(pipeline: Res<ShadowPipelineResource>, mut gizmos: Gizmos) {
    let extent = pipeline.0.get_config().canvas_size as f32 + SEPARATOR;
    gizmos.line_2d(
        Vec2::new(0.0, -extent),
        Vec2::new(0.0, extent),
        Color::RED,
    );
    gizmos.line_2d(
        Vec2::new(-extent, 0.0),
        Vec2::new(extent, 0.0),
        Color::RED,
    );
}

/// Size of the window needed to show all four quadrants
pub fn window_size(canvas_size: usize) -> (f32, f32) {
    let side = canvas_size as f32 * 2.0 + SEPARATOR;
    (side, side)
}
