//! Moves the light around with the keyboard

use bevy::{
    app::{App, Plugin, Update},
    ecs::system::{Res, ResMut},
    input::{keyboard::KeyCode, Input},
    log::trace,
    math::Vec2,
};

use super::shadow_view::SceneResource;

/// Pixels the light moves per frame while a key is held
const LIGHT_SPEED: f32 = 1.0;

pub struct LightControlsPlugin;

impl Plugin for LightControlsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, move_light_system);
    }
}

/// Which way the held keys push the light, in world pixels with Y down
pub fn light_direction(keyboard_input: &Input<KeyCode>) -> Vec2 {
    let mut delta = Vec2::ZERO;
    if keyboard_input.any_pressed([KeyCode::Left, KeyCode::A]) {
        delta.x -= 1.;
    }
    if keyboard_input.any_pressed([KeyCode::Right, KeyCode::D]) {
        delta.x += 1.;
    }
    if keyboard_input.any_pressed([KeyCode::Up, KeyCode::W]) {
        delta.y -= 1.;
    }
    if keyboard_input.any_pressed([KeyCode::Down, KeyCode::S]) {
        delta.y += 1.;
    }
    delta
}

/// Bevy Systems
pub fn move_light_system(keyboard_input: Res<Input<KeyCode>>, mut scene: ResMut<SceneResource>) {
    let delta = light_direction(&keyboard_input);
    if delta != Vec2::ZERO {
        scene.0.light.translate(delta * LIGHT_SPEED);
        trace!("Light moved to {}", scene.0.light.position);
    }
}
