//! This module contains all the bevy facing code.
//! It plays the host application: it owns the scene, moves the light, runs the
//! pipeline every frame and shows the stages in four debug quadrants.

use bevy::app::{PluginGroup, PluginGroupBuilder};

pub mod light_controls;
pub mod shadow_view;
pub mod shadow_window;

pub struct ShadowGuiPluginGroup;

impl PluginGroup for ShadowGuiPluginGroup {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(shadow_view::ShadowViewPlugin)
            .add(light_controls::LightControlsPlugin)
            .add(shadow_window::ShadowWindowPlugin)
    }
}
