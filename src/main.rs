use std::path::Path;

use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::{log::LogPlugin, prelude::*, window::WindowResolution};
use bevy_egui::EguiPlugin;
use polar_shadows::gui::shadow_view::{window_size, SceneResource, ShadowPipelineResource};
use polar_shadows::gui::ShadowGuiPluginGroup;
use polar_shadows::lighting::config::ShadowConfig;
use polar_shadows::lighting::error::ShadowError;
use polar_shadows::lighting::pipeline::ShadowPipeline;
use polar_shadows::lighting::scene::Scene;

/// Optional overrides, read from the working directory
const CONFIG_PATH: &str = "polar_shadows.toml";

fn load_config() -> Result<ShadowConfig, ShadowError> {
    let path = Path::new(CONFIG_PATH);
    if !path.exists() {
        return Ok(ShadowConfig::default());
    }
    match std::fs::read_to_string(path) {
        Ok(source) => ShadowConfig::from_toml_str(&source),
        Err(e) => Err(ShadowError::invalid_config(
            "config file",
            format!("could not read {}: {}", CONFIG_PATH, e),
        )),
    }
}

fn main() -> Result<(), ShadowError> {
    // Both kernels have to load before there is anything to show
    let pipeline = ShadowPipeline::new(load_config()?)?;
    let (width, height) = window_size(pipeline.get_config().canvas_size);

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(LogPlugin {
                    level: bevy::log::Level::INFO,
                    ..Default::default()
                })
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Polar Shadows".to_string(),
                        resolution: WindowResolution::new(width, height),
                        ..Default::default()
                    }),
                    ..Default::default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        .add_plugins(EguiPlugin)
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .insert_resource(ShadowPipelineResource(pipeline))
        .insert_resource(SceneResource(Scene::open_box()))
        .add_plugins(ShadowGuiPluginGroup)
        .run();
    Ok(())
}
