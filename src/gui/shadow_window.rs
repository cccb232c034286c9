//! An egui window to watch and tune the pipeline while it runs

use bevy::{
    app::{App, Plugin, Update},
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    ecs::system::{Local, Res, ResMut},
    log::{info, warn},
};
use bevy_egui::{
    egui::{self},
    EguiContexts,
};

use crate::lighting::config::ShadowConfig;
use crate::lighting::pipeline::ShadowPipeline;

use super::shadow_view::{SceneResource, ShadowPipelineResource};

pub struct ShadowWindowPlugin;

impl Plugin for ShadowWindowPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, shadow_window_system);
    }
}

/// Swaps in a pipeline built from `config`, keeping the running one if it is invalid
pub fn rebuild_pipeline(pipeline: &mut ShadowPipelineResource, config: &ShadowConfig) -> bool {
    match ShadowPipeline::new(config.clone()) {
        Ok(rebuilt) => {
            info!("Shadow pipeline rebuilt");
            pipeline.0 = rebuilt;
            true
        }
        Err(e) => {
            warn!("Keeping the current shadow pipeline: {}", e);
            false
        }
    }
}

pub fn shadow_window_system(
    mut contexts: EguiContexts,
    diagnostics: Res<DiagnosticsStore>,
    scene: Res<SceneResource>,
    mut pipeline: ResMut<ShadowPipelineResource>,
    mut draft: Local<Option<ShadowConfig>>,
) {
    let fps = diagnostics
        .get(FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
        .unwrap_or(0.0);
    let draft = draft.get_or_insert_with(|| pipeline.0.get_config().clone());
    let mut changed = false;
    egui::Window::new("Shadows").show(contexts.ctx_mut(), |ui| {
        ui.label(format!("FPS: {:.1}", fps));
        let light = scene.0.light.position;
        ui.label(format!("Light: ({:.0}, {:.0})", light.x, light.y));
        ui.label("Move the light with WASD or the arrow keys");
        ui.separator();
        changed |= ui
            .add(egui::Slider::new(&mut draft.polar_resolution, 16..=720).text("Angular samples"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut draft.march_steps, 16..=720).text("March steps"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut draft.stroke_width, 1.0..=12.0).text("Stroke width"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut draft.hit_threshold, 0.05..=1.0).text("Hit threshold"))
            .changed();
        if ui.button("Reset").clicked() {
            *draft = ShadowConfig::default();
            changed = true;
        }
    });
    if changed {
        rebuild_pipeline(&mut pipeline, draft);
    }
}
