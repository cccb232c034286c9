pub mod occlusion;
pub mod pipeline;
pub mod polar;
pub mod reconstruct;

use polar_shadows::lighting::config::ShadowConfig;
use polar_shadows::lighting::scene::Scene;

/// The demo scene with the default config
pub fn demo() -> (Scene, ShadowConfig) {
    (Scene::open_box(), ShadowConfig::default())
}
