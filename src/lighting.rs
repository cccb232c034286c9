//! This module contains the 2D soft shadow pipeline.
//!
//! When contributing to this module, please keep the following things in mind:
//! * It stays "game engine agnostic". Bevy is only used for math, colors and logging,
//!   anything touching the ECS lives in [`crate::gui`].
//! * Stages are pure functions of the previous stage's output, nothing is kept across frames.
//! * Every stage should be highly unit tested.

pub mod compositor;
pub mod config;
pub mod error;
pub mod occlusion;
pub mod pipeline;
pub mod polar;
pub mod reconstruct;
pub mod scene;
pub mod util;
