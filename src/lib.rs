//! Real-time 2D soft shadows from a polar distance map.
//!
//! Occluders are rasterized around the light, ray marched into a one row map of
//! distances per angle, and every pixel is then compared against that map to
//! decide how shadowed it is.

pub mod gui;
pub mod lighting;
