//! Useful functions and structs for the lighting stages.

pub mod functions;
pub mod grid;
pub mod image;
