//! The per-frame input of the pipeline: occluder polylines and a single point light.
//! World coordinates are pixels with Y growing downward.

use bevy::math::Vec2;
use derive_more::From;
use itertools::Itertools;

/// A polyline that blocks light
#[derive(Debug, Clone, PartialEq)]
pub struct Occluder {
    pub points: Vec<Vec2>,
    /// If true the last point connects back to the first
    pub closed: bool,
}

impl Occluder {
    /// A closed polygon
    pub fn closed(points: Vec<Vec2>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    /// An open polyline
    pub fn open(points: Vec<Vec2>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    /// A single straight wall
    pub fn segment(a: Vec2, b: Vec2) -> Self {
        Self::open(vec![a, b])
    }

    /// Consecutive vertex pairs, including the closing pair when closed.
    /// A single point yields one zero-length segment so it still leaves a mark.
    pub fn segments(&self) -> Vec<(Vec2, Vec2)> {
        match self.points.len() {
            0 => Vec::new(),
            1 => vec![(self.points[0], self.points[0])],
            2 => vec![(self.points[0], self.points[1])],
            _ if self.closed => self.points.iter().copied().circular_tuple_windows().collect(),
            _ => self.points.iter().copied().tuple_windows().collect(),
        }
    }

    /// Moves every point by the same amount
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            points: self.points.iter().map(|p| *p + delta).collect(),
            closed: self.closed,
        }
    }
}

/// A light that emits in all directions from a single point
#[derive(Debug, Clone, Copy, PartialEq, Default, From)]
pub struct Light {
    pub position: Vec2,
}

impl Light {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
        }
    }

    /// Move the light, only ever done between frames
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

/// Everything the pipeline needs for one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub occluders: Vec<Occluder>,
    pub light: Light,
}

impl Scene {
    /// The demo scene: three walls of a box with the right side open and
    /// the light near the top left corner inside it
    pub fn open_box() -> Self {
        SceneBuilder::new()
            .occluder(Occluder::open(vec![
                Vec2::new(150.0, 150.0),
                Vec2::new(150.0, 300.0),
                Vec2::new(300.0, 300.0),
                Vec2::new(300.0, 150.0),
            ]))
            .light(Light::new(200.0, 200.0))
            .build()
    }

    /// A closed square of the given half size centered on the light
    pub fn closed_box(center: Vec2, half_size: f32) -> Self {
        SceneBuilder::new()
            .occluder(Occluder::closed(vec![
                center + Vec2::new(-half_size, -half_size),
                center + Vec2::new(half_size, -half_size),
                center + Vec2::new(half_size, half_size),
                center + Vec2::new(-half_size, half_size),
            ]))
            .light(Light { position: center })
            .build()
    }

    /// Total number of segments across all occluders
    pub fn num_segments(&self) -> usize {
        self.occluders.iter().map(|o| o.segments().len()).sum()
    }
}

/// A builder for Scene
#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    occluders: Vec<Occluder>,
    light: Light,
}

impl SceneBuilder {
    /// Start here
    pub fn new() -> Self {
        Self::default()
    }
    /// Add an occluder
    pub fn occluder(mut self, occluder: Occluder) -> Self {
        self.occluders.push(occluder);
        self
    }
    /// Set the light
    pub fn light(mut self, light: Light) -> Self {
        self.light = light;
        self
    }
    pub fn build(self) -> Scene {
        Scene {
            occluders: self.occluders,
            light: self.light,
        }
    }
}
