//! A simple 2d grid type
//! Backed by ndarray so that whole-image passes can be run in parallel with rayon.
//! Indexing is (row, column), rows growing downward like texture coordinates.
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use bevy::math::Vec2;
use ndarray::{Array2, Zip};

/// A simple 2d grid type
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T>(Array2<T>);

/* =================
 * Initialization
 * ================= */
impl<T> Grid<T> {
    /// Create a new grid filled with one value
    pub fn new_fill(width: usize, height: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self(Array2::from_elem((height, width), value))
    }

    /// Create a new grid where every cell is computed from its (row, column)
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        Self(Array2::from_shape_fn((height, width), |(row, col)| f(row, col)))
    }

    /// Same as [`Grid::from_fn`] but every cell is computed in parallel.
    /// `f` must only depend on its arguments and on read-only captures.
    pub fn par_from_fn<F>(width: usize, height: usize, f: F) -> Self
    where
        T: Default + Clone + Send,
        F: Fn(usize, usize) -> T + Sync + Send,
    {
        let mut data = Array2::from_elem((height, width), T::default());
        Zip::indexed(&mut data).par_for_each(|(row, col), cell| {
            *cell = f(row, col);
        });
        Self(data)
    }
}

/* ======================================
 * Simple Getters
 * Access basic attributes of the struct
 * ====================================== */
impl<T> Grid<T> {
    /// Get the width of the grid
    pub fn get_width(&self) -> usize {
        self.0.ncols()
    }
    /// Get the height of the grid
    pub fn get_height(&self) -> usize {
        self.0.nrows()
    }
    /// Get the total size of the grid
    pub fn total_size(&self) -> usize {
        self.0.len()
    }
    /// Get the data as an ndarray
    pub fn get_data(&self) -> &Array2<T> {
        &self.0
    }
}

/* ======================================
 * Position Based Getters
 * Access data at a position
 * ====================================== */
impl<T> Grid<T> {
    /// Gets the value at the given coordinate
    /// Panics when out of bounds, like slice indexing
    pub fn get(&self, row: usize, col: usize) -> &T {
        &self.0[[row, col]]
    }
    /// Gets the value at the given coordinate, or None if it is out of bounds
    pub fn checked_get(&self, row: usize, col: usize) -> Option<&T> {
        self.0.get([row, col])
    }
    /// Sets the value at the given coordinate, overwriting the old value
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.0[[row, col]] = value;
    }
    /// Nearest-texel lookup in normalized texture space.
    /// Coordinates outside [0, 1] are clamped to the border texel.
    pub fn sample_nearest(&self, coord: Vec2) -> &T {
        let col = texel_index(coord.x, self.get_width());
        let row = texel_index(coord.y, self.get_height());
        self.get(row, col)
    }
}

/// Converts a normalized coordinate into a clamped texel index
fn texel_index(x: f32, len: usize) -> usize {
    debug_assert_ne!(len, 0, "Cannot sample an empty grid");
    let idx = (x * len as f32).floor();
    if idx.is_nan() || idx < 0.0 {
        0
    } else {
        (idx as usize).min(len - 1)
    }
}

/// Iteration
impl<T> Grid<T> {
    /// Iterate over the cells in row-major order
    pub fn iter(&self) -> ndarray::iter::Iter<'_, T, ndarray::Ix2> {
        self.0.iter()
    }
}

impl<'a, T> IntoIterator for &'a Grid<T> {
    type Item = &'a T;
    type IntoIter = ndarray::iter::Iter<'a, T, ndarray::Ix2>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
