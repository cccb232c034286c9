//! Scalar helpers shaped after their shading-language namesakes.
//! Keeping them here means the stages read like the kernels they replace.

/// A modulo that works for negative numbers
pub fn modulo(x: isize, y: usize) -> usize {
    let y_isize = y as isize;
    (((x % y_isize) + y_isize) % y_isize) as usize
}

/// 0.0 if `x < edge`, else 1.0
pub fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

/// Hermite interpolation between two edges.
/// Reversed edges (`edge0 > edge1`) are allowed and produce a falling curve.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return step(edge0, x);
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Wraps a value into [0, 1)
pub fn wrap_unit(x: f32) -> f32 {
    let wrapped = x - x.floor();
    // x.floor() can round so that x - floor(x) == 1.0 for tiny negative x
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}
