//! Gradient noise with hash-derived gradient angles.

use super::{hash32, smoothstep};

const TAU: f32 = 6.283_185_3;

/// Sample gradient noise at `(x, y)`. Output is roughly in `[-1, 1]`.
pub fn perlin(x: f32, y: f32, seed: u32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let sx = x - x0 as f32;
    let sy = y - y0 as f32;

    let u = smoothstep(0.0, 1.0, sx);
    let v = smoothstep(0.0, 1.0, sy);

    let n00 = grad(x0, y0, seed, sx, sy);
    let n10 = grad(x1, y0, seed, sx - 1.0, sy);
    let n01 = grad(x0, y1, seed, sx, sy - 1.0);
    let n11 = grad(x1, y1, seed, sx - 1.0, sy - 1.0);

    let nx0 = n00 * (1.0 - u) + n10 * u;
    let nx1 = n01 * (1.0 - u) + n11 * u;
    nx0 * (1.0 - v) + nx1 * v
}

/// Dot product of the corner gradient with the offset vector. The gradient
/// direction is an angle derived from the corner hash.
#[inline]
fn grad(ix: i32, iy: i32, seed: u32, dx: f32, dy: f32) -> f32 {
    let h = hash32(ix as u32, iy as u32, seed);
    let angle = (h as f32 / u32::MAX as f32) * TAU;
    angle.cos() * dx + angle.sin() * dy
}
