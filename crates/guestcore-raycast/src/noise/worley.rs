//! Worley (cellular) noise with jittered feature points.

use super::hash32;

/// Euclidean F1 and F2 distances to the nearest feature points.
///
/// Coordinates are scaled by `density` (cells per unit); each cell owns one
/// feature point jittered from its integer coordinates and the seed. The
/// 3x3 cell neighbourhood is searched.
pub fn worley_f1_f2(x: f32, y: f32, density: f32, seed: u32) -> (f32, f32) {
    let sx = x * density;
    let sy = y * density;
    let xi = sx.floor() as i32;
    let yi = sy.floor() as i32;

    let mut f1 = 1e9f32;
    let mut f2 = 1e9f32;

    for dy in -1..=1 {
        for dx in -1..=1 {
            let cx = xi + dx;
            let cy = yi + dy;
            let h = hash32(cx as u32, cy as u32, seed);
            let jx = (h & 0xFFFF) as f32 / 65535.0;
            let jy = ((h >> 16) & 0xFFFF) as f32 / 65535.0;
            let fx = cx as f32 + jx;
            let fy = cy as f32 + jy;
            let dxp = sx - fx;
            let dyp = sy - fy;
            let d2 = dxp * dxp + dyp * dyp;
            if d2 < f1 {
                f2 = f1;
                f1 = d2;
            } else if d2 < f2 {
                f2 = d2;
            }
        }
    }

    (f1.sqrt(), f2.sqrt())
}
