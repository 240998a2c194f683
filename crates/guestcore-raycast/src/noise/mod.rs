//! Noise primitives for procedural mortar generation.
//!
//! All functions are pure and deterministic for a given seed; single
//! precision throughout to keep texture output stable across platforms.

mod fbm;
mod perlin;
mod worley;

pub use fbm::fbm;
pub use perlin::perlin;
pub use worley::worley_f1_f2;

/// Stable integer hash over cell coordinates and a seed.
#[inline]
pub fn hash32(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h ^= x.wrapping_mul(0x1B87_3593);
    h ^= y.wrapping_mul(0xCC9E_2D51);
    h = (h ^ (h >> 16)).wrapping_mul(0x85EB_CA6B);
    h = (h ^ (h >> 13)).wrapping_mul(0xC2B2_AE35);
    h ^ (h >> 16)
}

/// Hermite smoothstep between two edges, clamped.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
