//! Fractal Brownian motion over gradient noise.

use super::perlin;

/// Sum `octaves` layers of gradient noise, halving amplitude and doubling
/// frequency per octave; each octave perturbs the seed so layers decorrelate.
/// Output is normalised by the total amplitude.
pub fn fbm(x: f32, y: f32, octaves: u32, seed: u32) -> f32 {
    let mut total = 0.0f32;
    let mut frequency = 1.0f32;
    let mut amplitude = 1.0f32;
    let mut max_value = 0.0f32;

    for i in 0..octaves.max(1) {
        total += perlin(x * frequency, y * frequency, seed.wrapping_add(i)) * amplitude;
        max_value += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }

    total / max_value
}
