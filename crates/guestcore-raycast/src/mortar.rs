//! Procedural mortar vein sampling.
//!
//! The megatexture strip is never stored; every pixel is a pure function of
//! its global `(u, v)` coordinate, the seed, and the parameter set. Veins
//! are ridges of a jittered Worley pattern, warped by fractal gradient
//! noise so the network looks organic.

use crate::noise::{fbm, smoothstep, worley_f1_f2};

/// Golden-ratio seed perturbation for the second warp axis.
const WARP_SEED_XOR: u32 = 0x9E37_79B9;
/// 2x2 supersampling offsets within one pixel.
const SUBPIXELS: [(f32, f32); 4] = [(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)];
/// Horizontal pixels per world unit is 1024/3; vertically 1024 pixels span
/// one unit of wall height.
const PIXELS_PER_UNIT: f32 = 1024.0;

/// Mortar generation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MortarParams {
    pub seed: u32,
    /// Vein thickness in world units.
    pub mortar_width: f32,
    /// Vein gray value in `[0, 1]`.
    pub mortar_gray: f32,
    /// Domain warp octaves.
    pub perlin_octaves: u32,
    /// Domain warp frequency.
    pub perlin_scale: f32,
    /// Vein network density, cells per world unit.
    pub worley_scale: f32,
    /// Domain warp strength in `[0, 1]`.
    pub worley_strength: f32,
}

impl Default for MortarParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            mortar_width: 0.005,
            mortar_gray: 0.30,
            perlin_octaves: 2,
            perlin_scale: 1.7,
            worley_scale: 2.0,
            worley_strength: 0.4,
        }
    }
}

impl MortarParams {
    /// The vein colour as RGB bytes.
    pub fn mortar_rgb(&self) -> [u8; 3] {
        let g = (self.mortar_gray.clamp(0.0, 1.0) * 255.0).round() as u8;
        [g, g, g]
    }
}

/// Sample the strip at global pixel `(u, v)`, returning RGBA bytes.
///
/// Supersamples the mortar coverage at four sub-pixel offsets. Alpha is the
/// averaged coverage with a minimum-visible floor of 8 whenever any
/// coverage exists; zero alpha means fully transparent.
pub fn sample(u: u32, v: u32, params: &MortarParams) -> [u8; 4] {
    let mut coverage = 0.0f32;
    for (sx, sy) in SUBPIXELS {
        let x = ((u as f32 + sx) / PIXELS_PER_UNIT) * 3.0;
        let y = (v as f32 + sy) / PIXELS_PER_UNIT;
        coverage += mortar_shape(x, y, params);
    }
    coverage /= SUBPIXELS.len() as f32;

    let mut alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
    if alpha < 8 && coverage > 0.0 {
        alpha = 8;
    }

    let [r, g, b] = params.mortar_rgb();
    [r, g, b, alpha]
}

/// Mortar coverage at world `(x, y)`, in `[0, 1]`.
fn mortar_shape(mut x: f32, mut y: f32, params: &MortarParams) -> f32 {
    let warp = params.worley_strength.max(0.0);
    let scale = params.perlin_scale.max(0.001);
    if warp > 0.0 {
        let octaves = params.perlin_octaves.max(1);
        let nx = fbm(x * scale + 31.1, y * scale + 17.3, octaves, params.seed);
        let ny = fbm(
            x * scale + 101.7,
            y * scale + 47.9,
            octaves,
            params.seed ^ WARP_SEED_XOR,
        );
        x += (nx * 2.0 - 1.0) * warp * 0.25;
        y += (ny * 2.0 - 1.0) * warp * 0.25;
    }

    let density = params.worley_scale.max(0.001);
    let cell_seed = params.seed.wrapping_mul(59167).wrapping_add(123);
    let (f1, f2) = worley_f1_f2(x, y, density, cell_seed);
    let ridge = f2 - f1;

    let width = params.mortar_width.max(0.0005);
    let m = (1.0 - smoothstep(width * 0.25, width * 0.85, ridge)).clamp(0.0, 1.0);
    m.powf(0.8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_is_pure() {
        let params = MortarParams::default();
        assert_eq!(sample(1023, 512, &params), sample(1023, 512, &params));
        assert_eq!(sample(0, 0, &params), sample(0, 0, &params));
    }

    #[test]
    fn seed_changes_the_pattern() {
        let a = MortarParams::default();
        let b = MortarParams {
            seed: 54321,
            ..MortarParams::default()
        };
        let differs = (0..64).any(|u| sample(u * 16, 512, &a) != sample(u * 16, 512, &b));
        assert!(differs);
    }

    #[test]
    fn rgb_is_the_mortar_gray() {
        let params = MortarParams::default();
        let g = (0.30f32 * 255.0).round() as u8;
        assert_eq!(params.mortar_rgb(), [g, g, g]);
        for u in 0..256 {
            let [r, gg, b, _] = sample(u, 100, &params);
            assert_eq!([r, gg, b], [g, g, g]);
        }
    }

    #[test]
    fn faint_coverage_gets_the_visibility_floor() {
        let params = MortarParams::default();
        let mut seen_floor_or_more = false;
        for u in 0..4096 {
            let [_, _, _, a] = sample(u, 700, &params);
            assert!(a == 0 || a >= 8, "alpha {a} below visibility floor");
            seen_floor_or_more |= a >= 8;
        }
        assert!(seen_floor_or_more, "no vein crossed the sampled row");
    }

    #[test]
    fn veins_cover_a_small_fraction_of_the_strip() {
        // Thin mortar lines: most pixels are transparent, some are not.
        let params = MortarParams::default();
        let mut opaque = 0u32;
        let total = 4096u32;
        for u in 0..total {
            if sample(u, 333, &params)[3] > 0 {
                opaque += 1;
            }
        }
        assert!(opaque > 0, "no veins at all");
        assert!(opaque < total / 2, "veins cover too much: {opaque}/{total}");
    }
}
