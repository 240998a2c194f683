//! Streaming tile generation.
//!
//! The strip is materialised only as 1024x1024 RGBA tiles, one at a time,
//! so arbitrarily long strips never need a full allocation. Every pixel is
//! filled from the global sample function, which makes tile boundaries
//! seamless by construction.

use rayon::prelude::*;

use crate::mortar::{sample, MortarParams};

/// Tile edge length in pixels.
pub const TILE_SIZE: u32 = 1024;
/// Byte length of one RGBA tile.
pub const TILE_BYTES: usize = (TILE_SIZE as usize) * (TILE_SIZE as usize) * 4;

/// Number of tiles covering a strip of the given width.
pub fn tile_count(strip_width: u32) -> u32 {
    strip_width.div_ceil(TILE_SIZE)
}

/// Render tile `k` of the strip as packed RGBA rows.
///
/// Tiles are always full 1024x1024; columns past the strip width are still
/// defined by the same global function. Rows are filled in parallel, each
/// from pure per-pixel sampling.
pub fn render_tile(k: u32, params: &MortarParams) -> Vec<u8> {
    let u0 = k * TILE_SIZE;
    let mut tile = vec![0u8; TILE_BYTES];

    tile.par_chunks_mut(TILE_SIZE as usize * 4)
        .enumerate()
        .for_each(|(v, row)| {
            for x in 0..TILE_SIZE {
                let rgba = sample(u0 + x, v as u32, params);
                row[x as usize * 4..x as usize * 4 + 4].copy_from_slice(&rgba);
            }
        });

    tile
}

/// Render every tile of a strip in ascending order, feeding each to `emit`.
pub fn stream_tiles<E, F>(strip_width: u32, params: &MortarParams, mut emit: F) -> Result<(), E>
where
    F: FnMut(u32, &[u8]) -> Result<(), E>,
{
    for k in 0..tile_count(strip_width) {
        let tile = render_tile(k, params);
        emit(k, &tile)?;
    }
    Ok(())
}
