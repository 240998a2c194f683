//! Keyframe (chunk type 0x20) decoding.

use byteorder::{ByteOrder, LittleEndian};

use super::{paint_masked_tile, Frame, Palette, TILE_SIZE};
use crate::error::{MediaError, MediaResult};

/// Byte length of the embedded palette table.
const PALETTE_BYTES: usize = 768;
/// Header: x tiles, y tiles, colour depth, all u16le.
const HEADER_BYTES: usize = 6;
/// Per-tile record: c1, c0, 16-bit mask.
const TILE_RECORD_BYTES: usize = 4;

/// Decode a keyframe payload into a fresh palette and frame.
///
/// Layout: `u16 xTiles`, `u16 yTiles`, `u16 colourDepth`, 768 palette
/// bytes, then one `(c1, c0, u16 mask)` record per tile in row-major order.
pub(super) fn decode(payload: &[u8]) -> MediaResult<(Palette, Frame)> {
    if payload.len() < HEADER_BYTES + PALETTE_BYTES {
        return Err(MediaError::BitmapMalformed {
            reason: "keyframe shorter than header and palette",
            offset: payload.len(),
        });
    }

    let x_tiles = u32::from(LittleEndian::read_u16(&payload[0..2]));
    let y_tiles = u32::from(LittleEndian::read_u16(&payload[2..4]));
    // Colour depth is fixed at 8 in shipped data; the field is validated
    // only implicitly through the 768-byte palette that follows.
    let _colour_depth = LittleEndian::read_u16(&payload[4..6]);

    if x_tiles == 0 || y_tiles == 0 {
        return Err(MediaError::BitmapMalformed {
            reason: "keyframe has zero tile dimension",
            offset: 0,
        });
    }

    let mut palette_bytes = [0u8; PALETTE_BYTES];
    palette_bytes.copy_from_slice(&payload[HEADER_BYTES..HEADER_BYTES + PALETTE_BYTES]);
    let palette = Palette::from_bytes(&palette_bytes);

    let tile_count = x_tiles as usize * y_tiles as usize;
    let tiles_start = HEADER_BYTES + PALETTE_BYTES;
    if payload.len() < tiles_start + tile_count * TILE_RECORD_BYTES {
        return Err(MediaError::BitmapMalformed {
            reason: "keyframe tile stream truncated",
            offset: payload.len(),
        });
    }

    let mut frame = Frame::new(x_tiles * TILE_SIZE, y_tiles * TILE_SIZE);
    let mut cursor = tiles_start;
    for tile_y in 0..y_tiles {
        for tile_x in 0..x_tiles {
            let c1 = palette.get(payload[cursor]);
            let c0 = palette.get(payload[cursor + 1]);
            let mask = LittleEndian::read_u16(&payload[cursor + 2..cursor + 4]);
            cursor += TILE_RECORD_BYTES;

            paint_masked_tile(&mut frame, tile_x * TILE_SIZE, tile_y * TILE_SIZE, mask, c1, c0);
        }
    }

    Ok((palette, frame))
}
