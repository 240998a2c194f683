//! Delta (chunk type 0x25) decoding.
//!
//! A delta payload starts with a palette patch (a `u16` byte count of
//! replacement triples, a 32-byte selection bitfield that is always present,
//! then the triples in scan order) followed by a stream of tile opcodes
//! painting into the current frame.

use byteorder::{ByteOrder, LittleEndian};

use super::{paint_masked_tile, Frame, Palette, Rgb, TILE_MASKS, TILE_SIZE};
use crate::error::{MediaError, MediaResult};

/// Byte length of the palette selection bitfield (16 x u16).
const BITFIELD_BYTES: usize = 32;

/// Apply a delta payload to the palette and frame in place.
///
/// Returns whether any palette entry was rewritten. The caller passes
/// working copies; on error the originals are untouched.
pub(super) fn apply(payload: &[u8], palette: &mut Palette, frame: &mut Frame) -> MediaResult<bool> {
    if payload.len() < 2 + BITFIELD_BYTES {
        return Err(MediaError::BitmapMalformed {
            reason: "delta shorter than palette patch header",
            offset: payload.len(),
        });
    }

    let patch_bytes = usize::from(LittleEndian::read_u16(&payload[0..2]));
    let opcodes_start = 2 + BITFIELD_BYTES + patch_bytes;
    if opcodes_start > payload.len() {
        return Err(MediaError::BitmapMalformed {
            reason: "palette patch data runs past payload",
            offset: payload.len(),
        });
    }

    let palette_changed = patch_palette(payload, patch_bytes, palette)?;
    run_opcodes(payload, opcodes_start, palette, frame)?;
    Ok(palette_changed)
}

/// Rewrite the palette entries selected by the bitfield.
///
/// Bit `j` (MSB first) of word `i` selects entry `16*i + j`; replacement
/// triples are consumed in scan order.
fn patch_palette(payload: &[u8], patch_bytes: usize, palette: &mut Palette) -> MediaResult<bool> {
    let mut triple_cursor = 2 + BITFIELD_BYTES;
    let triples_end = triple_cursor + patch_bytes;
    let mut changed = false;

    for group in 0..16usize {
        let word = LittleEndian::read_u16(&payload[2 + group * 2..4 + group * 2]);
        for bit in 0..16usize {
            if word & (0x8000 >> bit) == 0 {
                continue;
            }
            if triple_cursor + 3 > triples_end {
                return Err(MediaError::BitmapMalformed {
                    reason: "palette patch overflows declared size",
                    offset: triple_cursor,
                });
            }
            palette.set(
                (group * 16 + bit) as u8,
                Rgb {
                    r: payload[triple_cursor],
                    g: payload[triple_cursor + 1],
                    b: payload[triple_cursor + 2],
                },
            );
            triple_cursor += 3;
            changed = true;
        }
    }

    Ok(changed)
}

/// Walk the tile opcode stream, painting into `frame`.
fn run_opcodes(
    payload: &[u8],
    mut cursor: usize,
    palette: &Palette,
    frame: &mut Frame,
) -> MediaResult<()> {
    let mut x = 0u32;
    let mut y = 0u32;

    // Reads `n` bytes of opcode arguments or fails without touching state.
    macro_rules! take {
        ($n:expr) => {{
            let n: usize = $n;
            if cursor + n > payload.len() {
                return Err(MediaError::BitmapMalformed {
                    reason: "opcode arguments run past payload",
                    offset: cursor,
                });
            }
            let slice = &payload[cursor..cursor + n];
            cursor += n;
            slice
        }};
    }

    while cursor < payload.len() {
        let opcode_offset = cursor;
        let opcode = payload[cursor];
        cursor += 1;

        match opcode {
            // Table-indexed two-colour tile.
            0x00..=0x5F => {
                let args = take!(2);
                let (c1, c0) = (palette.get(args[0]), palette.get(args[1]));
                paint_tile(frame, x, y, opcode_offset, |frame| {
                    paint_masked_tile(frame, x, y, TILE_MASKS[usize::from(opcode)], c1, c0);
                })?;
                x += TILE_SIZE;
            }
            // Literal tile: one palette index per pixel.
            0x60 => {
                let indices: Vec<u8> = take!(16).to_vec();
                paint_tile(frame, x, y, opcode_offset, |frame| {
                    for (i, &index) in indices.iter().enumerate() {
                        let i = i as u32;
                        frame.put_pixel(x + (i % 4), y + (i / 4), palette.get(index));
                    }
                })?;
                x += TILE_SIZE;
            }
            // Newline.
            0x61 => {
                x = 0;
                y += TILE_SIZE;
            }
            // Skip tiles horizontally; 0x62 itself is a no-op.
            0x62..=0x6B => {
                x += u32::from(opcode - 0x62) * TILE_SIZE;
            }
            // Fill a run of tiles with one solid colour.
            0x6C..=0x75 => {
                let colour = palette.get(take!(1)[0]);
                for _ in 0..(opcode - 0x6B) {
                    paint_tile(frame, x, y, opcode_offset, |frame| {
                        paint_masked_tile(frame, x, y, 0xFFFF, colour, colour);
                    })?;
                    x += TILE_SIZE;
                }
            }
            // One solid colour per consecutive tile.
            0x76..=0x7F => {
                let count = usize::from(opcode - 0x75);
                let indices: Vec<u8> = take!(count).to_vec();
                for index in indices {
                    let colour = palette.get(index);
                    paint_tile(frame, x, y, opcode_offset, |frame| {
                        paint_masked_tile(frame, x, y, 0xFFFF, colour, colour);
                    })?;
                    x += TILE_SIZE;
                }
            }
            // Inline mask: the opcode byte is the low half of the mask.
            0x80..=0xFF => {
                let args = take!(3);
                let mask = u16::from(opcode) | (u16::from(args[0]) << 8);
                let (c1, c0) = (palette.get(args[1]), palette.get(args[2]));
                paint_tile(frame, x, y, opcode_offset, |frame| {
                    paint_masked_tile(frame, x, y, mask, c1, c0);
                })?;
                x += TILE_SIZE;
            }
        }
    }

    Ok(())
}

/// Bounds-check a tile write, then run it.
fn paint_tile<F>(frame: &mut Frame, x: u32, y: u32, opcode_offset: usize, paint: F) -> MediaResult<()>
where
    F: FnOnce(&mut Frame),
{
    if x + TILE_SIZE > frame.width() || y + TILE_SIZE > frame.height() {
        return Err(MediaError::BitmapMalformed {
            reason: "tile write outside frame",
            offset: opcode_offset,
        });
    }
    paint(frame);
    Ok(())
}
