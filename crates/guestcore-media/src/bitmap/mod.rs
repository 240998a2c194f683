//! Bitmap codec: keyframes, deltas, and the rolling decode session.
//!
//! Images are coded on a grid of 4x4-pixel tiles. A keyframe (chunk type
//! 0x20) carries the full palette and a two-colour-per-tile raster; every
//! following image chunk is either a delta (0x25) patching the palette and
//! repainting tiles in place, or a duplicate marker (0x00) repeating the
//! previous frame.
//!
//! Decode state (the base and current palettes and frames) is owned by a
//! [`DecodeSession`] value per sub-file, never shared. A malformed chunk
//! leaves the session exactly as it was before the chunk.

mod delta;
mod keyframe;
mod masks;

pub use masks::TILE_MASKS;

use crate::error::{MediaError, MediaResult};
use crate::subfile::{Chunk, CHUNK_DELTA, CHUNK_DUPLICATE, CHUNK_KEYFRAME};

/// Edge length of a coding tile, in pixels.
pub const TILE_SIZE: u32 = 4;

/// One palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// 256-entry RGB palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: [Rgb; 256],
}

impl Palette {
    /// Parse a palette from its 768-byte on-disk form.
    pub fn from_bytes(bytes: &[u8; 768]) -> Self {
        let mut entries = [Rgb::default(); 256];
        for (i, entry) in entries.iter_mut().enumerate() {
            *entry = Rgb {
                r: bytes[i * 3],
                g: bytes[i * 3 + 1],
                b: bytes[i * 3 + 2],
            };
        }
        Self { entries }
    }

    /// Look up an entry by palette index.
    #[inline]
    pub fn get(&self, index: u8) -> Rgb {
        self.entries[usize::from(index)]
    }

    /// Replace an entry.
    #[inline]
    pub(crate) fn set(&mut self, index: u8, colour: Rgb) {
        self.entries[usize::from(index)] = colour;
    }
}

/// A decoded frame: packed RGB rows, top-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Allocate a black frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 3],
        }
    }

    /// Frame width in pixels. Always a multiple of 4.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels. Always a multiple of 4.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed RGB pixel data, row-major, top-down.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Read one pixel. Callers must stay in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Rgb {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
        }
    }

    /// Write one pixel. Callers must stay in bounds.
    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, colour: Rgb) {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        self.data[i] = colour.r;
        self.data[i + 1] = colour.g;
        self.data[i + 2] = colour.b;
    }
}

/// What a decoded image chunk exposes to the caller.
#[derive(Debug)]
pub struct DecodedChunk<'a> {
    /// The frame after this chunk was applied.
    pub frame: &'a Frame,
    /// The current palette after this chunk was applied.
    pub palette: &'a Palette,
    /// Whether this chunk rewrote any palette entries.
    pub palette_changed: bool,
}

/// Rolling decode state for one sub-file's image chunks.
///
/// Chunks must be fed in file order; the first image chunk must be a
/// keyframe. Each successful call returns a read-only view of the new
/// current frame; non-image chunks return `None` and leave the session
/// untouched.
#[derive(Debug, Default)]
pub struct DecodeSession {
    state: Option<SessionState>,
}

#[derive(Debug, Clone)]
struct SessionState {
    base_palette: Palette,
    palette: Palette,
    base_frame: Frame,
    frame: Frame,
}

impl DecodeSession {
    /// Create a session with no keyframe yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current frame, if a keyframe has been decoded.
    pub fn frame(&self) -> Option<&Frame> {
        self.state.as_ref().map(|s| &s.frame)
    }

    /// The palette captured at the most recent keyframe.
    pub fn base_palette(&self) -> Option<&Palette> {
        self.state.as_ref().map(|s| &s.base_palette)
    }

    /// The raster produced by the most recent keyframe.
    pub fn base_frame(&self) -> Option<&Frame> {
        self.state.as_ref().map(|s| &s.base_frame)
    }

    /// Decode one chunk, advancing the session state.
    ///
    /// Image chunk types (keyframe, delta, duplicate) yield a
    /// [`DecodedChunk`]; everything else yields `None`. On error the
    /// pre-chunk state is preserved.
    pub fn decode_chunk(&mut self, chunk: &Chunk) -> MediaResult<Option<DecodedChunk<'_>>> {
        match chunk.kind {
            CHUNK_KEYFRAME => {
                let payload = chunk.decoded_payload()?;
                let (palette, frame) = keyframe::decode(&payload)?;
                let state = self.state.insert(SessionState {
                    base_palette: palette.clone(),
                    palette,
                    base_frame: frame.clone(),
                    frame,
                });
                Ok(Some(DecodedChunk {
                    frame: &state.frame,
                    palette: &state.palette,
                    palette_changed: true,
                }))
            }
            CHUNK_DELTA => {
                let state = self.state.as_mut().ok_or(MediaError::BitmapMalformed {
                    reason: "delta chunk before any keyframe",
                    offset: 0,
                })?;
                let payload = chunk.decoded_payload()?;

                // Apply to working copies so a malformed chunk rolls back.
                let mut palette = state.palette.clone();
                let mut frame = state.frame.clone();
                let palette_changed = delta::apply(&payload, &mut palette, &mut frame)?;

                state.palette = palette;
                state.frame = frame;
                Ok(Some(DecodedChunk {
                    frame: &state.frame,
                    palette: &state.palette,
                    palette_changed,
                }))
            }
            CHUNK_DUPLICATE => {
                let state = self.state.as_ref().ok_or(MediaError::BitmapMalformed {
                    reason: "duplicate chunk before any keyframe",
                    offset: 0,
                })?;
                Ok(Some(DecodedChunk {
                    frame: &state.frame,
                    palette: &state.palette,
                    palette_changed: false,
                }))
            }
            _ => Ok(None),
        }
    }
}

/// Paint a 4x4 tile from a two-colour mask.
///
/// Bit 15 of `mask` selects the top-left pixel; bits run row-major. A set
/// bit paints `c1`, a clear bit paints `c0`.
fn paint_masked_tile(frame: &mut Frame, x: u32, y: u32, mask: u16, c1: Rgb, c0: Rgb) {
    for i in 0..16u32 {
        let colour = if mask & (0x8000 >> i) != 0 { c1 } else { c0 };
        frame.put_pixel(x + (i % 4), y + (i / 4), colour);
    }
}
