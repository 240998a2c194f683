//! Parameterised LZSS codec.
//!
//! Chunk payloads are compressed with a ring-buffer LZSS whose split between
//! match length and match offset varies per chunk: the chunk header carries a
//! `length_mask`/`length_bits` pair, and `mask == (1 << bits) - 1` must hold.
//! With `bits` length bits the ring holds `1 << (16 - bits)` bytes and a
//! match encodes at most `1 << bits` bytes.
//!
//! Decompression is the normative direction; the compressor exists for
//! diagnostic round-trips and only promises that its output decompresses to
//! the input.

use crate::error::{MediaError, MediaResult};

/// Minimum length of an encoded match.
const THRESHOLD: usize = 3;

/// LZSS parameters as carried in a chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzssParams {
    /// Mask isolating the length bits of a 16-bit token word.
    pub length_mask: u8,
    /// Number of length bits in a token word.
    pub length_bits: u8,
}

impl LzssParams {
    /// Construct a parameter pair. The caller is responsible for the
    /// `mask == (1 << bits) - 1` invariant; [`LzssParams::is_consistent`]
    /// checks it.
    pub fn new(length_mask: u8, length_bits: u8) -> Self {
        Self {
            length_mask,
            length_bits,
        }
    }

    /// Whether the mask and bit count agree.
    pub fn is_consistent(&self) -> bool {
        self.length_bits <= 8 && u16::from(self.length_mask) == (1u16 << self.length_bits) - 1
    }

    /// Ring buffer size.
    fn ring_size(&self) -> usize {
        1 << (16 - u32::from(self.length_bits))
    }

    /// Maximum encodable match length (before the threshold offset).
    fn max_match(&self) -> usize {
        1 << u32::from(self.length_bits)
    }
}

/// Decompress an LZSS stream.
///
/// The input is a sequence of flag bytes, each introducing up to eight
/// tokens, LSB first. A set flag bit is a literal byte; a clear bit is a
/// 16-bit little-endian word holding offset and length, with the all-zero
/// word terminating the stream. Exhausting the input on a token boundary
/// also terminates cleanly; exhausting it inside a token is an error.
pub fn decompress(input: &[u8], params: LzssParams) -> MediaResult<Vec<u8>> {
    let n = params.ring_size();
    let f = params.max_match();
    let mut ring = vec![0u8; n];
    let mut cursor = n - f;

    let mut output = Vec::with_capacity(input.len() * 2);
    let mut pos = 0usize;

    'stream: while pos < input.len() {
        let flags = input[pos];
        pos += 1;

        for bit in 0..8 {
            if pos >= input.len() {
                break 'stream;
            }
            if flags & (1 << bit) != 0 {
                let byte = input[pos];
                pos += 1;
                output.push(byte);
                ring[cursor] = byte;
                cursor = (cursor + 1) & (n - 1);
            } else {
                if pos + 1 >= input.len() {
                    return Err(MediaError::LzssTruncated { offset: pos });
                }
                let word = u16::from(input[pos]) | (u16::from(input[pos + 1]) << 8);
                pos += 2;
                if word == 0 {
                    break 'stream;
                }

                let length = (usize::from(word) & usize::from(params.length_mask)) + THRESHOLD;
                let encoded_offset = usize::from(word >> params.length_bits);
                let mut src = cursor.wrapping_sub(encoded_offset) & (n - 1);

                // Overlapping copies are legal: the source wraps through the
                // ring as it is being written, which encodes run-lengths.
                for _ in 0..length {
                    let byte = ring[src];
                    src = (src + 1) & (n - 1);
                    output.push(byte);
                    ring[cursor] = byte;
                    cursor = (cursor + 1) & (n - 1);
                }
            }
        }
    }

    Ok(output)
}

/// Compress a buffer with a greedy longest-match search.
///
/// Diagnostic use only. The output always ends with the explicit all-zero
/// terminator word so that decompression does not depend on input length.
pub fn compress(input: &[u8], params: LzssParams) -> Vec<u8> {
    let n = params.ring_size();
    let f = params.max_match();
    let mut ring = vec![0u8; n];
    let mut cursor = n - f;

    let mut output = Vec::with_capacity(input.len() + input.len() / 8 + 3);
    let mut pos = 0usize;

    loop {
        let flags_pos = output.len();
        output.push(0);
        let mut flags = 0u8;

        for bit in 0..8 {
            if pos >= input.len() {
                // Terminator word, emitted inside a flag group so the
                // decoder always sees it as a token.
                output.push(0);
                output.push(0);
                output[flags_pos] = flags;
                return output;
            }

            // Find the longest ring match. Offset 0 is reserved (a zero
            // token word terminates the stream) and offsets are capped at
            // `n - f` so a copy can never overwrite its own source through
            // ring wrap-around.
            let mut best_len = 0usize;
            let mut best_offset = 0usize;
            for offset in 1..=(n - f) {
                let start = cursor.wrapping_sub(offset) & (n - 1);
                let mut len = 0usize;
                while len < f && pos + len < input.len() {
                    // Past the first `offset` bytes the decoder replays the
                    // bytes it just wrote, so the expectation comes from the
                    // input itself.
                    let expected = if len < offset {
                        ring[(start + len) & (n - 1)]
                    } else {
                        input[pos + len - offset]
                    };
                    if expected != input[pos + len] {
                        break;
                    }
                    len += 1;
                }
                if len > best_len {
                    best_len = len;
                    best_offset = offset;
                    if len == f {
                        break;
                    }
                }
            }

            if best_len >= THRESHOLD {
                let word =
                    ((best_offset as u16) << params.length_bits) | ((best_len - THRESHOLD) as u16);
                output.push((word & 0xFF) as u8);
                output.push((word >> 8) as u8);
                for _ in 0..best_len {
                    ring[cursor] = input[pos];
                    cursor = (cursor + 1) & (n - 1);
                    pos += 1;
                }
            } else {
                let byte = input[pos];
                pos += 1;
                output.push(byte);
                ring[cursor] = byte;
                cursor = (cursor + 1) & (n - 1);
                flags |= 1 << bit;
            }
        }

        output[flags_pos] = flags;
    }
}
