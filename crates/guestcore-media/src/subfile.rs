//! Sub-file (chunked media) parser.
//!
//! A sub-file is the unit stored in a container: a 16-bit identifier, six
//! reserved bytes, then a run of typed chunks. Each chunk header carries the
//! payload length and the LZSS parameters; a zero `length_bits` means the
//! payload is stored literally. Parsing only enumerates chunks; payload
//! decompression and decoding are separate steps, and chunk types this crate
//! does not understand are retained untouched.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{MediaError, MediaResult};
use crate::lzss::{self, LzssParams};

/// Image keyframe chunk: full palette and pixels.
pub const CHUNK_KEYFRAME: u8 = 0x20;
/// Image delta chunk: palette patches and tile opcodes.
pub const CHUNK_DELTA: u8 = 0x25;
/// Duplicate-previous-image chunk; carries no payload semantics.
pub const CHUNK_DUPLICATE: u8 = 0x00;
/// 8-bit mono PCM audio chunk.
pub const CHUNK_AUDIO: u8 = 0x80;

/// Size of the sub-file header preceding the first chunk.
const SUBFILE_HEADER_SIZE: usize = 8;
/// Size of one chunk header.
const CHUNK_HEADER_SIZE: usize = 8;

/// One typed chunk of a sub-file.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Chunk type byte.
    pub kind: u8,
    /// Reserved header byte, preserved verbatim.
    pub reserved: u8,
    /// LZSS parameters; `length_bits == 0` means the payload is literal.
    pub params: LzssParams,
    /// Raw (possibly compressed) payload bytes.
    pub payload: Vec<u8>,
}

impl Chunk {
    /// Whether the payload is LZSS-compressed.
    pub fn is_compressed(&self) -> bool {
        self.params.length_bits != 0
    }

    /// The payload with LZSS undone where the header declares it.
    pub fn decoded_payload(&self) -> MediaResult<Vec<u8>> {
        if self.is_compressed() {
            lzss::decompress(&self.payload, self.params)
        } else {
            Ok(self.payload.clone())
        }
    }
}

/// A parsed sub-file: header fields plus its chunks in file order.
#[derive(Debug, Clone)]
pub struct SubFile {
    /// Name the sub-file was indexed under (extension stripped).
    pub name: String,
    /// 16-bit sub-file identifier.
    pub identifier: u16,
    /// Six reserved header bytes, preserved verbatim.
    pub reserved: [u8; 6],
    /// Chunks in file order. Order is significant for image decoding.
    pub chunks: Vec<Chunk>,
}

impl SubFile {
    /// Whether any chunk carries image data.
    pub fn has_images(&self) -> bool {
        self.chunks
            .iter()
            .any(|c| matches!(c.kind, CHUNK_KEYFRAME | CHUNK_DELTA))
    }

    /// Whether any chunk carries PCM audio.
    pub fn has_audio(&self) -> bool {
        self.chunks.iter().any(|c| c.kind == CHUNK_AUDIO)
    }
}

/// Parse a sub-file from its raw container slice.
///
/// `name` is the index record name; a trailing extension is stripped, which
/// mirrors how sub-files are addressed by the rest of the pipeline.
pub fn parse_subfile(name: &str, bytes: &[u8]) -> MediaResult<SubFile> {
    if bytes.len() < SUBFILE_HEADER_SIZE {
        return Err(MediaError::ChunkTruncated {
            chunk_index: 0,
            declared: 0,
            offset: 0,
        });
    }

    let stem = match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    };

    let identifier = LittleEndian::read_u16(&bytes[0..2]);
    let mut reserved = [0u8; 6];
    reserved.copy_from_slice(&bytes[2..8]);

    let mut chunks = Vec::new();
    let mut offset = SUBFILE_HEADER_SIZE;
    while offset < bytes.len() {
        if bytes.len() - offset < CHUNK_HEADER_SIZE {
            return Err(MediaError::ChunkTruncated {
                chunk_index: chunks.len(),
                declared: 0,
                offset,
            });
        }

        let kind = bytes[offset];
        let header_reserved = bytes[offset + 1];
        let length = LittleEndian::read_u32(&bytes[offset + 2..offset + 6]);
        let params = LzssParams::new(bytes[offset + 6], bytes[offset + 7]);

        let payload_start = offset + CHUNK_HEADER_SIZE;
        let payload_end = payload_start + length as usize;
        if payload_end > bytes.len() {
            return Err(MediaError::ChunkTruncated {
                chunk_index: chunks.len(),
                declared: length,
                offset,
            });
        }

        chunks.push(Chunk {
            kind,
            reserved: header_reserved,
            params,
            payload: bytes[payload_start..payload_end].to_vec(),
        });
        offset = payload_end;
    }

    Ok(SubFile {
        name: stem.to_string(),
        identifier,
        reserved,
        chunks,
    })
}
