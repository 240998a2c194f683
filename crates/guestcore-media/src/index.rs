//! Index file reader.
//!
//! An index is a flat directory of fixed 20-byte records, each naming one
//! sub-file stored in the paired container: a 12-byte zero-padded ASCII name,
//! a little-endian byte offset and a little-endian byte length.

use std::fs;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{MediaError, MediaResult};

/// Size of one on-disk index record.
pub const RECORD_SIZE: usize = 20;

/// One directory entry of an index file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    /// Sub-file name, trimmed at the first NUL or at 12 bytes.
    pub name: String,
    /// Byte offset of the sub-file within the container.
    pub offset: u32,
    /// Byte length of the sub-file within the container.
    pub length: u32,
}

impl IndexRecord {
    /// Decode a single 20-byte record.
    fn from_bytes(block: &[u8; RECORD_SIZE]) -> Self {
        let name_bytes = &block[..12];
        let end = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(name_bytes.len());
        let name = String::from_utf8_lossy(&name_bytes[..end]).into_owned();

        Self {
            name,
            offset: LittleEndian::read_u32(&block[12..16]),
            length: LittleEndian::read_u32(&block[16..20]),
        }
    }
}

/// Parse an index from an in-memory buffer.
///
/// Fails with [`MediaError::IndexMalformed`] if the buffer is not a whole
/// number of records. An empty buffer is a valid, empty index.
pub fn parse_index(bytes: &[u8]) -> MediaResult<Vec<IndexRecord>> {
    if bytes.len() % RECORD_SIZE != 0 {
        return Err(MediaError::IndexMalformed {
            size: bytes.len() as u64,
        });
    }

    Ok(bytes
        .chunks_exact(RECORD_SIZE)
        .map(|chunk| {
            let mut block = [0u8; RECORD_SIZE];
            block.copy_from_slice(chunk);
            IndexRecord::from_bytes(&block)
        })
        .collect())
}

/// Read and parse the index file at `path`.
pub fn read_index(path: &Path) -> MediaResult<Vec<IndexRecord>> {
    let bytes = fs::read(path)?;
    parse_index(&bytes)
}
