//! Error types for the raycast subsystem.

use thiserror::Error;

/// Errors from map analysis, archive IO, and tile decoding.
#[derive(Debug, Error)]
pub enum RaycastError {
    /// The map grid has no cells.
    #[error("map is empty")]
    MapEmpty,

    /// Archive magic, version, header field, or tile size is invalid.
    #[error("archive malformed at offset {offset}: {reason}")]
    ArchiveMalformed { reason: &'static str, offset: u64 },

    /// zlib reported an error while packing or unpacking a tile.
    #[error("deflate failed for tile {tile}: {source}")]
    DeflateFailed {
        tile: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RaycastResult<T> = Result<T, RaycastError>;
