//! Error types for the media pipeline.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while reading archives or decoding media.
///
/// Every variant that corresponds to malformed on-disk data carries the file
/// offset or chunk index where the problem was detected, so CLI tools can
/// print a usable one-line diagnostic.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Index file size is not a positive multiple of the 20-byte record size.
    #[error("index file is malformed: {size} bytes is not a multiple of 20")]
    IndexMalformed {
        /// Total size of the index file.
        size: u64,
    },

    /// A container read returned fewer bytes than the index entry declared.
    #[error("container read short at offset {offset}: wanted {wanted} bytes, got {got}")]
    ContainerShort {
        /// Offset of the attempted read.
        offset: u64,
        /// Bytes requested.
        wanted: u32,
        /// Bytes actually available.
        got: u64,
    },

    /// A declared chunk payload runs past the end of the sub-file buffer.
    #[error("chunk {chunk_index} truncated: payload of {declared} bytes exceeds buffer at offset {offset}")]
    ChunkTruncated {
        /// Ordinal of the chunk within the sub-file.
        chunk_index: usize,
        /// Declared payload length.
        declared: u32,
        /// Offset of the chunk header within the sub-file.
        offset: usize,
    },

    /// A compressed token spans past the end of the LZSS input.
    #[error("LZSS stream truncated at input offset {offset}")]
    LzssTruncated {
        /// Input offset of the incomplete token.
        offset: usize,
    },

    /// A bitmap chunk opcode read or wrote out of bounds.
    #[error("bitmap chunk malformed: {reason} at payload offset {offset}")]
    BitmapMalformed {
        /// What went wrong.
        reason: &'static str,
        /// Payload offset of the offending opcode or field.
        offset: usize,
    },

    /// The XMI event stream ended mid-event.
    #[error("XMI data truncated at offset {offset}")]
    XmiTruncated {
        /// Offset of the incomplete read.
        offset: usize,
    },

    /// The XMI container is missing its `EVNT` chunk or is otherwise not XMI.
    #[error("not an XMI container: {reason}")]
    XmiBadContainer {
        /// What was expected and not found.
        reason: &'static str,
    },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV encoding failure.
    #[error("WAV write error: {0}")]
    Wav(#[from] hound::Error),

    /// PNG encoding failure.
    #[error("PNG write error: {0}")]
    Png(#[from] png::EncodingError),
}
