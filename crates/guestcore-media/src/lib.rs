//! Asset decoding for the game's media archives.
//!
//! The shipped data ships as paired files: an index (`.RL`) of named
//! records and a container (`.GJD`) holding the record bytes. Records are
//! sub-files of tagged chunks, optionally LZSS-compressed, carrying either
//! tile-based animation bitmaps, raw PCM audio, or an XMI music score.
//!
//! # Pipeline
//!
//! - [`index`] parses the record table; [`container`] slices record bytes.
//! - [`subfile`] splits a record into chunks and [`lzss`] expands the
//!   compressed ones.
//! - [`bitmap`] decodes keyframe/delta animation chunks into RGB frames,
//!   [`audio`] assembles PCM chunks into WAV, and [`xmi`] converts music
//!   scores to Standard MIDI Format 0.
//! - [`png`] exports frames deterministically and [`framediff`] computes
//!   the changed-row uploads used for presentation.
//!
//! Decoding is deterministic: the same record bytes always produce the
//! same frames, samples, and events.

pub mod audio;
pub mod bitmap;
pub mod container;
pub mod error;
pub mod framediff;
pub mod index;
pub mod lzss;
pub mod png;
pub mod subfile;
pub mod xmi;

pub use bitmap::{DecodeSession, DecodedChunk, Frame, Palette, Rgb};
pub use error::{MediaError, MediaResult};
pub use framediff::{FrameUploader, RowUpload};
pub use index::IndexRecord;
pub use lzss::LzssParams;
pub use subfile::{Chunk, SubFile};
pub use xmi::convert_xmi;
