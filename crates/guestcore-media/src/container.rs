//! Container file access.
//!
//! The container holds the concatenated sub-files referenced by an index.
//! It is opaque except through `(offset, length)` slices, and the pairing
//! rule between an index path and its container path lives here.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{MediaError, MediaResult};
use crate::index::IndexRecord;

/// Canonical extension of a container file.
pub const CONTAINER_EXTENSION: &str = "gjd";

/// Derive the container path paired with the given index path.
///
/// The container lives next to the index with the same stem and the
/// canonical container extension, preserving the case convention of the
/// index extension (`.RL` pairs with `.GJD`, `.rl` with `.gjd`).
pub fn container_path(index_path: &Path) -> PathBuf {
    let upper = index_path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.chars().any(|c| c.is_ascii_uppercase()));

    let ext = if upper {
        CONTAINER_EXTENSION.to_ascii_uppercase()
    } else {
        CONTAINER_EXTENSION.to_string()
    };
    index_path.with_extension(ext)
}

/// Read the byte range described by `record` from the container at `path`.
///
/// Fails with [`MediaError::ContainerShort`] when the container does not
/// hold `record.length` bytes at `record.offset`.
pub fn slice(path: &Path, record: &IndexRecord) -> MediaResult<Vec<u8>> {
    let mut file = File::open(path)?;
    slice_from(&mut file, record)
}

/// Read the byte range described by `record` from an open container.
pub fn slice_from<R: Read + Seek>(container: &mut R, record: &IndexRecord) -> MediaResult<Vec<u8>> {
    container.seek(SeekFrom::Start(u64::from(record.offset)))?;

    let mut buffer = vec![0u8; record.length as usize];
    let mut filled = 0usize;
    while filled < buffer.len() {
        let n = container.read(&mut buffer[filled..])?;
        if n == 0 {
            return Err(MediaError::ContainerShort {
                offset: u64::from(record.offset),
                wanted: record.length,
                got: filled as u64,
            });
        }
        filled += n;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn rec(offset: u32, length: u32) -> IndexRecord {
        IndexRecord {
            name: "TEST".into(),
            offset,
            length,
        }
    }

    #[test]
    fn pairs_extension_preserving_case() {
        assert_eq!(
            container_path(Path::new("media/GAME.RL")),
            PathBuf::from("media/GAME.GJD")
        );
        assert_eq!(
            container_path(Path::new("media/game.rl")),
            PathBuf::from("media/game.gjd")
        );
    }

    #[test]
    fn slices_exact_range() {
        let mut data = Cursor::new(b"0123456789".to_vec());
        let bytes = slice_from(&mut data, &rec(3, 4)).unwrap();
        assert_eq!(bytes, b"3456");
    }

    #[test]
    fn zero_length_slice_is_empty() {
        let mut data = Cursor::new(b"abc".to_vec());
        assert!(slice_from(&mut data, &rec(1, 0)).unwrap().is_empty());
    }

    #[test]
    fn short_read_is_an_error() {
        let mut data = Cursor::new(b"0123456789".to_vec());
        let err = slice_from(&mut data, &rec(8, 4)).unwrap_err();
        match err {
            MediaError::ContainerShort { offset, wanted, got } => {
                assert_eq!(offset, 8);
                assert_eq!(wanted, 4);
                assert_eq!(got, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
