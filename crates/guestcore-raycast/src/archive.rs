//! MTX tile archive packing and unpacking.
//!
//! An archive stores the strip's RGBA tiles zlib-compressed behind a fixed
//! 67-byte header and a `u64` offset table. Packing streams tiles in
//! ascending order, reserving the offset table up front and rewriting it
//! once every offset is known. Unpacking decompresses every tile into a
//! cache that answers pixel lookups in O(1).

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{RaycastError, RaycastResult};

pub const ARCHIVE_MAGIC: &[u8; 4] = b"MTX1";
/// Current archive version. Version 1 archives are still readable; they
/// imply 1024x1024 tiles regardless of their header fields.
pub const ARCHIVE_VERSION: u32 = 2;

const HEADER_BYTES: u64 = 67;
const RESERVED_BYTES: usize = 40;
const COMPRESSION_LEVEL: u32 = 6;

/// Archive header fields describing the tile set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveMeta {
    pub tile_width: u32,
    pub tile_height: u32,
    pub mortar_rgb: [u8; 3],
    pub seed: u32,
}

impl ArchiveMeta {
    fn tile_bytes(&self) -> usize {
        self.tile_width as usize * self.tile_height as usize * 4
    }
}

/// Write an archive, pulling tile `k`'s raw RGBA bytes from `render`.
///
/// Tiles are written in ascending index order so the offset table is
/// deterministic for a given tile stream.
pub fn pack<W, F>(writer: &mut W, meta: &ArchiveMeta, tile_count: u32, mut render: F) -> RaycastResult<()>
where
    W: Write + Seek,
    F: FnMut(u32) -> Vec<u8>,
{
    writer.write_all(ARCHIVE_MAGIC)?;
    writer.write_u32::<LittleEndian>(ARCHIVE_VERSION)?;
    writer.write_u32::<LittleEndian>(meta.tile_width)?;
    writer.write_u32::<LittleEndian>(meta.tile_height)?;
    writer.write_u32::<LittleEndian>(tile_count)?;
    writer.write_all(&meta.mortar_rgb)?;
    writer.write_u32::<LittleEndian>(meta.seed)?;
    writer.write_all(&[0u8; RESERVED_BYTES])?;

    // Offset table placeholder, rewritten once offsets are known.
    let mut offsets = vec![0u64; tile_count as usize];
    writer.write_all(&vec![0u8; tile_count as usize * 8])?;

    for k in 0..tile_count {
        let raw = render(k);
        if raw.len() != meta.tile_bytes() {
            return Err(RaycastError::ArchiveMalformed {
                reason: "tile byte length does not match header dimensions",
                offset: writer.stream_position()?,
            });
        }

        offsets[k as usize] = writer.stream_position()?;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(COMPRESSION_LEVEL));
        encoder
            .write_all(&raw)
            .map_err(|source| RaycastError::DeflateFailed { tile: k, source })?;
        let compressed = encoder
            .finish()
            .map_err(|source| RaycastError::DeflateFailed { tile: k, source })?;

        writer.write_u32::<LittleEndian>(compressed.len() as u32)?;
        writer.write_all(&compressed)?;
    }

    let end = writer.stream_position()?;
    writer.seek(SeekFrom::Start(HEADER_BYTES))?;
    for offset in &offsets {
        writer.write_u64::<LittleEndian>(*offset)?;
    }
    writer.seek(SeekFrom::Start(end))?;
    writer.flush()?;
    Ok(())
}

/// A fully decoded archive: header fields plus the raw RGBA tile cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileArchive {
    meta: ArchiveMeta,
    tiles: Vec<Vec<u8>>,
}

impl TileArchive {
    pub fn meta(&self) -> &ArchiveMeta {
        &self.meta
    }

    pub fn tile_count(&self) -> u32 {
        self.tiles.len() as u32
    }

    /// Raw RGBA bytes of tile `k`.
    pub fn tile(&self, k: u32) -> Option<&[u8]> {
        self.tiles.get(k as usize).map(Vec::as_slice)
    }

    /// Pixel lookup into the cache. Out-of-range indices yield transparent
    /// black.
    pub fn sample_tile(&self, k: u32, x: u32, y: u32) -> [u8; 4] {
        if x >= self.meta.tile_width || y >= self.meta.tile_height {
            return [0; 4];
        }
        match self.tiles.get(k as usize) {
            Some(tile) => {
                let i = (y as usize * self.meta.tile_width as usize + x as usize) * 4;
                [tile[i], tile[i + 1], tile[i + 2], tile[i + 3]]
            }
            None => [0; 4],
        }
    }
}

/// Read and fully decode an archive.
pub fn unpack<R: Read + Seek>(reader: &mut R) -> RaycastResult<TileArchive> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != ARCHIVE_MAGIC {
        return Err(RaycastError::ArchiveMalformed {
            reason: "bad magic",
            offset: 0,
        });
    }

    let version = reader.read_u32::<LittleEndian>()?;
    let mut tile_width = reader.read_u32::<LittleEndian>()?;
    let mut tile_height = reader.read_u32::<LittleEndian>()?;
    let tile_count = reader.read_u32::<LittleEndian>()?;
    let mut mortar_rgb = [0u8; 3];
    reader.read_exact(&mut mortar_rgb)?;
    let seed = reader.read_u32::<LittleEndian>()?;
    let mut reserved = [0u8; RESERVED_BYTES];
    reader.read_exact(&mut reserved)?;

    match version {
        1 => {
            tile_width = 1024;
            tile_height = 1024;
        }
        2 => {}
        _ => {
            return Err(RaycastError::ArchiveMalformed {
                reason: "unsupported version",
                offset: 4,
            });
        }
    }

    let meta = ArchiveMeta {
        tile_width,
        tile_height,
        mortar_rgb,
        seed,
    };
    if tile_count > 0 && meta.tile_bytes() == 0 {
        return Err(RaycastError::ArchiveMalformed {
            reason: "zero tile dimensions",
            offset: 8,
        });
    }

    let mut offsets = Vec::with_capacity(tile_count as usize);
    for _ in 0..tile_count {
        offsets.push(reader.read_u64::<LittleEndian>()?);
    }

    let mut tiles = Vec::with_capacity(tile_count as usize);
    for (k, &offset) in offsets.iter().enumerate() {
        reader.seek(SeekFrom::Start(offset))?;
        let size = reader.read_u32::<LittleEndian>()?;
        let mut compressed = vec![0u8; size as usize];
        reader.read_exact(&mut compressed)?;

        let mut raw = Vec::with_capacity(meta.tile_bytes());
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut raw)
            .map_err(|source| RaycastError::DeflateFailed {
                tile: k as u32,
                source,
            })?;

        if raw.len() != meta.tile_bytes() {
            return Err(RaycastError::ArchiveMalformed {
                reason: "decompressed tile has wrong byte length",
                offset,
            });
        }
        tiles.push(raw);
    }

    Ok(TileArchive { meta, tiles })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn meta_4x4() -> ArchiveMeta {
        ArchiveMeta {
            tile_width: 4,
            tile_height: 4,
            mortar_rgb: [77, 77, 77],
            seed: 12345,
        }
    }

    fn test_tile(k: u32) -> Vec<u8> {
        (0..4 * 4 * 4).map(|i| (i as u32 + k * 7) as u8).collect()
    }

    #[test]
    fn pack_then_unpack_is_lossless() {
        let mut cursor = Cursor::new(Vec::new());
        pack(&mut cursor, &meta_4x4(), 3, test_tile).unwrap();

        cursor.set_position(0);
        let archive = unpack(&mut cursor).unwrap();
        assert_eq!(archive.meta(), &meta_4x4());
        assert_eq!(archive.tile_count(), 3);
        for k in 0..3 {
            assert_eq!(archive.tile(k).unwrap(), test_tile(k).as_slice());
        }
    }

    #[test]
    fn pack_round_trips_through_a_real_file() {
        // File-backed seeks take a different path than Cursor; the offset
        // table rewrite must survive it.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strip.mtx");

        let mut file = std::fs::File::create(&path).unwrap();
        pack(&mut file, &meta_4x4(), 3, test_tile).unwrap();
        drop(file);

        let mut file = std::fs::File::open(&path).unwrap();
        let archive = unpack(&mut file).unwrap();
        assert_eq!(archive.tile_count(), 3);
        for k in 0..3 {
            assert_eq!(archive.tile(k).unwrap(), test_tile(k).as_slice());
        }
    }

    #[test]
    fn sample_tile_reads_pixels_in_place() {
        let mut cursor = Cursor::new(Vec::new());
        pack(&mut cursor, &meta_4x4(), 1, test_tile).unwrap();
        cursor.set_position(0);
        let archive = unpack(&mut cursor).unwrap();

        let tile = test_tile(0);
        let i = (2 * 4 + 3) * 4;
        assert_eq!(
            archive.sample_tile(0, 3, 2),
            [tile[i], tile[i + 1], tile[i + 2], tile[i + 3]]
        );
        assert_eq!(archive.sample_tile(0, 4, 0), [0; 4]);
        assert_eq!(archive.sample_tile(9, 0, 0), [0; 4]);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut cursor = Cursor::new(Vec::new());
        pack(&mut cursor, &meta_4x4(), 1, test_tile).unwrap();
        let mut bytes = cursor.into_inner();
        bytes[0] = b'X';
        let err = unpack(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            RaycastError::ArchiveMalformed { reason: "bad magic", .. }
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut cursor = Cursor::new(Vec::new());
        pack(&mut cursor, &meta_4x4(), 0, test_tile).unwrap();
        let mut bytes = cursor.into_inner();
        bytes[4] = 3;
        let err = unpack(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            RaycastError::ArchiveMalformed { reason: "unsupported version", .. }
        ));
    }

    #[test]
    fn version_1_implies_1024_square_tiles() {
        let mut cursor = Cursor::new(Vec::new());
        pack(&mut cursor, &meta_4x4(), 0, test_tile).unwrap();
        let mut bytes = cursor.into_inner();
        bytes[4] = 1;
        let archive = unpack(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(archive.meta().tile_width, 1024);
        assert_eq!(archive.meta().tile_height, 1024);
    }

    #[test]
    fn wrong_tile_length_fails_pack() {
        let mut cursor = Cursor::new(Vec::new());
        let err = pack(&mut cursor, &meta_4x4(), 1, |_| vec![0u8; 5]).unwrap_err();
        assert!(matches!(err, RaycastError::ArchiveMalformed { .. }));
    }

    #[test]
    fn corrupt_stream_is_a_deflate_error() {
        let mut cursor = Cursor::new(Vec::new());
        pack(&mut cursor, &meta_4x4(), 1, test_tile).unwrap();
        let mut bytes = cursor.into_inner();
        // Clobber the compressed payload past the size field.
        let len = bytes.len();
        bytes[len - 4..].fill(0xAA);
        let err = unpack(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            RaycastError::DeflateFailed { .. } | RaycastError::ArchiveMalformed { .. }
        ));
    }
}
