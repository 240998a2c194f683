//! Shared read-only raycast resources.
//!
//! The edge layout and decoded tile cache are produced once and then only
//! read, so renderers and tests can share one value without locking.

use crate::archive::TileArchive;
use crate::edges::{EdgeLayout, Side, WallEdge, STRIP_HEIGHT};

/// Edge layout plus the tile cache it indexes into.
#[derive(Debug, Clone)]
pub struct RaycastResources {
    layout: EdgeLayout,
    archive: TileArchive,
}

impl RaycastResources {
    pub fn new(layout: EdgeLayout, archive: TileArchive) -> Self {
        Self { layout, archive }
    }

    pub fn layout(&self) -> &EdgeLayout {
        &self.layout
    }

    pub fn archive(&self) -> &TileArchive {
        &self.archive
    }

    /// Look up the edge for a wall face.
    pub fn find_edge(&self, cell_x: u32, cell_y: u32, side: Side) -> Option<&WallEdge> {
        self.layout.find(cell_x, cell_y, side)
    }

    /// Sample the wall texture for a face at normalised `(u, v)`.
    ///
    /// `u` runs along the wall face, `v` down its height, both clamped to
    /// `[0, 1]`. Faces without an edge (unexposed or off the map) are fully
    /// transparent.
    pub fn sample_wall(&self, cell_x: u32, cell_y: u32, side: Side, u: f32, v: f32) -> [u8; 4] {
        let Some(edge) = self.find_edge(cell_x, cell_y, side) else {
            return [0; 4];
        };

        let span = (edge.width - 1) as f32;
        let strip_x = edge.x_offset + (u.clamp(0.0, 1.0) * span) as u32;
        let strip_y = (v.clamp(0.0, 1.0) * (STRIP_HEIGHT - 1) as f32) as u32;

        let tile_width = self.archive.meta().tile_width.max(1);
        self.archive
            .sample_tile(strip_x / tile_width, strip_x % tile_width, strip_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{pack, unpack, ArchiveMeta};
    use crate::edges::analyze_map;
    use crate::map::Map;
    use std::io::Cursor;

    // A tiny archive whose "tiles" are 4x4 so strip pixels map onto many
    // tiles; pixel bytes encode their own coordinates for verification.
    fn tiny_archive(tile_count: u32) -> TileArchive {
        let meta = ArchiveMeta {
            tile_width: 4,
            tile_height: 4,
            mortar_rgb: [80, 80, 80],
            seed: 1,
        };
        let mut cursor = Cursor::new(Vec::new());
        pack(&mut cursor, &meta, tile_count, |k| {
            let mut tile = Vec::with_capacity(4 * 4 * 4);
            for y in 0..4u8 {
                for x in 0..4u8 {
                    tile.extend_from_slice(&[k as u8, x, y, 255]);
                }
            }
            tile
        })
        .unwrap();
        cursor.set_position(0);
        unpack(&mut cursor).unwrap()
    }

    fn resources() -> RaycastResources {
        let map = Map::from_rows(&[
            vec![0x01, 0x01],
            vec![0x00, 0x00],
        ])
        .unwrap();
        let layout = analyze_map(&map).unwrap();
        RaycastResources::new(layout, tiny_archive(200))
    }

    #[test]
    fn unexposed_faces_are_transparent() {
        let res = resources();
        assert_eq!(res.sample_wall(0, 0, Side::East, 0.5, 0.5), [0; 4]);
        assert_eq!(res.sample_wall(7, 7, Side::North, 0.5, 0.5), [0; 4]);
    }

    #[test]
    fn sample_wall_reads_the_edge_pixel_range() {
        let res = resources();
        let edge = *res.find_edge(0, 0, Side::South).unwrap();

        // u = 0 maps to the edge's first strip column.
        let px = res.sample_wall(0, 0, Side::South, 0.0, 0.0);
        assert_eq!(px[0], (edge.x_offset / 4) as u8);
        assert_eq!(px[1], (edge.x_offset % 4) as u8);

        // u = 1 maps to the edge's last strip column.
        let last = edge.x_offset + edge.width - 1;
        let px = res.sample_wall(0, 0, Side::South, 1.0, 0.0);
        assert_eq!(px[0], (last / 4) as u8);
        assert_eq!(px[1], (last % 4) as u8);
    }

    #[test]
    fn uv_is_clamped() {
        let res = resources();
        assert_eq!(
            res.sample_wall(0, 0, Side::South, -3.0, -1.0),
            res.sample_wall(0, 0, Side::South, 0.0, 0.0)
        );
        assert_eq!(
            res.sample_wall(0, 0, Side::South, 4.0, 2.0),
            res.sample_wall(0, 0, Side::South, 1.0, 1.0)
        );
    }
}
