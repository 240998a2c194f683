//! Exposed wall edge enumeration and strip layout.
//!
//! Every wall cell contributes one edge per side whose neighbour is not a
//! wall. Edges are ordered by `(cellY, cellX, side)` and each is assigned a
//! pixel range in the megatexture strip: 1024 horizontal pixels span three
//! world units, so widths follow the 341/341/342 pattern of a fractional
//! accumulator stepping by 1024/3.

use std::collections::HashMap;

use crate::error::{RaycastError, RaycastResult};
use crate::map::Map;

/// Height of the megatexture strip in pixels.
pub const STRIP_HEIGHT: u32 = 1024;
/// Horizontal pixels spanning three world units.
const PIXELS_PER_THREE_UNITS: u64 = 1024;

/// A wall face, in enumeration order North < East < South < West.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    /// All sides in enumeration order.
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    /// Grid offset of the neighbour across this side.
    fn neighbour(self) -> (i32, i32) {
        match self {
            Side::North => (0, -1),
            Side::East => (1, 0),
            Side::South => (0, 1),
            Side::West => (-1, 0),
        }
    }
}

/// One exposed wall face and its pixel range in the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallEdge {
    pub cell_x: u32,
    pub cell_y: u32,
    pub side: Side,
    /// First strip column owned by this edge.
    pub x_offset: u32,
    /// Number of strip columns owned by this edge. Always at least 1.
    pub width: u32,
}

/// The ordered edge list and the strip dimensions it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLayout {
    edges: Vec<WallEdge>,
    /// Face to edge-list position, for per-column sampling.
    index: HashMap<(u32, u32, Side), usize>,
    strip_width: u32,
}

impl EdgeLayout {
    pub fn edges(&self) -> &[WallEdge] {
        &self.edges
    }

    /// Total strip width in pixels: `ceil(edges * 1024 / 3)`.
    pub fn strip_width(&self) -> u32 {
        self.strip_width
    }

    /// Look up the edge for a wall face, if that face is exposed. O(1).
    pub fn find(&self, cell_x: u32, cell_y: u32, side: Side) -> Option<&WallEdge> {
        self.index
            .get(&(cell_x, cell_y, side))
            .map(|&i| &self.edges[i])
    }
}

/// Enumerate exposed edges in `(cellY, cellX, side)` order and assign each
/// its pixel range.
///
/// Out-of-bounds neighbours count as wall, so perimeter faces with no map
/// neighbour produce no edge. A map with no exposed edges yields an empty
/// layout with zero strip width.
pub fn analyze_map(map: &Map) -> RaycastResult<EdgeLayout> {
    if map.width() == 0 || map.height() == 0 {
        return Err(RaycastError::MapEmpty);
    }

    let mut edges = Vec::new();
    for y in 0..map.height() {
        for x in 0..map.width() {
            if !map.is_wall(x as i32, y as i32) {
                continue;
            }
            for side in Side::ALL {
                let (dx, dy) = side.neighbour();
                if !map.is_wall(x as i32 + dx, y as i32 + dy) {
                    edges.push(WallEdge {
                        cell_x: x,
                        cell_y: y,
                        side,
                        x_offset: 0,
                        width: 0,
                    });
                }
            }
        }
    }

    let strip_width = assign_pixel_ranges(&mut edges);
    let index = edges
        .iter()
        .enumerate()
        .map(|(i, e)| ((e.cell_x, e.cell_y, e.side), i))
        .collect();
    Ok(EdgeLayout {
        edges,
        index,
        strip_width,
    })
}

/// Fractional-accumulator width assignment.
///
/// Edge `i` spans `[floor(i*1024/3), floor((i+1)*1024/3))`, clamped to at
/// least one pixel; the final edge is widened to the accumulator ceiling so
/// the strip width is exactly `ceil(n*1024/3)`. Within each group of three
/// edges the widths are 341, 341, 342 and sum to 1024.
fn assign_pixel_ranges(edges: &mut [WallEdge]) -> u32 {
    let n = edges.len() as u64;
    for (i, edge) in edges.iter_mut().enumerate() {
        let i = i as u64;
        let start = i * PIXELS_PER_THREE_UNITS / 3;
        let end = if i + 1 == n {
            // Ceiling division keeps the strip wide enough to cover the
            // fractional remainder of the last edge.
            (n * PIXELS_PER_THREE_UNITS).div_ceil(3)
        } else {
            (i + 1) * PIXELS_PER_THREE_UNITS / 3
        };
        edge.x_offset = start as u32;
        edge.width = (end - start).max(1) as u32;
    }
    edges.last().map_or(0, |e| e.x_offset + e.width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const W: u8 = 0x01;
    const F: u8 = 0x00;

    #[test]
    fn lone_wall_exposes_all_four_sides_in_order() {
        // Wall surrounded by floor on every side.
        let map = Map::from_rows(&[
            vec![F, F, F],
            vec![F, W, F],
            vec![F, F, F],
        ])
        .unwrap();
        let layout = analyze_map(&map).unwrap();
        let sides: Vec<Side> = layout.edges().iter().map(|e| e.side).collect();
        assert_eq!(sides, Side::ALL.to_vec());
        assert!(layout.edges().iter().all(|e| (e.cell_x, e.cell_y) == (1, 1)));
    }

    #[test]
    fn perimeter_faces_produce_no_edges() {
        // A single wall cell map: every neighbour is out of bounds.
        let map = Map::from_rows(&[vec![W]]).unwrap();
        let layout = analyze_map(&map).unwrap();
        assert!(layout.edges().is_empty());
        assert_eq!(layout.strip_width(), 0);
    }

    #[test]
    fn edges_sort_by_row_then_column() {
        let map = Map::from_rows(&[
            vec![W, F, W],
            vec![F, F, F],
        ])
        .unwrap();
        let layout = analyze_map(&map).unwrap();
        let cells: Vec<(u32, u32)> = layout
            .edges()
            .iter()
            .map(|e| (e.cell_y, e.cell_x))
            .collect();
        let mut sorted = cells.clone();
        sorted.sort();
        assert_eq!(cells, sorted);
    }

    #[test]
    fn triples_of_widths_sum_to_1024() {
        // A long wall row over floor gives many south edges.
        let map = Map::from_rows(&[
            vec![W; 12],
            vec![F; 12],
        ])
        .unwrap();
        let layout = analyze_map(&map).unwrap();
        assert!(layout.edges().len() >= 6);

        let widths: Vec<u32> = layout.edges().iter().map(|e| e.width).collect();
        for triple in widths.chunks_exact(3) {
            assert_eq!(triple.iter().sum::<u32>(), 1024);
            assert_eq!(&triple[..2], &[341, 341]);
            assert_eq!(triple[2], 342);
        }
    }

    #[test]
    fn strip_width_is_ceil_of_edge_thirds() {
        for cols in 1..8u32 {
            let map = Map::from_rows(&[
                vec![W; cols as usize],
                vec![F; cols as usize],
            ])
            .unwrap();
            let layout = analyze_map(&map).unwrap();
            let n = layout.edges().len() as u64;
            let expect = (n * 1024).div_ceil(3) as u32;
            assert_eq!(layout.strip_width(), expect);
            let total: u32 = layout.edges().iter().map(|e| e.width).sum();
            assert_eq!(total, layout.strip_width());
        }
    }

    #[test]
    fn ranges_are_contiguous_from_zero() {
        let map = Map::from_rows(&[
            vec![W, W, W],
            vec![F, F, F],
        ])
        .unwrap();
        let layout = analyze_map(&map).unwrap();
        let mut cursor = 0;
        for edge in layout.edges() {
            assert_eq!(edge.x_offset, cursor);
            assert!(edge.width >= 1);
            cursor += edge.width;
        }
        assert_eq!(cursor, layout.strip_width());
    }

    #[test]
    fn find_matches_exposed_faces_only() {
        let map = Map::from_rows(&[
            vec![W, W],
            vec![F, F],
        ])
        .unwrap();
        let layout = analyze_map(&map).unwrap();
        assert!(layout.find(0, 0, Side::South).is_some());
        // The face between the two walls is not exposed.
        assert!(layout.find(0, 0, Side::East).is_none());
    }

    #[test]
    fn find_returns_every_enumerated_edge() {
        let map = Map::from_rows(&[
            vec![F, W, F],
            vec![W, F, W],
            vec![F, W, F],
        ])
        .unwrap();
        let layout = analyze_map(&map).unwrap();
        assert!(!layout.edges().is_empty());
        for edge in layout.edges() {
            assert_eq!(layout.find(edge.cell_x, edge.cell_y, edge.side), Some(edge));
        }
    }
}
