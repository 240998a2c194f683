//! Dungeon map grid.
//!
//! A map is a dense byte grid. `0x01` is a wall, `0x00` is floor, and
//! `0xF0..=0xF3` mark walkable player spawns facing north, east, south and
//! west. The grid carries no header; the host fixes width and height.

use crate::error::{RaycastError, RaycastResult};

/// Cell value marking a wall.
pub const CELL_WALL: u8 = 0x01;
/// Cell value range marking a walkable player spawn (facing N/E/S/W).
pub const CELL_SPAWN_FIRST: u8 = 0xF0;
pub const CELL_SPAWN_LAST: u8 = 0xF3;

/// A dense byte grid of map cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    width: u32,
    height: u32,
    cells: Vec<u8>,
}

impl Map {
    /// Build a map from row-major cell bytes.
    pub fn new(width: u32, height: u32, cells: Vec<u8>) -> RaycastResult<Self> {
        if width == 0 || height == 0 || cells.len() != width as usize * height as usize {
            return Err(RaycastError::MapEmpty);
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a map from a rectangular slice of rows.
    pub fn from_rows(rows: &[Vec<u8>]) -> RaycastResult<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.len() as u32);
        if rows.iter().any(|r| r.len() as u32 != width) {
            return Err(RaycastError::MapEmpty);
        }
        Self::new(width, height, rows.concat())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The cell at signed coordinates, or `None` when out of bounds.
    pub fn cell(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(self.cells[y as usize * self.width as usize + x as usize])
    }

    /// Wall test with out-of-bounds counting as wall.
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).map_or(true, |c| c == CELL_WALL)
    }

    /// Walkable test: every in-bounds non-wall cell is walkable, spawn
    /// markers included.
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).map_or(false, |c| c != CELL_WALL)
    }

    /// Whether the cell carries a player spawn marker.
    pub fn is_spawn(&self, x: i32, y: i32) -> bool {
        self.cell(x, y)
            .map_or(false, |c| (CELL_SPAWN_FIRST..=CELL_SPAWN_LAST).contains(&c))
    }
}
