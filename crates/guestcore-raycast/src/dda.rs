//! Grid DDA ray casting.

use crate::edges::Side;
use crate::map::Map;

/// A ray that stopped at a wall face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Perpendicular distance from the origin to the wall plane, in cell
    /// units.
    pub distance: f32,
    /// Which cardinal face of the wall cell was hit.
    pub side: Side,
    /// The wall cell.
    pub cell_x: i32,
    pub cell_y: i32,
    /// Fractional coordinate along the wall face in `[0, 1)`, increasing
    /// in one canonical direction per side.
    pub wall_x: f32,
}

/// Outcome of casting one ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RayOutcome {
    Hit(RayHit),
    /// The ray left the map; `distance` is the perpendicular distance
    /// accumulated up to the exit step.
    Miss { distance: f32 },
}

/// Cast a ray from `(px, py)` along unit direction `(dx, dy)`.
///
/// Cells are stepped with the classic DDA: advance whichever axis has the
/// nearer grid line, until a wall cell is entered or the map is left.
/// Spawn-marker cells are walkable and never stop the ray. The traversal
/// visits at most `width + height` cells before leaving the map.
pub fn cast_ray(map: &Map, px: f32, py: f32, dx: f32, dy: f32) -> RayOutcome {
    let mut map_x = px.floor() as i32;
    let mut map_y = py.floor() as i32;

    let delta_x = (1.0 / dx).abs();
    let delta_y = (1.0 / dy).abs();

    let (step_x, mut side_dist_x) = if dx < 0.0 {
        (-1, (px - map_x as f32) * delta_x)
    } else {
        (1, (map_x as f32 + 1.0 - px) * delta_x)
    };
    let (step_y, mut side_dist_y) = if dy < 0.0 {
        (-1, (py - map_y as f32) * delta_y)
    } else {
        (1, (map_y as f32 + 1.0 - py) * delta_y)
    };

    loop {
        let vertical = side_dist_x < side_dist_y;
        if vertical {
            side_dist_x += delta_x;
            map_x += step_x;
        } else {
            side_dist_y += delta_y;
            map_y += step_y;
        }

        let distance = if vertical {
            side_dist_x - delta_x
        } else {
            side_dist_y - delta_y
        };

        if map.cell(map_x, map_y).is_none() {
            return RayOutcome::Miss { distance };
        }
        if !map.is_wall(map_x, map_y) {
            continue;
        }

        let side = if vertical {
            if step_x > 0 {
                Side::West
            } else {
                Side::East
            }
        } else if step_y > 0 {
            Side::North
        } else {
            Side::South
        };

        // Intersection coordinate along the wall, flipped so wall_x runs
        // in a fixed direction per face.
        let mut wall_x = if vertical {
            py + distance * dy
        } else {
            px + distance * dx
        };
        wall_x -= wall_x.floor();
        if (vertical && step_x > 0) || (!vertical && step_y < 0) {
            wall_x = 1.0 - wall_x;
            if wall_x >= 1.0 {
                wall_x = 0.0;
            }
        }

        return RayOutcome::Hit(RayHit {
            distance,
            side,
            cell_x: map_x,
            cell_y: map_y,
            wall_x,
        });
    }
}
