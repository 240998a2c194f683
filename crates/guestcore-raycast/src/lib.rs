//! Procedural wall textures and grid raycasting.
//!
//! The dungeon's walls share one conceptual megatexture strip, 1024 pixels
//! tall and as wide as the map has exposed wall faces. The strip is never
//! allocated whole: every pixel is a pure function of its global
//! coordinate, a seed, and the mortar parameters, so tiles can be
//! generated, packed, and sampled independently.
//!
//! # Pipeline
//!
//! - [`edges`] enumerates exposed wall faces and assigns each a pixel range
//!   in the strip.
//! - [`mortar`] samples the procedural mortar veins; [`tiles`] streams the
//!   strip as 1024x1024 RGBA tiles.
//! - [`archive`] packs tiles into an `MTX1` file and decodes it back into
//!   an O(1) sampling cache.
//! - [`dda`] casts rays through the map grid; [`resources`] ties the edge
//!   layout and tile cache together for wall texture lookups.
//!
//! Generation is deterministic: the same map, seed, and parameters always
//! produce byte-identical tiles.

pub mod archive;
pub mod dda;
pub mod edges;
pub mod error;
pub mod map;
pub mod mortar;
pub mod noise;
pub mod resources;
pub mod tiles;

pub use archive::{ArchiveMeta, TileArchive};
pub use dda::{cast_ray, RayHit, RayOutcome};
pub use edges::{analyze_map, EdgeLayout, Side, WallEdge, STRIP_HEIGHT};
pub use error::{RaycastError, RaycastResult};
pub use map::Map;
pub use mortar::{sample, MortarParams};
pub use resources::RaycastResources;
pub use tiles::{render_tile, stream_tiles, tile_count, TILE_SIZE};
