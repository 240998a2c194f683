//! Fixed tile-mask table for short delta opcodes.
//!
//! Delta opcodes `0x00..=0x5F` index this table instead of carrying their
//! 16-bit mask inline, which saves a byte on the tile shapes the encoder
//! emits most. Bit 15 of a mask is the top-left pixel of the 4x4 tile,
//! proceeding row-major to bit 0 at the bottom-right.
//!
//! The table is grouped into families: diagonal wipes, axis-aligned splits,
//! single rows/columns, corners, and dithers.

/// Masks for opcodes `0x00..=0x5F`, in opcode order.
pub const TILE_MASKS: [u16; 96] = [
    // 0x00..0x0F: diagonal wipes, both slopes.
    0xC800, 0xEC80, 0xFEC8, 0xFFEC, 0xFFFE, 0x3100, 0x7310, 0xF731,
    0xFF73, 0xFFF7, 0x6C80, 0x36C8, 0x136C, 0x6310, 0xC631, 0x8C63,
    // 0x10..0x1F: horizontal and vertical splits.
    0xF000, 0xFF00, 0xFFF0, 0x000F, 0x00FF, 0x0FFF, 0x8888, 0xCCCC,
    0xEEEE, 0x1111, 0x3333, 0x7777, 0x6666, 0x9999, 0x8CC8, 0x3113,
    // 0x20..0x2F: single rows and columns, then their complements.
    0x0F00, 0x00F0, 0x4444, 0x2222, 0xF0FF, 0xFF0F, 0xBBBB, 0xDDDD,
    0x0FF0, 0xF00F, 0x9669, 0x6996, 0xFAAF, 0xF55F, 0xAFFA, 0x5FF5,
    // 0x30..0x3F: corner triangles, growing.
    0x8000, 0xC000, 0xE000, 0x1000, 0x3000, 0x7000, 0x0008, 0x000C,
    0x000E, 0x0001, 0x0003, 0x0007, 0xC880, 0x3110, 0x0113, 0x088C,
    // 0x40..0x4F: corner blocks and bars.
    0xCC00, 0x3300, 0x00CC, 0x0033, 0xCC88, 0x3311, 0x88CC, 0x1133,
    0xEC00, 0x3700, 0x00CE, 0x0073, 0xE800, 0x1700, 0x008E, 0x0071,
    // 0x50..0x5F: dithers and sparse textures.
    0xAAAA, 0x5555, 0xA5A5, 0x5A5A, 0xAA55, 0x55AA, 0x9696, 0x6969,
    0x8421, 0x1248, 0x8241, 0x1842, 0xA0A0, 0x0A0A, 0x5050, 0x0505,
];
