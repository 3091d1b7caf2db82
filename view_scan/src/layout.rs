//! Sets constants for the packed key layout
//!
//! A key is a short array of signed cells. For hashing, the cells are written big-endian into a
//! single `u128`, each with its sign bit flipped so that the packed integers sort in the same
//! order as the keys they came from. Unused trailing cells stay zero.

use std::mem::size_of;
use byteorder::{ByteOrder, BigEndian};

pub type CellIndex = i16;
pub type PackedKey = u128;

pub const CELL_SIZE: usize = size_of::<CellIndex>();
pub const PACKED_KEY_SIZE: usize = size_of::<PackedKey>();

pub const MAX_KEY_PARTS: usize = PACKED_KEY_SIZE / CELL_SIZE;

const SIGN_FLIP: u16 = 0x8000;

pub fn cell_offset(part: usize) -> usize {
    return part * CELL_SIZE;
}

/// Panics if there are more than `MAX_KEY_PARTS` cells; keyers are validated against that limit
/// when they are built.
pub fn pack_cells(cells: &[CellIndex]) -> PackedKey {

    assert!(cells.len() <= MAX_KEY_PARTS);

    let mut arr = [0u8; PACKED_KEY_SIZE];
    for (part, cell) in cells.iter().enumerate() {
        let offset = cell_offset(part);
        BigEndian::write_u16(&mut arr[offset..offset + CELL_SIZE], (*cell as u16) ^ SIGN_FLIP);
    }

    return PackedKey::from_be_bytes(arr);
}

pub fn unpack_cells(packed: PackedKey, cells: &mut [CellIndex]) {

    assert!(cells.len() <= MAX_KEY_PARTS);

    let arr = packed.to_be_bytes();
    for (part, cell) in cells.iter_mut().enumerate() {
        let offset = cell_offset(part);
        *cell = (BigEndian::read_u16(&arr[offset..offset + CELL_SIZE]) ^ SIGN_FLIP) as CellIndex;
    }
}
