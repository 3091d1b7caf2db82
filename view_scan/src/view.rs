use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::{wrap_degrees, Coord, Rotation};

pub type StructureId = u32;
pub type ResidueIndex = u32;

/// Whether the to-residue comes after (`Increasing`) or before (`Decreasing`) the from-residue
/// along the chain.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Direction {
    Increasing,
    Decreasing,
}

impl Direction {

    pub fn of_indices(from_index: usize, to_index: usize) -> Self {

        match to_index > from_index {
            true => Direction::Increasing,
            false => Direction::Decreasing,
        }
    }
}

/// The geometric description of one ordered residue pair.
///
/// Angles are degrees in `[-180, 180)`. `view_vector` is the position of the to-residue in the
/// from-residue's local frame and `frame` is the to-residue's orientation in that same frame.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct View {
    pub from_phi: f32,
    pub from_psi: f32,
    pub to_phi: f32,
    pub to_psi: f32,
    pub direction: Direction,
    pub view_vector: Coord,
    pub frame: Rotation,
}

impl View {

    pub fn random<R: Rng>(rng: &mut R, half_width: f32) -> Self {

        return Self {
            from_phi: wrap_degrees(rng.gen_range(-180.0..180.0)),
            from_psi: wrap_degrees(rng.gen_range(-180.0..180.0)),
            to_phi: wrap_degrees(rng.gen_range(-180.0..180.0)),
            to_psi: wrap_degrees(rng.gen_range(-180.0..180.0)),
            direction: match rng.gen::<bool>() {
                true => Direction::Increasing,
                false => Direction::Decreasing,
            },
            view_vector: Coord::random_in_cube(rng, half_width),
            frame: Rotation::random(rng),
        };
    }
}

/// One sampled residue pair of one structure, as stored in buckets and handed to actions.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ResPairEntry {
    pub structure_id: StructureId,
    pub from_index: ResidueIndex,
    pub to_index: ResidueIndex,
    pub view: View,
}

impl ResPairEntry {

    pub fn new(structure_id: StructureId, from_index: ResidueIndex, to_index: ResidueIndex, view: View) -> Self {

        return Self {
            structure_id,
            from_index,
            to_index,
            view,
        };
    }
}
