use std::fmt;
use ascii::AsciiStr;
use rand::Rng;

use crate::error::{Error, Result};
use crate::geometry::{wrap_degrees, Coord, Rotation};
use crate::view::{Direction, View};

pub const NAME_SIZE: usize = 30;

/// Mean distance between consecutive alpha carbons, in angstroms.
const CONSECUTIVE_RESIDUE_DISTANCE: f32 = 3.8;

/// Anything that can be scanned: a sequence of residues and the view of any ordered pair of them.
pub trait Structure {
    fn name(&self) -> &StructureName;
    fn num_residues(&self) -> usize;

    /// Panics if either index is out of range.
    fn view_of_pair(&self, from_index: usize, to_index: usize) -> View;
}

/// Fixed-width ASCII structure name, zero padded.
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct StructureName(pub [u8; NAME_SIZE]);

impl StructureName {

    pub fn from_str(data: &str) -> Result<Self> {

        if data.len() > NAME_SIZE {
            return Err(Error::Identifier(format!("{} is longer than {} characters", data, NAME_SIZE)));
        }

        let ascii = AsciiStr::from_ascii(data.as_bytes())
            .map_err(|_| Error::Identifier(format!("{} is not ASCII", data)))?;

        let mut fill_arr = [0u8; NAME_SIZE];
        fill_arr[..ascii.len()].copy_from_slice(ascii.as_bytes());

        return Ok(Self(fill_arr));
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {

        let mut bytes = [0u8; NAME_SIZE];
        for x in &mut bytes[..8] {
            *x = rng.gen_range(65..91);
        }

        return Self(bytes);
    }

    fn used_bytes(&self) -> &[u8] {

        let len = self.0.iter().position(|b| *b == 0).unwrap_or(NAME_SIZE);
        return &self.0[..len];
    }
}

impl fmt::Display for StructureName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {

        match AsciiStr::from_ascii(self.used_bytes()) {
            Ok(name) => write!(f, "{}", name),
            Err(_) => write!(f, "<non-ascii name>"),
        }
    }
}

impl fmt::Debug for StructureName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// One residue reduced to what a view needs: backbone angles, a reference location and the
/// residue's local frame (a rotation from the structure's frame into the residue's).
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Residue {
    pub phi: f32,
    pub psi: f32,
    pub location: Coord,
    pub frame: Rotation,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Protein {
    pub name: StructureName,
    pub residues: Vec<Residue>,
}

impl Protein {

    pub fn new(name: &str, residues: Vec<Residue>) -> Result<Self> {

        return Ok(Self {
            name: StructureName::from_str(name)?,
            residues,
        });
    }

    /// A random chain: consecutive locations a fixed step apart, random frames and angles.
    pub fn random<R: Rng>(rng: &mut R, num_residues: usize) -> Self {

        let mut residues = Vec::with_capacity(num_residues);
        let mut location = Coord::default();

        for _ in 0..num_residues {
            let frame = Rotation::random(rng);
            residues.push(Residue {
                phi: wrap_degrees(rng.gen_range(-180.0..180.0)),
                psi: wrap_degrees(rng.gen_range(-180.0..180.0)),
                location,
                frame,
            });
            let step = frame.rotate(&Coord::new(CONSECUTIVE_RESIDUE_DISTANCE, 0.0, 0.0));
            location = location + step;
        }

        return Self {
            name: StructureName::random(rng),
            residues,
        };
    }

    /// A noisy copy: each residue's angles, location and frame moved by up to the given amounts.
    pub fn perturbed<R: Rng>(&self, rng: &mut R, max_angle_shift: f32, max_location_shift: f32, max_frame_turn: f32) -> Self {

        let residues = self.residues.iter()
            .map(|res| Residue {
                phi: wrap_degrees(res.phi + rng.gen_range(-max_angle_shift..=max_angle_shift)),
                psi: wrap_degrees(res.psi + rng.gen_range(-max_angle_shift..=max_angle_shift)),
                location: res.location + Coord::random_in_cube(rng, max_location_shift),
                frame: res.frame.compose(&Rotation::from_axis_angle(
                    Coord::random_in_cube(rng, 1.0),
                    rng.gen_range(0.0..=max_frame_turn),
                )),
            })
            .collect();

        return Self {
            name: self.name,
            residues,
        };
    }

    /// The same protein rigidly moved: views are invariant under this.
    pub fn moved(&self, rotation: &Rotation, translation: &Coord) -> Self {

        let residues = self.residues.iter()
            .map(|res| Residue {
                location: rotation.rotate(&res.location) + *translation,
                frame: res.frame.compose(&rotation.inverse()),
                ..*res
            })
            .collect();

        return Self {
            name: self.name,
            residues,
        };
    }
}

impl Structure for Protein {

    fn name(&self) -> &StructureName {
        return &self.name;
    }

    fn num_residues(&self) -> usize {
        return self.residues.len();
    }

    fn view_of_pair(&self, from_index: usize, to_index: usize) -> View {

        let from = &self.residues[from_index];
        let to = &self.residues[to_index];

        return View {
            from_phi: from.phi,
            from_psi: from.psi,
            to_phi: to.phi,
            to_psi: to.psi,
            direction: Direction::of_indices(from_index, to_index),
            view_vector: from.frame.rotate(&(to.location - from.location)),
            frame: to.frame.compose(&from.frame.inverse()),
        };
    }
}
