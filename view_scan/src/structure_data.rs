//! Per-structure storage of the sampled residue pairs, owned by an index or a query set.

use std::mem::size_of;
use std::ops::Index;

use crate::criteria::MatchCriteria;
use crate::error::{Error, Result};
use crate::stride::RoledScanStride;
use crate::structure::{Structure, StructureName};
use crate::view::{ResPairEntry, ResidueIndex, StructureId};

/// The sampled pairs of one structure.
///
/// Each sampled (rep) pair stands for the block of pairs that lie within one stride of it:
/// `(from + i, to + j)` for `i` below the from-stride and `j` below the to-stride. The block's
/// pairs are its neighbours; the rep is its own first neighbour. A rep ruled out by the
/// criteria on its own takes its block with it.
#[derive(Debug, Clone)]
pub struct ScanStructureData {
    name: StructureName,
    num_residues: usize,
    roled_stride: RoledScanStride,
    from_step: usize,
    to_step: usize,
    num_to_reps: usize,
    entries: Vec<ResPairEntry>,
    /// Neighbours of every block, rep grid order. Empty when both strides are 1.
    neighbours: Vec<ResPairEntry>,
    /// Start of each block's neighbours, plus the end of the last.
    neighbour_starts: Vec<usize>,
}

impl ScanStructureData {

    /// Samples the structure's residue pairs with the role's strides, dropping any pair the
    /// criteria rule out on its own.
    pub fn from_structure<S: Structure>(
        structure: &S,
        structure_id: StructureId,
        roled_stride: RoledScanStride,
        criteria: &MatchCriteria,
    ) -> Result<Self> {

        let num_residues = structure.num_residues();
        if ResidueIndex::try_from(num_residues).is_err() {
            return Err(Error::InvalidUsage(format!("{} has too many residues ({})", structure.name(), num_residues)));
        }

        let from_strider = roled_stride.from_strider()?;
        let to_strider = roled_stride.to_strider()?;
        let from_step = from_strider.step();
        let to_step = to_strider.step();
        let has_neighbours = from_step > 1 || to_step > 1;

        let pair_entry = |from_index: usize, to_index: usize| {
            return ResPairEntry::new(
                structure_id,
                from_index as ResidueIndex,
                to_index as ResidueIndex,
                structure.view_of_pair(from_index, to_index),
            );
        };

        let mut entries = Vec::new();
        let mut neighbours = Vec::new();
        let mut neighbour_starts = Vec::new();
        for from_index in from_strider.rep_indices(num_residues) {
            for to_index in to_strider.rep_indices(num_residues) {
                if has_neighbours {
                    neighbour_starts.push(neighbours.len());
                }
                if !criteria.are_not_violated_by(from_index, to_index) {
                    continue;
                }
                entries.push(pair_entry(from_index, to_index));

                if !has_neighbours {
                    continue;
                }
                for neighbour_from in from_index..(from_index + from_step).min(num_residues) {
                    for neighbour_to in to_index..(to_index + to_step).min(num_residues) {
                        if criteria.are_not_violated_by(neighbour_from, neighbour_to) {
                            neighbours.push(pair_entry(neighbour_from, neighbour_to));
                        }
                    }
                }
            }
        }
        if has_neighbours {
            neighbour_starts.push(neighbours.len());
        }
        entries.shrink_to_fit();
        neighbours.shrink_to_fit();
        neighbour_starts.shrink_to_fit();

        return Ok(Self {
            name: *structure.name(),
            num_residues,
            roled_stride,
            from_step,
            to_step,
            num_to_reps: to_strider.num_reps(num_residues),
            entries,
            neighbours,
            neighbour_starts,
        });
    }

    pub fn name(&self) -> &StructureName {
        return &self.name;
    }

    pub fn num_residues(&self) -> usize {
        return self.num_residues;
    }

    pub fn roled_stride(&self) -> &RoledScanStride {
        return &self.roled_stride;
    }

    /// The rep pairs, the ones that go into a store.
    pub fn entries(&self) -> &[ResPairEntry] {
        return &self.entries;
    }

    /// The pairs in `rep`'s block, `rep` first.
    ///
    /// Panics if `rep` is not one of this structure's rep pairs.
    pub fn neighbours_of<'a>(&'a self, rep: &'a ResPairEntry) -> &'a [ResPairEntry] {

        let from_index = rep.from_index as usize;
        let to_index = rep.to_index as usize;
        assert!(
            from_index % self.from_step == 0 && to_index % self.to_step == 0
                && from_index < self.num_residues && to_index < self.num_residues,
            "{:?} is not a rep pair of {}", rep, self.name
        );

        if self.neighbour_starts.is_empty() {
            return std::slice::from_ref(rep);
        }

        let cell = (from_index / self.from_step) * self.num_to_reps + to_index / self.to_step;
        return &self.neighbours[self.neighbour_starts[cell]..self.neighbour_starts[cell + 1]];
    }

    /// All the pairs reachable through the reps, each once.
    pub fn num_neighbours(&self) -> usize {

        if self.neighbour_starts.is_empty() {
            return self.entries.len();
        }
        return self.neighbours.len();
    }

    pub fn info_size(&self) -> usize {

        return size_of::<Self>()
            + (self.entries.capacity() + self.neighbours.capacity()) * size_of::<ResPairEntry>()
            + self.neighbour_starts.capacity() * size_of::<usize>();
    }
}

/// All the structures on one side of a scan, indexed by structure id.
#[derive(Debug, Clone)]
pub struct ScanMultiStructureData {
    roled_stride: RoledScanStride,
    structures: Vec<ScanStructureData>,
}

impl ScanMultiStructureData {

    pub fn new(roled_stride: RoledScanStride) -> Self {

        return Self {
            roled_stride,
            structures: Vec::new(),
        };
    }

    pub fn push(&mut self, data: ScanStructureData) -> Result<()> {

        if data.roled_stride != self.roled_stride {
            return Err(Error::InvalidUsage(format!(
                "structure {} was sampled with {:?}, not {:?}", data.name, data.roled_stride, self.roled_stride
            )));
        }

        self.structures.push(data);
        return Ok(());
    }

    /// Id the next pushed structure will get.
    pub fn next_id(&self) -> Result<StructureId> {

        return StructureId::try_from(self.structures.len())
            .map_err(|_| Error::InvalidUsage("too many structures".to_string()));
    }

    pub fn len(&self) -> usize {
        return self.structures.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.structures.is_empty();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanStructureData> {
        return self.structures.iter();
    }

    pub fn num_entries(&self) -> usize {
        return self.structures.iter().map(|data| data.entries.len()).sum();
    }

    pub fn info_size(&self) -> usize {
        return size_of::<Self>() + self.structures.iter().map(|data| data.info_size()).sum::<usize>();
    }
}

/// Panics on an unknown id.
impl Index<StructureId> for ScanMultiStructureData {
    type Output = ScanStructureData;

    fn index(&self, structure_id: StructureId) -> &ScanStructureData {
        return &self.structures[structure_id as usize];
    }
}
