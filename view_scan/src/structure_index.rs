use std::time::{Duration, Instant};
use log::{debug, warn};

use crate::diagnostics::{BuildReport, DurnAndSize, MatchCounts};
use crate::error::Result;
use crate::hash_store::HashStore;
use crate::keyer::Key;
use crate::policy::Policy;
use crate::store::{Bucket, ResPairStore};
use crate::store_builder::{populate_store, Sod};
use crate::stride::ScanRole;
use crate::structure::Structure;
use crate::structure_data::{ScanMultiStructureData, ScanStructureData};
use crate::view::{ResPairEntry, StructureId};

/// The haystack side of a scan.
///
/// Every sampled residue pair is stored under every key that a matching query view could have,
/// so one exact probe per query key finds all candidates. Read-only once built: any number of
/// scans, on any number of threads, can share it.
#[derive(Debug)]
pub struct StructureIndex<'p, const N: usize> {
    policy: &'p Policy<N>,
    structures: ScanMultiStructureData,
    store: HashStore<N>,
    structures_build_durn: Duration,
    store_build_durn: Duration,
}

impl<'p, const N: usize> StructureIndex<'p, N> {

    pub fn new(policy: &'p Policy<N>) -> Self {

        return Self {
            policy,
            structures: ScanMultiStructureData::new(policy.roled_stride(ScanRole::Index)),
            store: HashStore::with_capacity(policy.hash_store_capacity()),
            structures_build_durn: Duration::ZERO,
            store_build_durn: Duration::ZERO,
        };
    }

    pub fn from_structures<S: Structure>(policy: &'p Policy<N>, structures: &[S]) -> Result<Self> {

        let mut index = Self::new(policy);
        for structure in structures.iter() {
            index.add_structure(structure)?;
        }

        return Ok(index);
    }

    /// Samples the structure and stores its pairs densely. Returns the structure's id.
    pub fn add_structure<S: Structure>(&mut self, structure: &S) -> Result<StructureId> {

        let structure_id = self.structures.next_id()?;
        let criteria = self.policy.criteria();

        let start = Instant::now();
        let data = ScanStructureData::from_structure(
            structure,
            structure_id,
            self.policy.roled_stride(ScanRole::Index),
            criteria,
        )?;
        self.structures_build_durn += start.elapsed();

        let start = Instant::now();
        let num_insertions = populate_store(&mut self.store, data.entries(), self.policy.keyer(), criteria, Sod::Dense);
        self.store_build_durn += start.elapsed();

        if data.entries().is_empty() {
            warn!("Structure {} gave no residue pairs to index", structure.name());
        }
        debug!(
            "Indexed structure {} ({}) with {} residues: {} pairs under {} keys",
            structure_id, structure.name(), data.num_residues(), data.entries().len(), num_insertions
        );

        self.structures.push(data)?;
        return Ok(structure_id);
    }

    pub fn policy(&self) -> &'p Policy<N> {
        return self.policy;
    }

    pub fn structures_data(&self) -> &ScanMultiStructureData {
        return &self.structures;
    }

    pub fn get_num_structures(&self) -> usize {
        return self.structures.len();
    }

    /// Panics on an unknown id.
    pub fn get_num_residues_of_structure(&self, structure_id: StructureId) -> usize {
        return self.structures[structure_id].num_residues();
    }

    pub fn get_structures_build_durn_and_size(&self) -> DurnAndSize {
        return (self.structures_build_durn, self.structures.info_size());
    }

    pub fn get_index_build_durn_and_size(&self) -> DurnAndSize {
        return (self.store_build_durn, self.store.size_estimate());
    }

    pub fn build_report(&self) -> BuildReport {

        return BuildReport::new(
            self.get_num_structures(),
            self.store.num_entries(),
            self.store.num_keys(),
            self.get_structures_build_durn_and_size(),
            self.get_index_build_durn_and_size(),
        );
    }

    pub fn find_matches(&self, key: &Key<N>) -> &Bucket {
        return self.store.find_matches(key);
    }

    /// Looks `key` up in the index once and follows up every pair from `query_bucket` and the
    /// index bucket that meets the criteria: `action(query_pair, index_pair)` is called for every
    /// pair in the query entry's block and every pair in the index entry's block that meet the
    /// criteria too. With unit strides each block holds only its rep.
    ///
    /// `query_structures` must be the data the query bucket's entries came from; entries
    /// that are not rep pairs of it are a bug and panic.
    pub fn act_on_matches<F>(
        &self,
        key: &Key<N>,
        query_structures: &ScanMultiStructureData,
        query_bucket: &Bucket,
        action: &mut F,
    ) -> MatchCounts
    where
        F: FnMut(&ResPairEntry, &ResPairEntry),
    {

        let index_bucket = self.store.find_matches(key);
        let mut counts = MatchCounts {
            index_entries: index_bucket.len(),
            ..MatchCounts::default()
        };
        if index_bucket.is_empty() {
            return counts;
        }

        let criteria = self.policy.criteria();
        for query_entry in query_bucket.iter() {
            let query_neighbours = query_structures[query_entry.structure_id].neighbours_of(query_entry);

            for index_entry in index_bucket.iter() {
                counts.comparisons += 1;
                if !criteria.are_met_by(&query_entry.view, &index_entry.view) {
                    continue;
                }
                counts.rep_matches += 1;

                let index_neighbours = self.structures[index_entry.structure_id].neighbours_of(index_entry);
                for query_neighbour in query_neighbours.iter() {
                    for index_neighbour in index_neighbours.iter() {
                        counts.neighbour_comparisons += 1;
                        if criteria.are_met_by(&query_neighbour.view, &index_neighbour.view) {
                            counts.matches += 1;
                            action(query_neighbour, index_neighbour);
                        }
                    }
                }
            }
        }

        return counts;
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::policy::test_support::light_config;
    use crate::policy::PolicyConfig;
    use crate::structure::{Protein, Structure};

    #[test]
    fn quick_counts_and_sizes() {

        let policy = light_config().build().unwrap();

        let mut rng = rand::thread_rng();
        let proteins = vec![Protein::random(&mut rng, 5), Protein::random(&mut rng, 8)];
        let index = StructureIndex::from_structures(&policy, &proteins).unwrap();

        assert_eq!(index.get_num_structures(), 2);
        assert_eq!(index.get_num_residues_of_structure(0), 5);
        assert_eq!(index.get_num_residues_of_structure(1), 8);

        let (_, structures_size) = index.get_structures_build_durn_and_size();
        let (_, store_size) = index.get_index_build_durn_and_size();
        assert!(structures_size >= (20 + 56) * std::mem::size_of::<ResPairEntry>());
        assert!(store_size > 0);

        let report = index.build_report();
        assert!(report.num_entries >= 20 + 56);
        assert!(report.num_keys > 0);
    }

    #[test]
    fn quick_every_entry_under_its_exact_key() {

        let mut config = light_config();
        config.criteria.minimum_index_distance = 2;
        let policy = config.build().unwrap();

        let mut rng = rand::thread_rng();
        let protein = Protein::random(&mut rng, 7);
        let mut index = StructureIndex::new(&policy);
        assert_eq!(index.add_structure(&protein).unwrap(), 0);

        for entry in index.structures_data()[0].entries() {
            let key = policy.keyer().make_key(&entry.view);
            assert!(index.find_matches(&key).contains(entry));
        }
    }

    #[test]
    fn quick_tiny_structure_has_no_pairs() {

        let policy = light_config().build().unwrap();

        let mut rng = rand::thread_rng();
        let mut index = StructureIndex::new(&policy);
        index.add_structure(&Protein::random(&mut rng, 1)).unwrap();

        assert_eq!(index.get_num_structures(), 1);
        assert_eq!(index.structures_data().num_entries(), 0);
        assert_eq!(index.build_report().num_keys, 0);
    }

    #[test]
    fn slow_index_many_structures() {

        let _ = env_logger::builder().is_test(true).try_init();
        let policy = light_config().build().unwrap();
        let mut rng = rand::thread_rng();

        let mut index = StructureIndex::new(&policy);
        let mut expected_pairs = 0;
        for i in kdam::tqdm!(0..30) {
            let protein = Protein::random(&mut rng, 5 + i % 7);
            expected_pairs += protein.num_residues() * (protein.num_residues() - 1);
            assert_eq!(index.add_structure(&protein).unwrap() as usize, i);
        }

        assert_eq!(index.get_num_structures(), 30);
        assert_eq!(index.structures_data().num_entries(), expected_pairs);
        assert_eq!(index.get_num_residues_of_structure(29), 5 + 29 % 7);
    }

    #[test]
    #[should_panic]
    fn quick_unknown_structure_panics() {

        let policy = PolicyConfig::example().build().unwrap();
        let index = StructureIndex::new(&policy);
        index.get_num_residues_of_structure(3);
    }
}
