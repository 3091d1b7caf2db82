use std::time::{Duration, Instant};
use log::{debug, info, warn};

use crate::diagnostics::{BuildReport, DurnAndSize, ScanReport};
use crate::error::{Error, Result};
use crate::policy::Policy;
use crate::store::ResPairStore;
use crate::store_builder::{populate_store, Sod};
use crate::stride::ScanRole;
use crate::structure::Structure;
use crate::structure_data::{ScanMultiStructureData, ScanStructureData};
use crate::structure_index::StructureIndex;
use crate::vector_store::SortedVectorStore;
use crate::view::{ResPairEntry, StructureId};

/// The needle side of a scan: each sampled residue pair is stored once, under its exact key,
/// in a sorted store that a scan walks in key order.
#[derive(Debug)]
pub struct QuerySet<'p, const N: usize> {
    policy: &'p Policy<N>,
    structures: ScanMultiStructureData,
    store: SortedVectorStore<N>,
    structures_build_durn: Duration,
    store_build_durn: Duration,
}

impl<'p, const N: usize> QuerySet<'p, N> {

    pub fn new(policy: &'p Policy<N>) -> Self {

        return Self {
            policy,
            structures: ScanMultiStructureData::new(policy.roled_stride(ScanRole::Query)),
            store: SortedVectorStore::new(),
            structures_build_durn: Duration::ZERO,
            store_build_durn: Duration::ZERO,
        };
    }

    pub fn from_structures<S: Structure>(policy: &'p Policy<N>, structures: &[S]) -> Result<Self> {

        let mut query_set = Self::new(policy);
        for structure in structures.iter() {
            query_set.add_structure(structure)?;
        }

        return Ok(query_set);
    }

    /// Samples the structure and stores its pairs sparsely. Returns the structure's id.
    pub fn add_structure<S: Structure>(&mut self, structure: &S) -> Result<StructureId> {

        let structure_id = self.structures.next_id()?;
        let criteria = self.policy.criteria();

        let start = Instant::now();
        let data = ScanStructureData::from_structure(
            structure,
            structure_id,
            self.policy.roled_stride(ScanRole::Query),
            criteria,
        )?;
        self.structures_build_durn += start.elapsed();

        let start = Instant::now();
        populate_store(&mut self.store, data.entries(), self.policy.keyer(), criteria, Sod::Sparse);
        self.store_build_durn += start.elapsed();

        if data.entries().is_empty() {
            warn!("Structure {} gave no residue pairs to query with", structure.name());
        }
        debug!(
            "Added query structure {} ({}) with {} residues: {} pairs",
            structure_id, structure.name(), data.num_residues(), data.entries().len()
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

    /// Runs `action(query_entry, index_entry)` once for every matching pair of entries and
    /// returns how long the scan took.
    ///
    /// Fails without looking anything up if the index was built with a different `Policy`
    /// instance.
    pub fn scan<F>(&self, index: &StructureIndex<'_, N>, action: F) -> Result<Duration>
    where
        F: FnMut(&ResPairEntry, &ResPairEntry),
    {
        return Ok(self.scan_with_report(index, action)?.duration);
    }

    /// As `scan`, also counting probes, candidate comparisons, neighbour follow-ups and matches.
    pub fn scan_with_report<F>(&self, index: &StructureIndex<'_, N>, mut action: F) -> Result<ScanReport>
    where
        F: FnMut(&ResPairEntry, &ResPairEntry),
    {

        if !self.policy.same_instance(index.policy()) {
            return Err(Error::InvalidUsage(
                "Unable to scan a query set against an index built with a different policy".to_string()
            ));
        }

        let mut report = ScanReport::default();
        let start = Instant::now();

        for (key, query_bucket) in self.store.iter() {
            assert!(!query_bucket.is_empty(), "empty query bucket under {:?}", key);
            let counts = index.act_on_matches(key, &self.structures, query_bucket, &mut action);
            report.record(&counts);
        }

        report.duration = start.elapsed();
        info!(
            "Scanned {} query keys ({} hit) against {} structures: {} comparisons, {} rep matches, {} neighbour comparisons, {} matches in {:.3}s",
            report.keys_probed, report.buckets_hit, index.get_num_structures(), report.comparisons,
            report.rep_matches, report.neighbour_comparisons, report.matches, report.duration.as_secs_f64()
        );

        return Ok(report);
    }
}
