use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::criteria::{MatchCriteria, MatchCriteriaConfig};
use crate::error::Result;
use crate::keyer::{Keyer, KeyerConfig, STANDARD_KEY_PARTS};
use crate::stride::{RoledScanStride, ScanRole, ScanStride};

/// Number of buckets a `HashStore` reserves before the first insertion, unless the policy says
/// otherwise. Dense insertion touches many keys per entry, so the index side starts large.
pub const DEFAULT_HASH_STORE_CAPACITY: usize = 1 << 16;

/// Everything both sides of a scan must agree on: how views are keyed, what counts as a match
/// and which residues are sampled.
///
/// A `StructureIndex` and a `QuerySet` borrow the policy they were built with and a scan only
/// runs when both borrowed the very same instance. Two policies with equal settings are still
/// different policies.
#[derive(Debug)]
pub struct Policy<const N: usize> {
    keyer: Keyer<N>,
    criteria: MatchCriteria,
    stride: ScanStride,
    hash_store_capacity: usize,
}

pub type StandardPolicy = Policy<STANDARD_KEY_PARTS>;

impl<const N: usize> Policy<N> {

    pub fn new(keyer: Keyer<N>, criteria: MatchCriteria, stride: ScanStride) -> Result<Self> {

        stride.validate()?;

        return Ok(Self {
            keyer,
            criteria,
            stride,
            hash_store_capacity: DEFAULT_HASH_STORE_CAPACITY,
        });
    }

    pub fn with_hash_store_capacity(mut self, hash_store_capacity: usize) -> Self {

        self.hash_store_capacity = hash_store_capacity;
        return self;
    }

    pub fn keyer(&self) -> &Keyer<N> {
        return &self.keyer;
    }

    pub fn criteria(&self) -> &MatchCriteria {
        return &self.criteria;
    }

    pub fn stride(&self) -> &ScanStride {
        return &self.stride;
    }

    pub fn roled_stride(&self, role: ScanRole) -> RoledScanStride {
        return self.stride.for_role(role);
    }

    pub fn hash_store_capacity(&self) -> usize {
        return self.hash_store_capacity;
    }

    /// Identity, not equality.
    pub fn same_instance(&self, other: &Policy<N>) -> bool {
        return std::ptr::eq(self, other);
    }
}

fn default_hash_store_capacity() -> usize {
    return DEFAULT_HASH_STORE_CAPACITY;
}

/// YAML form of a standard policy.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub keyer: KeyerConfig,
    pub criteria: MatchCriteriaConfig,
    pub stride: ScanStride,
    #[serde(default = "default_hash_store_capacity")]
    pub hash_store_capacity: usize,
}

impl PolicyConfig {

    /// The template `write_config` writes out. Its numbers are placeholders to be replaced with
    /// tolerances that suit the data; nothing falls back to it.
    pub fn example() -> Self {

        return Self {
            keyer: KeyerConfig {
                angle_cell_width: 90.0,
                angle_start_offset: 0.0,
                axis_cell_width: 7.0,
            },
            criteria: MatchCriteriaConfig {
                require_matching_directions: true,
                minimum_index_distance: 11,
                maximum_squared_distance: 40.0,
                maximum_frame_angle_difference: 35.0,
                maximum_phi_angle_difference: 67.5,
                maximum_psi_angle_difference: 67.5,
            },
            stride: ScanStride {
                query_from_stride: 1,
                query_to_stride: 1,
                index_from_stride: 1,
                index_to_stride: 1,
            },
            hash_store_capacity: DEFAULT_HASH_STORE_CAPACITY,
        };
    }

    pub fn from_file<P: AsRef<Path>>(filename: P) -> Result<Self> {

        let serialized = std::fs::read_to_string(filename)?;
        let deserialized: Self = serde_yaml::from_str(&serialized)?;

        return Ok(deserialized);
    }

    pub fn to_yaml(&self) -> Result<String> {
        return Ok(serde_yaml::to_string(self)?);
    }

    pub fn to_file<P: AsRef<Path>>(&self, filename: P) -> Result<()> {

        std::fs::write(filename, self.to_yaml()?)?;
        return Ok(());
    }

    pub fn build(&self) -> Result<StandardPolicy> {

        let policy = Policy::new(Keyer::standard(&self.keyer)?, self.criteria.build()?, self.stride)?;
        return Ok(policy.with_hash_store_capacity(self.hash_store_capacity));
    }
}

#[cfg(test)]
pub mod test_support {

    use super::*;

    /// Small tolerances and a small hash store, so dense insertion stays cheap in tests.
    pub fn light_config() -> PolicyConfig {

        return PolicyConfig {
            keyer: KeyerConfig {
                angle_cell_width: 30.0,
                angle_start_offset: 0.0,
                axis_cell_width: 3.0,
            },
            criteria: MatchCriteriaConfig {
                require_matching_directions: true,
                minimum_index_distance: 1,
                maximum_squared_distance: 4.0,
                maximum_frame_angle_difference: 30.0,
                maximum_phi_angle_difference: 20.0,
                maximum_psi_angle_difference: 20.0,
            },
            stride: ScanStride {
                query_from_stride: 1,
                query_to_stride: 1,
                index_from_stride: 1,
                index_to_stride: 1,
            },
            hash_store_capacity: 1024,
        };
    }
}
