//! Residue sampling: which residues of a structure take part as the from- and to-residues of
//! the stored pairs.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Picks every `step`th residue, starting from the first.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RepStrider {
    step: usize,
}

impl RepStrider {

    pub fn new(step: usize) -> Result<Self> {

        if step == 0 {
            return Err(Error::Config("a stride of 0 is degenerate, use 1 to take every residue".to_string()));
        }

        return Ok(Self { step });
    }

    pub fn step(&self) -> usize {
        return self.step;
    }

    pub fn num_reps(&self, num_residues: usize) -> usize {
        return (num_residues + self.step - 1) / self.step;
    }

    pub fn index_of_rep(&self, rep: usize) -> usize {
        return rep * self.step;
    }

    pub fn rep_indices(&self, num_residues: usize) -> impl Iterator<Item = usize> + Clone {
        return (0..num_residues).step_by(self.step);
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum ScanRole {
    Query,
    Index,
}

/// Separate from/to strides for the query side and the index side of a scan.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct ScanStride {
    pub query_from_stride: usize,
    pub query_to_stride: usize,
    pub index_from_stride: usize,
    pub index_to_stride: usize,
}

impl ScanStride {

    pub fn new(query_from_stride: usize, query_to_stride: usize, index_from_stride: usize, index_to_stride: usize) -> Result<Self> {

        let stride = Self {
            query_from_stride,
            query_to_stride,
            index_from_stride,
            index_to_stride,
        };
        stride.validate()?;

        return Ok(stride);
    }

    pub fn uniform(stride: usize) -> Result<Self> {
        return Self::new(stride, stride, stride, stride);
    }

    pub fn validate(&self) -> Result<()> {

        for stride in [self.query_from_stride, self.query_to_stride, self.index_from_stride, self.index_to_stride] {
            RepStrider::new(stride)?;
        }

        return Ok(());
    }

    pub fn for_role(&self, role: ScanRole) -> RoledScanStride {
        return RoledScanStride { role, stride: *self };
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RoledScanStride {
    pub role: ScanRole,
    pub stride: ScanStride,
}

impl RoledScanStride {

    pub fn from_strider(&self) -> Result<RepStrider> {

        match self.role {
            ScanRole::Query => RepStrider::new(self.stride.query_from_stride),
            ScanRole::Index => RepStrider::new(self.stride.index_from_stride),
        }
    }

    pub fn to_strider(&self) -> Result<RepStrider> {

        match self.role {
            ScanRole::Query => RepStrider::new(self.stride.query_to_stride),
            ScanRole::Index => RepStrider::new(self.stride.index_to_stride),
        }
    }
}
