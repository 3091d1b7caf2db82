use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{abs_dot_of_angle, angle_difference};
use crate::keyer_part::KeyerPart;
use crate::view::View;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum DirectionCriterion {
    MustMatch,
    NeedNotMatch,
}

/// Tolerances that decide whether a query view and an index view match.
///
/// Built once and then only read. The frame tolerance is also kept as the smallest allowed
/// `|q1 . q2|` so the pairwise test needs no trigonometry.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct MatchCriteria {
    direction_criterion: DirectionCriterion,
    minimum_index_distance: usize,
    maximum_squared_distance: f32,
    maximum_frame_angle_difference: f32,
    maximum_phi_angle_difference: f32,
    maximum_psi_angle_difference: f32,
    minimum_frame_abs_dot: f32,
}

impl MatchCriteria {

    pub fn new(
        direction_criterion: DirectionCriterion,
        minimum_index_distance: usize,
        maximum_squared_distance: f32,
        maximum_frame_angle_difference: f32,
        maximum_phi_angle_difference: f32,
        maximum_psi_angle_difference: f32,
    ) -> Result<Self> {

        for (name, value) in [
            ("maximum_squared_distance", maximum_squared_distance),
            ("maximum_frame_angle_difference", maximum_frame_angle_difference),
            ("maximum_phi_angle_difference", maximum_phi_angle_difference),
            ("maximum_psi_angle_difference", maximum_psi_angle_difference),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!("{} must be a non-negative number, got {}", name, value)));
            }
        }

        return Ok(Self {
            direction_criterion,
            minimum_index_distance,
            maximum_squared_distance,
            maximum_frame_angle_difference,
            maximum_phi_angle_difference,
            maximum_psi_angle_difference,
            minimum_frame_abs_dot: abs_dot_of_angle(maximum_frame_angle_difference),
        });
    }

    pub fn direction_criterion(&self) -> DirectionCriterion {
        return self.direction_criterion;
    }

    pub fn minimum_index_distance(&self) -> usize {
        return self.minimum_index_distance;
    }

    pub fn maximum_squared_distance(&self) -> f32 {
        return self.maximum_squared_distance;
    }

    pub fn maximum_distance(&self) -> f32 {
        return self.maximum_squared_distance.sqrt();
    }

    pub fn maximum_frame_angle_difference(&self) -> f32 {
        return self.maximum_frame_angle_difference;
    }

    pub fn maximum_phi_angle_difference(&self) -> f32 {
        return self.maximum_phi_angle_difference;
    }

    pub fn maximum_psi_angle_difference(&self) -> f32 {
        return self.maximum_psi_angle_difference;
    }

    /// How far a keyer part has to look either side of a value so that no match is missed.
    pub fn radius_for<P: KeyerPart>(&self, part: &P) -> P::Radius {
        return part.search_radius(self);
    }

    /// Whether a single residue pair is worth storing at all.
    pub fn are_not_violated_by(&self, from_index: usize, to_index: usize) -> bool {

        return from_index != to_index && from_index.abs_diff(to_index) >= self.minimum_index_distance;
    }

    pub fn are_met_by(&self, a: &View, b: &View) -> bool {

        if a.view_vector.squared_distance(&b.view_vector) > self.maximum_squared_distance {
            return false;
        }

        if a.frame.dot(&b.frame).abs() < self.minimum_frame_abs_dot {
            return false;
        }

        if angle_difference(a.from_phi, b.from_phi) > self.maximum_phi_angle_difference
            || angle_difference(a.to_phi, b.to_phi) > self.maximum_phi_angle_difference {
            return false;
        }

        if angle_difference(a.from_psi, b.from_psi) > self.maximum_psi_angle_difference
            || angle_difference(a.to_psi, b.to_psi) > self.maximum_psi_angle_difference {
            return false;
        }

        match self.direction_criterion {
            DirectionCriterion::MustMatch => a.direction == b.direction,
            DirectionCriterion::NeedNotMatch => true,
        }
    }

    pub fn config(&self) -> MatchCriteriaConfig {

        return MatchCriteriaConfig {
            require_matching_directions: self.direction_criterion == DirectionCriterion::MustMatch,
            minimum_index_distance: self.minimum_index_distance,
            maximum_squared_distance: self.maximum_squared_distance,
            maximum_frame_angle_difference: self.maximum_frame_angle_difference,
            maximum_phi_angle_difference: self.maximum_phi_angle_difference,
            maximum_psi_angle_difference: self.maximum_psi_angle_difference,
        };
    }
}

/// Parses the compact form
/// `dist_co=12,dirn_co=0,index_dist_co=-11,frame_ang_co=22.5,phi_ang_co=22.5,psi_ang_co=22.5`.
///
/// Spaces are ignored and the `_co` suffixes are optional. `dist` is the maximum squared
/// distance, a non-zero `dirn` requires matching directions and `index_dist` is the negated
/// minimum index distance. All six values are required.
impl FromStr for MatchCriteria {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {

        let stripped: String = s.chars().filter(|c| *c != ' ').collect();

        let mut values: HashMap<String, f64> = HashMap::new();
        for part in stripped.split(',') {
            let halves: Vec<&str> = part.split('=').collect();
            if halves.len() != 2 {
                return Err(Error::Config(format!("criteria part '{}' is not of the form name=value", part)));
            }
            let name = halves[0].strip_suffix("_co").unwrap_or(halves[0]);
            let value: f64 = halves[1].parse()
                .map_err(|_| Error::Config(format!("criteria value '{}' for {} is not a number", halves[1], name)))?;
            values.insert(name.to_string(), value);
        }

        let get = |name: &str| -> Result<f64> {
            values.get(name).copied().ok_or_else(|| Error::Config(format!("criteria string is missing {}", name)))
        };

        let index_dist = -get("index_dist")?;
        if index_dist < 0.0 || index_dist.fract() != 0.0 {
            return Err(Error::Config(format!("index_dist must be a non-positive integer, got {}", -index_dist)));
        }

        let direction_criterion = match get("dirn")? != 0.0 {
            true => DirectionCriterion::MustMatch,
            false => DirectionCriterion::NeedNotMatch,
        };

        return MatchCriteria::new(
            direction_criterion,
            index_dist as usize,
            get("dist")? as f32,
            get("frame_ang")? as f32,
            get("phi_ang")? as f32,
            get("psi_ang")? as f32,
        );
    }
}

impl fmt::Display for MatchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {

        write!(
            f,
            "match_criteria[require_matching_directions:{}, minimum_index_distance:{}, maximum_squared_distance:{}, maximum_frame_angle_difference:{}, maximum_phi_angle_difference:{}, maximum_psi_angle_difference:{}]",
            self.direction_criterion == DirectionCriterion::MustMatch,
            self.minimum_index_distance,
            self.maximum_squared_distance,
            self.maximum_frame_angle_difference,
            self.maximum_phi_angle_difference,
            self.maximum_psi_angle_difference,
        )
    }
}

/// The serialisable form of `MatchCriteria`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct MatchCriteriaConfig {
    pub require_matching_directions: bool,
    pub minimum_index_distance: usize,
    pub maximum_squared_distance: f32,
    pub maximum_frame_angle_difference: f32,
    pub maximum_phi_angle_difference: f32,
    pub maximum_psi_angle_difference: f32,
}

impl MatchCriteriaConfig {

    pub fn build(&self) -> Result<MatchCriteria> {

        let direction_criterion = match self.require_matching_directions {
            true => DirectionCriterion::MustMatch,
            false => DirectionCriterion::NeedNotMatch,
        };

        return MatchCriteria::new(
            direction_criterion,
            self.minimum_index_distance,
            self.maximum_squared_distance,
            self.maximum_frame_angle_difference,
            self.maximum_phi_angle_difference,
            self.maximum_psi_angle_difference,
        );
    }
}
