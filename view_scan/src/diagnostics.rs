//! Timings, sizes and counters reported by builds and scans.

use std::time::Duration;
use serde::{Serialize, Serializer};

/// How long something took to build and roughly how many bytes it holds.
pub type DurnAndSize = (Duration, usize);

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// What happened while acting on the matches of one query bucket.
///
/// `comparisons` and `rep_matches` count sampled pairs checked straight from the buckets;
/// `neighbour_comparisons` counts the follow-up checks between the neighbours of matching
/// pairs, and `matches` the pairs handed to the action.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct MatchCounts {
    pub index_entries: usize,
    pub comparisons: usize,
    pub rep_matches: usize,
    pub neighbour_comparisons: usize,
    pub matches: usize,
}

#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize)]
pub struct ScanReport {
    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    pub duration: Duration,
    pub keys_probed: usize,
    pub buckets_hit: usize,
    pub comparisons: usize,
    pub rep_matches: usize,
    pub neighbour_comparisons: usize,
    pub matches: usize,
}

impl ScanReport {

    pub fn record(&mut self, counts: &MatchCounts) {

        self.keys_probed += 1;
        if counts.index_entries > 0 {
            self.buckets_hit += 1;
        }
        self.comparisons += counts.comparisons;
        self.rep_matches += counts.rep_matches;
        self.neighbour_comparisons += counts.neighbour_comparisons;
        self.matches += counts.matches;
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct BuildReport {
    pub num_structures: usize,
    pub num_entries: usize,
    pub num_keys: usize,
    #[serde(serialize_with = "serialize_secs")]
    pub structures_secs: Duration,
    pub structures_bytes: usize,
    #[serde(serialize_with = "serialize_secs")]
    pub store_secs: Duration,
    pub store_bytes: usize,
}

impl BuildReport {

    pub fn new(num_structures: usize, num_entries: usize, num_keys: usize, structures: DurnAndSize, store: DurnAndSize) -> Self {

        return Self {
            num_structures,
            num_entries,
            num_keys,
            structures_secs: structures.0,
            structures_bytes: structures.1,
            store_secs: store.0,
            store_bytes: store.1,
        };
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn quick_scan_report_counts() {

        let mut report = ScanReport::default();
        report.record(&MatchCounts::default());
        report.record(&MatchCounts { index_entries: 4, comparisons: 8, rep_matches: 2, neighbour_comparisons: 6, matches: 3 });

        assert_eq!(report.keys_probed, 2);
        assert_eq!(report.buckets_hit, 1);
        assert_eq!(report.comparisons, 8);
        assert_eq!(report.rep_matches, 2);
        assert_eq!(report.neighbour_comparisons, 6);
        assert_eq!(report.matches, 3);
    }

    #[test]
    fn quick_reports_serialize_seconds() {

        let mut report = ScanReport::default();
        report.duration = Duration::from_millis(1500);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["duration_secs"], serde_json::json!(1.5));
        assert_eq!(json["keys_probed"], serde_json::json!(0));

        let build = BuildReport::new(2, 10, 7, (Duration::from_secs(2), 100), (Duration::from_millis(250), 900));
        let json = serde_json::to_value(&build).unwrap();
        assert_eq!(json["store_secs"], serde_json::json!(0.25));
        assert_eq!(json["structures_bytes"], serde_json::json!(100));
    }
}
