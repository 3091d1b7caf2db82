//! Putting a structure's entries into a store, either under their exact keys or under every key
//! a matching view could have.

use crate::criteria::MatchCriteria;
use crate::keyer::{Key, Keyer};
use crate::store::ResPairStore;
use crate::view::ResPairEntry;

/// Sparse: each entry under its own key only. Dense: each entry under every close key.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Sod {
    Sparse,
    Dense,
}

/// Returns the number of (key, entry) insertions made.
pub fn add_entry_to_store<const N: usize, S: ResPairStore<N>>(
    store: &mut S,
    entry: &ResPairEntry,
    keyer: &Keyer<N>,
    criteria: &MatchCriteria,
    sod: Sod,
) -> usize {

    match sod {
        Sod::Sparse => {
            store.add_entry(&keyer.make_key(&entry.view), entry);
            return 1;
        },
        Sod::Dense => {
            let mut count = 0;
            for key in keyer.make_close_keys(&entry.view, criteria).cross() {
                store.add_entry(&key, entry);
                count += 1;
            }
            return count;
        },
    }
}

/// Returns the number of (key, entry) insertions made.
///
/// Panics if `store` is bounded and a key falls outside it; dense insertion reaches past the
/// entries' own keys, so a bounded store must be sized for the same `Sod`.
pub fn populate_store<const N: usize, S: ResPairStore<N>>(
    store: &mut S,
    entries: &[ResPairEntry],
    keyer: &Keyer<N>,
    criteria: &MatchCriteria,
    sod: Sod,
) -> usize {

    match sod {
        Sod::Sparse => {
            let keyed: Vec<(Key<N>, ResPairEntry)> = entries.iter()
                .map(|entry| (keyer.make_key(&entry.view), *entry))
                .collect();
            let count = keyed.len();
            store.add_entries(keyed);
            return count;
        },
        Sod::Dense => {
            return entries.iter()
                .map(|entry| add_entry_to_store(store, entry, keyer, criteria, sod))
                .sum();
        },
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::criteria::DirectionCriterion;
    use crate::hash_store::HashStore;
    use crate::keyer::{KeyerConfig, STANDARD_KEY_PARTS};
    use crate::lattice_store::LatticeStore;
    use crate::vector_store::SortedVectorStore;
    use crate::geometry::{wrap_degrees, Coord};
    use crate::view::View;
    use rand::Rng;

    fn keyer() -> Keyer<STANDARD_KEY_PARTS> {
        return Keyer::standard(&KeyerConfig { angle_cell_width: 20.0, angle_start_offset: 0.0, axis_cell_width: 3.0 }).unwrap();
    }

    #[test]
    fn quick_dense_counts_close_keys() {

        let mut rng = rand::thread_rng();
        let keyer = keyer();
        let criteria = MatchCriteria::new(DirectionCriterion::NeedNotMatch, 0, 9.0, 30.0, 15.0, 15.0).unwrap();
        let entry = ResPairEntry::new(0, 0, 5, View::random(&mut rng, 10.0));

        let mut store = HashStore::<STANDARD_KEY_PARTS>::with_capacity(1024);
        let count = add_entry_to_store(&mut store, &entry, &keyer, &criteria, Sod::Dense);

        assert_eq!(count, keyer.make_close_keys(&entry.view, &criteria).num_keys());
        assert_eq!(store.num_keys(), count);
        for key in keyer.make_close_keys(&entry.view, &criteria).cross() {
            assert_eq!(store.find_matches(&key), &vec![entry]);
        }
    }

    #[test]
    #[should_panic]
    fn quick_dense_into_sparse_sized_lattice_panics() {

        let mut rng = rand::thread_rng();
        let keyer = keyer();
        let criteria = MatchCriteria::new(DirectionCriterion::NeedNotMatch, 0, 9.0, 30.0, 15.0, 15.0).unwrap();
        let entries = vec![ResPairEntry::new(0, 0, 5, View::random(&mut rng, 10.0))];

        let mut lattice = LatticeStore::<STANDARD_KEY_PARTS>::for_entries(&entries, &keyer, &criteria, Sod::Sparse).unwrap();
        populate_store(&mut lattice, &entries, &keyer, &criteria, Sod::Dense);
    }

    fn jittered<R: Rng>(rng: &mut R, view: &View) -> View {

        let mut angle = |a: f32| wrap_degrees(a + rng.gen_range(-25.0..25.0));
        let mut jittered = *view;
        jittered.from_phi = angle(view.from_phi);
        jittered.from_psi = angle(view.from_psi);
        jittered.to_phi = angle(view.to_phi);
        jittered.to_psi = angle(view.to_psi);
        jittered.view_vector = view.view_vector + Coord::random_in_cube(rng, 2.0);

        return jittered;
    }

    #[test]
    fn slow_dense_has_no_false_negatives() {

        let mut rng = rand::thread_rng();
        let keyer = keyer();
        let criteria = MatchCriteria::new(DirectionCriterion::MustMatch, 0, 9.0, 180.0, 20.0, 20.0).unwrap();

        let index_entries: Vec<ResPairEntry> = (0..100)
            .map(|i| ResPairEntry::new(1, i, i + 1, View::random(&mut rng, 6.0)))
            .collect();
        let query_entries: Vec<ResPairEntry> = index_entries.iter()
            .map(|entry| ResPairEntry::new(0, entry.from_index, entry.to_index, jittered(&mut rng, &entry.view)))
            .collect();

        let mut index_store = HashStore::<STANDARD_KEY_PARTS>::with_capacity(1 << 12);
        populate_store(&mut index_store, &index_entries, &keyer, &criteria, Sod::Dense);

        let mut query_store = SortedVectorStore::<STANDARD_KEY_PARTS>::new();
        populate_store(&mut query_store, &query_entries, &keyer, &criteria, Sod::Sparse);

        let mut found = 0;
        let mut brute_force = 0;
        for (key, bucket) in query_store.iter() {
            for query in bucket.iter() {
                assert_eq!(keyer.make_key(&query.view), *key);
                found += index_store.find_matches(key).iter()
                    .filter(|entry| criteria.are_met_by(&query.view, &entry.view))
                    .count();
                brute_force += index_entries.iter()
                    .filter(|entry| criteria.are_met_by(&query.view, &entry.view))
                    .count();
            }
        }

        assert!(brute_force > 0);
        assert_eq!(found, brute_force);
        assert_eq!(query_store.num_entries(), query_entries.len());
    }
}
