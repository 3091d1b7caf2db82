//! Key to bucket storage shared by both sides of a scan.
//!
//! Each store implementation trades memory against lookup speed differently; all of them return
//! the same shared empty bucket when a key has no entries, so lookups never allocate.

use std::mem::size_of;

use crate::keyer::Key;
use crate::view::ResPairEntry;

/// Entries stored under one key, in insertion order. Never empty once a store has created it.
pub type Bucket = Vec<ResPairEntry>;

/// Returned for every key a store holds nothing under.
pub static EMPTY_BUCKET: Bucket = Vec::new();

/// A map from keys to buckets of entries.
///
/// Stores either take any key (`HashStore`, `SortedVectorStore`) or are bounded to a box of keys
/// fixed when they are made (`LatticeStore`). Adding under a key outside a bounded store's box
/// panics, so whatever fills one, `populate_store` included, must only produce keys inside it.
pub trait ResPairStore<const N: usize> {

    /// Appends `entry` to the bucket under `key`, creating the bucket if needed.
    ///
    /// Panics if the store is bounded and `key` is outside its box.
    fn add_entry(&mut self, key: &Key<N>, entry: &ResPairEntry);

    /// Adds many keyed entries; entries sharing a key keep their order. Panics as `add_entry`
    /// does.
    fn add_entries(&mut self, keyed_entries: Vec<(Key<N>, ResPairEntry)>) {

        for (key, entry) in keyed_entries.iter() {
            self.add_entry(key, entry);
        }
    }

    /// The bucket under `key`, or `EMPTY_BUCKET`. Calling this never changes the store.
    fn find_matches(&self, key: &Key<N>) -> &Bucket;

    /// Number of non-empty buckets.
    fn num_keys(&self) -> usize;

    /// Number of stored entries, counting an entry once per key it is stored under.
    fn num_entries(&self) -> usize;

    /// Approximate heap and inline bytes held.
    fn size_estimate(&self) -> usize;
}

pub fn bucket_bytes(bucket: &Bucket) -> usize {
    return size_of::<Bucket>() + bucket.capacity() * size_of::<ResPairEntry>();
}


#[cfg(test)]
mod tests {

    use super::*;
    use std::collections::HashMap;
    use crate::hash_store::HashStore;
    use crate::lattice_store::LatticeStore;
    use crate::vector_store::SortedVectorStore;
    use super::test_support::random_keyed_entries;

    fn all_keys() -> Vec<Key<3>> {

        let mut keys = Vec::new();
        for a in -3..4 {
            for b in -1..5 {
                for c in -2..2 {
                    keys.push(Key([a, b, c]));
                }
            }
        }
        return keys;
    }

    #[test]
    fn quick_stores_are_equivalent() {

        let mut rng = rand::thread_rng();
        let keyed = random_keyed_entries(&mut rng, 500);

        let mut hash_store = HashStore::<3>::with_capacity(16);
        let mut vector_store = SortedVectorStore::<3>::new();
        let mut lattice_store = LatticeStore::new(Key([-2, 0, -1]), Key([2, 3, 0])).unwrap();

        let mut expected: HashMap<Key<3>, Vec<ResPairEntry>> = HashMap::new();
        for (key, entry) in keyed.iter() {
            hash_store.add_entry(key, entry);
            lattice_store.add_entry(key, entry);
            expected.entry(*key).or_default().push(*entry);
        }
        vector_store.add_entries(keyed.clone());

        for key in all_keys() {
            let want = expected.get(&key).cloned().unwrap_or_default();
            assert_eq!(hash_store.find_matches(&key), &want);
            assert_eq!(vector_store.find_matches(&key), &want);
            assert_eq!(lattice_store.find_matches(&key), &want);
        }

        assert_eq!(hash_store.num_keys(), expected.len());
        assert_eq!(vector_store.num_keys(), expected.len());
        assert_eq!(lattice_store.num_keys(), expected.len());
        assert_eq!(hash_store.num_entries(), 500);
        assert_eq!(vector_store.num_entries(), 500);
        assert_eq!(lattice_store.num_entries(), 500);
    }

    #[test]
    fn quick_find_matches_is_idempotent() {

        let mut rng = rand::thread_rng();
        let keyed = random_keyed_entries(&mut rng, 100);

        let mut hash_store = HashStore::<3>::with_capacity(16);
        let mut vector_store = SortedVectorStore::<3>::new();
        let mut lattice_store = LatticeStore::new(Key([-2, 0, -1]), Key([2, 3, 0])).unwrap();
        for (key, entry) in keyed.iter() {
            hash_store.add_entry(key, entry);
            vector_store.add_entry(key, entry);
            lattice_store.add_entry(key, entry);
        }

        let hash_state = (hash_store.num_keys(), hash_store.num_entries(), hash_store.size_estimate());
        let vector_state = (vector_store.num_keys(), vector_store.num_entries(), vector_store.size_estimate());
        let lattice_state = (lattice_store.num_keys(), lattice_store.num_entries(), lattice_store.size_estimate());

        // every key twice, including ones nothing was stored under
        for key in all_keys() {
            let first = hash_store.find_matches(&key).clone();
            assert_eq!(hash_store.find_matches(&key), &first);
            let first = vector_store.find_matches(&key).clone();
            assert_eq!(vector_store.find_matches(&key), &first);
            let first = lattice_store.find_matches(&key).clone();
            assert_eq!(lattice_store.find_matches(&key), &first);
        }

        assert_eq!((hash_store.num_keys(), hash_store.num_entries(), hash_store.size_estimate()), hash_state);
        assert_eq!((vector_store.num_keys(), vector_store.num_entries(), vector_store.size_estimate()), vector_state);
        assert_eq!((lattice_store.num_keys(), lattice_store.num_entries(), lattice_store.size_estimate()), lattice_state);
        assert_eq!(hash_store.num_entries(), 100);
        assert!(hash_store.num_keys() < all_keys().len());
    }

    #[test]
    fn quick_missing_key_gives_shared_empty_bucket() {

        let hash_store = HashStore::<3>::with_capacity(16);
        let vector_store = SortedVectorStore::<3>::new();

        let key = Key([100, 100, 100]);
        assert!(std::ptr::eq(hash_store.find_matches(&key), &EMPTY_BUCKET));
        assert!(std::ptr::eq(vector_store.find_matches(&key), &EMPTY_BUCKET));
    }
}
