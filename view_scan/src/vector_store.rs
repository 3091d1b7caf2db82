use std::cmp::Ordering;
use std::mem::size_of;

use crate::keyer::Key;
use crate::store::{bucket_bytes, Bucket, ResPairStore, EMPTY_BUCKET};
use crate::view::ResPairEntry;

/// Buckets in a vector sorted by key. Lookups are binary searches and iteration is in key order,
/// which is what the query side of a scan walks.
#[derive(Debug, Clone, Default)]
pub struct SortedVectorStore<const N: usize> {
    buckets: Vec<(Key<N>, Bucket)>,
    num_entries: usize,
}

impl<const N: usize> SortedVectorStore<N> {

    pub fn new() -> Self {

        return Self {
            buckets: Vec::new(),
            num_entries: 0,
        };
    }

    /// Every non-empty bucket, in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key<N>, &Bucket)> {
        return self.buckets.iter().map(|(key, bucket)| (key, bucket));
    }

    fn search(&self, key: &Key<N>) -> std::result::Result<usize, usize> {
        return self.buckets.binary_search_by(|(probe, _)| probe.cmp(key));
    }
}

impl<const N: usize> ResPairStore<N> for SortedVectorStore<N> {

    fn add_entry(&mut self, key: &Key<N>, entry: &ResPairEntry) {

        match self.search(key) {
            Ok(position) => self.buckets[position].1.push(*entry),
            Err(position) => self.buckets.insert(position, (*key, vec![*entry])),
        }
        self.num_entries += 1;
    }

    /// Sorts the new entries and merges them in one pass instead of inserting one at a time.
    fn add_entries(&mut self, mut keyed_entries: Vec<(Key<N>, ResPairEntry)>) {

        keyed_entries.sort_by(|a, b| a.0.cmp(&b.0));
        self.num_entries += keyed_entries.len();

        let existing = std::mem::take(&mut self.buckets);
        let mut merged: Vec<(Key<N>, Bucket)> = Vec::with_capacity(existing.len() + keyed_entries.len());

        let mut existing = existing.into_iter().peekable();
        let mut incoming = keyed_entries.into_iter().peekable();

        loop {
            let take_existing = match (existing.peek(), incoming.peek()) {
                (None, None) => break,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (Some((old_key, _)), Some((new_key, _))) => old_key.cmp(new_key) != Ordering::Greater,
            };

            let next = match take_existing {
                true => existing.next(),
                false => incoming.next().map(|(key, entry)| (key, vec![entry])),
            };

            if let Some((key, bucket)) = next {
                match merged.last_mut() {
                    Some((last_key, last_bucket)) if *last_key == key => last_bucket.extend(bucket),
                    _ => merged.push((key, bucket)),
                }
            }
        }

        self.buckets = merged;
    }

    fn find_matches(&self, key: &Key<N>) -> &Bucket {

        match self.search(key) {
            Ok(position) => &self.buckets[position].1,
            Err(_) => &EMPTY_BUCKET,
        }
    }

    fn num_keys(&self) -> usize {
        return self.buckets.len();
    }

    fn num_entries(&self) -> usize {
        return self.num_entries;
    }

    fn size_estimate(&self) -> usize {

        let table = self.buckets.capacity() * size_of::<Key<N>>();
        let buckets: usize = self.buckets.iter().map(|(_, bucket)| bucket_bytes(bucket)).sum();

        return size_of::<Self>() + table + buckets;
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::store::test_support::random_keyed_entries;

    #[test]
    fn quick_iterates_in_key_order() {

        let mut rng = rand::thread_rng();
        let mut store = SortedVectorStore::<3>::new();
        for (key, entry) in random_keyed_entries(&mut rng, 300) {
            store.add_entry(&key, &entry);
        }

        let keys: Vec<Key<3>> = store.iter().map(|(key, _)| *key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(keys, sorted);
        assert!(store.iter().all(|(_, bucket)| !bucket.is_empty()));
    }

    #[test]
    fn quick_bulk_merge_matches_single_adds() {

        let mut rng = rand::thread_rng();
        let first = random_keyed_entries(&mut rng, 200);
        let second = random_keyed_entries(&mut rng, 200);

        let mut one_by_one = SortedVectorStore::<3>::new();
        for (key, entry) in first.iter().chain(second.iter()) {
            one_by_one.add_entry(key, entry);
        }

        let mut bulk = SortedVectorStore::<3>::new();
        bulk.add_entries(first);
        bulk.add_entries(second);

        assert_eq!(bulk.buckets, one_by_one.buckets);
        assert_eq!(bulk.num_entries(), one_by_one.num_entries());
    }
}
