use std::collections::HashMap;
use std::mem::size_of;

use crate::keyer::Key;
use crate::layout::PackedKey;
use crate::store::{bucket_bytes, Bucket, ResPairStore, EMPTY_BUCKET};
use crate::view::ResPairEntry;

/// Hash map from packed keys to buckets, reserved up front. Used on the index side, where
/// dense insertion makes for many keys and only exact probes are needed.
#[derive(Debug, Clone)]
pub struct HashStore<const N: usize> {
    buckets: HashMap<PackedKey, Bucket>,
    num_entries: usize,
}

impl<const N: usize> HashStore<N> {

    pub fn with_capacity(capacity: usize) -> Self {

        return Self {
            buckets: HashMap::with_capacity(capacity),
            num_entries: 0,
        };
    }

    /// Keys in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = Key<N>> + '_ {
        return self.buckets.keys().map(|packed| Key::unpack(*packed));
    }
}

impl<const N: usize> ResPairStore<N> for HashStore<N> {

    fn add_entry(&mut self, key: &Key<N>, entry: &ResPairEntry) {

        self.buckets.entry(key.pack()).or_default().push(*entry);
        self.num_entries += 1;
    }

    fn find_matches(&self, key: &Key<N>) -> &Bucket {
        return self.buckets.get(&key.pack()).unwrap_or(&EMPTY_BUCKET);
    }

    fn num_keys(&self) -> usize {
        return self.buckets.len();
    }

    fn num_entries(&self) -> usize {
        return self.num_entries;
    }

    fn size_estimate(&self) -> usize {

        // one control byte per slot on top of the key and bucket header
        let table = self.buckets.capacity() * (size_of::<PackedKey>() + 1);
        let buckets: usize = self.buckets.values().map(bucket_bytes).sum();

        return size_of::<Self>() + table + buckets;
    }
}
