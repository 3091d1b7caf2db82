use std::mem::size_of;

use crate::criteria::MatchCriteria;
use crate::error::{Error, Result};
use crate::keyer::{Key, Keyer};
use crate::store::{bucket_bytes, Bucket, ResPairStore, EMPTY_BUCKET};
use crate::store_builder::{populate_store, Sod};
use crate::view::ResPairEntry;

/// One bucket for every key in the box `[min_key, max_key]`, laid out with the last part
/// varying fastest. Lookups are pure arithmetic; memory grows with the volume of the box.
#[derive(Debug, Clone)]
pub struct LatticeStore<const N: usize> {
    min_key: Key<N>,
    max_key: Key<N>,
    dims: [usize; N],
    buckets: Vec<Bucket>,
    num_keys: usize,
    num_entries: usize,
}

impl<const N: usize> LatticeStore<N> {

    pub fn new(min_key: Key<N>, max_key: Key<N>) -> Result<Self> {

        let mut dims = [0usize; N];
        let mut num_cells: usize = 1;
        for part in 0..N {
            if min_key.0[part] > max_key.0[part] {
                return Err(Error::Config(format!("lattice bounds {:?} and {:?} are the wrong way round", min_key, max_key)));
            }
            dims[part] = (max_key.0[part] as i32 - min_key.0[part] as i32 + 1) as usize;
            num_cells = num_cells.checked_mul(dims[part])
                .ok_or_else(|| Error::Config(format!("lattice between {:?} and {:?} is too large", min_key, max_key)))?;
        }

        let mut buckets = Vec::new();
        buckets.resize_with(num_cells, Bucket::new);

        return Ok(Self {
            min_key,
            max_key,
            dims,
            buckets,
            num_keys: 0,
            num_entries: 0,
        });
    }

    /// Sizes the lattice to the keys the entries will be stored under and stores them.
    pub fn for_entries(entries: &[ResPairEntry], keyer: &Keyer<N>, criteria: &MatchCriteria, sod: Sod) -> Result<Self> {

        let mut bounds: Option<(Key<N>, Key<N>)> = None;
        for entry in entries.iter() {
            let (low, high) = match sod {
                Sod::Sparse => {
                    let key = keyer.make_key(&entry.view);
                    (key, key)
                },
                Sod::Dense => (keyer.make_min_close_key(&entry.view, criteria), keyer.make_max_close_key(&entry.view, criteria)),
            };
            bounds = Some(match bounds {
                None => (low, high),
                Some((min_key, max_key)) => (
                    Key(std::array::from_fn(|i| min_key.0[i].min(low.0[i]))),
                    Key(std::array::from_fn(|i| max_key.0[i].max(high.0[i]))),
                ),
            });
        }

        let (min_key, max_key) = bounds
            .ok_or_else(|| Error::InvalidUsage("cannot size a lattice store from no entries".to_string()))?;

        let mut store = Self::new(min_key, max_key)?;
        populate_store(&mut store, entries, keyer, criteria, sod);

        return Ok(store);
    }

    pub fn min_key(&self) -> &Key<N> {
        return &self.min_key;
    }

    pub fn max_key(&self) -> &Key<N> {
        return &self.max_key;
    }

    /// Whether `key` lies inside the lattice at all.
    pub fn has_matches(&self, key: &Key<N>) -> bool {

        return (0..N).all(|part| self.min_key.0[part] <= key.0[part] && key.0[part] <= self.max_key.0[part]);
    }

    fn offset(&self, key: &Key<N>) -> usize {

        let mut offset = 0;
        for part in 0..N {
            offset = offset * self.dims[part] + (key.0[part] as i32 - self.min_key.0[part] as i32) as usize;
        }
        return offset;
    }
}

impl<const N: usize> ResPairStore<N> for LatticeStore<N> {

    /// Panics if `key` is outside the lattice.
    fn add_entry(&mut self, key: &Key<N>, entry: &ResPairEntry) {

        assert!(self.has_matches(key), "key {:?} outside lattice {:?} to {:?}", key, self.min_key, self.max_key);

        let offset = self.offset(key);
        let bucket = &mut self.buckets[offset];
        if bucket.is_empty() {
            self.num_keys += 1;
        }
        bucket.push(*entry);
        self.num_entries += 1;
    }

    fn find_matches(&self, key: &Key<N>) -> &Bucket {

        match self.has_matches(key) {
            true => &self.buckets[self.offset(key)],
            false => &EMPTY_BUCKET,
        }
    }

    fn num_keys(&self) -> usize {
        return self.num_keys;
    }

    fn num_entries(&self) -> usize {
        return self.num_entries;
    }

    fn size_estimate(&self) -> usize {

        let buckets: usize = self.buckets.iter().map(bucket_bytes).sum();
        return size_of::<Self>() + buckets;
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::criteria::DirectionCriterion;
    use crate::hash_store::HashStore;
    use crate::keyer::{KeyerConfig, STANDARD_KEY_PARTS};
    use crate::view::View;

    #[test]
    fn quick_bounds() {

        let store = LatticeStore::new(Key([-1, 2]), Key([1, 4])).unwrap();
        assert_eq!(store.buckets.len(), 9);
        assert!(store.has_matches(&Key([0, 3])));
        assert!(!store.has_matches(&Key([2, 3])));
        assert!(!store.has_matches(&Key([0, 1])));
        assert!(store.find_matches(&Key([5, 5])).is_empty());

        assert!(LatticeStore::new(Key([1, 2]), Key([0, 4])).is_err());
        assert!(LatticeStore::new(Key([i16::MIN; 8]), Key([i16::MAX; 8])).is_err());
    }

    #[test]
    #[should_panic]
    fn quick_add_outside_panics() {

        let mut rng = rand::thread_rng();
        let mut store = LatticeStore::new(Key([0, 0]), Key([1, 1])).unwrap();
        let entry = ResPairEntry::new(0, 0, 1, View::random(&mut rng, 1.0));
        store.add_entry(&Key([2, 0]), &entry);
    }

    #[test]
    fn quick_for_entries_agrees_with_hash_store() {

        let mut rng = rand::thread_rng();
        let keyer = Keyer::standard(&KeyerConfig { angle_cell_width: 90.0, angle_start_offset: 0.0, axis_cell_width: 5.0 }).unwrap();
        let criteria = MatchCriteria::new(DirectionCriterion::MustMatch, 0, 4.0, 30.0, 10.0, 10.0).unwrap();

        let entries: Vec<ResPairEntry> = (0..40)
            .map(|i| ResPairEntry::new(0, i, i + 1, View::random(&mut rng, 8.0)))
            .collect();

        for sod in [Sod::Sparse, Sod::Dense] {
            let lattice = LatticeStore::<STANDARD_KEY_PARTS>::for_entries(&entries, &keyer, &criteria, sod).unwrap();
            let mut hash_store = HashStore::<STANDARD_KEY_PARTS>::with_capacity(1024);
            populate_store(&mut hash_store, &entries, &keyer, &criteria, sod);

            assert_eq!(lattice.num_entries(), hash_store.num_entries());
            assert_eq!(lattice.num_keys(), hash_store.num_keys());
            for key in hash_store.keys() {
                assert!(lattice.has_matches(&key));
                assert_eq!(lattice.find_matches(&key), hash_store.find_matches(&key));
            }
        }

        assert!(LatticeStore::<STANDARD_KEY_PARTS>::for_entries(&[], &keyer, &criteria, Sod::Sparse).is_err());
    }
}
