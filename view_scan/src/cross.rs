//! Lazy enumeration of the cross product of per-part close cells.

use crate::keyer::{CloseKeyRanges, Key};

/// Odometer over the close keys of a view. The last part varies fastest, so keys come out in
/// ascending order whenever every part's cells are ascending.
///
/// Holds its own copy of the ranges: cloning it gives an independent iterator at the same point.
#[derive(Debug, Clone)]
pub struct CrossKeys<const N: usize> {
    ranges: CloseKeyRanges<N>,
    positions: [usize; N],
    remaining: usize,
}

impl<const N: usize> CrossKeys<N> {

    pub fn new(ranges: CloseKeyRanges<N>) -> Self {

        return Self {
            remaining: ranges.num_keys(),
            ranges,
            positions: [0; N],
        };
    }

    fn current(&self) -> Key<N> {
        return Key(std::array::from_fn(|i| self.ranges.0[i].nth_cell(self.positions[i])));
    }

    fn advance(&mut self) {

        for dim in (0..N).rev() {
            self.positions[dim] += 1;
            if self.positions[dim] < self.ranges.0[dim].num_cells() {
                return;
            }
            self.positions[dim] = 0;
        }
    }
}

impl<const N: usize> Iterator for CrossKeys<N> {
    type Item = Key<N>;

    fn next(&mut self) -> Option<Key<N>> {

        if self.remaining == 0 {
            return None;
        }

        let key = self.current();
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }

        return Some(key);
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return (self.remaining, Some(self.remaining));
    }
}

impl<const N: usize> ExactSizeIterator for CrossKeys<N> {}
