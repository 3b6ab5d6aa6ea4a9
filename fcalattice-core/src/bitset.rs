// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Fixed-universe bit sets
//!
//! Extents, intents and incidence columns are all subsets of a fixed,
//! indexed universe (objects or attributes). `BitSet` packs them into
//! `u64` words so that the Galois operators reduce to word-wise AND plus
//! popcount.
//!
//! **Invariant:** bits past the universe size are always zero. Every
//! constructor and mutator preserves it, which is what makes the word-wise
//! subset test and equality exact.

use bitvec::prelude::*;
use std::cmp::Ordering;
use std::fmt;

use crate::error::{Axis, LatticeError, Result};

const WORD_BITS: usize = u64::BITS as usize;

/// A subset of `{0, .., universe - 1}`
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    bits: BitVec<u64, Lsb0>,
}

impl BitSet {
    /// The empty subset of a universe of `universe` elements
    pub fn empty(universe: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, universe),
        }
    }

    /// The whole universe
    pub fn full(universe: usize) -> Self {
        let mut set = Self::empty(universe);
        // fill() only touches live bits, so the tail of the last word stays zero
        set.bits.fill(true);
        set
    }

    /// Build a set from element indices, rejecting indices outside the universe
    pub fn from_indices<I>(universe: usize, indices: I, axis: Axis) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut set = Self::empty(universe);
        for index in indices {
            if index >= universe {
                return Err(LatticeError::IndexOutOfRange {
                    axis,
                    index,
                    len: universe,
                });
            }
            set.bits.set(index, true);
        }
        Ok(set)
    }

    /// Size of the universe this set lives in
    pub fn universe(&self) -> usize {
        self.bits.len()
    }

    /// Number of elements in the set (popcount)
    pub fn count(&self) -> usize {
        self.words().iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words().iter().all(|&w| w == 0)
    }

    pub fn is_full(&self) -> bool {
        self.count() == self.universe()
    }

    /// Membership test; indices outside the universe are never members
    pub fn contains(&self, index: usize) -> bool {
        self.bits.get(index).map(|bit| *bit).unwrap_or(false)
    }

    /// Add an element.
    ///
    /// # Panics
    /// If `index` is outside the universe.
    pub fn insert(&mut self, index: usize) {
        self.bits.set(index, true);
    }

    /// Remove an element.
    ///
    /// # Panics
    /// If `index` is outside the universe.
    pub fn remove(&mut self, index: usize) {
        self.bits.set(index, false);
    }

    /// Iterate over member indices in ascending order
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    pub fn to_indices(&self) -> Vec<usize> {
        self.iter_ones().collect()
    }

    pub fn intersect_with(&mut self, other: &BitSet) {
        debug_assert_eq!(self.universe(), other.universe());
        for (a, b) in self.words_mut().iter_mut().zip(other.words()) {
            *a &= *b;
        }
    }

    pub fn union_with(&mut self, other: &BitSet) {
        debug_assert_eq!(self.universe(), other.universe());
        for (a, b) in self.words_mut().iter_mut().zip(other.words()) {
            *a |= *b;
        }
    }

    /// Remove every member of `other` from `self`
    pub fn difference_with(&mut self, other: &BitSet) {
        debug_assert_eq!(self.universe(), other.universe());
        for (a, b) in self.words_mut().iter_mut().zip(other.words()) {
            *a &= !*b;
        }
    }

    pub fn intersection(&self, other: &BitSet) -> BitSet {
        let mut out = self.clone();
        out.intersect_with(other);
        out
    }

    pub fn union(&self, other: &BitSet) -> BitSet {
        let mut out = self.clone();
        out.union_with(other);
        out
    }

    /// `|self ∩ other|` without allocating
    pub fn intersection_count(&self, other: &BitSet) -> usize {
        self.words()
            .iter()
            .zip(other.words())
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// `self ⊆ other`
    pub fn is_subset(&self, other: &BitSet) -> bool {
        debug_assert_eq!(self.universe(), other.universe());
        self.words()
            .iter()
            .zip(other.words())
            .all(|(a, b)| a & !b == 0)
    }

    /// `self ⊊ other`
    pub fn is_strict_subset(&self, other: &BitSet) -> bool {
        self.is_subset(other) && self != other
    }

    /// True when both sets contain exactly the same elements below `bound`.
    ///
    /// This is the canonicity test of Close-by-One: a closure reached by
    /// adding element `g` is canonical iff it agrees with its generator on
    /// every element smaller than `g`.
    pub fn agrees_below(&self, other: &BitSet, bound: usize) -> bool {
        let bound = bound.min(self.universe());
        let full_words = bound / WORD_BITS;
        let rest = bound % WORD_BITS;

        let (a, b) = (self.words(), other.words());
        if a[..full_words] != b[..full_words] {
            return false;
        }
        if rest == 0 {
            return true;
        }
        let mask = (1u64 << rest) - 1;
        (a[full_words] ^ b[full_words]) & mask == 0
    }

    /// Compare the sorted index lists of two sets
    pub fn cmp_lexicographic(&self, other: &BitSet) -> Ordering {
        self.iter_ones().cmp(other.iter_ones())
    }

    fn words(&self) -> &[u64] {
        self.bits.as_raw_slice()
    }

    fn words_mut(&mut self) -> &mut [u64] {
        self.bits.as_raw_mut_slice()
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter_ones()).finish()
    }
}
