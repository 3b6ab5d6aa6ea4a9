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

//! Galois connection capability
//!
//! Miners and lattice builders only ever need a handful of operations from
//! a context: map an intent to its extent, map an extent to its intent,
//! compare intents, and list the projections Sofia sweeps over. Anything
//! providing them can be mined, binary table or pattern structure alike.

use std::fmt::Debug;

use crate::bitset::BitSet;
use crate::table::BitVectorTable;

/// A Galois connection between object subsets and intents.
///
/// Implementations must satisfy, for all extents `A1 ⊆ A2`:
/// `leq_intents(intent_of(A2), intent_of(A1))`, and for every extent `A`,
/// `A ⊆ extent_of(intent_of(A))` (closure is extensive, monotone and
/// idempotent).
pub trait GaloisConnection: Sync {
    /// Intent representation: an attribute `BitSet` for binary tables,
    /// an opaque pattern description otherwise
    type Intent: Clone + PartialEq + Debug + Send + Sync;

    fn n_objects(&self) -> usize;

    /// Objects described by `intent`
    fn extent_of(&self, intent: &Self::Intent) -> BitSet;

    /// The most specific intent describing every object of `extent`
    fn intent_of(&self, extent: &BitSet) -> Self::Intent;

    /// `intent_of(extent ∪ {g})` given `intent == intent_of(extent)`.
    ///
    /// The default recomputes from scratch; implementations usually
    /// narrow `intent` by object `g` alone.
    fn intention_extended(&self, extent: &BitSet, _intent: &Self::Intent, g: usize) -> Self::Intent {
        let mut extended = extent.clone();
        extended.insert(g);
        self.intent_of(&extended)
    }

    /// `a ≤ b` in the intent order: `a` is at least as general as `b`
    fn leq_intents(&self, a: &Self::Intent, b: &Self::Intent) -> bool;

    /// Object subsets a projection-based miner intersects the working set with
    fn projections(&self) -> Vec<BitSet>;

    /// Close an object set: returns `(extent_of(intent_of(A)), intent_of(A))`
    fn close(&self, extent: &BitSet) -> (BitSet, Self::Intent) {
        let intent = self.intent_of(extent);
        (self.extent_of(&intent), intent)
    }
}

impl GaloisConnection for BitVectorTable {
    type Intent = BitSet;

    fn n_objects(&self) -> usize {
        BitVectorTable::n_objects(self)
    }

    fn extent_of(&self, intent: &BitSet) -> BitSet {
        self.extension_bits(intent)
    }

    fn intent_of(&self, extent: &BitSet) -> BitSet {
        self.intention_bits(extent)
    }

    fn intention_extended(&self, _extent: &BitSet, intent: &BitSet, g: usize) -> BitSet {
        intent.intersection(&self.rows()[g])
    }

    fn leq_intents(&self, a: &BitSet, b: &BitSet) -> bool {
        a.is_subset(b)
    }

    fn projections(&self) -> Vec<BitSet> {
        self.columns().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_connection() {
        let table = BitVectorTable::from_incidence(3, 3, &[vec![0, 1], vec![1], vec![1, 2]]).unwrap();

        let extent = table.object_set(&[0, 2]).unwrap();
        let (closed, intent) = table.close(&extent);
        assert_eq!(intent.to_indices(), vec![1]);
        assert_eq!(closed.to_indices(), vec![0, 1, 2]);

        let empty = BitSet::empty(3);
        let narrowed = table.intention_extended(&empty, &table.intent_of(&empty), 2);
        assert_eq!(narrowed.to_indices(), vec![1, 2]);

        assert!(table.leq_intents(&table.attribute_set(&[1]).unwrap(), &intent));
        assert_eq!(table.projections().len(), 3);
    }
}
