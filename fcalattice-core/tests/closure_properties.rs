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

//! Algebraic properties of the derivation operators
//!
//! Property-based checks that both contexts form Galois connections:
//! closures are extensive and idempotent, derivation is antitone.

use fcalattice_core::{BitSet, BitVectorTable, GaloisConnection, IntervalContext};
use proptest::prelude::*;

// Random dense table, up to 70 objects so extents span two words
fn table_strategy() -> impl Strategy<Value = BitVectorTable> {
    (1usize..70, 1usize..12).prop_flat_map(|(n_objects, n_attributes)| {
        proptest::collection::vec(
            proptest::collection::vec(any::<bool>(), n_attributes),
            n_objects,
        )
        .prop_map(|rows| BitVectorTable::from_rows(&rows).unwrap())
    })
}

fn subset(universe: usize, mask: &[bool]) -> BitSet {
    let mut set = BitSet::empty(universe);
    for (i, &bit) in mask.iter().enumerate().take(universe) {
        if bit {
            set.insert(i);
        }
    }
    set
}

fn interval_strategy() -> impl Strategy<Value = IntervalContext> {
    (1usize..20, 1usize..4).prop_flat_map(|(n_objects, n_attributes)| {
        proptest::collection::vec(
            proptest::collection::vec(-5i32..5, n_attributes),
            n_objects,
        )
        .prop_map(|rows| {
            IntervalContext::from_rows(
                rows.into_iter()
                    .map(|row| row.into_iter().map(f64::from).collect())
                    .collect(),
            )
            .unwrap()
        })
    })
}

proptest! {
    #[test]
    fn test_object_closure_idempotent(
        table in table_strategy(),
        mask in proptest::collection::vec(any::<bool>(), 70),
    ) {
        let extent = subset(table.n_objects(), &mask);
        let (closed, intent) = table.close(&extent);

        prop_assert!(extent.is_subset(&closed));
        let (again, intent_again) = table.close(&closed);
        prop_assert_eq!(again, closed);
        prop_assert_eq!(intent_again, intent);
    }

    #[test]
    fn test_attribute_closure_idempotent(
        table in table_strategy(),
        mask in proptest::collection::vec(any::<bool>(), 12),
    ) {
        let attributes = subset(table.n_attributes(), &mask).to_indices();
        let closed = table.closure_of_attributes(&attributes).unwrap();

        for m in &attributes {
            prop_assert!(closed.contains(m));
        }
        prop_assert_eq!(table.closure_of_attributes(&closed).unwrap(), closed);
    }

    #[test]
    fn test_derivation_antitone(
        table in table_strategy(),
        small in proptest::collection::vec(any::<bool>(), 70),
        extra in proptest::collection::vec(any::<bool>(), 70),
    ) {
        let a1 = subset(table.n_objects(), &small);
        let a2 = a1.union(&subset(table.n_objects(), &extra));

        // A1 ⊆ A2 implies A2' ⊆ A1'
        let i1 = table.intent_of(&a1);
        let i2 = table.intent_of(&a2);
        prop_assert!(i2.is_subset(&i1));

        // and B1 ⊆ B2 implies B2' ⊆ B1'
        prop_assert!(table.extent_of(&i1).is_subset(&table.extent_of(&i2)));
    }

    #[test]
    fn test_incremental_intent_matches_recomputed(
        table in table_strategy(),
        mask in proptest::collection::vec(any::<bool>(), 70),
        g in 0usize..70,
    ) {
        let g = g % table.n_objects();
        let extent = subset(table.n_objects(), &mask);
        let intent = table.intent_of(&extent);

        let mut extended = extent.clone();
        extended.insert(g);
        prop_assert_eq!(
            table.intention_extended(&extent, &intent, g),
            table.intent_of(&extended)
        );
    }

    #[test]
    fn test_interval_closure(
        ctx in interval_strategy(),
        mask in proptest::collection::vec(any::<bool>(), 20),
    ) {
        let extent = subset(ctx.n_objects(), &mask);
        let (closed, intent) = ctx.close(&extent);

        prop_assert!(extent.is_subset(&closed));
        prop_assert_eq!(&ctx.close(&closed).0, &closed);
        prop_assert_eq!(ctx.intent_of(&closed), intent.clone());
        // the whole object set has the most general description
        let everything = BitSet::full(ctx.n_objects());
        prop_assert!(ctx.leq_intents(&ctx.intent_of(&everything), &intent));
    }
}

#[test]
fn test_transpose_swaps_derivations() {
    let table = BitVectorTable::from_incidence(4, 3, &[vec![0], vec![0, 1], vec![1, 2], vec![]]).unwrap();
    let transposed = table.clone().transpose();

    for g in 0..table.n_objects() {
        assert_eq!(
            table.intention_i(&[g]).unwrap(),
            transposed.extension_i(&[g]).unwrap()
        );
    }
}
