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

//! Formal and pattern concepts
//!
//! A concept is a closed pair: its intent describes exactly its extent and
//! its extent is exactly what its intent describes. Within one context the
//! extent determines the concept, so equality, hashing and the concept
//! order all go through the extent.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::bitset::BitSet;
use crate::closure::GaloisConnection;
use crate::error::{LatticeError, Result};

/// Closed (extent, intent) pair with user-attached measures
#[derive(Debug, Clone)]
pub struct Concept<I = BitSet> {
    extent: BitSet,
    intent: I,
    measures: BTreeMap<String, f64>,
}

impl<I> Concept<I> {
    /// Pair an extent with its intent. Closure is not checked; see
    /// [`validate`](Self::validate).
    pub fn new(extent: BitSet, intent: I) -> Self {
        Self {
            extent,
            intent,
            measures: BTreeMap::new(),
        }
    }

    /// Close `extent` in `context` and build the resulting concept
    pub fn from_extent<C>(context: &C, extent: &BitSet) -> Self
    where
        C: GaloisConnection<Intent = I>,
    {
        let (extent, intent) = context.close(extent);
        Self::new(extent, intent)
    }

    pub fn extent(&self) -> &BitSet {
        &self.extent
    }

    pub fn intent(&self) -> &I {
        &self.intent
    }

    /// Number of objects in the extent
    pub fn support(&self) -> usize {
        self.extent.count()
    }

    pub fn extent_i(&self) -> Vec<usize> {
        self.extent.to_indices()
    }

    /// Split into extent and intent, dropping measures
    pub fn into_parts(self) -> (BitSet, I) {
        (self.extent, self.intent)
    }

    pub fn measures(&self) -> &BTreeMap<String, f64> {
        &self.measures
    }

    pub fn measure(&self, name: &str) -> Option<f64> {
        self.measures.get(name).copied()
    }

    pub fn set_measure(&mut self, name: impl Into<String>, value: f64) {
        self.measures.insert(name.into(), value);
    }

    /// Concept order: `self ≤ other` iff `self.extent ⊆ other.extent`
    pub fn is_subconcept_of(&self, other: &Concept<I>) -> bool {
        self.extent.is_subset(&other.extent)
    }

    /// Canonical listing order: descending support, then lexicographic extent
    pub fn canonical_cmp(&self, other: &Concept<I>) -> Ordering {
        other
            .support()
            .cmp(&self.support())
            .then_with(|| self.extent.cmp_lexicographic(&other.extent))
    }

    /// Re-check both closure directions against `context`
    pub fn validate<C>(&self, context: &C) -> Result<()>
    where
        C: GaloisConnection<Intent = I>,
        I: PartialEq + std::fmt::Debug,
    {
        if self.extent.universe() != context.n_objects() {
            return Err(LatticeError::DimensionMismatch {
                expected: context.n_objects(),
                actual: self.extent.universe(),
            });
        }

        let intent = context.intent_of(&self.extent);
        if intent != self.intent {
            return Err(LatticeError::NotClosed(format!(
                "intent of {:?} is {:?}, not {:?}",
                self.extent, intent, self.intent
            )));
        }

        let extent = context.extent_of(&self.intent);
        if extent != self.extent {
            return Err(LatticeError::NotClosed(format!(
                "extent of {:?} is {:?}, not {:?}",
                self.intent, extent, self.extent
            )));
        }
        Ok(())
    }
}

impl Concept<BitSet> {
    pub fn intent_i(&self) -> Vec<usize> {
        self.intent.to_indices()
    }

    /// Plain data for external serialisers
    pub fn record(&self) -> ConceptRecord {
        ConceptRecord {
            extent_i: self.extent_i(),
            intent_i: self.intent_i(),
            support: self.support(),
            measures: self.measures.clone(),
        }
    }
}

impl<I> PartialEq for Concept<I> {
    fn eq(&self, other: &Self) -> bool {
        self.extent == other.extent
    }
}

impl<I> Eq for Concept<I> {}

impl<I> Hash for Concept<I> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.extent.hash(state);
    }
}

/// Serialisable view of a formal concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptRecord {
    pub extent_i: Vec<usize>,
    pub intent_i: Vec<usize>,
    pub support: usize,
    #[serde(default)]
    pub measures: BTreeMap<String, f64>,
}

/// Sort concepts into canonical listing order
pub fn sort_concepts<I>(concepts: &mut [Concept<I>]) {
    concepts.sort_by(|a, b| a.canonical_cmp(b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::BitVectorTable;

    fn table() -> BitVectorTable {
        BitVectorTable::from_incidence(3, 2, &[vec![0], vec![0, 1], vec![1]]).unwrap()
    }

    #[test]
    fn test_from_extent_closes() {
        let table = table();
        let concept = Concept::from_extent(&table, &table.object_set(&[1]).unwrap());
        assert_eq!(concept.extent_i(), vec![1]);
        assert_eq!(concept.intent_i(), vec![0, 1]);
        assert_eq!(concept.support(), 1);
        concept.validate(&table).unwrap();
    }

    #[test]
    fn test_validate_rejects_open_pair() {
        let table = table();
        let open = Concept::new(table.object_set(&[0]).unwrap(), table.attribute_set(&[0]).unwrap());
        assert!(matches!(open.validate(&table), Err(LatticeError::NotClosed(_))));
    }

    #[test]
    fn test_equality_by_extent() {
        let table = table();
        let a = Concept::new(table.object_set(&[0, 1]).unwrap(), table.attribute_set(&[0]).unwrap());
        let mut b = Concept::new(table.object_set(&[0, 1]).unwrap(), table.attribute_set(&[]).unwrap());
        b.set_measure("LStab", 0.5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_canonical_order() {
        let table = table();
        let mut concepts: Vec<Concept> = [vec![1], vec![1, 2], vec![0, 1, 2], vec![0, 1]]
            .iter()
            .map(|objs| Concept::from_extent(&table, &table.object_set(objs).unwrap()))
            .collect();
        sort_concepts(&mut concepts);

        let extents: Vec<_> = concepts.iter().map(Concept::extent_i).collect();
        assert_eq!(extents, vec![vec![0, 1, 2], vec![0, 1], vec![1, 2], vec![1]]);
    }

    #[test]
    fn test_record_serializes() {
        let table = table();
        let mut concept = Concept::from_extent(&table, &table.object_set(&[0, 1]).unwrap());
        concept.set_measure("UStab", 0.75);
        let record = concept.record();
        let text = toml::to_string(&record).unwrap();
        let back: ConceptRecord = toml::from_str(&text).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.intent_i, vec![0]);
    }
}
