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

//! Interval pattern structure
//!
//! A many-valued context where each object carries one real value per
//! attribute. The description of an object set is the per-attribute
//! `[min, max]` hull of its values; an object matches a description when
//! every value falls inside the matching interval.
//!
//! The empty object set is described by the bottom pattern (`None`), which
//! matches nothing.

use std::collections::HashSet;

use crate::bitset::BitSet;
use crate::closure::GaloisConnection;
use crate::error::{LatticeError, Result};

/// Per-attribute closed intervals, or the bottom pattern
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalPattern(pub Option<Vec<(f64, f64)>>);

impl IntervalPattern {
    pub fn bottom() -> Self {
        IntervalPattern(None)
    }

    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.0.as_deref()
    }

    /// True when every value lies in its interval
    pub fn matches(&self, values: &[f64]) -> bool {
        match &self.0 {
            None => false,
            Some(intervals) => intervals
                .iter()
                .zip(values)
                .all(|(&(lo, hi), &v)| lo <= v && v <= hi),
        }
    }

    /// Widen the hull so it also covers `values`
    fn widen(&self, values: &[f64]) -> Self {
        let intervals = match &self.0 {
            None => values.iter().map(|&v| (v, v)).collect(),
            Some(intervals) => intervals
                .iter()
                .zip(values)
                .map(|(&(lo, hi), &v)| (lo.min(v), hi.max(v)))
                .collect(),
        };
        IntervalPattern(Some(intervals))
    }
}

/// Objects × real-valued attributes
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalContext {
    object_names: Vec<String>,
    attribute_names: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl IntervalContext {
    /// Build a context from one value row per object. All rows must have the
    /// same length and every value must be finite.
    pub fn from_rows(values: Vec<Vec<f64>>) -> Result<Self> {
        let n_attributes = values.first().map(Vec::len).unwrap_or(0);
        for (row, cells) in values.iter().enumerate() {
            if cells.len() != n_attributes {
                return Err(LatticeError::RaggedRows {
                    row,
                    expected: n_attributes,
                    actual: cells.len(),
                });
            }
            if let Some(m) = cells.iter().position(|v| !v.is_finite()) {
                return Err(LatticeError::InvalidValue(format!(
                    "object {row}, attribute {m}: {}",
                    cells[m]
                )));
            }
        }

        Ok(Self {
            object_names: (0..values.len()).map(|i| i.to_string()).collect(),
            attribute_names: (0..n_attributes).map(|i| i.to_string()).collect(),
            values,
        })
    }

    pub fn with_names<S: Into<String>>(
        mut self,
        object_names: impl IntoIterator<Item = S>,
        attribute_names: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let object_names: Vec<String> = object_names.into_iter().map(Into::into).collect();
        let attribute_names: Vec<String> = attribute_names.into_iter().map(Into::into).collect();
        if object_names.len() != self.object_names.len() {
            return Err(LatticeError::DimensionMismatch {
                expected: self.object_names.len(),
                actual: object_names.len(),
            });
        }
        if attribute_names.len() != self.attribute_names.len() {
            return Err(LatticeError::DimensionMismatch {
                expected: self.attribute_names.len(),
                actual: attribute_names.len(),
            });
        }
        self.object_names = object_names;
        self.attribute_names = attribute_names;
        Ok(self)
    }

    pub fn n_attributes(&self) -> usize {
        self.attribute_names.len()
    }

    pub fn object_names(&self) -> &[String] {
        &self.object_names
    }

    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }
}

impl GaloisConnection for IntervalContext {
    type Intent = IntervalPattern;

    fn n_objects(&self) -> usize {
        self.values.len()
    }

    fn extent_of(&self, intent: &IntervalPattern) -> BitSet {
        let mut extent = BitSet::empty(self.values.len());
        for (g, row) in self.values.iter().enumerate() {
            if intent.matches(row) {
                extent.insert(g);
            }
        }
        extent
    }

    fn intent_of(&self, extent: &BitSet) -> IntervalPattern {
        extent
            .iter_ones()
            .fold(IntervalPattern::bottom(), |hull, g| hull.widen(&self.values[g]))
    }

    fn intention_extended(&self, _extent: &BitSet, intent: &IntervalPattern, g: usize) -> IntervalPattern {
        intent.widen(&self.values[g])
    }

    fn leq_intents(&self, a: &IntervalPattern, b: &IntervalPattern) -> bool {
        match (&a.0, &b.0) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(a), Some(b)) => a
                .iter()
                .zip(b)
                .all(|(&(a_lo, a_hi), &(b_lo, b_hi))| a_lo <= b_lo && b_hi <= a_hi),
        }
    }

    /// Interordinal scaling: for every attribute and every observed value
    /// `v`, the objects with value `>= v` and those with value `<= v`
    fn projections(&self) -> Vec<BitSet> {
        let n = self.values.len();
        let mut seen = HashSet::new();
        let mut projections = Vec::new();

        for m in 0..self.n_attributes() {
            let mut thresholds: Vec<f64> = self.values.iter().map(|row| row[m]).collect();
            thresholds.sort_by(f64::total_cmp);
            thresholds.dedup();

            for &v in &thresholds {
                let mut at_least = BitSet::empty(n);
                let mut at_most = BitSet::empty(n);
                for (g, row) in self.values.iter().enumerate() {
                    if row[m] >= v {
                        at_least.insert(g);
                    }
                    if row[m] <= v {
                        at_most.insert(g);
                    }
                }
                for projection in [at_least, at_most] {
                    if seen.insert(projection.clone()) {
                        projections.push(projection);
                    }
                }
            }
        }
        projections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heights() -> IntervalContext {
        IntervalContext::from_rows(vec![vec![1.0, 10.0], vec![2.0, 10.0], vec![5.0, 30.0]]).unwrap()
    }

    #[test]
    fn test_interval_hull() {
        let ctx = heights();
        let extent = BitSet::from_indices(3, [0, 1], crate::error::Axis::Object).unwrap();
        let intent = ctx.intent_of(&extent);
        assert_eq!(intent, IntervalPattern(Some(vec![(1.0, 2.0), (10.0, 10.0)])));
        assert_eq!(ctx.extent_of(&intent).to_indices(), vec![0, 1]);

        assert_eq!(ctx.intent_of(&BitSet::empty(3)), IntervalPattern::bottom());
        assert!(ctx.extent_of(&IntervalPattern::bottom()).is_empty());
    }

    #[test]
    fn test_interval_order() {
        let ctx = heights();
        let wide = IntervalPattern(Some(vec![(0.0, 5.0), (10.0, 30.0)]));
        let narrow = IntervalPattern(Some(vec![(1.0, 2.0), (10.0, 10.0)]));
        assert!(ctx.leq_intents(&wide, &narrow));
        assert!(!ctx.leq_intents(&narrow, &wide));
        assert!(ctx.leq_intents(&narrow, &IntervalPattern::bottom()));
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = IntervalContext::from_rows(vec![vec![1.0], vec![f64::NAN]]).unwrap_err();
        assert!(matches!(err, LatticeError::InvalidValue(_)));
    }

    #[test]
    fn test_projections_are_distinct() {
        let ctx = heights();
        let projections = ctx.projections();
        let unique: HashSet<_> = projections.iter().cloned().collect();
        assert_eq!(unique.len(), projections.len());
        // {2} is reachable as "first attribute >= 5"
        assert!(projections.iter().any(|p| p.to_indices() == vec![2]));
    }
}
