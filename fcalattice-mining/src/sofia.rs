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

//! Sofia: beam search over projections
//!
//! The working set starts as `{G}` plus the closure of the empty set, the
//! least extent, which no intersection may reach. Each projection (a closed object
//! subset) is intersected with every survivor; results merge by extent.
//! After every projection:
//!
//! 1. extents below the support threshold are dropped, except the smallest
//! 2. if more than `max_concepts` remain, the set is ranked and cut back to
//!    `max_concepts`, always keeping the smallest and the largest extent
//!
//! A sweep that cuts nothing has produced every extent above the threshold,
//! so the result is `Exact`. Otherwise another sweep starts from the
//! survivors, until one converges or `max_sweeps` is used up.

use std::collections::HashSet;
use std::time::Instant;

use fcalattice_core::{
    support_count, BitSet, Completeness, Concept, GaloisConnection, LatticeError, MiningConfig,
    RankingMeasure, Result, DEFAULT_MAX_CONCEPTS,
};
use tracing::{debug, info, warn};

/// Bounded, approximate concept miner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sofia {
    max_concepts: usize,
    min_support: f64,
    ranking: RankingMeasure,
    max_sweeps: usize,
}

impl Default for Sofia {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCEPTS)
    }
}

impl Sofia {
    /// Keep at most `max_concepts` extents (at least 2)
    pub fn new(max_concepts: usize) -> Self {
        Self {
            max_concepts: max_concepts.max(2),
            min_support: 0.0,
            ranking: RankingMeasure::Support,
            max_sweeps: 1,
        }
    }

    pub fn from_config(config: &MiningConfig) -> Self {
        Self {
            max_concepts: config.max_concepts.max(2),
            min_support: config.min_support,
            ranking: config.ranking_measure,
            max_sweeps: config.max_sweeps.max(1),
        }
    }

    /// Absolute count, or a fraction of the objects when below 1
    pub fn with_min_support(mut self, min_support: f64) -> Self {
        self.min_support = min_support;
        self
    }

    pub fn with_ranking(mut self, ranking: RankingMeasure) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps.max(1);
        self
    }

    /// Mine over the context's own projections
    pub fn mine<C: GaloisConnection>(&self, context: &C) -> Result<(Vec<Concept<C::Intent>>, Completeness)> {
        self.mine_with_projections(context, &context.projections())
    }

    /// Mine over caller-supplied projections.
    ///
    /// Every projection must be a closed object subset of `context`;
    /// otherwise the intersections are closed afterwards and may merge.
    pub fn mine_with_projections<C: GaloisConnection>(
        &self,
        context: &C,
        projections: &[BitSet],
    ) -> Result<(Vec<Concept<C::Intent>>, Completeness)> {
        let n = context.n_objects();
        if let Some(bad) = projections.iter().find(|p| p.universe() != n) {
            return Err(LatticeError::DimensionMismatch {
                expected: n,
                actual: bad.universe(),
            });
        }

        let start = Instant::now();
        let min_count = support_count(self.min_support, n);
        let (bottom, _) = context.close(&BitSet::empty(n));
        let mut working = vec![BitSet::full(n)];
        if !bottom.is_full() {
            working.insert(0, bottom);
        }
        let mut completeness = Completeness::Approximate;

        for sweep in 0..self.max_sweeps {
            let before: HashSet<BitSet> = working.iter().cloned().collect();
            let mut truncated = false;

            for projection in projections {
                if projection.is_full() {
                    continue;
                }
                truncated |= self.step(&mut working, projection, min_count);
            }

            debug!(sweep, extents = working.len(), truncated, "Finished Sofia sweep");
            if !truncated {
                completeness = Completeness::Exact;
                break;
            }
            if working.iter().all(|e| before.contains(e)) && working.len() == before.len() {
                break;
            }
        }

        if completeness == Completeness::Approximate {
            warn!(
                max_concepts = self.max_concepts,
                sweeps = self.max_sweeps,
                "Sofia truncated the working set; result is approximate"
            );
        }

        let mut seen = HashSet::new();
        let concepts: Vec<Concept<C::Intent>> = working
            .iter()
            .map(|extent| Concept::from_extent(context, extent))
            .filter(|concept| seen.insert(concept.extent().clone()))
            .collect();

        info!(
            concepts = concepts.len(),
            projections = projections.len(),
            completeness = ?completeness,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Sofia finished"
        );
        Ok((concepts, completeness))
    }

    /// Apply one projection; returns whether the working set was cut
    fn step(&self, working: &mut Vec<BitSet>, projection: &BitSet, min_count: usize) -> bool {
        let mut seen: HashSet<BitSet> = working.iter().cloned().collect();
        let mut extended = working.clone();
        for extent in working.iter() {
            let narrowed = extent.intersection(projection);
            if seen.insert(narrowed.clone()) {
                extended.push(narrowed);
            }
        }

        extended.sort_by(|a, b| a.count().cmp(&b.count()).then_with(|| a.cmp_lexicographic(b)));
        let mut kept: Vec<BitSet> = Vec::with_capacity(extended.len());
        for (i, extent) in extended.into_iter().enumerate() {
            if i == 0 || extent.count() >= min_count {
                kept.push(extent);
            }
        }

        let truncated = kept.len() > self.max_concepts;
        if truncated {
            kept = self.prune(kept);
        }
        *working = kept;
        truncated
    }

    /// Cut `extents` (ascending by size) back to `max_concepts`
    fn prune(&self, extents: Vec<BitSet>) -> Vec<BitSet> {
        let last = extents.len() - 1;
        let scores = rank(&extents, self.ranking);

        let mut middle: Vec<usize> = (1..last).collect();
        // Best score first; ties prefer the larger extent
        middle.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then_with(|| b.cmp(&a)));
        middle.truncate(self.max_concepts - 2);

        let mut keep = vec![false; extents.len()];
        keep[0] = true;
        keep[last] = true;
        for i in middle {
            keep[i] = true;
        }

        extents
            .into_iter()
            .zip(keep)
            .filter_map(|(extent, kept)| kept.then_some(extent))
            .collect()
    }
}

/// Score every extent of an ascending-by-size list
fn rank(extents: &[BitSet], ranking: RankingMeasure) -> Vec<f64> {
    extents
        .iter()
        .enumerate()
        .map(|(i, extent)| {
            let support = extent.count();
            // strict subsets can only sit earlier in the list
            let below = extents[..i].iter().filter(|other| other.is_strict_subset(extent));
            match ranking {
                RankingMeasure::Support => support as f64,
                RankingMeasure::LogStabilityBound => {
                    let largest = below.map(BitSet::count).max().unwrap_or(0);
                    (support - largest) as f64
                }
                RankingMeasure::StabilityLowerBound => {
                    let below: Vec<&BitSet> = below.collect();
                    // direct children only: no other candidate sits in between
                    let sum: f64 = below
                        .iter()
                        .filter(|child| !below.iter().any(|other| child.is_strict_subset(other)))
                        .map(|child| 2f64.powi(-((support - child.count()) as i32)))
                        .sum();
                    1.0 - sum
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcalattice_core::{Axis, BitVectorTable};

    fn set(universe: usize, objects: &[usize]) -> BitSet {
        BitSet::from_indices(universe, objects.iter().copied(), Axis::Object).unwrap()
    }

    // Chain of nested attribute extents plus one disjoint column
    fn chain() -> BitVectorTable {
        BitVectorTable::from_incidence(
            5,
            4,
            &[vec![0, 1, 2], vec![0, 1], vec![0], vec![3], vec![]],
        )
        .unwrap()
    }

    #[test]
    fn test_exact_when_budget_suffices() {
        let table = chain();
        let (concepts, completeness) = Sofia::new(100).mine(&table).unwrap();
        assert_eq!(completeness, Completeness::Exact);

        let mut extents: Vec<Vec<usize>> = concepts.iter().map(|c| c.extent_i()).collect();
        extents.sort();
        assert_eq!(
            extents,
            vec![vec![], vec![0], vec![0, 1], vec![0, 1, 2], vec![0, 1, 2, 3, 4], vec![3]]
        );
        for concept in &concepts {
            concept.validate(&table).unwrap();
        }
    }

    #[test]
    fn test_budget_keeps_extremes() {
        let table = chain();
        let (concepts, completeness) = Sofia::new(3).mine(&table).unwrap();
        assert_eq!(completeness, Completeness::Approximate);
        assert!(concepts.len() <= 3);

        let extents: Vec<Vec<usize>> = concepts.iter().map(|c| c.extent_i()).collect();
        assert!(extents.contains(&vec![0, 1, 2, 3, 4]));
        assert!(extents.contains(&vec![]));
    }

    #[test]
    fn test_min_support_drops_small_extents() {
        let table = chain();
        let (concepts, _) = Sofia::new(100).with_min_support(2.0).mine(&table).unwrap();
        let mut extents: Vec<Vec<usize>> = concepts.iter().map(|c| c.extent_i()).collect();
        extents.sort();
        // the empty extent survives only as the smallest one
        assert_eq!(extents, vec![vec![], vec![0, 1], vec![0, 1, 2], vec![0, 1, 2, 3, 4]]);
    }

    #[test]
    fn test_rankings() {
        let extents = vec![set(4, &[]), set(4, &[0]), set(4, &[0, 1, 2]), set(4, &[0, 1, 2, 3])];

        let support = rank(&extents, RankingMeasure::Support);
        assert_eq!(support, vec![0.0, 1.0, 3.0, 4.0]);

        let delta = rank(&extents, RankingMeasure::LogStabilityBound);
        assert_eq!(delta, vec![0.0, 1.0, 2.0, 1.0]);

        let lower = rank(&extents, RankingMeasure::StabilityLowerBound);
        assert_eq!(lower[0], 1.0);
        assert_eq!(lower[1], 0.5);
        // only {0} covers from below, the empty extent sits under it
        assert_eq!(lower[2], 0.75);
        assert_eq!(lower[3], 0.5);
    }

    #[test]
    fn test_lower_bound_sums_direct_children() {
        // {0} and {1} both sit directly under {0, 1}
        let extents = vec![set(3, &[]), set(3, &[0]), set(3, &[1]), set(3, &[0, 1])];
        let lower = rank(&extents, RankingMeasure::StabilityLowerBound);
        assert_eq!(lower[3], 0.0);

        // a chain counts one child per level
        let chain = vec![set(3, &[]), set(3, &[0]), set(3, &[0, 1])];
        let lower = rank(&chain, RankingMeasure::StabilityLowerBound);
        assert_eq!(lower[2], 0.5);
    }

    #[test]
    fn test_projection_universe_checked() {
        let table = chain();
        let err = Sofia::new(10)
            .mine_with_projections(&table, &[set(3, &[0])])
            .unwrap_err();
        assert!(matches!(err, LatticeError::DimensionMismatch { expected: 5, actual: 3 }));
    }

    #[test]
    fn test_custom_projections() {
        let table = chain();
        // Only the first two columns
        let projections = vec![table.columns()[0].clone(), table.columns()[1].clone()];
        let (concepts, completeness) = Sofia::new(10)
            .mine_with_projections(&table, &projections)
            .unwrap();
        assert_eq!(completeness, Completeness::Exact);
        let mut extents: Vec<Vec<usize>> = concepts.iter().map(|c| c.extent_i()).collect();
        extents.sort();
        assert_eq!(extents, vec![vec![], vec![0, 1], vec![0, 1, 2], vec![0, 1, 2, 3, 4]]);
    }

    #[test]
    fn test_bottom_seeded_for_constant_patterns() {
        let context = fcalattice_core::IntervalContext::from_rows(vec![vec![1.0], vec![1.0]]).unwrap();
        let (concepts, completeness) = Sofia::new(10).mine(&context).unwrap();
        assert_eq!(completeness, Completeness::Exact);
        let extents: Vec<Vec<usize>> = concepts.iter().map(|c| c.extent_i()).collect();
        assert_eq!(extents, vec![vec![], vec![0, 1]]);
    }
}
