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

//! Covering relation construction
//!
//! Turns an unordered list of concepts into the direct-cover edges of the
//! extent-inclusion order.
//!
//! ## Spanning tree (default)
//!
//! 1. Sort concepts by descending support, ties by lexicographic extent.
//!    Every superconcept then precedes its subconcepts.
//! 2. Sift each concept down from the virtual root, always stepping into
//!    the most specific tree child that still subsumes it, and hang it
//!    there. Every tree ancestor of a node subsumes the node.
//! 3. For each concept walk the tree, skipping any subtree whose root does
//!    not subsume it. What is left is the full superconcept set `S(c)`.
//! 4. Direct parents: `S(c) \ ⋃_{s ∈ S(c)} S(s)`, computed on bitsets.
//!
//! ## Complete pairwise
//!
//! `S(c)` from comparing every pair, then the same reduction.
//!
//! Steps 3 and 4 are independent per concept and run on the worker pool
//! when more than one worker is configured. Edges go into a `HasseIndex`
//! and are exported sorted, so the result does not depend on scheduling.

use std::collections::HashMap;
use std::time::Instant;

use fcalattice_core::{
    BitSet, Concept, LatticeError, LatticeStrategy, MiningConfig, Result, WorkerPool,
};
use tracing::{debug, info};

use crate::hasse::{CoveringRelation, HasseIndex};

const VIRTUAL_ROOT: usize = usize::MAX;

/// Builds the covering relation of a concept list
#[derive(Debug, Clone, Copy)]
pub struct LatticeBuilder {
    strategy: LatticeStrategy,
    workers: usize,
}

impl Default for LatticeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LatticeBuilder {
    /// Spanning-tree strategy on the calling thread
    pub fn new() -> Self {
        Self {
            strategy: LatticeStrategy::SpanningTree,
            workers: 1,
        }
    }

    pub fn from_config(config: &MiningConfig) -> Self {
        Self {
            strategy: config.lattice_strategy,
            workers: config.effective_workers(),
        }
    }

    pub fn with_strategy(mut self, strategy: LatticeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Compute direct parents and children for `concepts`.
    ///
    /// Node `i` of the result is `concepts[i]`. Extents must be pairwise
    /// distinct and live in the same object universe.
    pub fn build<I>(&self, concepts: &[Concept<I>]) -> Result<CoveringRelation> {
        check_concepts(concepts)?;
        if concepts.is_empty() {
            return Ok(CoveringRelation::default());
        }

        let start = Instant::now();
        let pool = WorkerPool::new(self.workers);

        // order[p] = input index of the concept at sorted position p
        let mut order: Vec<usize> = (0..concepts.len()).collect();
        order.sort_by(|&a, &b| concepts[a].canonical_cmp(&concepts[b]));
        let extents: Vec<&BitSet> = order.iter().map(|&i| concepts[i].extent()).collect();
        debug!(concepts = concepts.len(), "Sorted concepts");

        let supers = match self.strategy {
            LatticeStrategy::SpanningTree => {
                let tree = SpanningTree::build(&extents);
                debug!(roots = tree.roots.len(), "Built spanning tree");
                let positions: Vec<usize> = (0..extents.len()).collect();
                pool.map(&positions, |_, &p| tree.superconcepts(&extents, p))?
            }
            LatticeStrategy::CompletePairwise => {
                let positions: Vec<usize> = (0..extents.len()).collect();
                pool.map(&positions, |_, &p| pairwise_superconcepts(&extents, p))?
            }
        };

        let index = HasseIndex::new(concepts.len());
        let positions: Vec<usize> = (0..extents.len()).collect();
        pool.map(&positions, |_, &p| {
            for parent in direct_parents(&supers, p).iter_ones() {
                index.add_edge(order[parent], order[p]);
            }
        })?;
        debug!(edges = index.n_edges(), "Reduced superconcept sets");

        let covering = index.to_covering();
        info!(
            concepts = concepts.len(),
            edges = covering.n_edges(),
            workers = pool.workers(),
            strategy = ?self.strategy,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built covering relation"
        );
        Ok(covering)
    }
}

/// Reject mixed universes and duplicate extents
pub fn check_concepts<I>(concepts: &[Concept<I>]) -> Result<()> {
    let Some(first) = concepts.first() else {
        return Ok(());
    };
    let universe = first.extent().universe();

    let mut seen: HashMap<&BitSet, usize> = HashMap::with_capacity(concepts.len());
    for (i, concept) in concepts.iter().enumerate() {
        if concept.extent().universe() != universe {
            return Err(LatticeError::DimensionMismatch {
                expected: universe,
                actual: concept.extent().universe(),
            });
        }
        if let Some(&first) = seen.get(concept.extent()) {
            return Err(LatticeError::DuplicateConcept { first, second: i });
        }
        seen.insert(concept.extent(), i);
    }
    Ok(())
}

/// Check `covering` against a pairwise recomputation
pub fn verify_covering<I>(concepts: &[Concept<I>], covering: &CoveringRelation) -> Result<()> {
    if covering.len() != concepts.len() {
        return Err(LatticeError::DimensionMismatch {
            expected: concepts.len(),
            actual: covering.len(),
        });
    }

    let expected = LatticeBuilder::new()
        .with_strategy(LatticeStrategy::CompletePairwise)
        .build(concepts)?;

    for i in 0..concepts.len() {
        let mut parents = covering.parents_of(i).to_vec();
        parents.sort_unstable();
        if parents != expected.parents[i] {
            return Err(LatticeError::InconsistentOrder(format!(
                "concept {i} has parents {:?}, expected {:?}",
                parents, expected.parents[i]
            )));
        }
        let mut children = covering.children_of(i).to_vec();
        children.sort_unstable();
        if children != expected.children[i] {
            return Err(LatticeError::InconsistentOrder(format!(
                "concept {i} has children {:?}, expected {:?}",
                children, expected.children[i]
            )));
        }
    }
    Ok(())
}

/// Tree over sorted positions in which every ancestor subsumes its descendants
struct SpanningTree {
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
}

impl SpanningTree {
    fn build(extents: &[&BitSet]) -> Self {
        let mut tree = Self {
            roots: Vec::new(),
            children: vec![Vec::new(); extents.len()],
        };

        for (p, extent) in extents.iter().enumerate() {
            let mut current = VIRTUAL_ROOT;
            loop {
                // Most specific subsuming child: smallest extent, then lowest position
                let next = tree
                    .children_of(current)
                    .iter()
                    .copied()
                    .filter(|&q| extent.is_strict_subset(extents[q]))
                    .min_by_key(|&q| (extents[q].count(), q));
                match next {
                    Some(q) => current = q,
                    None => break,
                }
            }
            tree.attach(current, p);
        }
        tree
    }

    fn children_of(&self, node: usize) -> &[usize] {
        if node == VIRTUAL_ROOT {
            &self.roots
        } else {
            &self.children[node]
        }
    }

    fn attach(&mut self, parent: usize, child: usize) {
        if parent == VIRTUAL_ROOT {
            self.roots.push(child);
        } else {
            self.children[parent].push(child);
        }
    }

    /// Every strict superconcept of position `p`, as a set of positions
    fn superconcepts(&self, extents: &[&BitSet], p: usize) -> BitSet {
        let target = extents[p];
        let mut supers = BitSet::empty(extents.len());
        let mut stack: Vec<usize> = self.roots.clone();

        while let Some(q) = stack.pop() {
            if target.is_strict_subset(extents[q]) {
                supers.insert(q);
                stack.extend_from_slice(&self.children[q]);
            }
        }
        supers
    }
}

fn pairwise_superconcepts(extents: &[&BitSet], p: usize) -> BitSet {
    let mut supers = BitSet::empty(extents.len());
    for (q, other) in extents.iter().enumerate() {
        if extents[p].is_strict_subset(other) {
            supers.insert(q);
        }
    }
    supers
}

/// `S(p) \ ⋃_{s ∈ S(p)} S(s)`
fn direct_parents(supers: &[BitSet], p: usize) -> BitSet {
    let mut indirect = BitSet::empty(supers.len());
    for s in supers[p].iter_ones() {
        indirect.union_with(&supers[s]);
    }
    let mut direct = supers[p].clone();
    direct.difference_with(&indirect);
    direct
}
