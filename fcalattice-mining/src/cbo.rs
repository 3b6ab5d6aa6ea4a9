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

//! Close-by-One
//!
//! Depth-first enumeration of every closed extent. Starting from the
//! closure of the empty set, a frame tries each object `g` not yet in its
//! extent, from the frame's cursor upwards. The closure `C` of
//! `extent ∪ {g}` is canonical iff it adds no object below `g`; only
//! canonical closures are emitted and expanded, so each closed set is
//! visited exactly once.
//!
//! Concepts are emitted in preorder. In parallel mode each canonical child
//! of the root is an independent subtree; subtree outputs are concatenated
//! in child order, giving the same list as the sequential run.

use std::time::Instant;

use fcalattice_core::{
    BitSet, BitVectorTable, CboOrientation, Concept, GaloisConnection, IntervalContext,
    MiningConfig, Result, WorkerPool,
};
use tracing::{debug, info};

#[derive(Clone)]
struct Frame<I> {
    extent: BitSet,
    intent: I,
    /// Next object to try
    next: usize,
}

impl<I: Clone> Frame<I> {
    fn concept(&self) -> Concept<I> {
        Concept::new(self.extent.clone(), self.intent.clone())
    }
}

/// Exhaustive Close-by-One miner
#[derive(Debug, Clone, Copy)]
pub struct CloseByOne {
    workers: usize,
    orientation: CboOrientation,
}

impl Default for CloseByOne {
    fn default() -> Self {
        Self::new()
    }
}

impl CloseByOne {
    pub fn new() -> Self {
        Self {
            workers: 1,
            orientation: CboOrientation::Auto,
        }
    }

    pub fn from_config(config: &MiningConfig) -> Self {
        Self {
            workers: config.effective_workers(),
            orientation: config.orientation,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_orientation(mut self, orientation: CboOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Enumerate every concept of `context` by adding objects
    pub fn mine<C: GaloisConnection>(&self, context: &C) -> Result<Vec<Concept<C::Intent>>> {
        let start = Instant::now();
        let (extent, intent) = context.close(&BitSet::empty(context.n_objects()));
        let mut root = Frame {
            extent,
            intent,
            next: 0,
        };

        let concepts = if self.workers == 1 {
            let mut out = Vec::new();
            enumerate(context, root, &mut out);
            out
        } else {
            let mut out = vec![root.concept()];
            let mut branches = Vec::new();
            while let Some(child) = canonical_child(context, &mut root) {
                branches.push(child);
            }
            debug!(branches = branches.len(), workers = self.workers, "Split root branches");

            let pool = WorkerPool::new(self.workers);
            let subtrees = pool.map(&branches, |_, branch| {
                let mut subtree = Vec::new();
                enumerate(context, branch.clone(), &mut subtree);
                subtree
            })?;
            for subtree in subtrees {
                out.extend(subtree);
            }
            out
        };

        info!(
            concepts = concepts.len(),
            workers = self.workers,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Close-by-One finished"
        );
        Ok(concepts)
    }

    /// Enumerate a binary table along the configured side.
    ///
    /// Attribute-wise runs object-wise on the transposed table and swaps the
    /// halves of every concept back; the enumeration then starts at the top
    /// concept instead of the bottom one.
    pub fn mine_table(&self, table: &BitVectorTable) -> Result<Vec<Concept>> {
        let attribute_wise = match self.orientation {
            CboOrientation::Objects => false,
            CboOrientation::Attributes => true,
            CboOrientation::Auto => table.n_attributes() < table.n_objects(),
        };
        if !attribute_wise {
            return self.mine(table);
        }

        debug!(attributes = table.n_attributes(), "Mining attribute-wise");
        let transposed = table.clone().transpose();
        let concepts = self.mine(&transposed)?;
        Ok(concepts
            .into_iter()
            .map(|concept| {
                let (attributes, objects) = concept.into_parts();
                Concept::new(objects, attributes)
            })
            .collect())
    }
}

/// Contexts Close-by-One can mine. Binary tables honour the configured
/// orientation; every other context enumerates objects.
pub trait CboContext: GaloisConnection + Sized {
    fn close_by_one(&self, miner: &CloseByOne) -> Result<Vec<Concept<Self::Intent>>> {
        miner.mine(self)
    }
}

impl CboContext for BitVectorTable {
    fn close_by_one(&self, miner: &CloseByOne) -> Result<Vec<Concept>> {
        miner.mine_table(self)
    }
}

impl CboContext for IntervalContext {}

/// Advance `frame` to its next canonical child
fn canonical_child<C: GaloisConnection>(
    context: &C,
    frame: &mut Frame<C::Intent>,
) -> Option<Frame<C::Intent>> {
    while frame.next < context.n_objects() {
        let g = frame.next;
        frame.next += 1;
        if frame.extent.contains(g) {
            continue;
        }

        let intent = context.intention_extended(&frame.extent, &frame.intent, g);
        let extent = context.extent_of(&intent);
        if extent.agrees_below(&frame.extent, g) {
            return Some(Frame {
                extent,
                intent,
                next: g + 1,
            });
        }
    }
    None
}

/// Preorder walk of the subtree rooted at `root`
fn enumerate<C: GaloisConnection>(context: &C, root: Frame<C::Intent>, out: &mut Vec<Concept<C::Intent>>) {
    out.push(root.concept());
    let mut stack = vec![root];
    while let Some(top) = stack.last_mut() {
        match canonical_child(context, top) {
            Some(child) => {
                out.push(child.concept());
                stack.push(child);
            }
            None => {
                stack.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // a b c
    // x x .
    // . x x
    // x . x
    fn triangle() -> BitVectorTable {
        BitVectorTable::from_incidence(3, 3, &[vec![0, 1], vec![1, 2], vec![0, 2]]).unwrap()
    }

    fn extents<I>(concepts: &[Concept<I>]) -> Vec<Vec<usize>> {
        concepts.iter().map(|c| c.extent_i()).collect()
    }

    #[test]
    fn test_preorder_output() {
        let table = triangle();
        let concepts = CloseByOne::new()
            .with_orientation(CboOrientation::Objects)
            .mine_table(&table)
            .unwrap();

        assert_eq!(
            extents(&concepts),
            vec![
                vec![],
                vec![0],
                vec![0, 1],
                vec![0, 1, 2],
                vec![0, 2],
                vec![1],
                vec![1, 2],
                vec![2],
            ]
        );
        for concept in &concepts {
            concept.validate(&table).unwrap();
        }
    }

    #[test]
    fn test_orientations_agree() {
        let table = BitVectorTable::from_incidence(
            4,
            2,
            &[vec![0], vec![0, 1], vec![1], vec![]],
        )
        .unwrap();

        let by_objects: HashSet<Vec<usize>> = extents(
            &CloseByOne::new()
                .with_orientation(CboOrientation::Objects)
                .mine_table(&table)
                .unwrap(),
        )
        .into_iter()
        .collect();
        let by_attributes = CloseByOne::new()
            .with_orientation(CboOrientation::Attributes)
            .mine_table(&table)
            .unwrap();

        // attribute-wise starts from the top concept
        assert_eq!(by_attributes[0].extent_i(), vec![0, 1, 2, 3]);
        assert_eq!(by_attributes[0].intent_i(), Vec::<usize>::new());
        assert_eq!(by_attributes.len(), by_objects.len());
        for concept in &by_attributes {
            assert!(by_objects.contains(&concept.extent_i()));
            concept.validate(&table).unwrap();
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let table = triangle();
        let sequential = CloseByOne::new().mine(&table).unwrap();
        let parallel = CloseByOne::new().with_workers(3).mine(&table).unwrap();
        assert_eq!(extents(&sequential), extents(&parallel));
    }

    #[test]
    fn test_empty_table() {
        let table = BitVectorTable::from_incidence(0, 0, &[]).unwrap();
        let concepts = CloseByOne::new().mine(&table).unwrap();
        assert_eq!(concepts.len(), 1);
        assert!(concepts[0].extent().is_empty());
    }
}
