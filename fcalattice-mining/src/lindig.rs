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

//! Lindig's upper-neighbour search
//!
//! Walks the lattice upwards from the bottom concept. The upper neighbours
//! of `(A, B)` are the closures `(A ∪ {g})''` that are reached by every
//! object they add; the `min` candidate set filters out the rest. Concepts
//! and cover edges come out of the same walk, so no separate covering
//! pass is needed.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use fcalattice_core::{BitSet, Concept, GaloisConnection, Result};
use fcalattice_index::CoveringRelation;
use tracing::info;

/// Upper neighbours of the concept `(extent, intent)`
pub fn upper_neighbours<C: GaloisConnection>(
    context: &C,
    extent: &BitSet,
    intent: &C::Intent,
) -> Vec<(BitSet, C::Intent)> {
    let mut min = BitSet::full(context.n_objects());
    min.difference_with(extent);

    let candidates: Vec<usize> = min.iter_ones().collect();
    let mut neighbours = Vec::new();
    for g in candidates {
        let neighbour_intent = context.intention_extended(extent, intent, g);
        let neighbour = context.extent_of(&neighbour_intent);

        let mut added = neighbour.clone();
        added.difference_with(extent);
        added.remove(g);
        if added.intersection_count(&min) == 0 {
            neighbours.push((neighbour, neighbour_intent));
        } else {
            min.remove(g);
        }
    }
    neighbours
}

/// Every concept of `context` and its covering relation.
///
/// Concepts are listed in discovery order (breadth first from the
/// bottom); node `i` of the relation is `concepts[i]`.
pub fn lindig<C: GaloisConnection>(context: &C) -> Result<(Vec<Concept<C::Intent>>, CoveringRelation)> {
    let start = Instant::now();
    let (bottom_extent, bottom_intent) = context.close(&BitSet::empty(context.n_objects()));

    let mut ids: HashMap<BitSet, usize> = HashMap::from([(bottom_extent.clone(), 0)]);
    let mut concepts = vec![Concept::new(bottom_extent, bottom_intent)];
    let mut parents: Vec<Vec<usize>> = vec![Vec::new()];
    let mut queue = VecDeque::from([0usize]);

    while let Some(id) = queue.pop_front() {
        let neighbours = upper_neighbours(context, concepts[id].extent(), concepts[id].intent());
        for (extent, intent) in neighbours {
            let parent = match ids.get(&extent) {
                Some(&existing) => existing,
                None => {
                    let new_id = concepts.len();
                    ids.insert(extent.clone(), new_id);
                    concepts.push(Concept::new(extent, intent));
                    parents.push(Vec::new());
                    queue.push_back(new_id);
                    new_id
                }
            };
            parents[id].push(parent);
        }
    }

    let covering = CoveringRelation::from_parents(parents);
    info!(
        concepts = concepts.len(),
        edges = covering.n_edges(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Lindig finished"
    );
    Ok((concepts, covering))
}
