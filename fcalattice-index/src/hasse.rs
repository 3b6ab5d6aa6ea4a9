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

//! Covering relation (Hasse diagram) index
//!
//! Maintains parent and child adjacency lists for the direct-cover edges of
//! a concept set. Nodes are concept positions.
//!
//! `HasseIndex` is the concurrent form used while edges are being produced:
//! adjacency lives in `DashMap`s keyed by node, so an append only locks the
//! shard entry of the node it touches. Lists use `SmallVec` inline storage;
//! most concepts have a handful of direct neighbours.
//!
//! `CoveringRelation` is the plain, sorted form handed to callers.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Maximum inline neighbours before spilling to the heap
const MAX_INLINE_NEIGHBORS: usize = 8;

type NeighborList = SmallVec<[usize; MAX_INLINE_NEIGHBORS]>;

/// Concurrent covering-relation adjacency
pub struct HasseIndex {
    // parent -> direct children
    children: DashMap<usize, NeighborList>,

    // child -> direct parents
    parents: DashMap<usize, NeighborList>,

    n_nodes: usize,
}

impl HasseIndex {
    /// Empty index over nodes `0..n_nodes`
    pub fn new(n_nodes: usize) -> Self {
        Self {
            children: DashMap::new(),
            parents: DashMap::new(),
            n_nodes,
        }
    }

    /// Record `parent` as a direct cover of `child`.
    ///
    /// Re-adding an existing edge is a no-op; returns whether the edge is new.
    /// Each list is locked on its own, never both at once.
    pub fn add_edge(&self, parent: usize, child: usize) -> bool {
        debug_assert!(parent < self.n_nodes && child < self.n_nodes);

        let is_new = {
            let mut children = self.children.entry(parent).or_default();
            if children.contains(&child) {
                false
            } else {
                children.push(child);
                true
            }
        };

        if is_new {
            let mut parents = self.parents.entry(child).or_default();
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }
        is_new
    }

    /// Number of cover edges recorded so far
    pub fn n_edges(&self) -> usize {
        self.children.iter().map(|entry| entry.value().len()).sum()
    }

    /// Freeze into the plain form, neighbour lists sorted ascending
    pub fn to_covering(&self) -> CoveringRelation {
        let sorted = |map: &DashMap<usize, NeighborList>| {
            let mut lists = vec![Vec::new(); self.n_nodes];
            for entry in map.iter() {
                let mut list = entry.value().to_vec();
                list.sort_unstable();
                lists[*entry.key()] = list;
            }
            lists
        };

        CoveringRelation {
            parents: sorted(&self.parents),
            children: sorted(&self.children),
        }
    }
}

/// Direct parents and children per node, lists sorted ascending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoveringRelation {
    pub parents: Vec<Vec<usize>>,
    pub children: Vec<Vec<usize>>,
}

impl CoveringRelation {
    /// Derive the child lists from per-node parent lists
    pub fn from_parents(mut parents: Vec<Vec<usize>>) -> Self {
        let mut children = vec![Vec::new(); parents.len()];
        for (child, list) in parents.iter_mut().enumerate() {
            list.sort_unstable();
            list.dedup();
            for &parent in list.iter() {
                children[parent].push(child);
            }
        }
        Self { parents, children }
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn n_edges(&self) -> usize {
        self.parents.iter().map(Vec::len).sum()
    }

    pub fn parents_of(&self, node: usize) -> &[usize] {
        self.parents.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children_of(&self, node: usize) -> &[usize] {
        self.children.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(parent, child)` pairs
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.parents
            .iter()
            .enumerate()
            .flat_map(|(child, parents)| parents.iter().map(move |&parent| (parent, child)))
    }

    /// Nodes without parents
    pub fn maximal(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.parents[i].is_empty()).collect()
    }

    /// Nodes without children
    pub fn minimal(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.children[i].is_empty()).collect()
    }
}
