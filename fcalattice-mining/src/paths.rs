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

//! Concepts from decision-path extents
//!
//! A tree ensemble trained elsewhere hands over, for every node on its
//! decision paths, the set of training objects reaching that node. Each
//! set is closed into a concept. The bottom and top concepts are always
//! added so the result has a unique least and greatest element.

use std::collections::HashSet;
use std::time::Instant;

use fcalattice_core::{BitSet, Concept, GaloisConnection, LatticeError, Result, WorkerPool};
use tracing::{debug, info};

/// Close every decision-path object set in `context`.
///
/// Fails with `MissingDecisionPaths` when `paths` is empty and with
/// `DimensionMismatch` when a path is over a different object universe.
pub fn concepts_from_paths<C: GaloisConnection>(
    context: &C,
    paths: &[BitSet],
    workers: usize,
) -> Result<Vec<Concept<C::Intent>>> {
    if paths.is_empty() {
        return Err(LatticeError::MissingDecisionPaths);
    }
    let n = context.n_objects();
    if let Some(bad) = paths.iter().find(|p| p.universe() != n) {
        return Err(LatticeError::DimensionMismatch {
            expected: n,
            actual: bad.universe(),
        });
    }

    let start = Instant::now();
    let pool = WorkerPool::new(workers);
    let closed = pool.map(paths, |_, path| Concept::from_extent(context, path))?;

    let bounds = [
        Concept::from_extent(context, &BitSet::empty(n)),
        Concept::from_extent(context, &BitSet::full(n)),
    ];

    let mut seen = HashSet::new();
    let concepts: Vec<Concept<C::Intent>> = bounds
        .into_iter()
        .chain(closed)
        .filter(|concept| seen.insert(concept.extent().clone()))
        .collect();
    debug!(paths = paths.len(), unique = concepts.len(), "Closed decision paths");

    info!(
        concepts = concepts.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Decision-path concepts built"
    );
    Ok(concepts)
}
