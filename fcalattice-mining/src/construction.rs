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

//! Lattice construction entry point
//!
//! ```ignore
//! let output = LatticeConstruction::new(&table)
//!     .config(MiningConfig::sofia(50).with_workers(4))
//!     .run()?;
//! println!("{} concepts ({:?})", output.concepts.len(), output.completeness);
//! ```
//!
//! Concepts in the output are in canonical order (descending support, then
//! lexicographic extent) and `covering` is indexed the same way.

use std::time::Instant;

use fcalattice_core::{
    sort_concepts, Algorithm, BitSet, Completeness, Concept, LatticeError, MiningConfig, Result,
};
use fcalattice_index::{ConceptLattice, CoveringRelation, LatticeBuilder};
use tracing::{debug, info};

use crate::cbo::{CboContext, CloseByOne};
use crate::lindig::lindig;
use crate::paths::concepts_from_paths;
use crate::sofia::Sofia;

/// Everything one construction run produces
pub struct ConstructionOutput<I = BitSet> {
    pub concepts: Vec<Concept<I>>,
    /// Node `i` is `concepts[i]`
    pub covering: CoveringRelation,
    pub completeness: Completeness,
    pub lattice: ConceptLattice<I>,
}

/// Builder for one mining + lattice construction run over `context`
pub struct LatticeConstruction<'a, C: CboContext> {
    context: &'a C,
    config: MiningConfig,
    decision_paths: Option<Vec<BitSet>>,
}

impl<'a, C> LatticeConstruction<'a, C>
where
    C: CboContext,
    C::Intent: 'static,
{
    pub fn new(context: &'a C) -> Self {
        Self {
            context,
            config: MiningConfig::default(),
            decision_paths: None,
        }
    }

    pub fn config(mut self, config: MiningConfig) -> Self {
        self.config = config;
        self
    }

    /// Object sets of decision-path nodes, required by `Algorithm::RandomForest`
    pub fn decision_paths(mut self, paths: Vec<BitSet>) -> Self {
        self.decision_paths = Some(paths);
        self
    }

    pub fn run(self) -> Result<ConstructionOutput<C::Intent>> {
        self.config.validate()?;
        let start = Instant::now();
        let config = &self.config;
        let context = self.context;

        let (concepts, covering, completeness) = match config.algorithm {
            Algorithm::CloseByOne => {
                let concepts = context.close_by_one(&CloseByOne::from_config(config))?;
                let (concepts, covering) = build_covering(config, concepts)?;
                (concepts, covering, Completeness::Exact)
            }
            Algorithm::Sofia => {
                let (concepts, completeness) = Sofia::from_config(config).mine(context)?;
                let (concepts, covering) = build_covering(config, concepts)?;
                (concepts, covering, completeness)
            }
            Algorithm::RandomForest => {
                let paths = self
                    .decision_paths
                    .as_deref()
                    .ok_or(LatticeError::MissingDecisionPaths)?;
                let concepts = concepts_from_paths(context, paths, config.effective_workers())?;
                let (concepts, covering) = build_covering(config, concepts)?;
                (concepts, covering, Completeness::Approximate)
            }
            Algorithm::Lindig => {
                let (concepts, covering) = lindig(context)?;
                let (concepts, covering) = into_canonical_order(concepts, &covering);
                (concepts, covering, Completeness::Exact)
            }
        };

        let lattice = ConceptLattice::new(concepts.clone(), &covering)?;
        info!(
            algorithm = ?config.algorithm,
            concepts = concepts.len(),
            edges = covering.n_edges(),
            completeness = ?completeness,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Lattice construction finished"
        );

        Ok(ConstructionOutput {
            concepts,
            covering,
            completeness,
            lattice,
        })
    }
}

fn build_covering<I>(
    config: &MiningConfig,
    mut concepts: Vec<Concept<I>>,
) -> Result<(Vec<Concept<I>>, CoveringRelation)> {
    sort_concepts(&mut concepts);
    debug!(concepts = concepts.len(), "Sorted mined concepts");
    let covering = LatticeBuilder::from_config(config).build(&concepts)?;
    Ok((concepts, covering))
}

/// Sort concepts canonically and renumber `covering` to match
fn into_canonical_order<I>(
    concepts: Vec<Concept<I>>,
    covering: &CoveringRelation,
) -> (Vec<Concept<I>>, CoveringRelation) {
    let mut order: Vec<usize> = (0..concepts.len()).collect();
    order.sort_by(|&a, &b| concepts[a].canonical_cmp(&concepts[b]));

    let mut position = vec![0; concepts.len()];
    for (new, &old) in order.iter().enumerate() {
        position[old] = new;
    }

    let parents: Vec<Vec<usize>> = order
        .iter()
        .map(|&old| covering.parents_of(old).iter().map(|&p| position[p]).collect())
        .collect();

    let mut slots: Vec<Option<Concept<I>>> = concepts.into_iter().map(Some).collect();
    let sorted = order.iter().filter_map(|&old| slots[old].take()).collect();
    (sorted, CoveringRelation::from_parents(parents))
}
