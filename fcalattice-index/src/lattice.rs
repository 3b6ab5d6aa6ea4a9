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

//! Concept lattice
//!
//! A `PartialOrderSet` of concepts ordered by extent inclusion, with its
//! direct caches pre-filled from the covering relation the builder
//! computed. Concept ids are positions in the original concept list and
//! stay valid across `add_concept` / `remove_concept`.

use std::collections::BTreeSet;

use fcalattice_core::{BitSet, Concept, ConceptRecord, GaloisConnection, LatticeError, Result};
use tracing::debug;

use crate::builder::{check_concepts, LatticeBuilder};
use crate::hasse::CoveringRelation;
use crate::poset::PartialOrderSet;

/// Lower stability bound measure name
pub const LSTAB: &str = "LStab";
/// Upper stability bound measure name
pub const USTAB: &str = "UStab";
/// Exact stability measure name
pub const STAB: &str = "Stab";

/// Largest extent `calc_stability` enumerates the subsets of
pub const MAX_STABILITY_EXTENT: usize = 30;

pub struct ConceptLattice<I = BitSet> {
    poset: PartialOrderSet<Concept<I>>,
}

impl<I: 'static> ConceptLattice<I> {
    /// Wrap concepts with an already computed covering relation
    pub fn new(concepts: Vec<Concept<I>>, covering: &CoveringRelation) -> Result<Self> {
        check_concepts(&concepts)?;
        let poset = PartialOrderSet::with_covering(concepts, is_subconcept::<I>, covering)?;
        Ok(Self { poset })
    }

    /// Compute the covering relation with the default builder
    pub fn from_concepts(concepts: Vec<Concept<I>>) -> Result<Self> {
        let covering = LatticeBuilder::new().build(&concepts)?;
        Self::new(concepts, &covering)
    }

    pub fn len(&self) -> usize {
        self.poset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poset.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.poset.ids()
    }

    pub fn concept(&self, id: usize) -> Result<&Concept<I>> {
        self.poset.element(id)
    }

    /// Live concepts with their ids, ascending by id
    pub fn concepts(&self) -> impl Iterator<Item = (usize, &Concept<I>)> + '_ {
        self.poset
            .ids()
            .filter_map(move |id| self.poset.get(id).map(|c| (id, c)))
    }

    pub fn poset(&self) -> &PartialOrderSet<Concept<I>> {
        &self.poset
    }

    /// The unique maximal concept
    pub fn top(&self) -> Result<usize> {
        let tops = self.poset.top_elements()?;
        unique(&tops, "top")
    }

    /// The unique minimal concept
    pub fn bottom(&self) -> Result<usize> {
        let bottoms = self.poset.bottom_elements()?;
        unique(&bottoms, "bottom")
    }

    /// Direct superconcepts, ascending by id
    pub fn parents(&self, id: usize) -> Result<Vec<usize>> {
        Ok(self.poset.direct_super_elements(id)?.iter().copied().collect())
    }

    /// Direct subconcepts, ascending by id
    pub fn children(&self, id: usize) -> Result<Vec<usize>> {
        Ok(self.poset.direct_sub_elements(id)?.iter().copied().collect())
    }

    /// Covering relation indexed by concept id; removed ids have no edges
    pub fn covering_relation(&self) -> Result<CoveringRelation> {
        self.poset.covering_relation()
    }

    /// Smallest concept above every given concept
    pub fn join(&self, ids: &[usize]) -> Result<Option<usize>> {
        self.poset.join_elements(ids)
    }

    /// Largest concept below every given concept
    pub fn meet(&self, ids: &[usize]) -> Result<Option<usize>> {
        self.poset.meet_elements(ids)
    }

    /// Insert a concept and splice it into the covering relation
    pub fn add_concept(&mut self, concept: Concept<I>) -> Result<usize> {
        let universe = self
            .concepts()
            .next()
            .map(|(_, c)| c.extent().universe());
        if let Some(universe) = universe {
            if concept.extent().universe() != universe {
                return Err(LatticeError::DimensionMismatch {
                    expected: universe,
                    actual: concept.extent().universe(),
                });
            }
        }
        if let Some((existing, _)) = self.concepts().find(|(_, c)| c.extent() == concept.extent()) {
            return Err(LatticeError::DuplicateConcept {
                first: existing,
                second: self.poset.capacity(),
            });
        }

        let id = self.poset.add(concept)?;
        debug!(id, "Added concept to lattice");
        Ok(id)
    }

    /// Remove a concept that is neither top nor bottom
    pub fn remove_concept(&mut self, id: usize) -> Result<Concept<I>> {
        self.poset.element(id)?;
        if self.top()? == id || self.bottom()? == id {
            return Err(LatticeError::NotALattice(format!(
                "concept {id} is the top or bottom and cannot be removed"
            )));
        }
        let concept = self.poset.remove(id)?;
        debug!(id, "Removed concept from lattice");
        Ok(concept)
    }

    /// Objects of the concept that no direct subconcept contains
    pub fn new_extent(&self, id: usize) -> Result<BitSet> {
        let mut extent = self.concept(id)?.extent().clone();
        for child in self.children(id)? {
            extent.difference_with(self.concept(child)?.extent());
        }
        Ok(extent)
    }

    /// Attach the exact stability `Stab` to every concept: the share of
    /// subsets of the extent that close back to the extent. An empty extent
    /// scores 1.
    ///
    /// Exponential in extent size; fails with `InvalidValue` before touching
    /// any concept when an extent exceeds [`MAX_STABILITY_EXTENT`].
    pub fn calc_stability<C>(&mut self, context: &C) -> Result<()>
    where
        C: GaloisConnection<Intent = I>,
    {
        let ids: Vec<usize> = self.ids().collect();
        for &id in &ids {
            let extent = self.poset.element(id)?.extent();
            if extent.universe() != context.n_objects() {
                return Err(LatticeError::DimensionMismatch {
                    expected: context.n_objects(),
                    actual: extent.universe(),
                });
            }
            if extent.count() > MAX_STABILITY_EXTENT {
                return Err(LatticeError::InvalidValue(format!(
                    "concept {id} has {} objects, stability enumerates at most {MAX_STABILITY_EXTENT}",
                    extent.count()
                )));
            }
        }

        let mut scores = Vec::with_capacity(ids.len());
        for &id in &ids {
            let extent = self.poset.element(id)?.extent();
            let objects = extent.to_indices();
            let total = 1u64 << objects.len();
            let mut stable = 0u64;
            for mask in 0..total {
                let mut subset = BitSet::empty(extent.universe());
                for (bit, &g) in objects.iter().enumerate() {
                    if (mask >> bit) & 1 == 1 {
                        subset.insert(g);
                    }
                }
                if context.close(&subset).0 == *extent {
                    stable += 1;
                }
            }
            let score = if objects.is_empty() {
                1.0
            } else {
                stable as f64 / total as f64
            };
            scores.push((id, score));
        }

        for (id, score) in scores {
            self.poset.element_mut(id)?.set_measure(STAB, score);
        }
        debug!(concepts = ids.len(), "Computed exact stability");
        Ok(())
    }

    /// Attach `LStab` / `UStab` to every concept.
    ///
    /// With `d_i` the extent difference to each direct subconcept:
    /// `LStab = 1 - Σ 2^-d_i` and `UStab = 1 - max 2^-d_i`; a concept with
    /// no subconcepts gets 1 for both.
    pub fn calc_stability_bounds(&mut self) -> Result<()> {
        let ids: Vec<usize> = self.ids().collect();
        let mut bounds = Vec::with_capacity(ids.len());

        for &id in &ids {
            let concept = self.poset.element(id)?;
            let support = concept.support();
            let mut sum = 0.0f64;
            let mut max = 0.0f64;
            for child in self.poset.direct_sub_elements(id)?.iter() {
                let diff = support - self.poset.element(*child)?.support();
                let weight = 2f64.powi(-(diff as i32));
                sum += weight;
                max = max.max(weight);
            }
            bounds.push((id, 1.0 - sum, 1.0 - max));
        }

        for (id, lower, upper) in bounds {
            let concept = self.poset.element_mut(id)?;
            concept.set_measure(LSTAB, lower);
            concept.set_measure(USTAB, upper);
        }
        Ok(())
    }
}

impl ConceptLattice<BitSet> {
    /// Plain data for every live concept, ascending by id
    pub fn records(&self) -> Vec<ConceptRecord> {
        self.concepts().map(|(_, c)| c.record()).collect()
    }

    /// Attributes of the concept that no direct superconcept carries
    pub fn new_intent(&self, id: usize) -> Result<BitSet> {
        let mut intent = self.concept(id)?.intent().clone();
        for parent in self.parents(id)? {
            intent.difference_with(self.concept(parent)?.intent());
        }
        Ok(intent)
    }
}

fn is_subconcept<I>(a: &Concept<I>, b: &Concept<I>) -> bool {
    a.is_subconcept_of(b)
}

fn unique(ids: &BTreeSet<usize>, what: &str) -> Result<usize> {
    let mut iter = ids.iter();
    match (iter.next(), iter.next()) {
        (Some(&id), None) => Ok(id),
        (None, _) => Err(LatticeError::NotALattice(format!("no {what} concept"))),
        (Some(_), Some(_)) => Err(LatticeError::NotALattice(format!(
            "{} {what} concepts",
            ids.len()
        ))),
    }
}
