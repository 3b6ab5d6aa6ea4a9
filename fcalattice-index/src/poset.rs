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

//! Partially ordered set with lazily filled order caches
//!
//! Elements live in an arena and keep their id for life; removal leaves a
//! tombstone. The order itself is an injected `≤` predicate. Four caches
//! (super, sub, direct super, direct sub) start empty and are filled on
//! first query, so repeated queries cost a map lookup:
//!
//! - `super_elements(e)` / `sub_elements(e)` include `e` itself. On a miss
//!   the set is the union of the neighbours' cached sets when every direct
//!   neighbour is already cached, otherwise a sweep over all live elements.
//! - `direct_*` sets are the minimal / maximal elements of the strict
//!   related set.
//!
//! `add` and `remove` patch only the caches of comparable elements.
//!
//! **Thread safety:** queries take `&self`; caches sit behind a
//! `parking_lot::RwLock` that is never held while the predicate runs.

use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

use fcalattice_core::{LatticeError, Result};

use crate::hasse::CoveringRelation;

/// Shared, immutable id set returned by cache queries
pub type IdSet = Arc<BTreeSet<usize>>;

type LeqFn<T> = Box<dyn Fn(&T, &T) -> bool + Send + Sync>;

#[derive(Default)]
struct OrderCache {
    supers: HashMap<usize, IdSet>,
    subs: HashMap<usize, IdSet>,
    direct_supers: HashMap<usize, IdSet>,
    direct_subs: HashMap<usize, IdSet>,
    tops: Option<IdSet>,
    bottoms: Option<IdSet>,
}

#[derive(Clone, Copy)]
enum Direction {
    Up,
    Down,
}

impl OrderCache {
    fn related(&self, dir: Direction) -> &HashMap<usize, IdSet> {
        match dir {
            Direction::Up => &self.supers,
            Direction::Down => &self.subs,
        }
    }

    fn related_mut(&mut self, dir: Direction) -> &mut HashMap<usize, IdSet> {
        match dir {
            Direction::Up => &mut self.supers,
            Direction::Down => &mut self.subs,
        }
    }

    fn direct(&self, dir: Direction) -> &HashMap<usize, IdSet> {
        match dir {
            Direction::Up => &self.direct_supers,
            Direction::Down => &self.direct_subs,
        }
    }

    fn direct_mut(&mut self, dir: Direction) -> &mut HashMap<usize, IdSet> {
        match dir {
            Direction::Up => &mut self.direct_supers,
            Direction::Down => &mut self.direct_subs,
        }
    }
}

/// Arena of elements ordered by an injected `≤` predicate
pub struct PartialOrderSet<T> {
    elements: Vec<Option<T>>,
    leq: LeqFn<T>,
    cache: RwLock<OrderCache>,
}

impl<T> PartialOrderSet<T> {
    /// Empty set ordered by `leq`
    pub fn new<F>(leq: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self {
            elements: Vec::new(),
            leq: Box::new(leq),
            cache: RwLock::new(OrderCache::default()),
        }
    }

    /// Add every element in turn, checking the order as `add` does
    pub fn from_elements<F>(elements: Vec<T>, leq: F) -> Result<Self>
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        let mut poset = Self::new(leq);
        for element in elements {
            poset.add(element)?;
        }
        Ok(poset)
    }

    /// Trust `elements` and pre-fill the direct caches from a known
    /// covering relation (`covering.parents[i]` are the direct supers of
    /// element `i`)
    pub fn with_covering<F>(elements: Vec<T>, leq: F, covering: &CoveringRelation) -> Result<Self>
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        if covering.len() != elements.len() {
            return Err(LatticeError::DimensionMismatch {
                expected: elements.len(),
                actual: covering.len(),
            });
        }
        if let Some(&bad) = covering
            .parents
            .iter()
            .chain(&covering.children)
            .flatten()
            .find(|&&id| id >= elements.len())
        {
            return Err(LatticeError::UnknownElement(bad));
        }

        let mut cache = OrderCache::default();
        for i in 0..elements.len() {
            cache
                .direct_supers
                .insert(i, Arc::new(covering.parents_of(i).iter().copied().collect()));
            cache
                .direct_subs
                .insert(i, Arc::new(covering.children_of(i).iter().copied().collect()));
        }

        Ok(Self {
            elements: elements.into_iter().map(Some).collect(),
            leq: Box::new(leq),
            cache: RwLock::new(cache),
        })
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.elements.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One past the largest id ever handed out
    pub fn capacity(&self) -> usize {
        self.elements.len()
    }

    /// Live ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|_| i))
    }

    pub fn get(&self, id: usize) -> Option<&T> {
        self.elements.get(id).and_then(Option::as_ref)
    }

    pub fn element(&self, id: usize) -> Result<&T> {
        self.get(id).ok_or(LatticeError::UnknownElement(id))
    }

    /// Mutable access for data that does not take part in the order
    pub fn element_mut(&mut self, id: usize) -> Result<&mut T> {
        self.elements
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(LatticeError::UnknownElement(id))
    }

    /// `a ≤ b` by id
    pub fn leq(&self, a: usize, b: usize) -> Result<bool> {
        Ok((self.leq)(self.element(a)?, self.element(b)?))
    }

    /// Apply the predicate to two elements that need not be in the set
    pub fn leq_elements(&self, a: &T, b: &T) -> bool {
        (self.leq)(a, b)
    }

    /// Every `x` with `e ≤ x`, including `e`
    pub fn super_elements(&self, id: usize) -> Result<IdSet> {
        self.related(id, Direction::Up)
    }

    /// Every `x` with `x ≤ e`, including `e`
    pub fn sub_elements(&self, id: usize) -> Result<IdSet> {
        self.related(id, Direction::Down)
    }

    /// Minimal elements strictly above `e`
    pub fn direct_super_elements(&self, id: usize) -> Result<IdSet> {
        self.direct(id, Direction::Up)
    }

    /// Maximal elements strictly below `e`
    pub fn direct_sub_elements(&self, id: usize) -> Result<IdSet> {
        self.direct(id, Direction::Down)
    }

    fn compare(&self, dir: Direction, from: &T, to: &T) -> bool {
        match dir {
            Direction::Up => (self.leq)(from, to),
            Direction::Down => (self.leq)(to, from),
        }
    }

    fn related(&self, id: usize, dir: Direction) -> Result<IdSet> {
        let element = self.element(id)?;

        let neighbours = {
            let cache = self.cache.read();
            if let Some(set) = cache.related(dir).get(&id) {
                return Ok(Arc::clone(set));
            }
            // Union of the neighbours' sets, if every one of them is cached
            cache.direct(dir).get(&id).and_then(|direct| {
                direct
                    .iter()
                    .map(|n| cache.related(dir).get(n).cloned())
                    .collect::<Option<Vec<_>>>()
            })
        };

        let set: BTreeSet<usize> = match neighbours {
            Some(sets) => {
                let mut set = BTreeSet::from([id]);
                for s in sets {
                    set.extend(s.iter().copied());
                }
                set
            }
            None => self
                .ids()
                .filter(|&j| j == id || self.compare(dir, element, self.live(j)))
                .collect(),
        };

        let set = Arc::new(set);
        self.cache
            .write()
            .related_mut(dir)
            .insert(id, Arc::clone(&set));
        Ok(set)
    }

    fn direct(&self, id: usize, dir: Direction) -> Result<IdSet> {
        self.element(id)?;
        if let Some(set) = self.cache.read().direct(dir).get(&id) {
            return Ok(Arc::clone(set));
        }

        let related = self.related(id, dir)?;
        let strict: Vec<usize> = related.iter().copied().filter(|&j| j != id).collect();

        // j is direct when no other strictly related k lies between e and j
        let direct: BTreeSet<usize> = strict
            .iter()
            .copied()
            .filter(|&j| {
                !strict
                    .iter()
                    .any(|&k| k != j && self.compare(dir, self.live(k), self.live(j)))
            })
            .collect();

        let set = Arc::new(direct);
        self.cache.write().direct_mut(dir).insert(id, Arc::clone(&set));
        Ok(set)
    }

    // Only called with ids taken from the arena's live set
    fn live(&self, id: usize) -> &T {
        match &self.elements[id] {
            Some(element) => element,
            None => unreachable!("id {id} is a tombstone"),
        }
    }

    /// Elements with nothing strictly above them
    pub fn top_elements(&self) -> Result<IdSet> {
        if let Some(tops) = &self.cache.read().tops {
            return Ok(Arc::clone(tops));
        }
        let mut tops = BTreeSet::new();
        for id in self.ids() {
            if self.super_elements(id)?.len() == 1 {
                tops.insert(id);
            }
        }
        let tops = Arc::new(tops);
        self.cache.write().tops = Some(Arc::clone(&tops));
        Ok(tops)
    }

    /// Elements with nothing strictly below them
    pub fn bottom_elements(&self) -> Result<IdSet> {
        if let Some(bottoms) = &self.cache.read().bottoms {
            return Ok(Arc::clone(bottoms));
        }
        let mut bottoms = BTreeSet::new();
        for id in self.ids() {
            if self.sub_elements(id)?.len() == 1 {
                bottoms.insert(id);
            }
        }
        let bottoms = Arc::new(bottoms);
        self.cache.write().bottoms = Some(Arc::clone(&bottoms));
        Ok(bottoms)
    }

    /// Least common upper bound of `ids`, `None` when it does not exist
    pub fn join_elements(&self, ids: &[usize]) -> Result<Option<usize>> {
        self.bound(ids, Direction::Up)
    }

    /// Greatest common lower bound of `ids`, `None` when it does not exist
    pub fn meet_elements(&self, ids: &[usize]) -> Result<Option<usize>> {
        self.bound(ids, Direction::Down)
    }

    fn bound(&self, ids: &[usize], dir: Direction) -> Result<Option<usize>> {
        let mut common: BTreeSet<usize> = self.ids().collect();
        for &id in ids {
            let related = self.related(id, dir)?;
            common.retain(|j| related.contains(j));
        }

        // The bound is the common element every other common element is related to
        for &candidate in &common {
            let reach = self.related(candidate, dir)?;
            if common.iter().all(|j| reach.contains(j)) {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Add an element and return its id.
    ///
    /// Fails with `InconsistentOrder` when the predicate is not reflexive on
    /// the element, would make it equal to a live element, or breaks
    /// transitivity through it. The transitivity check fills the super and
    /// sub caches of every comparable element.
    pub fn add(&mut self, element: T) -> Result<usize> {
        if !(self.leq)(&element, &element) {
            return Err(LatticeError::InconsistentOrder(
                "predicate is not reflexive on the new element".into(),
            ));
        }

        let id = self.elements.len();
        let mut supers = BTreeSet::from([id]);
        let mut subs = BTreeSet::from([id]);
        for j in self.ids() {
            let other = self.live(j);
            let below = (self.leq)(&element, other);
            let above = (self.leq)(other, &element);
            if below && above {
                return Err(LatticeError::InconsistentOrder(format!(
                    "new element is equal to element {j}"
                )));
            }
            if below {
                supers.insert(j);
            }
            if above {
                subs.insert(j);
            }
        }

        self.check_transitive(id, &subs, &supers)?;
        self.elements.push(Some(element));

        let cache = self.cache.get_mut();
        for &j in supers.iter().filter(|&&j| j != id) {
            if let Some(set) = cache.subs.get_mut(&j) {
                Arc::make_mut(set).insert(id);
            }
        }
        for &j in subs.iter().filter(|&&j| j != id) {
            if let Some(set) = cache.supers.get_mut(&j) {
                Arc::make_mut(set).insert(id);
            }
        }
        for j in supers.iter().chain(subs.iter()) {
            cache.direct_supers.remove(j);
            cache.direct_subs.remove(j);
        }
        cache.supers.insert(id, Arc::new(supers));
        cache.subs.insert(id, Arc::new(subs));
        cache.tops = None;
        cache.bottoms = None;

        debug!(id, "Added poset element");
        Ok(id)
    }

    // Live elements are already ordered, so every broken chain runs through
    // the new element `id`
    fn check_transitive(
        &self,
        id: usize,
        subs: &BTreeSet<usize>,
        supers: &BTreeSet<usize>,
    ) -> Result<()> {
        for &t in supers.iter().filter(|&&t| t != id) {
            let above = self.related(t, Direction::Up)?;
            if let Some(u) = above.iter().find(|&u| !supers.contains(u)) {
                return Err(LatticeError::InconsistentOrder(format!(
                    "new ≤ {t} ≤ {u} but not new ≤ {u}"
                )));
            }
        }
        for &s in subs.iter().filter(|&&s| s != id) {
            let below = self.related(s, Direction::Down)?;
            if let Some(u) = below.iter().find(|&u| !subs.contains(u)) {
                return Err(LatticeError::InconsistentOrder(format!(
                    "{u} ≤ {s} ≤ new but not {u} ≤ new"
                )));
            }
            let above = self.related(s, Direction::Up)?;
            if let Some(t) = supers.iter().find(|&&t| t != id && !above.contains(&t)) {
                return Err(LatticeError::InconsistentOrder(format!(
                    "{s} ≤ new ≤ {t} but not {s} ≤ {t}"
                )));
            }
        }
        Ok(())
    }

    /// Remove an element, leaving a tombstone, and re-link its neighbours
    pub fn remove(&mut self, id: usize) -> Result<T> {
        let supers = self.super_elements(id)?;
        let subs = self.sub_elements(id)?;
        let parents = self.direct_super_elements(id)?;
        let children = self.direct_sub_elements(id)?;

        let element = self.elements[id]
            .take()
            .ok_or(LatticeError::UnknownElement(id))?;

        let leq = &self.leq;
        let elements = &self.elements;
        let cache = self.cache.get_mut();

        for j in subs.iter() {
            if let Some(set) = cache.supers.get_mut(j) {
                Arc::make_mut(set).remove(&id);
            }
        }
        for j in supers.iter() {
            if let Some(set) = cache.subs.get_mut(j) {
                Arc::make_mut(set).remove(&id);
            }
        }
        for dir_cache in [&mut cache.supers, &mut cache.subs, &mut cache.direct_supers, &mut cache.direct_subs] {
            dir_cache.remove(&id);
        }

        let is_leq = |a: usize, b: usize| match (&elements[a], &elements[b]) {
            (Some(a), Some(b)) => leq(a, b),
            _ => false,
        };

        // Children of the removed node take over its parents, unless an
        // existing direct parent already sits below that parent
        for &c in children.iter() {
            if let Some(set) = cache.direct_supers.get_mut(&c) {
                let set = Arc::make_mut(set);
                set.remove(&id);
                let kept: Vec<usize> = set.iter().copied().collect();
                for &p in parents.iter() {
                    if !kept.iter().any(|&q| is_leq(q, p)) {
                        set.insert(p);
                    }
                }
            }
        }
        for &p in parents.iter() {
            if let Some(set) = cache.direct_subs.get_mut(&p) {
                let set = Arc::make_mut(set);
                set.remove(&id);
                let kept: Vec<usize> = set.iter().copied().collect();
                for &c in children.iter() {
                    if !kept.iter().any(|&q| is_leq(c, q)) {
                        set.insert(c);
                    }
                }
            }
        }
        cache.tops = None;
        cache.bottoms = None;

        debug!(id, "Removed poset element");
        Ok(element)
    }

    /// Compute every cache entry now
    pub fn fill_up_cache(&self) -> Result<()> {
        let ids: Vec<usize> = self.ids().collect();
        for &id in &ids {
            self.super_elements(id)?;
            self.sub_elements(id)?;
        }
        for &id in &ids {
            self.direct_super_elements(id)?;
            self.direct_sub_elements(id)?;
        }
        self.top_elements()?;
        self.bottom_elements()?;
        Ok(())
    }

    /// Transitive closure upwards: id -> every element above it (inclusive)
    pub fn all_super_elements(&self) -> Result<BTreeMap<usize, IdSet>> {
        self.ids().map(|id| Ok((id, self.super_elements(id)?))).collect()
    }

    /// Transitive closure downwards: id -> every element below it (inclusive)
    pub fn all_sub_elements(&self) -> Result<BTreeMap<usize, IdSet>> {
        self.ids().map(|id| Ok((id, self.sub_elements(id)?))).collect()
    }

    /// Check reflexivity, antisymmetry and transitivity over all live elements
    pub fn validate_order(&self) -> Result<()> {
        let ids: Vec<usize> = self.ids().collect();
        for &a in &ids {
            if !self.leq(a, a)? {
                return Err(LatticeError::InconsistentOrder(format!("{a} ≤ {a} does not hold")));
            }
        }
        for &a in &ids {
            for &b in &ids {
                if a == b || !self.leq(a, b)? {
                    continue;
                }
                if self.leq(b, a)? {
                    return Err(LatticeError::InconsistentOrder(format!(
                        "{a} ≤ {b} and {b} ≤ {a}"
                    )));
                }
                for &c in &ids {
                    if self.leq(b, c)? && !self.leq(a, c)? {
                        return Err(LatticeError::InconsistentOrder(format!(
                            "{a} ≤ {b} ≤ {c} but not {a} ≤ {c}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Direct-cover edges of the live elements, indexed by id
    pub fn covering_relation(&self) -> Result<CoveringRelation> {
        let mut parents = vec![Vec::new(); self.capacity()];
        for id in self.ids() {
            parents[id] = self.direct_super_elements(id)?.iter().copied().collect();
        }
        Ok(CoveringRelation::from_parents(parents))
    }
}
