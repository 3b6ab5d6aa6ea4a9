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

//! Fcalattice Index Layer
//!
//! Order structures over mined concepts.
//!
//! - **Hasse index** (`hasse`): concurrent direct-cover adjacency plus the
//!   plain sorted `CoveringRelation`
//! - **Builder** (`builder`): spanning-tree and pairwise covering
//!   construction, optionally on the worker pool
//! - **POSet** (`poset`): generic partial order with lazily filled caches
//! - **Lattice** (`lattice`): concepts ordered by extent inclusion,
//!   incremental edits, exact stability and stability bounds

pub mod builder;
pub mod hasse;
pub mod lattice;
pub mod poset;

pub use builder::{check_concepts, verify_covering, LatticeBuilder};
pub use hasse::{CoveringRelation, HasseIndex};
pub use lattice::{ConceptLattice, LSTAB, MAX_STABILITY_EXTENT, STAB, USTAB};
pub use poset::{IdSet, PartialOrderSet};
