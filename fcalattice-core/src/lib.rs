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

//! Fcalattice Core
//!
//! Data model shared by the miners and the lattice index:
//!
//! - **Contexts**: `BitVectorTable` (binary, bit-parallel derivation) and
//!   `IntervalContext` (many-valued, interval patterns)
//! - **Closure**: the `GaloisConnection` capability every miner is generic over
//! - **Concepts**: closed (extent, intent) pairs with attached measures
//! - **Runtime**: `MiningConfig`, the fixed `WorkerPool`, `LatticeError`

pub mod bitset;
pub mod closure;
pub mod concept;
pub mod config;
pub mod error;
pub mod pattern;
pub mod pool;
pub mod table;

pub use bitset::BitSet;
pub use closure::GaloisConnection;
pub use concept::{sort_concepts, Concept, ConceptRecord};
pub use config::{
    resolve_worker_count, support_count, Algorithm, CboOrientation, LatticeStrategy,
    MiningConfig, RankingMeasure, DEFAULT_MAX_CONCEPTS,
};
pub use error::{Axis, LatticeError, Result};
pub use pattern::{IntervalContext, IntervalPattern};
pub use pool::WorkerPool;
pub use table::BitVectorTable;

/// Whether a mined concept set is known to be every concept of the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Completeness {
    Exact,
    /// A budget (concept bound or sweep limit) cut the search short
    Approximate,
}
