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

//! Fcalattice Mining
//!
//! Concept miners and the construction entry point:
//!
//! - **Close-by-One** (`cbo`): exhaustive canonical enumeration, optionally
//!   split over the worker pool
//! - **Sofia** (`sofia`): bounded beam search over projections
//! - **Lindig** (`lindig`): upper-neighbour walk yielding concepts and covers
//! - **Decision paths** (`paths`): concepts closed from externally supplied
//!   object sets
//! - **Construction** (`construction`): `LatticeConstruction`, which runs
//!   the configured miner and assembles the lattice

pub mod cbo;
pub mod construction;
pub mod lindig;
pub mod paths;
pub mod sofia;

pub use cbo::{CboContext, CloseByOne};
pub use construction::{ConstructionOutput, LatticeConstruction};
pub use lindig::{lindig, upper_neighbours};
pub use paths::concepts_from_paths;
pub use sofia::Sofia;
