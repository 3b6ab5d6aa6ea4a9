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

//! Lattice error types

use thiserror::Error;

/// Result type for context, mining and lattice operations
pub type Result<T> = std::result::Result<T, LatticeError>;

/// Which side of a context an index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Object,
    Attribute,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Object => write!(f, "object"),
            Axis::Attribute => write!(f, "attribute"),
        }
    }
}

/// Errors raised by the lattice core.
///
/// Every variant except `Io` and `Config` is a rejected-input failure:
/// the caller handed over data that violates a documented precondition.
#[derive(Debug, Error)]
pub enum LatticeError {
    #[error("{axis} index {index} out of range (size {len})")]
    IndexOutOfRange { axis: Axis, index: usize, len: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Unknown {axis} name: {name}")]
    UnknownName { axis: Axis, name: String },

    #[error("Row {row} has {actual} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Two concepts share the same extent
    #[error("Duplicate concept: positions {first} and {second} have equal extents")]
    DuplicateConcept { first: usize, second: usize },

    /// The injected `<=` predicate is not a partial order
    #[error("Inconsistent order: {0}")]
    InconsistentOrder(String),

    /// An (extent, intent) pair is not a fixed point of the closure
    #[error("Pair is not closed: {0}")]
    NotClosed(String),

    #[error("Not a lattice: {0}")]
    NotALattice(String),

    #[error("Unknown element id: {0}")]
    UnknownElement(usize),

    #[error("RandomForest construction requires decision path extents")]
    MissingDecisionPaths,

    /// One or more pool workers panicked; the pool was torn down
    #[error("Worker failure: {0}")]
    WorkerPanicked(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for LatticeError {
    fn from(e: toml::de::Error) -> Self {
        LatticeError::Config(e.to_string())
    }
}
