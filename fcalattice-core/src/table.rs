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

//! Binary formal context
//!
//! `BitVectorTable` stores the incidence relation twice: one bit-vector per
//! attribute (the column view, over objects) and one per object (the row
//! view, over attributes). The derivation operators then reduce to AND-ing
//! the relevant vectors:
//!
//! ```text
//! extension(B) = ⋂_{m ∈ B} column(m)        (all objects when B = ∅)
//! intention(A) = ⋂_{g ∈ A} row(g)           (all attributes when A = ∅)
//! ```
//!
//! Both views are kept consistent: `set` is the only mutation and writes
//! through to both. `transpose` swaps them without recomputing anything.

use crate::bitset::BitSet;
use crate::error::{Axis, LatticeError, Result};

/// Binary object × attribute incidence table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVectorTable {
    object_names: Vec<String>,
    attribute_names: Vec<String>,
    /// One bit-vector per attribute, over objects
    columns: Vec<BitSet>,
    /// One bit-vector per object, over attributes
    rows: Vec<BitSet>,
}

impl BitVectorTable {
    /// Build a table from dense boolean rows, one row per object.
    ///
    /// Objects and attributes get their index as name; use
    /// [`with_names`](Self::with_names) to rename them.
    pub fn from_rows(rows: &[Vec<bool>]) -> Result<Self> {
        let n_attributes = rows.first().map(Vec::len).unwrap_or(0);

        let mut incidence = Vec::with_capacity(rows.len());
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != n_attributes {
                return Err(LatticeError::RaggedRows {
                    row,
                    expected: n_attributes,
                    actual: cells.len(),
                });
            }
            incidence.push(
                cells
                    .iter()
                    .enumerate()
                    .filter_map(|(m, &cell)| cell.then_some(m))
                    .collect::<Vec<_>>(),
            );
        }

        Self::from_incidence(rows.len(), n_attributes, &incidence)
    }

    /// Build a table from per-object attribute index lists
    pub fn from_incidence(
        n_objects: usize,
        n_attributes: usize,
        incidence: &[Vec<usize>],
    ) -> Result<Self> {
        if incidence.len() != n_objects {
            return Err(LatticeError::DimensionMismatch {
                expected: n_objects,
                actual: incidence.len(),
            });
        }

        let mut rows = Vec::with_capacity(n_objects);
        let mut columns = vec![BitSet::empty(n_objects); n_attributes];
        for (g, attributes) in incidence.iter().enumerate() {
            let row = BitSet::from_indices(n_attributes, attributes.iter().copied(), Axis::Attribute)?;
            for m in row.iter_ones() {
                columns[m].insert(g);
            }
            rows.push(row);
        }

        Ok(Self {
            object_names: default_names(n_objects),
            attribute_names: default_names(n_attributes),
            columns,
            rows,
        })
    }

    /// Replace object and attribute names. Counts must match the table.
    pub fn with_names<S: Into<String>>(
        mut self,
        object_names: impl IntoIterator<Item = S>,
        attribute_names: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let object_names: Vec<String> = object_names.into_iter().map(Into::into).collect();
        let attribute_names: Vec<String> = attribute_names.into_iter().map(Into::into).collect();

        if object_names.len() != self.n_objects() {
            return Err(LatticeError::DimensionMismatch {
                expected: self.n_objects(),
                actual: object_names.len(),
            });
        }
        if attribute_names.len() != self.n_attributes() {
            return Err(LatticeError::DimensionMismatch {
                expected: self.n_attributes(),
                actual: attribute_names.len(),
            });
        }

        self.object_names = object_names;
        self.attribute_names = attribute_names;
        Ok(self)
    }

    pub fn n_objects(&self) -> usize {
        self.rows.len()
    }

    pub fn n_attributes(&self) -> usize {
        self.columns.len()
    }

    pub fn object_names(&self) -> &[String] {
        &self.object_names
    }

    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    /// Number of incident (object, attribute) pairs
    pub fn n_connections(&self) -> usize {
        self.rows.iter().map(BitSet::count).sum()
    }

    pub fn object_index(&self, name: &str) -> Result<usize> {
        lookup(&self.object_names, name, Axis::Object)
    }

    pub fn attribute_index(&self, name: &str) -> Result<usize> {
        lookup(&self.attribute_names, name, Axis::Attribute)
    }

    /// Objects having attribute `m`
    pub fn column(&self, m: usize) -> Result<&BitSet> {
        self.columns.get(m).ok_or(LatticeError::IndexOutOfRange {
            axis: Axis::Attribute,
            index: m,
            len: self.n_attributes(),
        })
    }

    /// Attributes of object `g`
    pub fn row(&self, g: usize) -> Result<&BitSet> {
        self.rows.get(g).ok_or(LatticeError::IndexOutOfRange {
            axis: Axis::Object,
            index: g,
            len: self.n_objects(),
        })
    }

    pub fn columns(&self) -> &[BitSet] {
        &self.columns
    }

    pub fn rows(&self) -> &[BitSet] {
        &self.rows
    }

    pub fn get(&self, g: usize, m: usize) -> Result<bool> {
        let row = self.row(g)?;
        self.column(m)?;
        Ok(row.contains(m))
    }

    /// Set or clear one incidence cell, in both views
    pub fn set(&mut self, g: usize, m: usize, value: bool) -> Result<()> {
        self.row(g)?;
        self.column(m)?;

        if value {
            self.rows[g].insert(m);
            self.columns[m].insert(g);
        } else {
            self.rows[g].remove(m);
            self.columns[m].remove(g);
        }
        Ok(())
    }

    /// Swap objects and attributes. The stored views are moved, not rebuilt.
    pub fn transpose(self) -> Self {
        Self {
            object_names: self.attribute_names,
            attribute_names: self.object_names,
            columns: self.rows,
            rows: self.columns,
        }
    }

    /// Dense boolean rows, one per object
    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.rows
            .iter()
            .map(|row| (0..self.n_attributes()).map(|m| row.contains(m)).collect())
            .collect()
    }

    /// Objects sharing every attribute of `intent`
    ///
    /// # Panics
    /// If `intent` is not over this table's attributes.
    pub fn extension_bits(&self, intent: &BitSet) -> BitSet {
        assert_eq!(intent.universe(), self.n_attributes(), "intent universe");
        let mut extent = BitSet::full(self.n_objects());
        for m in intent.iter_ones() {
            extent.intersect_with(&self.columns[m]);
            if extent.is_empty() {
                break;
            }
        }
        extent
    }

    /// Attributes shared by every object of `extent`
    ///
    /// # Panics
    /// If `extent` is not over this table's objects.
    pub fn intention_bits(&self, extent: &BitSet) -> BitSet {
        assert_eq!(extent.universe(), self.n_objects(), "extent universe");
        let mut intent = BitSet::full(self.n_attributes());
        for g in extent.iter_ones() {
            intent.intersect_with(&self.rows[g]);
            if intent.is_empty() {
                break;
            }
        }
        intent
    }

    /// Object indices sharing all attributes in `attributes`
    pub fn extension_i(&self, attributes: &[usize]) -> Result<Vec<usize>> {
        let intent = self.attribute_set(attributes)?;
        Ok(self.extension_bits(&intent).to_indices())
    }

    /// Attribute indices shared by all objects in `objects`
    pub fn intention_i(&self, objects: &[usize]) -> Result<Vec<usize>> {
        let extent = self.object_set(objects)?;
        Ok(self.intention_bits(&extent).to_indices())
    }

    /// Name-based [`extension_i`](Self::extension_i)
    pub fn extension<S: AsRef<str>>(&self, attributes: &[S]) -> Result<Vec<String>> {
        let indices = attributes
            .iter()
            .map(|name| self.attribute_index(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(self
            .extension_i(&indices)?
            .into_iter()
            .map(|g| self.object_names[g].clone())
            .collect())
    }

    /// Name-based [`intention_i`](Self::intention_i)
    pub fn intention<S: AsRef<str>>(&self, objects: &[S]) -> Result<Vec<String>> {
        let indices = objects
            .iter()
            .map(|name| self.object_index(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(self
            .intention_i(&indices)?
            .into_iter()
            .map(|m| self.attribute_names[m].clone())
            .collect())
    }

    /// `B''` for an attribute index set
    pub fn closure_of_attributes(&self, attributes: &[usize]) -> Result<Vec<usize>> {
        let intent = self.attribute_set(attributes)?;
        let extent = self.extension_bits(&intent);
        Ok(self.intention_bits(&extent).to_indices())
    }

    /// `A''` for an object index set
    pub fn closure_of_objects(&self, objects: &[usize]) -> Result<Vec<usize>> {
        let extent = self.object_set(objects)?;
        let intent = self.intention_bits(&extent);
        Ok(self.extension_bits(&intent).to_indices())
    }

    pub fn object_set(&self, objects: &[usize]) -> Result<BitSet> {
        BitSet::from_indices(self.n_objects(), objects.iter().copied(), Axis::Object)
    }

    pub fn attribute_set(&self, attributes: &[usize]) -> Result<BitSet> {
        BitSet::from_indices(self.n_attributes(), attributes.iter().copied(), Axis::Attribute)
    }
}

fn default_names(n: usize) -> Vec<String> {
    (0..n).map(|i| i.to_string()).collect()
}

fn lookup(names: &[String], name: &str, axis: Axis) -> Result<usize> {
    names
        .iter()
        .position(|n| n == name)
        .ok_or_else(|| LatticeError::UnknownName {
            axis,
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn birds() -> BitVectorTable {
        // fly, hunt, run, swim
        BitVectorTable::from_rows(&[
            vec![true, false, false, false],
            vec![true, false, false, true],
            vec![true, true, false, false],
            vec![false, true, true, false],
            vec![false, false, true, false],
        ])
        .unwrap()
        .with_names(
            ["dove", "duck", "owl", "fox", "dog"],
            ["fly", "hunt", "run", "swim"],
        )
        .unwrap()
    }

    #[test]
    #[should_panic(expected = "intent universe")]
    fn test_extension_bits_rejects_object_set() {
        let table = birds();
        // five objects, four attributes
        table.extension_bits(&BitSet::full(5));
    }

    #[test]
    #[should_panic(expected = "extent universe")]
    fn test_intention_bits_rejects_attribute_set() {
        let table = birds();
        table.intention_bits(&BitSet::full(4));
    }

    #[test]
    fn test_derivation_operators() {
        let table = birds();

        assert_eq!(table.extension_i(&[0]).unwrap(), vec![0, 1, 2]);
        assert_eq!(table.extension_i(&[0, 1]).unwrap(), vec![2]);
        assert_eq!(table.extension_i(&[]).unwrap(), vec![0, 1, 2, 3, 4]);

        assert_eq!(table.intention_i(&[2, 3]).unwrap(), vec![1]);
        assert_eq!(table.intention_i(&[]).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(table.intention_i(&[0, 4]).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_named_derivation() {
        let table = birds();
        assert_eq!(table.extension(&["hunt"]).unwrap(), vec!["owl", "fox"]);
        assert_eq!(table.intention(&["duck"]).unwrap(), vec!["fly", "swim"]);

        let err = table.extension(&["bark"]).unwrap_err();
        assert!(matches!(err, LatticeError::UnknownName { axis: Axis::Attribute, .. }));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let table = birds();
        assert!(matches!(
            table.extension_i(&[4]),
            Err(LatticeError::IndexOutOfRange { axis: Axis::Attribute, index: 4, len: 4 })
        ));
        assert!(matches!(
            table.intention_i(&[7]),
            Err(LatticeError::IndexOutOfRange { axis: Axis::Object, index: 7, len: 5 })
        ));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = BitVectorTable::from_rows(&[vec![true, false], vec![true]]).unwrap_err();
        assert!(matches!(err, LatticeError::RaggedRows { row: 1, expected: 2, actual: 1 }));
    }

    #[test]
    fn test_name_count_mismatch_rejected() {
        let err = birds().with_names(["a", "b"], ["fly", "hunt", "run", "swim"]).unwrap_err();
        assert!(matches!(err, LatticeError::DimensionMismatch { expected: 5, actual: 2 }));
    }

    #[test]
    fn test_set_keeps_views_consistent() {
        let mut table = birds();
        table.set(4, 0, true).unwrap();
        assert!(table.get(4, 0).unwrap());
        assert!(table.column(0).unwrap().contains(4));
        assert!(table.row(4).unwrap().contains(0));

        table.set(4, 0, false).unwrap();
        assert!(!table.column(0).unwrap().contains(4));
        assert_eq!(table.n_connections(), 8);
    }

    #[test]
    fn test_transpose_swaps_views() {
        let table = birds();
        let rows = table.to_rows();
        let transposed = table.clone().transpose();

        assert_eq!(transposed.n_objects(), 4);
        assert_eq!(transposed.n_attributes(), 5);
        assert_eq!(transposed.object_names()[0], "fly");
        for (g, row) in rows.iter().enumerate() {
            for (m, &cell) in row.iter().enumerate() {
                assert_eq!(transposed.get(m, g).unwrap(), cell);
            }
        }
        assert_eq!(transposed.transpose(), table);
    }

    #[test]
    fn test_closures() {
        let table = birds();
        // swim implies fly
        assert_eq!(table.closure_of_attributes(&[3]).unwrap(), vec![0, 3]);
        // dove and duck share only fly, whose extent adds owl
        assert_eq!(table.closure_of_objects(&[0, 1]).unwrap(), vec![0, 1, 2]);
    }
}
