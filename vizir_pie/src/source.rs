// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row access for pie data.
//!
//! The layout reads points through [`PointSource`] so callers can keep data in whatever shape
//! they already have. [`PieData`] is a small owned implementation for demos and tests.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

/// Read-only access to the rows of a pie.
pub trait PointSource {
    /// Number of rows, including missing ones.
    fn row_count(&self) -> usize;

    /// The numeric value of a row.
    ///
    /// Non-numeric or absent values should be reported as `None`.
    fn value(&self, row: usize) -> Option<f64>;

    /// The display name (category) of a row.
    fn name(&self, row: usize) -> Option<&str>;

    /// Whether the row's slice is exploded.
    fn exploded(&self, row: usize) -> bool {
        let _ = row;
        false
    }
}

/// One row of [`PieData`].
#[derive(Clone, Debug, PartialEq)]
pub struct PieDatum {
    /// Category name.
    pub name: String,
    /// Value; `None` marks a missing point.
    pub value: Option<f64>,
    /// Whether the slice is exploded.
    pub exploded: bool,
}

impl PieDatum {
    /// Creates a non-exploded datum.
    pub fn new(name: impl Into<String>, value: impl Into<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            exploded: false,
        }
    }

    /// Sets the exploded flag.
    pub fn with_exploded(mut self, exploded: bool) -> Self {
        self.exploded = exploded;
        self
    }
}

/// An owned list of pie rows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PieData {
    /// Rows in iteration order.
    pub rows: Vec<PieDatum>,
}

impl PieData {
    /// Creates pie data from rows.
    pub fn new(rows: Vec<PieDatum>) -> Self {
        Self { rows }
    }

    /// Creates pie data from bare values, naming rows `"0"`, `"1"`, ...
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            rows: values
                .iter()
                .enumerate()
                .map(|(i, v)| PieDatum::new(alloc::format!("{i}"), *v))
                .collect(),
        }
    }

    /// Flips the exploded flag of `row`. Returns the new state.
    pub fn toggle_exploded(&mut self, row: usize) -> Option<bool> {
        let datum = self.rows.get_mut(row)?;
        datum.exploded = !datum.exploded;
        Some(datum.exploded)
    }
}

impl PointSource for PieData {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn value(&self, row: usize) -> Option<f64> {
        self.rows.get(row).and_then(|d| d.value)
    }

    fn name(&self, row: usize) -> Option<&str> {
        self.rows.get(row).map(|d| d.name.as_str())
    }

    fn exploded(&self, row: usize) -> bool {
        self.rows.get(row).is_some_and(|d| d.exploded)
    }
}
