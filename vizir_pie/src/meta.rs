// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-point layout metadata.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::Point;

use crate::geometry::{SliceAngles, standard_angle};
use crate::label::LabelAnchor;

/// The side of the pie a label is placed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Labels whose slice bisector points left (`90..=270` degrees).
    Left,
    /// Labels whose slice bisector points right.
    Right,
}

impl Side {
    /// Classifies a slice by its mid angle (degrees, any range).
    ///
    /// Exactly `90` and `270` fall on the left.
    pub fn from_mid_angle(mid_angle: f64) -> Self {
        let a = standard_angle(mid_angle);
        if a < 90.0 || a > 270.0 {
            Self::Right
        } else {
            Self::Left
        }
    }

    /// The label anchor used on this side.
    pub fn label_anchor(self) -> LabelAnchor {
        match self {
            Self::Right => LabelAnchor::LeftCenter,
            Self::Left => LabelAnchor::RightCenter,
        }
    }

    /// `1.0` on the right, `-1.0` on the left.
    pub fn sign(self) -> f64 {
        match self {
            Self::Right => 1.0,
            Self::Left => -1.0,
        }
    }
}

/// Layout metadata of one non-missing point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMeta {
    /// Start angle in degrees.
    pub start: f64,
    /// Sweep in degrees.
    pub sweep: f64,
    /// Resolved explode distance; `0` for slices that are not exploded.
    pub explode: f64,
    /// Signed connector stub length: positive on the right, negative on the left.
    pub connector: f64,
    /// Label side.
    pub side: Side,
    /// Where the connector leaves the (possibly exploded) slice.
    pub anchor: Point,
}

impl PointMeta {
    /// Start and sweep as [`SliceAngles`].
    pub fn angles(&self) -> SliceAngles {
        SliceAngles {
            start: self.start,
            sweep: self.sweep,
        }
    }

    /// Mid angle in degrees.
    pub fn mid_angle(&self) -> f64 {
        self.angles().mid_angle()
    }
}

/// Point-indexed side table of [`PointMeta`]. Missing points have no entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointMetaTable {
    entries: Vec<Option<PointMeta>>,
}

impl PointMetaTable {
    /// Creates a table for `row_count` rows, all empty.
    pub fn with_rows(row_count: usize) -> Self {
        Self {
            entries: alloc::vec![None; row_count],
        }
    }

    /// Stores the metadata of `index`, growing the table if needed.
    pub fn insert(&mut self, index: usize, meta: PointMeta) {
        if self.entries.len() <= index {
            self.entries.resize(index + 1, None);
        }
        self.entries[index] = Some(meta);
    }

    /// Metadata of `index`, if the point is not missing.
    pub fn get(&self, index: usize) -> Option<&PointMeta> {
        self.entries.get(index).and_then(Option::as_ref)
    }

    /// Iterates `(index, meta)` over non-missing points in row order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PointMeta)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.as_ref().map(|m| (i, m)))
    }

    /// Number of rows covered (missing ones included).
    pub fn row_count(&self) -> usize {
        self.entries.len()
    }
}
