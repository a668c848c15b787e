// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connector anchors and side classification.
//!
//! Points are visited in row order, which wraps around the pie. A side's labels therefore do
//! not arrive in one continuous run: the right side, for example, is entered at the top
//! (`270..360`), left at `90`, and entered again just past `270`. Each side keeps a secondary
//! bucket for the labels that arrive after the seam was crossed; the secondary bucket goes
//! in front of the primary one so the side reads as one continuous arc.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::Point;
use smallvec::SmallVec;

use crate::geometry::{SliceAngles, polar, standard_angle};
use crate::meta::Side;

/// Where a connector starts and which side its label goes to.
///
/// The anchor lies on the outer edge of the slice, pushed out by `explode` along the mid angle.
pub fn connector_anchor(
    center: Point,
    angles: SliceAngles,
    radius: f64,
    explode: f64,
) -> (Point, Side) {
    let mid = angles.mid_angle();
    (center + polar(radius + explode, mid), Side::from_mid_angle(mid))
}

type Bucket = SmallVec<[usize; 16]>;

/// The labels of one explode level, split by side, in stacking order.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExplodeLevel {
    pub(crate) explode: f64,
    left: Bucket,
    right: Bucket,
    left2: Bucket,
    right2: Bucket,
}

impl ExplodeLevel {
    fn new(explode: f64) -> Self {
        Self {
            explode,
            ..Self::default()
        }
    }

    /// Right-side point indices, seam bucket first.
    pub(crate) fn right(&self) -> Vec<usize> {
        self.right2.iter().chain(self.right.iter()).copied().collect()
    }

    /// Left-side point indices, seam bucket first.
    pub(crate) fn left(&self) -> Vec<usize> {
        self.left2.iter().chain(self.left.iter()).copied().collect()
    }
}

/// Buckets labels per explode level and side.
///
/// The seam switches are shared by all levels and never reset during a pass.
#[derive(Clone, Debug, Default)]
pub(crate) struct SideBuckets {
    levels: Vec<ExplodeLevel>,
    switch_to_right: bool,
    switch_to_left: bool,
}

impl SideBuckets {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Files point `index` whose slice bisects at `mid_angle` degrees.
    pub(crate) fn push(&mut self, index: usize, mid_angle: f64, side: Side, explode: f64) {
        let angle = standard_angle(mid_angle);
        let pos = match self
            .levels
            .iter()
            .position(|l| l.explode.to_bits() == explode.to_bits())
        {
            Some(pos) => pos,
            None => {
                self.levels.push(ExplodeLevel::new(explode));
                self.levels.len() - 1
            }
        };
        let level = &mut self.levels[pos];

        if angle > 270.0
            && !self.switch_to_right
            && (!level.left.is_empty() || !level.left2.is_empty())
        {
            self.switch_to_right = true;
        }
        if angle > 90.0
            && !self.switch_to_left
            && (!level.right.is_empty() || !level.right2.is_empty())
        {
            self.switch_to_left = true;
        }

        let bucket = match (side, self.switch_to_right, self.switch_to_left) {
            (Side::Right, true, _) => &mut level.right2,
            (Side::Right, false, _) => &mut level.right,
            (Side::Left, _, true) => &mut level.left2,
            (Side::Left, _, false) => &mut level.left,
        };
        bucket.push(index);
    }

    /// The explode levels, largest explode first.
    pub(crate) fn into_levels(mut self) -> Vec<ExplodeLevel> {
        self.levels.sort_by(|a, b| b.explode.total_cmp(&a.explode));
        self.levels
    }
}
