// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outside labels and the store that owns them.
//!
//! A [`Label`] is bound to one point index. Its position is polar, `(angle, radius)` around
//! the pie center, in the same coordinate system as the slices. The [`LabelStore`] owns all
//! labels of a pie; everything else (domains, connectors) refers to labels by point index.
//!
//! Label bounds are cached per index. Any change of angle, radius or text must go through the
//! store so the cache entry is dropped.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell;

use kurbo::{Point, Rect, Size};

use crate::geometry::polar;
use crate::measure::anchored_rect;

/// Which point of the label box sits on the label position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelAnchor {
    /// The middle of the left edge; used for labels on the right side of the pie.
    LeftCenter,
    /// The middle of the right edge; used for labels on the left side of the pie.
    RightCenter,
}

/// One outside label.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    index: usize,
    text: String,
    size: Size,
    angle: f64,
    radius: f64,
    anchor: LabelAnchor,
    enabled: bool,
}

impl Label {
    /// The point index this label belongs to.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Label text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Measured (padded) size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Angle in degrees, without the configured label offset.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Distance from the pie center, without the configured label offset.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Anchor of the label box.
    pub fn anchor(&self) -> LabelAnchor {
        self.anchor
    }

    /// Whether the label is shown. Labels dropped by the layout are disabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

/// Owns the labels of one pie, indexed by point index.
#[derive(Debug, Default)]
pub struct LabelStore {
    center: Point,
    offset_angle: f64,
    offset_radius: f64,
    labels: Vec<Option<Label>>,
    bounds_cache: Vec<Cell<Option<Rect>>>,
}

impl LabelStore {
    /// Creates an empty store for a pie centered at `center`.
    ///
    /// `offset_angle` (degrees) and `offset_radius` are added to every label position when it
    /// is measured or drawn.
    pub fn new(center: Point, offset_angle: f64, offset_radius: f64) -> Self {
        Self {
            center,
            offset_angle,
            offset_radius,
            labels: Vec::new(),
            bounds_cache: Vec::new(),
        }
    }

    /// Pie center.
    pub fn center(&self) -> Point {
        self.center
    }

    /// Angle offset in degrees.
    pub fn offset_angle(&self) -> f64 {
        self.offset_angle
    }

    /// Radius offset.
    pub fn offset_radius(&self) -> f64 {
        self.offset_radius
    }

    /// Adds (or replaces) the label for point `index`.
    pub fn add(
        &mut self,
        index: usize,
        text: String,
        size: Size,
        angle: f64,
        radius: f64,
        anchor: LabelAnchor,
    ) -> &mut Label {
        if self.labels.len() <= index {
            self.labels.resize(index + 1, None);
            self.bounds_cache.resize_with(index + 1, Cell::default);
        }
        self.bounds_cache[index].set(None);
        self.labels[index].insert(Label {
            index,
            text,
            size,
            angle,
            radius,
            anchor,
            enabled: true,
        })
    }

    /// The label for point `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index).and_then(Option::as_ref)
    }

    /// Iterates over all labels in point order.
    pub fn iter(&self) -> impl Iterator<Item = &Label> + '_ {
        self.labels.iter().flatten()
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns `true` if the store holds no labels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of enabled labels.
    pub fn enabled_count(&self) -> usize {
        self.iter().filter(|l| l.enabled).count()
    }

    /// Whether the label for `index` exists and is enabled.
    pub fn is_enabled(&self, index: usize) -> bool {
        self.get(index).is_some_and(Label::enabled)
    }

    /// Enables or disables the label for `index`.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) {
        if let Some(label) = self.labels.get_mut(index).and_then(Option::as_mut) {
            label.enabled = enabled;
        }
    }

    /// Moves the label for `index` and drops its cached bounds.
    pub fn set_position(&mut self, index: usize, angle: f64, radius: f64) {
        if let Some(label) = self.labels.get_mut(index).and_then(Option::as_mut) {
            label.angle = angle;
            label.radius = radius;
            self.drop_bounds_cache(index);
        }
    }

    /// Forgets the cached bounds of the label for `index`.
    pub fn drop_bounds_cache(&self, index: usize) {
        if let Some(cell) = self.bounds_cache.get(index) {
            cell.set(None);
        }
    }

    /// The point the label's anchor sits on, offsets included.
    pub fn position(&self, index: usize) -> Option<Point> {
        let label = self.get(index)?;
        Some(
            self.center
                + polar(
                    label.radius + self.offset_radius,
                    label.angle + self.offset_angle,
                ),
        )
    }

    /// Bounds of the label for `index` at its current position.
    ///
    /// Returns an empty rectangle if there is no such label.
    pub fn bounds(&self, index: usize) -> Rect {
        let Some(cell) = self.bounds_cache.get(index) else {
            return Rect::ZERO;
        };
        if let Some(rect) = cell.get() {
            return rect;
        }
        let (Some(label), Some(pos)) = (self.get(index), self.position(index)) else {
            return Rect::ZERO;
        };
        let rect = anchored_rect(pos, label.size, label.anchor);
        cell.set(Some(rect));
        rect
    }
}
