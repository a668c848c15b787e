// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Label domains: vertically stacked clusters of outside labels on one side of the pie.
//!
//! A domain takes the labels it holds at their natural positions, stacks them around the mean
//! of those positions, and slides each one along the label circle to its slot. How far a
//! connector has to bend to reach its slot is the label's *deviation*; a domain whose worst
//! deviation exceeds the critical angle (or whose stack no longer fits on the circle) is
//! *critical* and the resolver has to shed labels from it.
//!
//! Labels are listed bottom first: `labels[0]` gets the lowest slot.

extern crate alloc;

use alloc::vec::Vec;
use core::cell::Cell;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use kurbo::{Point, Rect};

use crate::config::PieGeometry;
use crate::geometry::{angle_between, polar, rects_overlap, to_polar};
use crate::label::LabelStore;
use crate::meta::{PointMeta, PointMetaTable, Side};

/// Keeps the stack strictly inside the label circle.
const EDGE_EPSILON: f64 = 0.1;

/// Shared read-only inputs of domain computations.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LayoutContext<'a> {
    pub(crate) geometry: &'a PieGeometry,
    pub(crate) meta: &'a PointMetaTable,
    pub(crate) store: &'a LabelStore,
}

/// A stack of labels on one side of the pie.
#[derive(Clone, Debug, PartialEq)]
pub struct Domain {
    side: Side,
    explode: f64,
    labels: Vec<usize>,
    dropped: Vec<usize>,
    positions: Vec<(f64, f64)>,
    deviations: Vec<f64>,
    y: f64,
    height: f64,
    x: f64,
    width: f64,
    first_height: f64,
    critical: bool,
    drop_index: Option<usize>,
    max_angle: f64,
    bounds_cache: Cell<Option<Rect>>,
}

impl Domain {
    pub(crate) fn new(side: Side, explode: f64) -> Self {
        Self {
            side,
            explode,
            labels: Vec::new(),
            dropped: Vec::new(),
            positions: Vec::new(),
            deviations: Vec::new(),
            y: 0.0,
            height: 0.0,
            x: 0.0,
            width: 0.0,
            first_height: 0.0,
            critical: false,
            drop_index: None,
            max_angle: f64::NAN,
            bounds_cache: Cell::new(None),
        }
    }

    /// Side of the pie this domain stacks labels on.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Explode level of the domain's slices.
    pub fn explode(&self) -> f64 {
        self.explode
    }

    /// Point indices of the member labels, bottom first.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Point indices of labels this domain dropped.
    pub fn dropped_labels(&self) -> &[usize] {
        &self.dropped
    }

    /// Computed `(angle, radius)` per member, offsets excluded.
    pub fn positions(&self) -> &[(f64, f64)] {
        &self.positions
    }

    /// Connector deviation per member, in degrees. Infeasible slots report infinity.
    pub fn deviations(&self) -> &[f64] {
        &self.deviations
    }

    /// Whether some member exceeds the critical angle or has no feasible slot.
    pub fn is_critical_angle(&self) -> bool {
        self.critical
    }

    /// The member with the largest deviation, i.e. the first one to drop.
    pub fn label_to_drop(&self) -> Option<usize> {
        self.drop_index.and_then(|j| self.labels.get(j).copied())
    }

    /// Largest member deviation in degrees; NaN for an empty domain.
    pub fn max_angle(&self) -> f64 {
        self.max_angle
    }

    /// Total stack height.
    pub fn height(&self) -> f64 {
        self.height
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Appends a label without recomputing.
    pub(crate) fn push(&mut self, index: usize) {
        self.labels.push(index);
        self.drop_bounds_cache();
    }

    /// Appends a label and recomputes the stack without resolving conflicts.
    pub(crate) fn soft_add(&mut self, index: usize, cx: &LayoutContext<'_>) {
        self.push(index);
        self.calc_domain(cx);
    }

    /// Removes the last member.
    pub(crate) fn pop(&mut self) -> Option<usize> {
        self.drop_bounds_cache();
        self.labels.pop()
    }

    /// Puts `labels` in front of the current members.
    pub(crate) fn prepend(&mut self, mut labels: Vec<usize>) {
        labels.append(&mut self.labels);
        self.labels = labels;
        self.drop_bounds_cache();
    }

    pub(crate) fn take_labels(&mut self) -> Vec<usize> {
        self.drop_bounds_cache();
        core::mem::take(&mut self.labels)
    }

    pub(crate) fn set_labels(&mut self, labels: Vec<usize>) {
        self.labels = labels;
        self.drop_bounds_cache();
    }

    pub(crate) fn take_dropped(&mut self) -> Vec<usize> {
        core::mem::take(&mut self.dropped)
    }

    /// Records a disabled label so the recovery pass can retry it.
    pub(crate) fn record_dropped(&mut self, index: usize) {
        if !self.dropped.contains(&index) {
            self.dropped.push(index);
        }
    }

    pub(crate) fn retain_dropped(&mut self, keep: impl Fn(usize) -> bool) {
        self.dropped.retain(|&i| keep(i));
    }

    pub(crate) fn extend_dropped(&mut self, dropped: Vec<usize>) {
        for index in dropped {
            self.record_dropped(index);
        }
    }

    /// Disables and removes the member with the largest deviation.
    ///
    /// Returns its point index, or `None` if the last computation chose nothing.
    pub(crate) fn drop_label(&mut self, store: &mut LabelStore) -> Option<usize> {
        let j = self.drop_index.take()?;
        if j >= self.labels.len() {
            return None;
        }
        let index = self.labels.remove(j);
        store.set_enabled(index, false);
        self.record_dropped(index);
        self.drop_bounds_cache();
        Some(index)
    }

    /// Re-enables every dropped label and forgets them.
    pub(crate) fn clear_dropped_labels(&mut self, store: &mut LabelStore) {
        for index in self.dropped.drain(..) {
            store.set_enabled(index, true);
        }
    }

    /// Recomputes the stack: slots, positions, deviations, extent and the drop candidate.
    pub(crate) fn calc_domain(&mut self, cx: &LayoutContext<'_>) {
        self.drop_bounds_cache();
        self.positions.clear();
        self.deviations.clear();
        self.critical = false;
        self.drop_index = None;
        self.max_angle = f64::NAN;
        if self.labels.is_empty() {
            self.y = 0.0;
            self.height = 0.0;
            self.x = 0.0;
            self.width = 0.0;
            self.first_height = 0.0;
            return;
        }

        let g = cx.geometry;
        let c = g.center;
        let pie_radius = g.radius + self.explode;
        let reach = pie_radius + g.connector_length;
        let label_radius = g.label_radius(self.explode) + g.offset_radius;
        let bottom_limit = c.y + reach - EDGE_EPSILON;
        let top_limit = c.y - reach + EDGE_EPSILON;

        let heights: Vec<f64> = self
            .labels
            .iter()
            .map(|&i| cx.store.bounds(i).height())
            .collect();
        let mut height = 0.0;
        let mut sum = 0.0;
        for (&index, &h) in self.labels.iter().zip(&heights) {
            sum += cx.store.bounds(index).y0 - height - h / 2.0;
            height += h;
        }
        let mut y = sum / self.labels.len() as f64;
        let mut slot = y + height;
        if slot > bottom_limit {
            slot = bottom_limit;
            y = bottom_limit - height;
        }
        let first_height = heights[0];
        if y + first_height < top_limit {
            slot = top_limit - first_height + height;
            y = top_limit - first_height;
        }

        let sign = self.side.sign();
        let stub = sign * g.connector_stub;
        let mut left = f64::INFINITY;
        let mut right = f64::NEG_INFINITY;

        for (j, &index) in self.labels.iter().enumerate() {
            let width = cx.store.bounds(index).width();
            let mid = cx.meta.get(index).map_or(0.0, PointMeta::mid_angle) + g.offset_angle;

            let dy = slot - c.y;
            let disc = reach * reach - dy * dy;
            let infeasible = disc < -1e-9 * reach * reach;
            let leg = disc.max(0.0).sqrt();
            let x = c.x + sign * leg;
            let target = Point::new(x, slot);

            let edge = c + polar(pie_radius, mid);
            let natural = c + polar(label_radius, mid);
            let deviation = angle_between(target - edge, natural - edge);
            let too_long = (target - c).hypot().floor() + g.offset_radius > label_radius;
            let invalid = infeasible || too_long;
            let score = if invalid { f64::INFINITY } else { deviation };

            if self.drop_index.is_none() || score > self.max_angle {
                self.max_angle = score;
                self.drop_index = Some(j);
            }
            if deviation > g.critical_angle || invalid {
                self.critical = true;
            }

            let label_x = x + stub;
            let (l, r) = match self.side {
                Side::Right => (label_x, label_x + width),
                Side::Left => (label_x - width, label_x),
            };
            left = left.min(l);
            right = right.max(r);

            let (angle, radius) = to_polar(Point::new(label_x, slot) - c);
            self.positions
                .push((angle - g.offset_angle, radius - g.offset_radius));
            self.deviations.push(score);

            let next = heights.get(j + 1).copied().unwrap_or(0.0);
            slot -= heights[j] / 2.0 + next / 2.0;
        }

        self.y = y;
        self.height = height;
        self.x = left;
        self.width = right - left;
        self.first_height = first_height;

        tracing::trace!(
            side = ?self.side,
            labels = self.labels.len(),
            y = self.y,
            height = self.height,
            max_angle = self.max_angle,
            critical = self.critical,
            "calc_domain"
        );
    }

    /// Bounds of the whole stack; `None` for an empty domain.
    pub fn bounds(&self) -> Option<Rect> {
        if self.labels.is_empty() {
            return None;
        }
        if let Some(rect) = self.bounds_cache.get() {
            return Some(rect);
        }
        let y0 = self.y + self.first_height / 2.0;
        let rect = Rect::new(self.x, y0, self.x + self.width, y0 + self.height);
        self.bounds_cache.set(Some(rect));
        Some(rect)
    }

    /// Forgets the cached bounds.
    pub fn drop_bounds_cache(&self) {
        self.bounds_cache.set(None);
    }

    /// Returns `true` unless `rect` overlaps this domain's bounds.
    pub fn is_not_intersect(&self, rect: Rect) -> bool {
        self.bounds().is_none_or(|b| !rects_overlap(b, rect))
    }

    /// Whether the two domains overlap.
    pub(crate) fn intersects(&self, other: &Self) -> bool {
        other.bounds().is_some_and(|b| !self.is_not_intersect(b))
    }

    /// Moves every member to its computed position.
    pub(crate) fn apply_positions(&self, store: &mut LabelStore) {
        for (&index, &(angle, radius)) in self.labels.iter().zip(&self.positions) {
            store.set_position(index, angle, radius);
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::format;

    use kurbo::Size;

    use super::*;
    use crate::anchor::connector_anchor;
    use crate::geometry::{SliceAngles, standard_angle};

    struct Fixture {
        geometry: PieGeometry,
        meta: PointMetaTable,
        store: LabelStore,
    }

    impl Fixture {
        fn new(critical_angle: f64) -> Self {
            let geometry = PieGeometry {
                center: Point::new(200.0, 200.0),
                radius: 100.0,
                inner_radius: 0.0,
                explode: 15.0,
                connector_length: 20.0,
                connector_stub: 5.0,
                critical_angle,
                start_angle: 0.0,
                offset_angle: 0.0,
                offset_radius: 0.0,
            };
            Self {
                store: LabelStore::new(geometry.center, 0.0, 0.0),
                meta: PointMetaTable::default(),
                geometry,
            }
        }

        /// Adds a 1-degree slice bisected at `mid` with a `16 px` tall label.
        fn add(&mut self, index: usize, mid: f64) {
            let angles = SliceAngles {
                start: mid - 0.5,
                sweep: 1.0,
            };
            let (anchor, side) = connector_anchor(self.geometry.center, angles, 100.0, 0.0);
            self.meta.insert(
                index,
                PointMeta {
                    start: angles.start,
                    sweep: angles.sweep,
                    explode: 0.0,
                    connector: 5.0 * side.sign(),
                    side,
                    anchor,
                },
            );
            self.store.add(
                index,
                format!("{index}"),
                Size::new(30.0, 16.0),
                standard_angle(mid),
                self.geometry.label_radius(0.0),
                side.label_anchor(),
            );
        }

        fn cx(&self) -> LayoutContext<'_> {
            LayoutContext {
                geometry: &self.geometry,
                meta: &self.meta,
                store: &self.store,
            }
        }
    }

    #[test]
    fn lone_label_stays_at_its_natural_position() {
        let mut f = Fixture::new(60.0);
        f.add(0, 30.0);
        let mut d = Domain::new(Side::Right, 0.0);
        d.soft_add(0, &f.cx());

        assert!(!d.is_critical_angle());
        assert!(d.max_angle() < 1e-6, "{}", d.max_angle());
        // The stored position is the stub end, just past the natural point.
        let (angle, radius) = d.positions()[0];
        assert!(angle > 28.5 && angle < 29.2, "{angle}");
        assert!(radius > 120.0);

        let natural = f.store.bounds(0);
        let b = d.bounds().expect("non-empty");
        assert!((b.y0 - natural.y0).abs() < 1e-9);
        assert!((b.height() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn crowded_labels_are_stacked_without_overlap() {
        let mut f = Fixture::new(60.0);
        // Bottom first on the right side.
        f.add(0, 2.0);
        f.add(1, 0.0);
        f.add(2, -2.0);
        let mut d = Domain::new(Side::Right, 0.0);
        for i in 0..3 {
            d.soft_add(i, &f.cx());
        }
        assert!(!d.is_critical_angle());
        assert!((d.height() - 48.0).abs() < 1e-9);

        d.apply_positions(&mut f.store);
        let rects: Vec<Rect> = (0..3).map(|i| f.store.bounds(i)).collect();
        for a in 0..3 {
            for b in (a + 1)..3 {
                assert!(!rects_overlap(rects[a], rects[b]), "{a} vs {b}: {rects:?}");
            }
        }
        // Members keep their bottom-to-top order.
        assert!(rects[0].y0 > rects[1].y0 && rects[1].y0 > rects[2].y0);

        let bounds = d.bounds().expect("non-empty");
        for r in &rects {
            assert!(r.y0 >= bounds.y0 - 1e-9 && r.y1 <= bounds.y1 + 1e-9);
            assert!(r.x0 >= bounds.x0 - 1e-9 && r.x1 <= bounds.x1 + 1e-9);
        }
    }

    #[test]
    fn drop_candidate_has_the_largest_deviation() {
        let mut f = Fixture::new(5.0);
        for (i, mid) in [4.0, 2.0, 0.0, -2.0, -4.0, -6.0].into_iter().enumerate() {
            f.add(i, mid);
        }
        let mut d = Domain::new(Side::Right, 0.0);
        for i in 0..6 {
            d.soft_add(i, &f.cx());
        }
        assert!(d.is_critical_angle());

        let worst = d.deviations().iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(d.max_angle(), worst);
        let candidate = d.label_to_drop().expect("critical domain has a candidate");
        let j = d.labels().iter().position(|&i| i == candidate).expect("member");
        assert_eq!(d.deviations()[j], worst);

        let dropped = d.drop_label(&mut f.store);
        assert_eq!(dropped, Some(candidate));
        assert!(!f.store.is_enabled(candidate));
        assert_eq!(d.dropped_labels(), [candidate]);
        assert_eq!(d.labels().len(), 5);

        d.clear_dropped_labels(&mut f.store);
        assert!(f.store.is_enabled(candidate));
        assert!(d.dropped_labels().is_empty());
    }

    #[test]
    fn over_tall_stacks_are_infeasible() {
        let mut f = Fixture::new(180.0);
        // 20 labels of 16 px cannot fit on a 240 px tall label circle.
        for i in 0..20 {
            f.add(i, 30.0 - i as f64);
        }
        let mut d = Domain::new(Side::Right, 0.0);
        for i in 0..20 {
            d.soft_add(i, &f.cx());
        }
        assert!(d.is_critical_angle());
        assert_eq!(d.max_angle(), f64::INFINITY);
    }

    #[test]
    fn stack_is_clamped_to_the_label_circle() {
        let mut f = Fixture::new(180.0);
        f.add(0, 89.0);
        f.add(1, 88.0);
        let mut d = Domain::new(Side::Right, 0.0);
        d.soft_add(0, &f.cx());
        d.soft_add(1, &f.cx());
        let b = d.bounds().expect("non-empty");
        // The lowest slot center sits at or above the bottom of the label circle.
        assert!(b.y1 - 8.0 <= 200.0 + 120.0 - EDGE_EPSILON + 1e-9, "{b:?}");
    }

    #[test]
    fn empty_domains_never_intersect() {
        let d = Domain::new(Side::Left, 0.0);
        assert!(d.bounds().is_none());
        assert!(d.is_not_intersect(Rect::new(-1e9, -1e9, 1e9, 1e9)));
    }
}
