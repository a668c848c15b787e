// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slice geometry: angles, explode offsets, and slice outlines.
//!
//! Angles in this crate are in **degrees**, measured clockwise from the positive x axis in
//! screen coordinates (y down). This matches how the label layout thinks about "sides" of
//! the pie and keeps round numbers (`90`, `270`) meaningful at the seams. Conversion to
//! radians happens only at the `kurbo` boundary.

extern crate alloc;

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use kurbo::{BezPath, Circle, Line, Point, Rect, Shape, Vec2};

/// Offset added to the configured start angle so that `0` starts the first slice at twelve
/// o'clock.
pub const DEFAULT_START_ANGLE: f64 = -90.0;

/// Normalizes an angle in degrees into `[0, 360)`.
pub fn standard_angle(degrees: f64) -> f64 {
    let a = degrees - 360.0 * (degrees / 360.0).floor();
    // `floor` can leave exactly 360 for tiny negative inputs.
    if a >= 360.0 { 0.0 } else { a }
}

/// Returns `true` if `value` cannot produce a slice.
///
/// `None`, NaN, infinities, zero and negative values are all "missing": they consume no angle
/// and never receive a label.
pub fn is_missing(value: Option<f64>) -> bool {
    match value {
        Some(v) => !(v.is_finite() && v > 0.0),
        None => true,
    }
}

/// The angular extent of one slice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliceAngles {
    /// Start angle in degrees (not normalized; accumulates from the pie start angle).
    pub start: f64,
    /// Sweep in degrees.
    pub sweep: f64,
}

impl SliceAngles {
    /// The bisecting angle of the slice, in degrees.
    pub fn mid_angle(&self) -> f64 {
        self.start + self.sweep / 2.0
    }

    /// End angle in degrees.
    pub fn end(&self) -> f64 {
        self.start + self.sweep
    }

    /// Offset of an exploded slice's center from the pie center.
    pub fn explode_offset(&self, explode: f64) -> Vec2 {
        if explode == 0.0 {
            return Vec2::ZERO;
        }
        polar(explode, self.mid_angle())
    }
}

/// Computes start/sweep for every row.
///
/// `start_angle` is the configured start angle; [`DEFAULT_START_ANGLE`] is added here.
/// Missing rows yield `None` and do not advance the running start angle. The order of
/// `values` is preserved; sorting is the caller's business.
pub fn slice_angles<I>(values: I, start_angle: f64) -> Vec<Option<SliceAngles>>
where
    I: IntoIterator<Item = Option<f64>>,
    I::IntoIter: Clone,
{
    let values = values.into_iter();
    let sum: f64 = values
        .clone()
        .filter(|v| !is_missing(*v))
        .map(|v| v.unwrap_or(0.0))
        .sum();

    let mut start = start_angle + DEFAULT_START_ANGLE;
    values
        .map(|v| {
            if is_missing(v) {
                return None;
            }
            let sweep = v.unwrap_or(0.0) / sum * 360.0;
            let angles = SliceAngles { start, sweep };
            start += sweep;
            Some(angles)
        })
        .collect()
}

/// A vector of length `r` pointing at `degrees`.
pub fn polar(r: f64, degrees: f64) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(r * rad.cos(), r * rad.sin())
}

/// Converts an offset from the pie center into `(angle, radius)`, angle in `[0, 360)`.
pub fn to_polar(offset: Vec2) -> (f64, f64) {
    let radius = offset.x.hypot(offset.y);
    let angle = standard_angle(offset.y.atan2(offset.x).to_degrees());
    (angle, radius)
}

/// Builds the outline of a slice (or donut segment) around `center`.
///
/// The slice is shifted by its explode offset. A sweep of a full turn produces a full disc
/// (or ring).
pub fn slice_path(
    center: Point,
    angles: SliceAngles,
    explode: f64,
    inner_radius: f64,
    outer_radius: f64,
    tolerance: f64,
) -> BezPath {
    let c = center + angles.explode_offset(explode);
    let circle = Circle::new(c, outer_radius);
    let segment = circle.segment(
        inner_radius,
        angles.start.to_radians(),
        angles.sweep.to_radians(),
    );
    segment.to_path(tolerance)
}

/// Unsigned angle between two vectors, in degrees. Zero if either vector is zero.
pub(crate) fn angle_between(a: Vec2, b: Vec2) -> f64 {
    a.cross(b).atan2(a.dot(b)).to_degrees().abs()
}

/// Penetration below this is treated as touching.
const OVERLAP_EPSILON: f64 = 1e-6;

/// Strict overlap test: rectangles that only share an edge do not overlap.
pub(crate) fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 + OVERLAP_EPSILON < b.x1
        && b.x0 + OVERLAP_EPSILON < a.x1
        && a.y0 + OVERLAP_EPSILON < b.y1
        && b.y0 + OVERLAP_EPSILON < a.y1
}

/// Closed segment intersection; touching endpoints and collinear overlaps count.
pub(crate) fn segments_intersect(a: Line, b: Line) -> bool {
    fn orient(p: Point, q: Point, r: Point) -> f64 {
        (q - p).cross(r - p)
    }
    fn overlap(a0: f64, a1: f64, b0: f64, b1: f64) -> bool {
        a0.min(a1).max(b0.min(b1)) <= a0.max(a1).min(b0.max(b1))
    }
    overlap(a.p0.x, a.p1.x, b.p0.x, b.p1.x)
        && overlap(a.p0.y, a.p1.y, b.p0.y, b.p1.y)
        && orient(a.p0, a.p1, b.p0) * orient(a.p0, a.p1, b.p1) <= 0.0
        && orient(b.p0, b.p1, a.p0) * orient(b.p0, b.p1, a.p1) <= 0.0
}

/// Whether a segment crosses the outline of `rect` or lies inside it.
pub(crate) fn segment_hits_rect(segment: Line, rect: Rect) -> bool {
    let inside = |p: Point| p.x > rect.x0 && p.x < rect.x1 && p.y > rect.y0 && p.y < rect.y1;
    if inside(segment.p0) || inside(segment.p1) {
        return true;
    }
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    (0..4).any(|i| segments_intersect(segment, Line::new(corners[i], corners[(i + 1) % 4])))
}
