// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outside label configuration.
//!
//! [`OutsideLabelsSpec`] is the user-facing settings bag. [`OutsideLabelsSpec::resolve`] turns
//! it into a [`PieGeometry`] of plain pixel values that the layout passes around.

extern crate alloc;

use alloc::format;
use alloc::string::String;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use kurbo::{Point, Rect};
use peniko::Brush;
use peniko::color::palette::css;

use crate::error::LayoutError;
use crate::geometry::standard_angle;
use crate::measure::LabelStyle;

/// A length given either in pixels or as a percentage of some base length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    /// Absolute length in chart coordinates.
    Pixels(f64),
    /// Percentage (`0..=100`) of a base length chosen by the setting.
    Percent(f64),
}

impl Length {
    /// Resolves against `base`.
    pub fn resolve(self, base: f64) -> f64 {
        match self {
            Self::Pixels(px) => px,
            Self::Percent(pct) => base * pct / 100.0,
        }
    }

    fn raw(self) -> f64 {
        match self {
            Self::Pixels(v) | Self::Percent(v) => v,
        }
    }

    fn check(self, name: &'static str) -> Result<Self, LayoutError> {
        let value = self.raw();
        if value.is_finite() && value >= 0.0 {
            Ok(self)
        } else {
            Err(LayoutError::InvalidLength { name, value })
        }
    }
}

impl From<f64> for Length {
    fn from(px: f64) -> Self {
        Self::Pixels(px)
    }
}

/// How outside labels may interact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverlapMode {
    /// Labels are clustered into non-overlapping domains; labels that do not fit are dropped.
    #[default]
    NoOverlap,
    /// Labels stay at their natural positions, overlapping or not.
    AllowOverlap,
}

/// What a label says.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LabelFormat {
    /// The point name.
    #[default]
    Name,
    /// The point value.
    Value,
    /// The share of the total, e.g. `25.0%`.
    Percent,
    /// Name followed by the share, e.g. `Apples: 25.0%`.
    NameAndPercent,
}

impl LabelFormat {
    /// Formats the text for one point.
    pub fn format(self, name: &str, value: f64, percent: f64) -> String {
        match self {
            Self::Name => String::from(name),
            Self::Value => format_value(value),
            Self::Percent => format!("{percent:.1}%"),
            Self::NameAndPercent => format!("{name}: {percent:.1}%"),
        }
    }
}

fn format_value(value: f64) -> String {
    if (value - value.floor()).abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// A paint + width pair for stroked paths (connectors, slice outlines).
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Stroke paint.
    pub brush: Brush,
    /// Stroke width in chart coordinates.
    pub stroke_width: f64,
}

impl StrokeStyle {
    /// Convenience for a solid stroke.
    pub fn solid(brush: impl Into<Brush>, stroke_width: f64) -> Self {
        Self {
            brush: brush.into(),
            stroke_width,
        }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::solid(css::BLACK, 1.0)
    }
}

/// Settings for a pie with outside labels.
#[derive(Clone, Debug, PartialEq)]
pub struct OutsideLabelsSpec {
    /// The area available to the pie and its labels.
    pub bounds: Rect,
    /// Start angle in degrees; `0` starts at twelve o'clock.
    pub start_angle: f64,
    /// Outer radius; percentages are of the smaller side of the pie area.
    pub radius: Length,
    /// Inner (donut hole) radius; percentages are of the outer radius.
    pub inner_radius: Length,
    /// Explode distance for exploded slices; percentages are of the smaller side of `bounds`.
    pub explode: Length,
    /// Distance from the pie edge to the label column; percentages are of the outer radius.
    pub connector_length: Length,
    /// Length of the horizontal connector stub next to the label.
    pub connector_stub: f64,
    /// Largest tolerated deviation, in degrees, of a connector from its radial direction.
    pub critical_angle: f64,
    /// Whether labels are kept apart.
    pub overlap_mode: OverlapMode,
    /// Label styling.
    pub label_style: LabelStyle,
    /// Label text.
    pub label_format: LabelFormat,
    /// Extra angle, in degrees, added to every label position.
    pub label_offset_angle: f64,
    /// Extra radius added to every label position; percentages are of the outer radius.
    pub label_offset_radius: Length,
    /// Connector stroke.
    pub connector_stroke: StrokeStyle,
    /// Curve flattening tolerance for slice outlines.
    pub tolerance: f64,
    /// Whether the pie shrinks until its enabled labels fit inside `bounds`.
    pub fit_labels: bool,
}

impl OutsideLabelsSpec {
    /// Creates a spec with default settings for a pie inside `bounds`.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            start_angle: 0.0,
            radius: Length::Percent(45.0),
            inner_radius: Length::Pixels(0.0),
            explode: Length::Pixels(15.0),
            connector_length: Length::Pixels(20.0),
            connector_stub: 5.0,
            critical_angle: 60.0,
            overlap_mode: OverlapMode::NoOverlap,
            label_style: LabelStyle::default(),
            label_format: LabelFormat::Name,
            label_offset_angle: 0.0,
            label_offset_radius: Length::Pixels(0.0),
            connector_stroke: StrokeStyle::default(),
            tolerance: 0.1,
            fit_labels: true,
        }
    }

    /// Sets the start angle (degrees).
    pub fn with_start_angle(mut self, start_angle: f64) -> Self {
        self.start_angle = start_angle;
        self
    }

    /// Sets the outer radius.
    pub fn with_radius(mut self, radius: impl Into<Length>) -> Self {
        self.radius = radius.into();
        self
    }

    /// Sets the inner radius (turns the pie into a donut).
    pub fn with_inner_radius(mut self, inner_radius: impl Into<Length>) -> Self {
        self.inner_radius = inner_radius.into();
        self
    }

    /// Sets the explode distance.
    pub fn with_explode(mut self, explode: impl Into<Length>) -> Self {
        self.explode = explode.into();
        self
    }

    /// Sets the connector length.
    pub fn with_connector_length(mut self, connector_length: impl Into<Length>) -> Self {
        self.connector_length = connector_length.into();
        self
    }

    /// Sets the connector stub length.
    pub fn with_connector_stub(mut self, connector_stub: f64) -> Self {
        self.connector_stub = connector_stub;
        self
    }

    /// Sets the critical angle (degrees).
    pub fn with_critical_angle(mut self, critical_angle: f64) -> Self {
        self.critical_angle = critical_angle;
        self
    }

    /// Sets the overlap mode.
    pub fn with_overlap_mode(mut self, overlap_mode: OverlapMode) -> Self {
        self.overlap_mode = overlap_mode;
        self
    }

    /// Sets the label style.
    pub fn with_label_style(mut self, label_style: LabelStyle) -> Self {
        self.label_style = label_style;
        self
    }

    /// Sets the label text format.
    pub fn with_label_format(mut self, label_format: LabelFormat) -> Self {
        self.label_format = label_format;
        self
    }

    /// Sets the label position offsets.
    pub fn with_label_offset(mut self, angle: f64, radius: impl Into<Length>) -> Self {
        self.label_offset_angle = angle;
        self.label_offset_radius = radius.into();
        self
    }

    /// Sets the connector stroke.
    pub fn with_connector_stroke(mut self, stroke: StrokeStyle) -> Self {
        self.connector_stroke = stroke;
        self
    }

    /// Sets whether the pie shrinks to keep its labels inside `bounds`.
    pub fn with_label_fit(mut self, fit_labels: bool) -> Self {
        self.fit_labels = fit_labels;
        self
    }

    /// Resolves all lengths into pixels.
    ///
    /// When `any_exploded` is set, the pie is shrunk so exploded slices stay inside `bounds`.
    /// Pies with a single row never explode, so callers pass `false` for them.
    pub fn resolve(&self, any_exploded: bool) -> Result<PieGeometry, LayoutError> {
        let b = self.bounds;
        if !(b.x0.is_finite() && b.y0.is_finite() && b.x1.is_finite() && b.y1.is_finite()) {
            return Err(LayoutError::NonFiniteBounds(b));
        }
        if !self.critical_angle.is_finite() {
            return Err(LayoutError::InvalidCriticalAngle(self.critical_angle));
        }
        if !(self.connector_stub.is_finite() && self.connector_stub >= 0.0) {
            return Err(LayoutError::InvalidLength {
                name: "connector_stub",
                value: self.connector_stub,
            });
        }
        let radius = self.radius.check("radius")?;
        let inner_radius = self.inner_radius.check("inner_radius")?;
        let explode = self.explode.check("explode")?;
        let connector_length = self.connector_length.check("connector_length")?;
        let offset_radius = self.label_offset_radius.check("label_offset_radius")?;

        let b = b.abs();
        let min_side = b.width().min(b.height());
        let explode = explode.resolve(min_side);
        let clamp = if any_exploded { explode } else { 0.0 };
        let pie_bounds = b.inset(-clamp);
        let pie_min_side = (min_side - 2.0 * clamp).max(0.0);

        let outer = radius.resolve(pie_min_side).max(0.0).min(pie_min_side / 2.0);
        let inner = inner_radius.resolve(outer);
        if inner > outer {
            return Err(LayoutError::InnerRadiusExceedsOuter { inner, outer });
        }

        Ok(PieGeometry {
            center: pie_bounds.center(),
            radius: outer,
            inner_radius: inner,
            explode,
            connector_length: connector_length.resolve(outer),
            connector_stub: self.connector_stub,
            critical_angle: standard_angle(self.critical_angle),
            start_angle: self.start_angle,
            offset_angle: self.label_offset_angle,
            offset_radius: offset_radius.resolve(outer),
        })
    }
}

impl OutsideLabelsSpec {
    /// `geometry` with its outer radius replaced by `radius`.
    ///
    /// Lengths relative to the outer radius follow it. `geometry` must come from
    /// [`resolve`](Self::resolve) on this spec.
    pub(crate) fn with_outer_radius(&self, geometry: &PieGeometry, radius: f64) -> PieGeometry {
        let radius = radius.max(0.0);
        PieGeometry {
            radius,
            inner_radius: self.inner_radius.resolve(radius).clamp(0.0, radius),
            connector_length: self.connector_length.resolve(radius).max(0.0),
            offset_radius: self.label_offset_radius.resolve(radius),
            ..*geometry
        }
    }
}

impl Default for OutsideLabelsSpec {
    fn default() -> Self {
        Self::new(Rect::new(0.0, 0.0, 400.0, 300.0))
    }
}

/// Resolved pie geometry, in pixels and degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PieGeometry {
    /// Pie center.
    pub center: Point,
    /// Outer radius.
    pub radius: f64,
    /// Inner radius.
    pub inner_radius: f64,
    /// Explode distance applied to exploded slices.
    pub explode: f64,
    /// Distance from the pie edge to the label column.
    pub connector_length: f64,
    /// Horizontal connector stub length.
    pub connector_stub: f64,
    /// Critical angle in `[0, 360)`.
    pub critical_angle: f64,
    /// Configured start angle.
    pub start_angle: f64,
    /// Label angle offset in degrees.
    pub offset_angle: f64,
    /// Label radius offset.
    pub offset_radius: f64,
}

impl PieGeometry {
    /// Radius of the natural label position for a slice exploded by `explode`.
    pub fn label_radius(&self, explode: f64) -> f64 {
        self.radius + self.connector_length + explode
    }
}
