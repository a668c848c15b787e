// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The outside label layout entry point.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{BezPath, Rect};

use crate::anchor::{SideBuckets, connector_anchor};
use crate::config::{OutsideLabelsSpec, OverlapMode, PieGeometry};
use crate::connector::{ConnectorGeometry, Connectors};
use crate::domain::Domain;
use crate::error::LayoutError;
use crate::geometry::{SliceAngles, is_missing, slice_angles, slice_path, standard_angle};
use crate::label::LabelStore;
use crate::measure::{LabelMeasurer, TextMeasurer};
use crate::meta::{PointMeta, PointMetaTable};
use crate::resolver::{Resolved, Resolver};
use crate::source::{PieData, PointSource};

/// Most extra layout passes spent shrinking the pie to fit its labels.
pub const FIT_ITERATIONS: usize = 5;

/// Label overflow, in pixels, left alone by the label fit.
pub const FIT_TOLERANCE: f64 = 10.0;

/// Result of one layout pass.
#[derive(Debug, Default)]
pub struct OutsideLabelsLayout {
    geometry: PieGeometry,
    tolerance: f64,
    slices: Vec<Option<SliceAngles>>,
    meta: PointMetaTable,
    labels: LabelStore,
    domains: Resolved,
    connectors: Connectors,
    hovered: Option<usize>,
}

impl OutsideLabelsLayout {
    /// Resolved pie geometry.
    pub fn geometry(&self) -> &PieGeometry {
        &self.geometry
    }

    /// Slice angles per row; `None` for missing rows.
    pub fn slices(&self) -> &[Option<SliceAngles>] {
        &self.slices
    }

    /// Per-point metadata.
    pub fn meta(&self) -> &PointMetaTable {
        &self.meta
    }

    /// All labels, enabled or not, at their final positions.
    pub fn labels(&self) -> &LabelStore {
        &self.labels
    }

    /// Left side domains, largest explode level first.
    pub fn left_domains(&self) -> &[Domain] {
        &self.domains.left
    }

    /// Right side domains, largest explode level first.
    pub fn right_domains(&self) -> &[Domain] {
        &self.domains.right
    }

    /// Connector paths.
    pub fn connectors(&self) -> &Connectors {
        &self.connectors
    }

    /// The shared connector path used while hovering a label that has no permanent connector.
    pub fn hovered_connector(&self) -> &BezPath {
        self.connectors.hovered()
    }

    /// Number of enabled labels.
    pub fn enabled_count(&self) -> usize {
        self.labels.enabled_count()
    }

    /// Whether the label of `index` should be rendered: enabled, or currently hovered.
    pub fn is_label_visible(&self, index: usize) -> bool {
        self.labels.is_enabled(index)
            || (self.hovered == Some(index) && self.labels.get(index).is_some())
    }

    /// Bounds of the label of `index` at its final position.
    pub fn label_bounds(&self, index: usize) -> Option<Rect> {
        self.labels.get(index).map(|_| self.labels.bounds(index))
    }

    /// How far the enabled labels reach past `bounds`, and the label reaching furthest.
    ///
    /// Negative when every enabled label is inside with room to spare. `None` without enabled
    /// labels.
    pub fn label_overflow(&self, bounds: Rect) -> Option<(f64, usize)> {
        let mut worst: Option<(f64, usize)> = None;
        for label in self.labels.iter().filter(|l| l.enabled()) {
            let r = self.labels.bounds(label.index());
            let overflow = (bounds.x0 - r.x0)
                .max(r.x1 - bounds.x1)
                .max(bounds.y0 - r.y0)
                .max(r.y1 - bounds.y1);
            if worst.is_none_or(|(w, _)| overflow > w) {
                worst = Some((overflow, label.index()));
            }
        }
        worst
    }

    /// Outline of the slice of `index`, exploded if the point is.
    pub fn slice_path(&self, index: usize) -> Option<BezPath> {
        let meta = self.meta.get(index)?;
        Some(slice_path(
            self.geometry.center,
            meta.angles(),
            meta.explode,
            self.geometry.inner_radius,
            self.geometry.radius,
            self.tolerance,
        ))
    }

    /// Where the connector of `index` runs, given the label's current position.
    pub fn connector_geometry(&self, index: usize) -> Option<ConnectorGeometry> {
        let meta = self.meta.get(index)?;
        Some(ConnectorGeometry {
            anchor: meta.anchor,
            end: self.labels.position(index)?,
            stub: meta.connector,
        })
    }
}

/// Lays out the outside labels of a pie.
///
/// Holds the configuration and the result of the last pass; each call to
/// [`calculate_outside_labels`](Self::calculate_outside_labels) rebuilds everything from the
/// source rows.
#[derive(Debug, Default)]
pub struct OutsideLabels {
    spec: OutsideLabelsSpec,
    layout: OutsideLabelsLayout,
}

impl OutsideLabels {
    /// Creates a layout for `spec`. Nothing is computed until the first pass.
    pub fn new(spec: OutsideLabelsSpec) -> Self {
        Self {
            spec,
            layout: OutsideLabelsLayout::default(),
        }
    }

    /// The configuration.
    pub fn spec(&self) -> &OutsideLabelsSpec {
        &self.spec
    }

    /// Replaces the configuration. Takes effect on the next pass.
    pub fn set_spec(&mut self, spec: OutsideLabelsSpec) {
        self.spec = spec;
    }

    /// The result of the last pass.
    pub fn layout(&self) -> &OutsideLabelsLayout {
        &self.layout
    }

    /// Runs a full layout pass over `source`.
    ///
    /// Labels that cannot be placed without overlap are disabled rather than reported as errors;
    /// only an unusable configuration fails.
    ///
    /// With [`fit_labels`](OutsideLabelsSpec::fit_labels) set, the pie is then shrunk by however
    /// far its enabled labels reach past the bounds and laid out again, up to
    /// [`FIT_ITERATIONS`] times or until the overflow is within [`FIT_TOLERANCE`].
    pub fn calculate_outside_labels(
        &mut self,
        source: &dyn PointSource,
        measurer: &dyn TextMeasurer,
    ) -> Result<&OutsideLabelsLayout, LayoutError> {
        let rows = source.row_count();
        let values: Vec<Option<f64>> = (0..rows).map(|row| source.value(row)).collect();
        let any_exploded =
            rows > 1 && (0..rows).any(|row| !is_missing(values[row]) && source.exploded(row));
        let mut geometry = self.spec.resolve(any_exploded)?;
        self.layout = self.lay_out(source, measurer, &values, geometry);

        if self.spec.fit_labels {
            let bounds = self.spec.bounds.abs();
            for iteration in 0..FIT_ITERATIONS {
                let Some((overflow, index)) = self.layout.label_overflow(bounds) else {
                    break;
                };
                if overflow <= FIT_TOLERANCE || geometry.radius <= 0.0 {
                    break;
                }
                geometry = self
                    .spec
                    .with_outer_radius(&geometry, geometry.radius - overflow);
                tracing::debug!(
                    iteration,
                    overflow,
                    index,
                    radius = geometry.radius,
                    "shrinking pie to fit its labels"
                );
                self.layout = self.lay_out(source, measurer, &values, geometry);
            }
        }

        tracing::debug!(
            rows,
            radius = self.layout.geometry.radius,
            labels = self.layout.labels.len(),
            enabled = self.layout.enabled_count(),
            left_domains = self.layout.domains.left.len(),
            right_domains = self.layout.domains.right.len(),
            "outside labels laid out"
        );
        Ok(&self.layout)
    }

    fn lay_out(
        &self,
        source: &dyn PointSource,
        measurer: &dyn TextMeasurer,
        values: &[Option<f64>],
        geometry: PieGeometry,
    ) -> OutsideLabelsLayout {
        let rows = values.len();
        let single = rows == 1;
        let slices = slice_angles(values.iter().copied(), self.spec.start_angle);
        let total: f64 = values
            .iter()
            .filter(|v| !is_missing(**v))
            .map(|v| v.unwrap_or(0.0))
            .sum();

        let measure = LabelMeasurer::new(measurer, &self.spec.label_style);
        let mut meta = PointMetaTable::with_rows(rows);
        let mut labels =
            LabelStore::new(geometry.center, geometry.offset_angle, geometry.offset_radius);
        let mut buckets = SideBuckets::new();

        for (row, angles) in slices.iter().enumerate() {
            let Some(angles) = *angles else { continue };
            let explode = if !single && source.exploded(row) {
                geometry.explode
            } else {
                0.0
            };
            let (anchor, side) = connector_anchor(geometry.center, angles, geometry.radius, explode);
            meta.insert(
                row,
                PointMeta {
                    start: angles.start,
                    sweep: angles.sweep,
                    explode,
                    connector: side.sign() * geometry.connector_stub,
                    side,
                    anchor,
                },
            );

            let value = values[row].unwrap_or(0.0);
            let name = source
                .name(row)
                .map_or_else(|| format!("{row}"), String::from);
            let text = self
                .spec
                .label_format
                .format(&name, value, value / total * 100.0);
            let size = measure.size(&text);
            labels.add(
                row,
                text,
                size,
                standard_angle(angles.mid_angle()),
                geometry.label_radius(explode),
                side.label_anchor(),
            );
            buckets.push(row, angles.mid_angle(), side, explode);
        }

        let domains = if single || self.spec.overlap_mode == OverlapMode::AllowOverlap {
            Resolved::default()
        } else {
            Resolver::new(&geometry, &meta, &mut labels).resolve(&buckets.into_levels())
        };

        let mut layout = OutsideLabelsLayout {
            geometry,
            tolerance: self.spec.tolerance,
            slices,
            meta,
            labels,
            domains,
            connectors: Connectors::default(),
            hovered: None,
        };
        let enabled: Vec<usize> = layout
            .labels
            .iter()
            .filter(|l| l.enabled())
            .map(|l| l.index())
            .collect();
        for index in enabled {
            if let Some(g) = layout.connector_geometry(index) {
                layout.connectors.draw(index, g);
            }
        }
        layout
    }

    /// Shows the label of `index` and its connector, even if the layout dropped it.
    ///
    /// Returns `false` if the point has no label.
    pub fn hover(&mut self, index: usize) -> bool {
        let Some(geometry) = self.layout.connector_geometry(index) else {
            return false;
        };
        self.unhover();
        self.layout.hovered = Some(index);
        self.layout.connectors.update(index, Some(geometry), true);
        true
    }

    /// Ends hovering: hides a dropped label again and clears the shared connector path.
    pub fn unhover(&mut self) {
        if let Some(index) = self.layout.hovered.take() {
            let geometry = self.layout.connector_geometry(index);
            let show = self.layout.labels.is_enabled(index);
            self.layout.connectors.update(index, geometry, show);
        }
    }

    /// Flips the exploded state of `row` in `data` and lays the pie out again.
    pub fn toggle_explode(
        &mut self,
        data: &mut PieData,
        row: usize,
        measurer: &dyn TextMeasurer,
    ) -> Result<&OutsideLabelsLayout, LayoutError> {
        if let Some(exploded) = data.toggle_exploded(row) {
            tracing::debug!(row, exploded, "toggled explode");
        }
        self.calculate_outside_labels(data, measurer)
    }
}
