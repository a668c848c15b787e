// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pie and donut geometry with non-overlapping outside labels.
//!
//! This crate lays out the labels of a pie chart *outside* the pie, next to their slices:
//! - **Slices** get start/sweep angles from the data; missing values take no room.
//! - **Labels** sit on a circle just outside the pie, on the left or right side depending on
//!   where their slice points.
//! - Crowded labels are stacked into **domains**. When a stack would bend a connector past the
//!   critical angle, the worst label is dropped instead of overlapping its neighbors.
//! - **Connectors** run from each slice edge to its label as a short elbow.
//! - The pie shrinks until its labels fit in the chart bounds, unless
//!   [`OutsideLabelsSpec::fit_labels`] is off.
//!
//! Rendering is out of scope: the layout produces rectangles, positions and `kurbo` paths, and
//! text measurement is supplied through [`TextMeasurer`].
//!
//! ```
//! use kurbo::Rect;
//! use vizir_pie::{HeuristicTextMeasurer, OutsideLabels, OutsideLabelsSpec, PieData};
//!
//! let data = PieData::from_values(&[25.0, 25.0, 25.0, 25.0]);
//! let mut pie = OutsideLabels::new(OutsideLabelsSpec::new(Rect::new(0.0, 0.0, 400.0, 300.0)));
//! let layout = pie
//!     .calculate_outside_labels(&data, &HeuristicTextMeasurer)
//!     .expect("valid configuration");
//! assert_eq!(layout.enabled_count(), 4);
//! ```

#![no_std]

extern crate alloc;

mod anchor;
mod config;
mod connector;
mod domain;
mod error;
#[cfg(not(feature = "std"))]
mod float;
mod geometry;
mod label;
#[cfg(test)]
mod layout_tests;
mod measure;
mod meta;
mod outside_labels;
mod resolver;
mod source;

pub use anchor::connector_anchor;
pub use config::{
    LabelFormat, Length, OutsideLabelsSpec, OverlapMode, PieGeometry, StrokeStyle,
};
pub use connector::{ConnectorGeometry, Connectors, draw_connector};
pub use domain::Domain;
pub use error::LayoutError;
pub use geometry::{
    DEFAULT_START_ANGLE, SliceAngles, is_missing, polar, slice_angles, slice_path,
    standard_angle, to_polar,
};
pub use label::{Label, LabelAnchor, LabelStore};
pub use measure::{HeuristicTextMeasurer, LabelMeasurer, LabelStyle, TextMeasurer, anchored_rect};
pub use meta::{PointMeta, PointMetaTable, Side};
pub use outside_labels::{FIT_ITERATIONS, FIT_TOLERANCE, OutsideLabels, OutsideLabelsLayout};
pub use source::{PieData, PieDatum, PointSource};
