// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement hooks for label layout.
//!
//! Label layout needs the extent of every label before it can stack them. Shaping and glyph
//! layout stay downstream, so the layout depends on a tiny measurement interface and turns its
//! output into anchored rectangles.

use kurbo::{Point, Rect, Size};
use peniko::Brush;
use peniko::color::palette::css;

use crate::label::LabelAnchor;

/// A minimal text measurement interface.
///
/// Callers can plug in a real text measurement backend (e.g. based on shaping), or use
/// [`HeuristicTextMeasurer`].
pub trait TextMeasurer {
    /// Returns `(width, height)` of a single line of text, in chart coordinates.
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64);
}

/// A tiny heuristic text measurer suitable for demos and early layout.
///
/// It assumes an average glyph width of ~0.6em and height of 1em.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
        let width = 0.6 * font_size * text.chars().count() as f64;
        (width, font_size)
    }
}

/// Styling inputs for outside labels.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelStyle {
    /// Font size in chart coordinates.
    pub font_size: f64,
    /// Padding added on every side of the measured text.
    pub padding: f64,
    /// Text fill paint.
    pub fill: Brush,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            padding: 2.0,
            fill: css::BLACK.into(),
        }
    }
}

/// Turns text into anchored label rectangles.
#[derive(Clone, Copy)]
pub struct LabelMeasurer<'a> {
    measurer: &'a dyn TextMeasurer,
    style: &'a LabelStyle,
}

impl core::fmt::Debug for LabelMeasurer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LabelMeasurer")
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl<'a> LabelMeasurer<'a> {
    /// Wraps a text measurer with label styling.
    pub fn new(measurer: &'a dyn TextMeasurer, style: &'a LabelStyle) -> Self {
        Self { measurer, style }
    }

    /// The padded size of `text`.
    pub fn size(&self, text: &str) -> Size {
        let (w, h) = self.measurer.measure(text, self.style.font_size);
        let pad = 2.0 * self.style.padding.max(0.0);
        Size::new(w.max(0.0) + pad, h.max(0.0) + pad)
    }

    /// Measures `text` placed with its `anchor` at `position`.
    pub fn measure(&self, text: &str, position: Point, anchor: LabelAnchor) -> Rect {
        anchored_rect(position, self.size(text), anchor)
    }
}

/// Places a rectangle of `size` so that its `anchor` point lands on `position`.
pub fn anchored_rect(position: Point, size: Size, anchor: LabelAnchor) -> Rect {
    let y0 = position.y - size.height / 2.0;
    let x0 = match anchor {
        LabelAnchor::LeftCenter => position.x,
        LabelAnchor::RightCenter => position.x - size.width,
    };
    Rect::new(x0, y0, x0 + size.width, y0 + size.height)
}
