// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connector lines from slices to their outside labels.
//!
//! A connector is a three-point polyline: from the slice edge to the start of the horizontal
//! stub, then along the stub to the label anchor.
//!
//! Enabled labels get a permanent path each. Labels without one (dropped labels shown while
//! hovered) all share a single extra path, so a pie never holds more than
//! `enabled labels + 1` connector paths.

extern crate alloc;

use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{BezPath, Point, Vec2};

/// Clears `path` and draws a connector into it.
///
/// `stub` is the signed stub length: positive when the label sits to the right of `end`.
pub fn draw_connector(path: &mut BezPath, anchor: Point, end: Point, stub: f64) {
    path.truncate(0);
    path.move_to(anchor);
    path.line_to(end - Vec2::new(stub, 0.0));
    path.line_to(end);
}

/// Where a connector runs: slice anchor, label anchor, signed stub length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectorGeometry {
    /// Point on the slice edge.
    pub anchor: Point,
    /// The label's anchor point.
    pub end: Point,
    /// Signed stub length.
    pub stub: f64,
}

impl ConnectorGeometry {
    fn draw(&self, path: &mut BezPath) {
        draw_connector(path, self.anchor, self.end, self.stub);
    }
}

/// Connector paths of one pie.
#[derive(Clone, Debug, Default)]
pub struct Connectors {
    drawn: HashMap<usize, BezPath>,
    hovered: BezPath,
    hovered_index: Option<usize>,
}

impl Connectors {
    /// Draws the permanent connector of `index` unless it was already drawn this pass.
    ///
    /// Returns `true` if a path was created.
    pub fn draw(&mut self, index: usize, geometry: ConnectorGeometry) -> bool {
        if self.drawn.contains_key(&index) {
            return false;
        }
        let mut path = BezPath::new();
        geometry.draw(&mut path);
        self.drawn.insert(index, path);
        true
    }

    /// Shows or hides the connector of `index`.
    ///
    /// Points with a permanent path are redrawn in place or cleared. Anything else goes
    /// through the shared hovered path.
    pub fn update(&mut self, index: usize, geometry: Option<ConnectorGeometry>, show: bool) {
        let geometry = geometry.filter(|_| show);
        if let Some(path) = self.drawn.get_mut(&index) {
            match geometry {
                Some(g) => g.draw(path),
                None => path.truncate(0),
            }
            return;
        }
        match geometry {
            Some(g) => {
                g.draw(&mut self.hovered);
                self.hovered_index = Some(index);
            }
            None => {
                self.hovered.truncate(0);
                self.hovered_index = None;
            }
        }
    }

    /// The permanent path of `index`.
    pub fn get(&self, index: usize) -> Option<&BezPath> {
        self.drawn.get(&index)
    }

    /// The shared path for hovered labels without a permanent connector.
    pub fn hovered(&self) -> &BezPath {
        &self.hovered
    }

    /// The point currently drawn into the hovered path.
    pub fn hovered_index(&self) -> Option<usize> {
        self.hovered_index
    }

    /// Permanent paths sorted by point index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BezPath)> + '_ {
        let mut paths: Vec<(usize, &BezPath)> = self.drawn.iter().map(|(&i, p)| (i, p)).collect();
        paths.sort_unstable_by_key(|(i, _)| *i);
        paths.into_iter()
    }

    /// Number of live paths: permanent ones plus the hovered path when it is in use.
    pub fn path_count(&self) -> usize {
        self.drawn.len() + usize::from(!self.hovered.elements().is_empty())
    }
}
