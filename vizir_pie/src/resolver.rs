// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolves outside labels into non-overlapping domains.
//!
//! The resolver owns the domain lists (one per side and explode level) as plain vectors.
//! Domains never point at their siblings: "the previous domain" is always the last committed
//! entry of the list being built, so merges and splits are pushes and pops.
//!
//! Per side of each explode level:
//! 1. greedy clustering, resolving each domain as it grows (drop or merge),
//! 2. merging of committed domains that still touch,
//! 3. recovery of dropped labels into fresh domains where they fit,
//! 4. position application and collision checks against earlier explode levels.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::{Line, Vec2};

use crate::anchor::ExplodeLevel;
use crate::config::PieGeometry;
use crate::domain::{Domain, LayoutContext};
use crate::geometry::{polar, rects_overlap, segment_hits_rect, segments_intersect};
use crate::label::LabelStore;
use crate::meta::{PointMetaTable, Side};

/// Domain lists produced by one resolution pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Resolved {
    pub(crate) left: Vec<Domain>,
    pub(crate) right: Vec<Domain>,
}

#[derive(Debug)]
pub(crate) struct Resolver<'a> {
    geometry: &'a PieGeometry,
    meta: &'a PointMetaTable,
    store: &'a mut LabelStore,
    budget: usize,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(
        geometry: &'a PieGeometry,
        meta: &'a PointMetaTable,
        store: &'a mut LabelStore,
    ) -> Self {
        let budget = 2 * store.len() + 2;
        Self {
            geometry,
            meta,
            store,
            budget,
        }
    }

    fn cx(&self) -> LayoutContext<'_> {
        LayoutContext {
            geometry: self.geometry,
            meta: self.meta,
            store: self.store,
        }
    }

    /// Lays out every explode level, largest explode first.
    pub(crate) fn resolve(mut self, levels: &[ExplodeLevel]) -> Resolved {
        let mut resolved = Resolved::default();
        let mut placed: Vec<usize> = Vec::new();
        for level in levels {
            let left = self.resolve_side(&level.left(), Side::Left, level.explode, &placed);
            let right = self.resolve_side(&level.right(), Side::Right, level.explode, &placed);
            for domain in left.iter().chain(&right) {
                placed.extend(
                    domain
                        .labels()
                        .iter()
                        .copied()
                        .filter(|&i| self.store.is_enabled(i)),
                );
            }
            resolved.left.extend(left);
            resolved.right.extend(right);
        }
        resolved
    }

    fn resolve_side(
        &mut self,
        labels: &[usize],
        side: Side,
        explode: f64,
        placed: &[usize],
    ) -> Vec<Domain> {
        let mut order = labels.to_vec();
        if side == Side::Right {
            order.reverse();
        }

        let mut domains: Vec<Domain> = Vec::new();
        let mut current: Option<Domain> = None;
        for index in order {
            if !self.store.is_enabled(index) {
                continue;
            }
            let bounds = self.store.bounds(index);
            match current.as_mut() {
                Some(domain) if !domain.is_not_intersect(bounds) => {
                    domain.push(index);
                    self.calculate(domain, &mut domains);
                }
                _ => {
                    if let Some(done) = current.take() {
                        domains.push(done);
                    }
                    let mut domain = Domain::new(side, explode);
                    domain.push(index);
                    self.calculate(&mut domain, &mut domains);
                    current = Some(domain);
                }
            }
        }
        if let Some(done) = current {
            domains.push(done);
        }
        domains.retain(|d| !d.is_empty());
        self.separate(&mut domains);

        self.recover(&mut domains, side, explode);

        for domain in &domains {
            domain.apply_positions(self.store);
        }
        if !placed.is_empty() {
            self.compare_with_placed(&domains, placed);
        }
        tracing::debug!(
            ?side,
            explode,
            domains = domains.len(),
            enabled = domains.iter().map(|d| d.labels().len()).sum::<usize>(),
            "side resolved"
        );
        domains
    }

    fn exhausted(&self, steps: usize, stage: &'static str) -> bool {
        if steps < self.budget {
            return false;
        }
        tracing::warn!(stage, budget = self.budget, "label layout iteration cap reached");
        debug_assert!(
            steps < self.budget,
            "label layout iteration cap reached in {stage}"
        );
        true
    }

    /// Resolves `domain` until it is neither critical nor touching the last committed domain.
    fn calculate(&mut self, domain: &mut Domain, domains: &mut Vec<Domain>) {
        let mut steps = 0;
        while !self.exhausted(steps, "calculate") {
            steps += 1;
            domain.calc_domain(&self.cx());

            if domain.is_critical_angle() && domain.labels().len() > 1 {
                if let Some(index) = domain.drop_label(self.store) {
                    tracing::debug!(
                        index,
                        max_angle = domain.max_angle(),
                        "dropped outside label"
                    );
                }
                self.defragment(domain, domains);
                continue;
            }

            match domains.pop() {
                Some(mut prev) if domain.intersects(&prev) => {
                    let labels = prev.take_labels();
                    for &index in &labels {
                        self.store.set_enabled(index, true);
                    }
                    tracing::debug!(absorbed = labels.len(), "merged with previous domain");
                    domain.prepend(labels);
                    domain.extend_dropped(prev.take_dropped());
                }
                Some(prev) => {
                    domains.push(prev);
                    return;
                }
                None => return,
            }
        }
    }

    /// Re-partitions `domain` after a drop.
    ///
    /// Its labels are regrouped at their natural positions. Groups that come apart are
    /// committed ahead of it, a group touching the previous domain absorbs that domain, and
    /// `domain` keeps the last group. If nothing split or merged, the domain is left as it was.
    fn defragment(&mut self, domain: &mut Domain, domains: &mut Vec<Domain>) {
        let side = domain.side();
        let explode = domain.explode();
        let committed = domains.len();
        let mut has_prev = !domains.is_empty();
        let mut tmp: Option<Domain> = None;
        let mut expanded = false;
        let mut orphans: Vec<usize> = Vec::new();

        for index in domain.labels().to_vec() {
            let bounds = self.store.bounds(index);
            let clear_of_prev =
                !has_prev || domains.last().is_none_or(|p| p.is_not_intersect(bounds));
            if !clear_of_prev {
                self.store.set_enabled(index, false);
                match tmp.as_mut() {
                    Some(t) => t.record_dropped(index),
                    None => orphans.push(index),
                }
                continue;
            }

            match tmp.as_mut() {
                Some(t) if !t.is_not_intersect(bounds) => {
                    t.soft_add(index, &self.cx());
                    if t.is_critical_angle() {
                        self.store.set_enabled(index, false);
                        t.record_dropped(index);
                        t.pop();
                        t.calc_domain(&self.cx());
                    } else if has_prev && domains.last().is_some_and(|p| t.intersects(p)) {
                        if let Some(mut prev) = domains.pop() {
                            t.prepend(prev.take_labels());
                            t.extend_dropped(prev.take_dropped());
                        }
                        has_prev = false;
                        t.calc_domain(&self.cx());
                        expanded = true;
                    }
                }
                _ => {
                    if let Some(done) = tmp.take() {
                        domains.push(done);
                        has_prev = true;
                    }
                    let mut t = Domain::new(side, explode);
                    t.soft_add(index, &self.cx());
                    tmp = Some(t);
                }
            }
        }

        let Some(mut tmp) = tmp else {
            domain.extend_dropped(orphans);
            return;
        };
        if domains.len() > committed || expanded {
            tracing::debug!(
                split = domains.len().saturating_sub(committed),
                expanded,
                "defragmented domain"
            );
            domain.set_labels(tmp.take_labels());
            domain.extend_dropped(tmp.take_dropped());
            domain.extend_dropped(orphans);
        } else {
            tmp.clear_dropped_labels(self.store);
            for index in orphans {
                self.store.set_enabled(index, true);
            }
        }
    }

    /// Merges committed domains that ended up touching and resolves the merged domain again.
    ///
    /// Splits made while defragmenting are only checked against their natural positions, so
    /// a committed domain can come to rest on top of an earlier one once it is stacked.
    fn separate(&mut self, domains: &mut Vec<Domain>) {
        let mut steps = 0;
        while let Some((first, last)) = first_overlap(domains) {
            if self.exhausted(steps, "separate") {
                break;
            }
            steps += 1;
            let mut tail = domains.split_off(last + 1);
            let Some(mut merged) = domains.pop() else {
                break;
            };
            while domains.len() > first {
                if let Some(mut prev) = domains.pop() {
                    merged.prepend(prev.take_labels());
                    merged.extend_dropped(prev.take_dropped());
                }
            }
            tracing::debug!(
                first,
                last,
                labels = merged.labels().len(),
                "merged overlapping domains"
            );
            self.calculate(&mut merged, domains);
            if !merged.is_empty() {
                domains.push(merged);
            }
            domains.append(&mut tail);
        }
    }

    /// Gives dropped labels a second chance in domains of their own.
    fn recover(&mut self, domains: &mut Vec<Domain>, side: Side, explode: f64) {
        let mut dropped: Vec<usize> = domains
            .iter()
            .flat_map(|d| d.dropped_labels().iter().copied())
            .filter(|&i| !self.store.is_enabled(i))
            .collect();
        if dropped.is_empty() {
            return;
        }
        dropped.sort_unstable();
        dropped.dedup();
        if side == Side::Right {
            dropped.reverse();
        }

        let mut scratch: Option<Domain> = None;
        for index in dropped {
            let bounds = self.store.bounds(index);
            if !domains.iter().all(|d| d.is_not_intersect(bounds)) {
                if let Some(done) = scratch.take() {
                    domains.push(done);
                }
                continue;
            }

            let s = scratch.get_or_insert_with(|| Domain::new(side, explode));
            s.soft_add(index, &self.cx());
            let clear = s
                .bounds()
                .is_none_or(|b| domains.iter().all(|d| d.is_not_intersect(b)));
            if s.is_critical_angle() || !clear {
                s.pop();
                s.calc_domain(&self.cx());
                if let Some(done) = scratch.take().filter(|d| !d.is_empty()) {
                    domains.push(done);
                }
            } else {
                self.store.set_enabled(index, true);
                tracing::debug!(index, "recovered outside label");
            }
        }
        if let Some(done) = scratch.filter(|d| !d.is_empty()) {
            domains.push(done);
        }

        let store = &*self.store;
        for domain in domains.iter_mut() {
            domain.retain_dropped(|i| !store.is_enabled(i));
        }
    }

    /// Disables labels that run into a label (or its slice) placed at an earlier explode level.
    fn compare_with_placed(&mut self, domains: &[Domain], placed: &[usize]) {
        for domain in domains {
            for &index in domain.labels() {
                if !self.store.is_enabled(index) {
                    continue;
                }
                if placed.iter().any(|&other| self.collides(index, other)) {
                    self.store.set_enabled(index, false);
                    tracing::debug!(index, "label hidden by an earlier explode level");
                }
            }
        }
    }

    fn collides(&self, index: usize, other: usize) -> bool {
        let (Some(connector), Some(other_connector)) =
            (self.connector_line(index), self.connector_line(other))
        else {
            return false;
        };
        let bounds = self.store.bounds(index);
        if rects_overlap(bounds, self.store.bounds(other))
            || segment_hits_rect(other_connector, bounds)
            || segments_intersect(connector, other_connector)
        {
            return true;
        }
        self.slice_edges(other).iter().any(|&edge| {
            segment_hits_rect(edge, bounds) || segments_intersect(connector, edge)
        })
    }

    /// The radial part of a label's connector: from the slice to the start of the stub.
    fn connector_line(&self, index: usize) -> Option<Line> {
        let meta = self.meta.get(index)?;
        let end = self.store.position(index)? - Vec2::new(meta.connector, 0.0);
        Some(Line::new(meta.anchor, end))
    }

    fn slice_edges(&self, index: usize) -> Vec<Line> {
        let Some(meta) = self.meta.get(index) else {
            return Vec::new();
        };
        let angles = meta.angles();
        let c = self.geometry.center + angles.explode_offset(meta.explode);
        [angles.start, angles.end()]
            .into_iter()
            .map(|a| {
                Line::new(
                    c + polar(self.geometry.inner_radius, a),
                    c + polar(self.geometry.radius, a),
                )
            })
            .collect()
    }
}

/// The first pair `(i, j)`, `i < j`, of intersecting domains, ordered by `j`.
fn first_overlap(domains: &[Domain]) -> Option<(usize, usize)> {
    (1..domains.len()).find_map(|j| {
        (0..j)
            .find(|&i| domains[i].intersects(&domains[j]))
            .map(|i| (i, j))
    })
}
