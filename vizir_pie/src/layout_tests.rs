// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

extern crate std;

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Rect;

use crate::geometry::rects_overlap;
use crate::{
    FIT_TOLERANCE, HeuristicTextMeasurer, LayoutError, Length, OutsideLabels,
    OutsideLabelsLayout, OutsideLabelsSpec, OverlapMode, PieData, PieDatum, Side,
    standard_angle,
};

fn spec() -> OutsideLabelsSpec {
    OutsideLabelsSpec::new(Rect::new(0.0, 0.0, 400.0, 300.0))
}

fn run(spec: OutsideLabelsSpec, data: &PieData) -> OutsideLabels {
    let mut pie = OutsideLabels::new(spec);
    pie.calculate_outside_labels(data, &HeuristicTextMeasurer)
        .expect("valid configuration");
    pie
}

/// Fifty thin slices crammed into the top right quarter, plus one large slice.
fn packed() -> PieData {
    let mut values = vec![1.0; 50];
    values.push(150.0);
    PieData::from_values(&values)
}

fn snapshot(layout: &OutsideLabelsLayout) -> Vec<(usize, f64, f64, bool)> {
    layout
        .labels()
        .iter()
        .map(|l| (l.index(), l.angle(), l.radius(), l.enabled()))
        .collect()
}

fn assert_invariants(layout: &OutsideLabelsLayout) {
    let store = layout.labels();

    let sweeps: Vec<f64> = layout.slices().iter().flatten().map(|s| s.sweep).collect();
    if !sweeps.is_empty() {
        let total: f64 = sweeps.iter().sum();
        assert!((total - 360.0).abs() < 1e-9, "slices cover {total} degrees");
    }

    let mut members = Vec::new();
    for domains in [layout.left_domains(), layout.right_domains()] {
        for d in domains {
            let enabled: Vec<usize> = d
                .labels()
                .iter()
                .copied()
                .filter(|&i| store.is_enabled(i))
                .collect();
            for (k, &a) in enabled.iter().enumerate() {
                for &b in &enabled[k + 1..] {
                    assert!(
                        !rects_overlap(store.bounds(a), store.bounds(b)),
                        "labels {a} and {b} overlap inside a domain"
                    );
                }
            }
            members.extend(enabled);
        }
        for (k, a) in domains.iter().enumerate() {
            for b in &domains[k + 1..] {
                if a.explode() == b.explode() {
                    assert!(!a.intersects(b), "{:?} intersects {:?}", a.bounds(), b.bounds());
                }
            }
        }
    }

    let count = members.len();
    members.sort_unstable();
    members.dedup();
    assert_eq!(members.len(), count, "a label belongs to two domains");
    if !layout.left_domains().is_empty() || !layout.right_domains().is_empty() {
        assert_eq!(count, layout.enabled_count(), "enabled label outside every domain");
    }

    assert_eq!(layout.connectors().path_count(), layout.enabled_count());
}

/// No two enabled labels overlap, whatever domain, side or explode level they belong to.
fn assert_labels_apart(layout: &OutsideLabelsLayout) {
    let store = layout.labels();
    let enabled: Vec<usize> = store.iter().filter(|l| l.enabled()).map(|l| l.index()).collect();
    for (k, &a) in enabled.iter().enumerate() {
        for &b in &enabled[k + 1..] {
            assert!(
                !rects_overlap(store.bounds(a), store.bounds(b)),
                "labels {a} and {b} overlap: {:?} {:?}",
                store.bounds(a),
                store.bounds(b)
            );
        }
    }
}

/// Deterministic linear congruential generator for generated pies.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        u32::try_from(self.0 >> 33).expect("31 bits")
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        f64::from(self.next()) / f64::from(1_u32 << 31)
    }

    /// Uniform in `lo..=hi`.
    fn range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + self.next() % (hi - lo + 1)
    }
}

/// A pie of 2 to 80 rows: mostly thin slices with the odd large one.
fn generated(rng: &mut Lcg) -> PieData {
    let rows = rng.range(2, 80);
    let values: Vec<f64> = (0..rows)
        .map(|_| {
            if rng.range(0, 9) == 0 {
                20.0 + 80.0 * rng.unit()
            } else {
                0.2 + 3.0 * rng.unit()
            }
        })
        .collect();
    PieData::from_values(&values)
}

#[test]
fn four_equal_slices() {
    let pie = run(spec(), &PieData::from_values(&[25.0, 25.0, 25.0, 25.0]));
    let layout = pie.layout();

    let starts: Vec<f64> = layout.slices().iter().flatten().map(|s| s.start).collect();
    assert_eq!(starts, [-90.0, 0.0, 90.0, 180.0]);
    assert!(layout.slices().iter().flatten().all(|s| s.sweep == 90.0));
    assert_eq!(layout.enabled_count(), 4);
    assert_eq!(layout.connectors().path_count(), 4);
    assert_eq!(layout.right_domains().len(), 2);
    assert_eq!(layout.left_domains().len(), 2);
    assert_invariants(layout);
}

#[test]
fn single_row_is_never_exploded() {
    let data = PieData::new(vec![PieDatum::new("all", 100.0).with_exploded(true)]);
    let pie = run(spec(), &data);
    let layout = pie.layout();

    assert_eq!(layout.meta().get(0).map(|m| m.explode), Some(0.0));
    assert_eq!(layout.enabled_count(), 1);
    assert!(layout.left_domains().is_empty());
    assert!(layout.right_domains().is_empty());
    assert_eq!(layout.connectors().path_count(), 1);

    let unfitted = run(spec().with_label_fit(false), &data);
    let plain = spec().resolve(false).expect("valid configuration");
    assert_eq!(unfitted.layout().geometry().radius, plain.radius);
}

#[test]
fn packed_side_drops_labels() {
    let pie = run(spec(), &packed());
    let layout = pie.layout();

    assert!(layout.enabled_count() < 51);
    assert!(layout.labels().is_enabled(50), "the large slice keeps its label");
    let dropped: usize = layout
        .right_domains()
        .iter()
        .map(|d| d.dropped_labels().len())
        .sum();
    assert!(dropped > 0);
    for d in layout.right_domains() {
        assert_eq!(d.side(), Side::Right);
        for &i in d.dropped_labels() {
            assert!(!layout.labels().is_enabled(i), "dropped label {i} is still enabled");
        }
    }
    assert_invariants(layout);
}

#[test]
fn zero_values_take_no_room() {
    let pie = run(spec(), &PieData::from_values(&[10.0, 0.0, 30.0]));
    let layout = pie.layout();

    assert!(layout.slices()[1].is_none());
    assert!(layout.labels().get(1).is_none());
    assert!(layout.meta().get(1).is_none());
    assert!(layout.slice_path(1).is_none());
    let sweeps: Vec<f64> = layout.slices().iter().flatten().map(|s| s.sweep).collect();
    assert_eq!(sweeps, [90.0, 270.0]);
    assert_eq!(layout.enabled_count(), 2);
}

#[test]
fn missing_values_are_skipped() {
    let data = PieData::new(vec![
        PieDatum::new("a", 1.0),
        PieDatum::new("b", None::<f64>),
        PieDatum::new("c", f64::NAN),
        PieDatum::new("d", -4.0),
        PieDatum::new("e", 1.0),
    ]);
    let pie = run(spec(), &data);
    let layout = pie.layout();
    assert_eq!(layout.labels().len(), 2);
    assert_eq!(layout.slices().iter().flatten().count(), 2);
    assert_invariants(layout);
}

#[test]
fn wider_critical_angle_keeps_more_labels() {
    let strict = run(spec().with_label_fit(false), &packed());
    let loose = run(
        spec().with_label_fit(false).with_critical_angle(180.0),
        &packed(),
    );
    assert!(loose.layout().enabled_count() >= strict.layout().enabled_count());
    assert_invariants(loose.layout());
}

#[test]
fn seam_neighbors_stack_in_angular_order() {
    // Four thin slices either side of 0 degrees, with the large slice on the left.
    let data = PieData::from_values(&[1.0, 1.0, 1.0, 1.0, 200.0, 1.0, 1.0, 1.0, 1.0]);
    let pie = run(spec().with_start_angle(90.0).with_critical_angle(180.0), &data);
    let layout = pie.layout();

    assert_eq!(layout.right_domains().len(), 1);
    let domain = &layout.right_domains()[0];
    assert_eq!(domain.labels(), [3, 2, 1, 0, 8, 7, 6, 5]);
    assert!(domain.labels().iter().all(|&i| layout.labels().is_enabled(i)));

    let ys: Vec<f64> = domain
        .labels()
        .iter()
        .map(|&i| layout.labels().bounds(i).center().y)
        .collect();
    assert!(ys.windows(2).all(|w| w[0] > w[1]), "stack out of order: {ys:?}");

    let signed = |i: usize| {
        let a = standard_angle(layout.meta().get(i).map_or(0.0, |m| m.mid_angle()));
        if a > 180.0 { a - 360.0 } else { a }
    };
    let mids: Vec<f64> = domain.labels().iter().map(|&i| signed(i)).collect();
    assert!(mids.windows(2).all(|w| w[0] > w[1]), "angles out of order: {mids:?}");
    assert_invariants(layout);
}

#[test]
fn layout_is_idempotent() {
    let data = packed();
    let mut pie = OutsideLabels::new(spec());
    let first = snapshot(
        pie.calculate_outside_labels(&data, &HeuristicTextMeasurer)
            .expect("valid configuration"),
    );
    let second = snapshot(
        pie.calculate_outside_labels(&data, &HeuristicTextMeasurer)
            .expect("valid configuration"),
    );
    assert_eq!(first, second);
}

#[test]
fn hover_adds_at_most_one_path() {
    let mut pie = run(spec(), &packed());
    let enabled = pie.layout().enabled_count();
    let dropped = pie
        .layout()
        .labels()
        .iter()
        .find(|l| !l.enabled())
        .map(|l| l.index())
        .expect("packed pie drops labels");

    assert!(pie.hover(dropped));
    assert!(pie.layout().is_label_visible(dropped));
    assert_eq!(pie.layout().connectors().path_count(), enabled + 1);
    assert_eq!(pie.layout().connectors().hovered_index(), Some(dropped));

    let other = pie
        .layout()
        .labels()
        .iter()
        .filter(|l| !l.enabled())
        .map(|l| l.index())
        .find(|&i| i != dropped)
        .expect("more than one label dropped");
    assert!(pie.hover(other));
    assert!(!pie.layout().is_label_visible(dropped));
    assert_eq!(pie.layout().connectors().path_count(), enabled + 1);

    pie.unhover();
    assert!(!pie.layout().is_label_visible(other));
    assert_eq!(pie.layout().connectors().path_count(), enabled);
    assert!(pie.layout().hovered_connector().elements().is_empty());

    assert!(pie.hover(50));
    assert_eq!(pie.layout().connectors().path_count(), enabled);
    pie.unhover();
    assert!(pie.layout().connectors().get(50).is_some_and(|p| !p.elements().is_empty()));
    assert!(!pie.hover(999));
}

#[test]
fn allow_overlap_keeps_every_label() {
    let pie = run(spec().with_overlap_mode(OverlapMode::AllowOverlap), &packed());
    let layout = pie.layout();
    assert_eq!(layout.enabled_count(), 51);
    assert!(layout.left_domains().is_empty());
    assert!(layout.right_domains().is_empty());
    assert_eq!(layout.connectors().path_count(), 51);
}

#[test]
fn exploded_slice_keeps_its_label() {
    let mut data = PieData::from_values(&[1.0; 12]);
    data.rows[3] = PieDatum::new("3", 1.0).with_exploded(true);
    let pie = run(spec(), &data);
    let layout = pie.layout();

    let explode = layout.geometry().explode;
    assert!(explode > 0.0);
    assert_eq!(layout.meta().get(3).map(|m| m.explode), Some(explode));
    assert!(layout.labels().is_enabled(3));
    assert_eq!(layout.right_domains()[0].explode(), explode);

    let exploded = layout.labels().bounds(3);
    for label in layout.labels().iter().filter(|l| l.enabled() && l.index() != 3) {
        assert!(!rects_overlap(exploded, layout.labels().bounds(label.index())));
    }
    assert_invariants(layout);
}

#[test]
fn toggle_explode_relays_the_pie() {
    let mut data = PieData::from_values(&[1.0, 2.0, 3.0, 4.0]);
    let mut pie = run(spec(), &data);
    let flat_radius = pie.layout().geometry().radius;

    let layout = pie
        .toggle_explode(&mut data, 2, &HeuristicTextMeasurer)
        .expect("valid configuration");
    assert!(data.rows[2].exploded);
    assert!(layout.geometry().radius < flat_radius);
    assert_eq!(layout.meta().get(2).map(|m| m.explode), Some(layout.geometry().explode));
    assert_eq!(layout.meta().get(1).map(|m| m.explode), Some(0.0));

    let layout = pie
        .toggle_explode(&mut data, 2, &HeuristicTextMeasurer)
        .expect("valid configuration");
    assert_eq!(layout.geometry().radius, flat_radius);
    assert_eq!(layout.meta().get(2).map(|m| m.explode), Some(0.0));
}

#[test]
fn donut_slices_have_a_hole() {
    let pie = run(
        spec().with_inner_radius(Length::Percent(50.0)),
        &PieData::from_values(&[1.0, 1.0]),
    );
    let layout = pie.layout();
    let g = layout.geometry();
    assert_eq!(g.inner_radius, g.radius / 2.0);
    let path = layout.slice_path(0).expect("slice 0 exists");
    let center = g.center;
    assert!(!kurbo::Shape::contains(&path, center + kurbo::Vec2::new(g.radius / 4.0, 0.0)));
    assert!(kurbo::Shape::contains(&path, center + kurbo::Vec2::new(g.radius * 0.75, 0.0)));
}

#[test]
fn label_offset_moves_unresolved_labels_outward() {
    let data = PieData::from_values(&[1.0, 1.0, 1.0]);
    let spec = spec()
        .with_label_fit(false)
        .with_overlap_mode(OverlapMode::AllowOverlap);
    let plain = run(spec.clone(), &data);
    let offset = run(spec.with_label_offset(0.0, Length::Pixels(12.0)), &data);
    let center = plain.layout().geometry().center;
    for label in plain.layout().labels().iter() {
        let i = label.index();
        let pa = plain.layout().labels().position(i).expect("label exists");
        let pb = offset.layout().labels().position(i).expect("label exists");
        let grown = (pb - center).hypot() - (pa - center).hypot();
        assert!((grown - 12.0).abs() < 1e-9, "label {i} moved {grown}");
    }
}

#[test]
fn labels_are_pulled_inside_the_bounds() {
    let spec = spec().with_radius(Length::Percent(50.0));
    let bounds = spec.bounds;
    let data = PieData::from_values(&[1.0, 1.0]);

    let unfitted = run(spec.clone().with_label_fit(false), &data);
    let (before, _) = unfitted
        .layout()
        .label_overflow(bounds)
        .expect("labels are enabled");
    assert!(before > FIT_TOLERANCE, "labels should start out of bounds: {before}");

    let fitted = run(spec, &data);
    let layout = fitted.layout();
    let (after, _) = layout.label_overflow(bounds).expect("labels are enabled");
    assert!(after <= FIT_TOLERANCE, "labels still reach {after} past the bounds");
    assert!(layout.geometry().radius < unfitted.layout().geometry().radius);
    assert_eq!(layout.enabled_count(), 2);
    assert_invariants(layout);
}

#[test]
fn label_fit_leaves_roomy_pies_alone() {
    let spec = spec().with_radius(Length::Percent(20.0));
    let data = PieData::from_values(&[1.0, 2.0, 3.0]);
    let fitted = run(spec.clone(), &data);
    let unfitted = run(spec.with_label_fit(false), &data);
    assert_eq!(
        fitted.layout().geometry().radius,
        unfitted.layout().geometry().radius
    );
    let (overflow, _) = fitted
        .layout()
        .label_overflow(fitted.spec().bounds)
        .expect("labels are enabled");
    assert!(overflow < 0.0, "labels should have room: {overflow}");
    assert!(
        fitted
            .layout()
            .label_overflow(Rect::ZERO)
            .is_some_and(|(o, _)| o > 0.0)
    );
    assert_eq!(run(self::spec(), &PieData::default()).layout().label_overflow(Rect::ZERO), None);
}

#[test]
fn generated_pies_keep_labels_apart() {
    let mut rng = Lcg(0x5eed_0f_da7a);
    for case in 0..120 {
        let mut data = generated(&mut rng);
        let start_angle = 360.0 * rng.unit() - 180.0;
        if case % 4 == 3 {
            let row = usize::try_from(rng.next()).expect("fits") % data.rows.len();
            data.toggle_exploded(row);
        }
        let spec = spec().with_start_angle(start_angle);

        let mut pie = OutsideLabels::new(spec);
        let first = pie
            .calculate_outside_labels(&data, &HeuristicTextMeasurer)
            .expect("valid configuration");
        assert_invariants(first);
        assert_labels_apart(first);
        let first = snapshot(first);
        let second = snapshot(
            pie.calculate_outside_labels(&data, &HeuristicTextMeasurer)
                .expect("valid configuration"),
        );
        assert_eq!(first, second, "case {case} is not idempotent");
    }
}

#[test]
fn generated_pies_degrade_monotonically() {
    // Cross-level hiding can invert the counts once slices explode, and the label fit can
    // settle on different radii, so both are kept out of this comparison.
    let mut rng = Lcg(0x0dd_ba11);
    for case in 0..80 {
        let data = generated(&mut rng);
        let start_angle = 360.0 * rng.unit() - 180.0;
        let enabled = |critical_angle: f64| {
            let spec = spec()
                .with_label_fit(false)
                .with_start_angle(start_angle)
                .with_critical_angle(critical_angle);
            let pie = run(spec, &data);
            assert_labels_apart(pie.layout());
            pie.layout().enabled_count()
        };
        let (narrow, medium, wide) = (enabled(20.0), enabled(60.0), enabled(180.0));
        assert!(
            narrow <= wide && medium <= wide,
            "case {case}: {narrow} / {medium} / {wide} labels at 20 / 60 / 180 degrees"
        );
    }
}

#[test]
fn empty_and_degenerate_sources() {
    let pie = run(spec(), &PieData::default());
    assert_eq!(pie.layout().labels().len(), 0);
    assert_eq!(pie.layout().connectors().path_count(), 0);

    let pie = run(spec(), &PieData::from_values(&[0.0, 0.0]));
    assert!(pie.layout().slices().iter().all(Option::is_none));
    assert_eq!(pie.layout().enabled_count(), 0);
}

#[test]
fn invalid_configuration_is_reported() {
    let mut pie = OutsideLabels::new(spec().with_radius(Length::Pixels(-5.0)));
    let err = pie
        .calculate_outside_labels(&PieData::from_values(&[1.0]), &HeuristicTextMeasurer)
        .expect_err("negative radius");
    assert!(matches!(err, LayoutError::InvalidLength { name: "radius", .. }));

    let mut pie = OutsideLabels::new(OutsideLabelsSpec::new(Rect::new(
        0.0,
        0.0,
        f64::INFINITY,
        10.0,
    )));
    let err = pie
        .calculate_outside_labels(&PieData::from_values(&[1.0]), &HeuristicTextMeasurer)
        .expect_err("infinite bounds");
    assert!(matches!(err, LayoutError::NonFiniteBounds(_)));
}
