// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG dump of an outside label layout.

use kurbo::{BezPath, Rect};
use peniko::{Brush, Color};
use vizir_pie::{LabelAnchor, OutsideLabelsLayout, OutsideLabelsSpec};

/// Slice fills, reused cyclically.
const PALETTE: [Color; 6] = [
    Color::from_rgb8(0x4e, 0x79, 0xa7),
    Color::from_rgb8(0xf2, 0x8e, 0x2b),
    Color::from_rgb8(0xe1, 0x57, 0x59),
    Color::from_rgb8(0x76, 0xb7, 0xb2),
    Color::from_rgb8(0x59, 0xa1, 0x4f),
    Color::from_rgb8(0xed, 0xc9, 0x48),
];

pub(crate) fn render_pie(spec: &OutsideLabelsSpec, layout: &OutsideLabelsLayout) -> String {
    let view_box = view_box(spec.bounds, layout);
    let mut out = String::new();

    out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" "#);
    out.push_str(&format!(
        r#"viewBox="{} {} {} {}" width="{}" height="{}" preserveAspectRatio="xMinYMin meet">"#,
        view_box.x0,
        view_box.y0,
        view_box.width(),
        view_box.height(),
        view_box.width(),
        view_box.height()
    ));
    out.push('\n');

    for (i, _) in layout.meta().iter() {
        let Some(path) = layout.slice_path(i) else {
            continue;
        };
        let fill = Brush::Solid(PALETTE[i % PALETTE.len()]);
        write_path(&mut out, &path, &fill, None);
    }

    let stroke = Some((&spec.connector_stroke.brush, spec.connector_stroke.stroke_width));
    let connectors = layout.connectors().iter().map(|(_, path)| path);
    for path in connectors.chain([layout.hovered_connector()]) {
        if !path.elements().is_empty() {
            write_path(&mut out, path, &Brush::default(), stroke);
        }
    }

    let style = &spec.label_style;
    for label in layout.labels().iter() {
        let i = label.index();
        if !layout.is_label_visible(i) {
            continue;
        }
        let Some(bounds) = layout.label_bounds(i) else {
            continue;
        };
        let (x, anchor) = match label.anchor() {
            LabelAnchor::LeftCenter => (bounds.x0 + style.padding, "start"),
            LabelAnchor::RightCenter => (bounds.x1 - style.padding, "end"),
        };
        out.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="{}" dominant-baseline="middle" text-anchor="{}""#,
            x,
            bounds.center().y,
            style.font_size,
            anchor
        ));
        write_paint_attr(&mut out, "fill", &style.fill);
        out.push('>');
        out.push_str(&escape_xml(label.text()));
        out.push_str("</text>\n");
    }

    out.push_str("</svg>\n");
    out
}

fn write_path(out: &mut String, path: &BezPath, fill: &Brush, stroke: Option<(&Brush, f64)>) {
    out.push_str(&format!(r#"<path d="{}""#, path.to_svg()));
    match stroke {
        Some((brush, width)) => {
            out.push_str(r#" fill="none""#);
            write_paint_attr(out, "stroke", brush);
            out.push_str(&format!(r#" stroke-width="{width}""#));
        }
        None => {
            write_paint_attr(out, "fill", fill);
            out.push_str(r#" stroke="white" stroke-width="1""#);
        }
    }
    out.push_str("/>\n");
}

/// The chart bounds grown to fit every visible label.
fn view_box(bounds: Rect, layout: &OutsideLabelsLayout) -> Rect {
    let labels = layout
        .labels()
        .iter()
        .filter(|l| layout.is_label_visible(l.index()))
        .filter_map(|l| layout.label_bounds(l.index()));
    let r = labels.fold(bounds.abs(), |acc, b| acc.union(b));
    let pad = 10.0;
    Rect::new(r.x0 - pad, r.y0 - pad, r.x1 + pad, r.y1 + pad)
}

fn svg_paint(brush: &Brush) -> (String, Option<f64>) {
    match brush {
        Brush::Solid(color) => {
            let rgba = color.to_rgba8();
            let fill = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
            let opacity = if rgba.a == 255 {
                None
            } else {
                Some(f64::from(rgba.a) / 255.0)
            };
            (fill, opacity)
        }
        _ => ("none".to_string(), None),
    }
}

fn write_paint_attr(out: &mut String, name: &str, brush: &Brush) {
    let (value, opacity) = svg_paint(brush);
    out.push_str(&format!(r#" {name}="{value}""#));
    if let Some(o) = opacity {
        out.push_str(&format!(r#" {name}-opacity="{o}""#));
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
