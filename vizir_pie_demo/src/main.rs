// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outside label demos for `vizir_pie`.
//!
//! Writes `vizir_pie_demo.html`. Set `RUST_LOG=vizir_pie=debug` (or `trace`) to watch the
//! domain resolution.

mod html;
mod svg;

use kurbo::Rect;
use tracing_subscriber::EnvFilter;
use vizir_pie::{
    HeuristicTextMeasurer, LabelFormat, Length, OutsideLabels, OutsideLabelsSpec, OverlapMode,
    PieData, PieDatum,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let sections = vec![
        sparse_demo(),
        dense_demo(),
        overlap_demo(),
        donut_demo(),
        explode_demo(),
        seam_demo(),
        hover_demo(),
    ];

    let html = html::render_report("VizIR pie outside labels demo", &sections);
    std::fs::write("vizir_pie_demo.html", html).expect("write vizir_pie_demo.html");
    tracing::info!(sections = sections.len(), "wrote vizir_pie_demo.html");
}

fn spec() -> OutsideLabelsSpec {
    OutsideLabelsSpec::new(Rect::new(0.0, 0.0, 420.0, 300.0))
}

fn browsers() -> PieData {
    PieData::new(vec![
        PieDatum::new("Chrome", 64.7),
        PieDatum::new("Safari", 18.6),
        PieDatum::new("Edge", 5.2),
        PieDatum::new("Firefox", 2.8),
        PieDatum::new("Samsung", 2.6),
        PieDatum::new("Opera", 2.2),
        PieDatum::new("UC", 1.0),
        PieDatum::new("Other", 2.9),
    ])
}

fn dense() -> PieData {
    let mut values: Vec<f64> = (1..=40_u32).map(|i| 1.0 + f64::from(i % 5) * 0.3).collect();
    values.push(120.0);
    PieData::from_values(&values)
}

fn section(
    title: &str,
    description: &str,
    spec: OutsideLabelsSpec,
    data: &PieData,
) -> html::HtmlSection {
    let mut pie = OutsideLabels::new(spec);
    let layout = pie
        .calculate_outside_labels(data, &HeuristicTextMeasurer)
        .expect("demo configuration is valid");
    let stats = format!(
        "{} of {} labels shown, {} left / {} right domains",
        layout.enabled_count(),
        layout.labels().len(),
        layout.left_domains().len(),
        layout.right_domains().len()
    );
    html::HtmlSection {
        title: title.to_string(),
        description: format!("{description} {stats}."),
        svg: svg::render_pie(pie.spec(), pie.layout()),
    }
}

fn sparse_demo() -> html::HtmlSection {
    section(
        "Sparse",
        "Browser share with name and percent labels. Neighbouring small slices share a domain.",
        spec().with_label_format(LabelFormat::NameAndPercent),
        &browsers(),
    )
}

fn dense_demo() -> html::HtmlSection {
    section(
        "Dense",
        "Forty small slices crowd both sides. Labels that would bend their connector past 60 \
         degrees are dropped.",
        spec(),
        &dense(),
    )
}

fn overlap_demo() -> html::HtmlSection {
    section(
        "Allow overlap",
        "The same data with domain resolution switched off.",
        spec().with_overlap_mode(OverlapMode::AllowOverlap),
        &dense(),
    )
}

fn donut_demo() -> html::HtmlSection {
    section(
        "Donut",
        "A 55% inner radius with value labels and a wider critical angle.",
        spec()
            .with_inner_radius(Length::Percent(55.0))
            .with_label_format(LabelFormat::Value)
            .with_critical_angle(80.0),
        &browsers(),
    )
}

fn explode_demo() -> html::HtmlSection {
    let mut data = browsers();
    for row in [1, 4] {
        data.toggle_exploded(row);
    }
    section(
        "Exploded",
        "Exploded slices are laid out first; later labels avoid them and their edges.",
        spec().with_explode(Length::Pixels(18.0)),
        &data,
    )
}

fn seam_demo() -> html::HtmlSection {
    let mut values = vec![0.6; 6];
    values.push(60.0);
    values.extend([0.6; 6]);
    section(
        "Seam",
        "Small slices on both sides of three o'clock stack as one column.",
        spec().with_start_angle(90.0),
        &PieData::from_values(&values),
    )
}

fn hover_demo() -> html::HtmlSection {
    let data = dense();
    let mut pie = OutsideLabels::new(spec());
    let layout = pie
        .calculate_outside_labels(&data, &HeuristicTextMeasurer)
        .expect("demo configuration is valid");
    let dropped = layout.labels().iter().find(|l| !l.enabled()).map(|l| l.index());
    let description = match dropped {
        Some(index) if pie.hover(index) => {
            format!("Label {index} was dropped; hovering its slice shows it on a shared connector.")
        }
        _ => "Nothing was dropped, so hovering changes nothing.".to_string(),
    };
    html::HtmlSection {
        title: "Hover".to_string(),
        description,
        svg: svg::render_pie(pie.spec(), pie.layout()),
    }
}
