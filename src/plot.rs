//! Box plots rendered to SVG
//!
//! Two kinds of plot per comparison group:
//! - statistics plot: boxes per technology, significance brackets for the
//!   post-hoc pairs, and a two-line title naming the tests that ran
//! - overview plot: the same boxes without any statistics
//!
//! Every plot is drawn into an in-memory SVG document; the drawing area is
//! dropped before the document is returned.

use crate::decision::{DecisionOutcome, PairwiseResult};
use crate::groups::ComparisonGroup;
use crate::layout::{MetricLabels, ReportLayout};
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;

/// "light rose"
const NO_DIFFERENCE_BACKGROUND: RGBColor = RGBColor(255, 197, 203);

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("no data to plot for {0}")]
    Empty(String),

    #[error("render error: {0}")]
    Render(String),
}

fn render_error(e: impl std::fmt::Display) -> PlotError {
    PlotError::Render(e.to_string())
}

/// Presentation options shared by all plots of a run
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub width: u32,
    pub height: u32,
    /// Pairs with a p-value above this are not annotated
    pub annotation_threshold: f64,
    /// Paint the background when the omnibus test found no difference
    pub highlight_no_difference: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            annotation_threshold: 0.05,
            highlight_no_difference: true,
        }
    }
}

/// `statistics-<filename>-<source>.svg`
pub fn statistics_file_name(labels: &MetricLabels, source: &str) -> String {
    format!("statistics-{}-{}.svg", labels.filename, source)
}

/// `<overview filename>-<source>.svg`
pub fn overview_file_name(labels: &MetricLabels, source: &str) -> String {
    format!("{}-{}.svg", labels.overview_filename, source)
}

/// Upper-case the first letter of every word, e.g. `control-plane` -> `Control-Plane`
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}

/// Short p-value label drawn above a bracket
pub fn format_p_value(p: f64) -> String {
    if p < 1e-3 {
        format!("p = {:.2e}", p)
    } else {
        format!("p = {:.3}", p)
    }
}

/// Bracket between two technologies, stacked at `level`
#[derive(Debug, Clone, PartialEq)]
pub struct Bracket {
    pub left: usize,
    pub right: usize,
    pub level: usize,
    pub label: String,
}

/// Place the significant pairs on non-overlapping levels
///
/// Narrow brackets go first so wider ones stack above them. A bracket takes
/// the lowest level whose existing brackets it does not overlap.
pub fn layout_brackets(
    pairs: &[PairwiseResult],
    layout: &ReportLayout,
    threshold: f64,
) -> Vec<Bracket> {
    let mut spans: Vec<(usize, usize, f64)> = pairs
        .iter()
        .filter(|pair| pair.p_value <= threshold)
        .filter_map(|pair| {
            let a = layout.technology_index(&pair.technology_a)?;
            let b = layout.technology_index(&pair.technology_b)?;
            Some((a.min(b), a.max(b), pair.p_value))
        })
        .collect();
    spans.sort_by_key(|&(left, right, _)| (right - left, left));

    let mut levels: Vec<Vec<(usize, usize)>> = Vec::new();
    let mut brackets = Vec::with_capacity(spans.len());
    for (left, right, p) in spans {
        let level = levels
            .iter()
            .position(|taken| taken.iter().all(|&(l, r)| right < l || left > r))
            .unwrap_or(levels.len());
        if level == levels.len() {
            levels.push(Vec::new());
        }
        levels[level].push((left, right));
        brackets.push(Bracket {
            left,
            right,
            level,
            label: format_p_value(p),
        });
    }
    brackets
}

/// What to put on one plot
struct PlotContent<'a> {
    group: &'a ComparisonGroup,
    layout: &'a ReportLayout,
    title: String,
    subtitle: Option<String>,
    brackets: Vec<Bracket>,
    background: RGBColor,
}

/// Box plot with significance brackets and the tests named in the title
pub fn render_statistics_plot(
    group: &ComparisonGroup,
    outcome: &DecisionOutcome,
    layout: &ReportLayout,
    options: &PlotOptions,
) -> Result<String, PlotError> {
    let labels = layout.labels(group.metric);
    let background = if !outcome.significant() && options.highlight_no_difference {
        NO_DIFFERENCE_BACKGROUND
    } else {
        WHITE
    };

    render(
        &PlotContent {
            group,
            layout,
            title: format!("{} - {}", labels.title, group.source),
            subtitle: Some(format!("({})", outcome.title_suffix())),
            brackets: layout_brackets(outcome.pairs(), layout, options.annotation_threshold),
            background,
        },
        options,
    )
}

/// Plain box plot of one comparison group
pub fn render_overview_plot(
    group: &ComparisonGroup,
    layout: &ReportLayout,
    options: &PlotOptions,
) -> Result<String, PlotError> {
    let labels = layout.labels(group.metric);
    render(
        &PlotContent {
            group,
            layout,
            title: format!("{} {}", title_case(&group.source), labels.title),
            subtitle: None,
            brackets: Vec::new(),
            background: WHITE,
        },
        options,
    )
}

fn render(content: &PlotContent<'_>, options: &PlotOptions) -> Result<String, PlotError> {
    let group = content.group;
    let labels = content.layout.labels(group.metric);
    let technologies = &content.layout.technologies;

    let (low, high) = group
        .value_range()
        .ok_or_else(|| PlotError::Empty(format!("{}/{}", group.metric, group.source)))?;
    let span = if high > low { high - low } else { 1.0 };
    let level_height = span * 0.08;
    let levels = content
        .brackets
        .iter()
        .map(|b| b.level + 1)
        .max()
        .unwrap_or(0);
    let y_min = (low - span * 0.05) as f32;
    let y_max = (high + span * 0.05 + level_height * levels as f64) as f32;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&content.background).map_err(render_error)?;

        let mut area = root
            .titled(&content.title, ("sans-serif", 22))
            .map_err(render_error)?;
        if let Some(subtitle) = &content.subtitle {
            area = area
                .titled(subtitle, ("sans-serif", 16))
                .map_err(render_error)?;
        }

        let mut chart = ChartBuilder::on(&area)
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..technologies.len() as u32).into_segmented(), y_min..y_max)
            .map_err(render_error)?;

        let name_of = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) => technologies
                .get(*i as usize)
                .cloned()
                .unwrap_or_default(),
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(labels.x_label.as_str())
            .y_desc(labels.y_label.as_str())
            .x_label_formatter(&name_of)
            .draw()
            .map_err(render_error)?;

        for (index, technology) in technologies.iter().enumerate() {
            let Some(values) = group.values_of(technology) else {
                continue;
            };
            let color = Palette99::pick(index).mix(0.9);
            let key = SegmentValue::CenterOf(index as u32);
            let quartiles = Quartiles::new(values);
            let [lower_fence, _, _, _, upper_fence] = quartiles.values();

            chart
                .draw_series(std::iter::once(
                    Boxplot::new_vertical(key.clone(), &quartiles)
                        .width(40)
                        .whisker_width(0.5)
                        .style(color.stroke_width(2)),
                ))
                .map_err(render_error)?;

            chart
                .draw_series(
                    values
                        .iter()
                        .map(|&v| v as f32)
                        .filter(|&v| v < lower_fence || v > upper_fence)
                        .map(|v| Circle::new((key.clone(), v), 3, color.stroke_width(1))),
                )
                .map_err(render_error)?;
        }

        for bracket in &content.brackets {
            let y = (high + span * 0.03 + level_height * bracket.level as f64) as f32;
            let tick = (level_height * 0.25) as f32;
            let (x0, y0) =
                chart.backend_coord(&(SegmentValue::CenterOf(bracket.left as u32), y - tick));
            let (x1, y1) = chart.backend_coord(&(SegmentValue::CenterOf(bracket.right as u32), y));

            root.draw(&PathElement::new(
                vec![(x0, y0), (x0, y1), (x1, y1), (x1, y0)],
                BLACK.stroke_width(1),
            ))
            .map_err(render_error)?;

            let style = ("sans-serif", 12)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            root.draw(&Text::new(
                bracket.label.clone(),
                ((x0 + x1) / 2, y1 - 2),
                style,
            ))
            .map_err(render_error)?;
        }

        root.present().map_err(render_error)?;
    }

    Ok(svg)
}
