//! SVG bar charts.
//!
//! Two chart shapes are produced:
//! - grouped bars: one group per reference label, one bar per release
//! - created vs fixed: a translucent created bar with the solid fixed bar in
//!   front of it, labelled with the fixed percentage
//!
//! Rendering is pure string building; [`ChartWriter`] owns the file side.

use crate::error::Result;
use crate::stats::{AlignedTable, ComparisonRecord};
use indexmap::IndexMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Pastel series colors, cycled by release index.
pub const PALETTE: [&str; 8] = [
    "#a1c9f4", "#ffb482", "#8de5a1", "#ff9f9b", "#d0bbff", "#debb9b", "#fab0e4", "#cfcfcf",
];

const HEIGHT: usize = 460;
const MARGIN_LEFT: usize = 70;
const MARGIN_RIGHT: usize = 180;
const PLOT_TOP: usize = 60;
const PLOT_BOTTOM: usize = 340;
const BAR_WIDTH: usize = 18;
const GROUP_GAP: usize = 24;
const MIN_WIDTH: usize = 640;
const TICKS: usize = 5;

/// Color for the series at `index`.
#[must_use]
pub fn series_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// File name for a chart titled `title`.
///
/// Lowercased, spaces become `_`, anything outside `[a-z0-9_-]` is dropped.
#[must_use]
pub fn chart_file_name(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            'a'..='z' | '0'..='9' | '_' | '-' => Some(c),
            _ => None,
        })
        .collect();
    format!("{slug}.svg")
}

/// Render a grouped bar chart of `series` over `labels`.
#[must_use]
pub fn render_grouped<S: AsRef<str>>(
    title: &str,
    y_label: &str,
    labels: &[S],
    series: &AlignedTable,
) -> String {
    let per_group = series.len().max(1);
    let group_width = per_group * BAR_WIDTH + GROUP_GAP;
    let max = series.values().flatten().copied().max().unwrap_or(0);

    let mut canvas = Canvas::new(title, labels.len(), group_width, max);
    canvas.y_axis(y_label);

    for (release_idx, values) in series.values().enumerate() {
        let color = series_color(release_idx);
        for (label_idx, value) in values.iter().enumerate() {
            let x = canvas.group_x(label_idx) + release_idx * BAR_WIDTH;
            canvas.bar(x, BAR_WIDTH - 2, *value, color, 1.0);
        }
    }

    canvas.x_labels(labels);
    for (release_idx, release) in series.keys().enumerate() {
        canvas.legend_entry(release_idx, release, series_color(release_idx), 1.0);
    }
    canvas.finish()
}

/// Render created vs fixed bars for the records produced by [`crate::stats::pair`].
#[must_use]
pub fn render_created_vs_fixed<S: AsRef<str>>(
    title: &str,
    labels: &[S],
    records: &[ComparisonRecord],
) -> String {
    let mut by_release: IndexMap<&str, Vec<&ComparisonRecord>> = IndexMap::new();
    for record in records {
        by_release.entry(record.release.as_str()).or_default().push(record);
    }

    let per_group = by_release.len().max(1);
    let group_width = per_group * BAR_WIDTH + GROUP_GAP;
    let max = records.iter().map(|r| r.created.max(r.fixed)).max().unwrap_or(0);

    let mut canvas = Canvas::new(title, labels.len(), group_width, max);
    canvas.y_axis("Issues");

    for (release_idx, rows) in by_release.values().enumerate() {
        let color = series_color(release_idx);
        for (label_idx, record) in rows.iter().enumerate().take(labels.len()) {
            let x = canvas.group_x(label_idx) + release_idx * BAR_WIDTH;
            canvas.bar(x, BAR_WIDTH - 2, record.created, color, 0.4);
            canvas.bar(x + 3, BAR_WIDTH - 8, record.fixed, color, 1.0);
            if record.created > 0 {
                let percent = format!("{:.0}%", record.fixed_percent());
                canvas.value_label(x + BAR_WIDTH / 2, record.created, &percent);
            }
        }
    }

    canvas.x_labels(labels);
    let mut entry = 0;
    for (release_idx, release) in by_release.keys().enumerate() {
        let color = series_color(release_idx);
        canvas.legend_entry(entry, &format!("{release} created"), color, 0.4);
        canvas.legend_entry(entry + 1, &format!("{release} fixed"), color, 1.0);
        entry += 2;
    }
    canvas.finish()
}

/// Writes rendered charts into an images directory.
#[derive(Debug, Clone)]
pub struct ChartWriter {
    images_dir: PathBuf,
}

impl ChartWriter {
    pub fn new(images_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
        }
    }

    #[must_use]
    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Render and save a grouped bar chart; returns the file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn grouped<S: AsRef<str>>(
        &self,
        title: &str,
        y_label: &str,
        labels: &[S],
        series: &AlignedTable,
    ) -> Result<PathBuf> {
        self.save(title, &render_grouped(title, y_label, labels, series))
    }

    /// Render and save a created vs fixed chart; returns the file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn created_vs_fixed<S: AsRef<str>>(
        &self,
        title: &str,
        labels: &[S],
        records: &[ComparisonRecord],
    ) -> Result<PathBuf> {
        self.save(title, &render_created_vs_fixed(title, labels, records))
    }

    fn save(&self, title: &str, svg: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.images_dir)?;
        let path = self.images_dir.join(chart_file_name(title));
        fs::write(&path, svg)?;
        debug!(path = %path.display(), "Saved chart");
        Ok(path)
    }
}

/// Escape text for XML content and attributes.
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Round `raw` up to 1, 2 or 5 times a power of ten.
fn nice_step(raw: usize) -> usize {
    let raw = raw.max(1);
    let mut magnitude = 1;
    while magnitude * 10 <= raw {
        magnitude *= 10;
    }
    [1, 2, 5]
        .into_iter()
        .map(|factor| factor * magnitude)
        .find(|step| *step >= raw)
        .unwrap_or(magnitude * 10)
}

struct Canvas {
    body: String,
    width: usize,
    group_width: usize,
    axis_max: usize,
    step: usize,
    title: String,
}

impl Canvas {
    fn new(title: &str, groups: usize, group_width: usize, max: usize) -> Self {
        let step = nice_step(max.div_ceil(TICKS));
        let axis_max = step * max.div_ceil(step).max(1);
        let width = (MARGIN_LEFT + groups.max(1) * group_width + MARGIN_RIGHT).max(MIN_WIDTH);
        Self {
            body: String::new(),
            width,
            group_width,
            axis_max,
            step,
            title: title.to_string(),
        }
    }

    fn plot_right(&self) -> usize {
        self.width - MARGIN_RIGHT
    }

    fn group_x(&self, index: usize) -> usize {
        MARGIN_LEFT + index * self.group_width + GROUP_GAP / 2
    }

    fn y_for(&self, value: usize) -> f64 {
        let span = (PLOT_BOTTOM - PLOT_TOP) as f64;
        PLOT_BOTTOM as f64 - span * value as f64 / self.axis_max as f64
    }

    fn y_axis(&mut self, label: &str) {
        let right = self.plot_right();
        let mut tick = 0;
        while tick <= self.axis_max {
            let y = self.y_for(tick);
            let _ = writeln!(
                self.body,
                "  <line x1=\"{MARGIN_LEFT}\" y1=\"{y:.1}\" x2=\"{right}\" y2=\"{y:.1}\" stroke=\"#e0e0e0\" stroke-width=\"1\"/>"
            );
            let _ = writeln!(
                self.body,
                "  <text x=\"{}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"end\">{tick}</text>",
                MARGIN_LEFT - 6,
                y + 4.0
            );
            tick += self.step;
        }
        let middle = (PLOT_TOP + PLOT_BOTTOM) / 2;
        let _ = writeln!(
            self.body,
            "  <text x=\"18\" y=\"{middle}\" font-size=\"12\" text-anchor=\"middle\" transform=\"rotate(-90 18 {middle})\">{}</text>",
            escape_xml(label)
        );
    }

    fn bar(&mut self, x: usize, width: usize, value: usize, color: &str, opacity: f64) {
        if value == 0 {
            return;
        }
        let top = self.y_for(value);
        let height = PLOT_BOTTOM as f64 - top;
        let _ = writeln!(
            self.body,
            "  <rect x=\"{x}\" y=\"{top:.1}\" width=\"{width}\" height=\"{height:.1}\" fill=\"{color}\" fill-opacity=\"{opacity}\"/>"
        );
    }

    fn value_label(&mut self, center_x: usize, value: usize, text: &str) {
        let y = self.y_for(value) - 4.0;
        let _ = writeln!(
            self.body,
            "  <text x=\"{center_x}\" y=\"{y:.1}\" font-size=\"9\" text-anchor=\"middle\">{}</text>",
            escape_xml(text)
        );
    }

    fn x_labels<S: AsRef<str>>(&mut self, labels: &[S]) {
        let right = self.plot_right();
        let _ = writeln!(
            self.body,
            "  <line x1=\"{MARGIN_LEFT}\" y1=\"{PLOT_BOTTOM}\" x2=\"{right}\" y2=\"{PLOT_BOTTOM}\" stroke=\"#333333\" stroke-width=\"1\"/>"
        );
        for (index, label) in labels.iter().enumerate() {
            let x = self.group_x(index) + (self.group_width - GROUP_GAP) / 2;
            let y = PLOT_BOTTOM + 14;
            let _ = writeln!(
                self.body,
                "  <text x=\"{x}\" y=\"{y}\" font-size=\"11\" text-anchor=\"end\" transform=\"rotate(-35 {x} {y})\">{}</text>",
                escape_xml(label.as_ref())
            );
        }
    }

    fn legend_entry(&mut self, index: usize, label: &str, color: &str, opacity: f64) {
        let x = self.plot_right() + 16;
        let y = PLOT_TOP + index * 20;
        let _ = writeln!(
            self.body,
            "  <rect x=\"{x}\" y=\"{y}\" width=\"12\" height=\"12\" fill=\"{color}\" fill-opacity=\"{opacity}\"/>"
        );
        let _ = writeln!(
            self.body,
            "  <text x=\"{}\" y=\"{}\" font-size=\"11\">{}</text>",
            x + 18,
            y + 10,
            escape_xml(label)
        );
    }

    fn finish(self) -> String {
        let mut svg = String::new();
        svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {HEIGHT}\" width=\"{w}\" height=\"{HEIGHT}\" font-family=\"sans-serif\">",
            w = self.width
        );
        let title = escape_xml(&self.title);
        let _ = writeln!(svg, "  <title>{title}</title>");
        let _ = writeln!(svg, "  <rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>");
        let _ = writeln!(
            svg,
            "  <text x=\"{}\" y=\"30\" font-size=\"16\" text-anchor=\"middle\">{title}</text>",
            self.width / 2
        );
        svg.push_str(&self.body);
        svg.push_str("</svg>\n");
        svg
    }
}
