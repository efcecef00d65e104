//! HTML report assembling rendered charts.

use crate::charts::Chart;
use crate::config::WriteMode;
use crate::error::Result;
use chrono::Local;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-latest.min.js";

/// An ordered list of charts rendered into one HTML document.
#[derive(Debug, Default)]
pub struct Report {
    title: String,
    charts: Vec<Chart>,
}

impl Report {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            charts: Vec::new(),
        }
    }

    pub fn push(&mut self, chart: Chart) {
        self.charts.push(chart);
    }

    pub fn extend(&mut self, charts: impl IntoIterator<Item = Chart>) {
        self.charts.extend(charts);
    }

    pub fn charts(&self) -> &[Chart] {
        &self.charts
    }

    pub fn into_charts(self) -> Vec<Chart> {
        self.charts
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    fn render(&self) -> Markup {
        let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_CDN) {}
                    style {
                        (PreEscaped("
                            body { font-family: Arial, sans-serif; margin: 20px; }
                            .chart { margin-bottom: 40px; }
                            .timestamp { color: #666; }
                        "))
                    }
                }
                body {
                    h1 { (self.title) }
                    p class="timestamp" { "Generated on: " (generated) " (" (self.charts.len()) " charts)" }
                    @for (i, chart) in self.charts.iter().enumerate() {
                        div class="chart" data-kind=(chart.kind().tag()) {
                            (PreEscaped(chart.to_inline_html(&format!("chart-{}", i))))
                        }
                    }
                }
            }
        }
    }

    /// Render the report as a standalone HTML document.
    ///
    /// plotly.js is loaded once in the head; each chart follows in order.
    pub fn to_html(&self) -> String {
        self.render().into_string()
    }

    /// Write the report to `<stem>.html` and return the path written.
    pub fn write_html(&self, stem: &str, mode: WriteMode) -> Result<PathBuf> {
        let path = PathBuf::from(format!("{}.html", stem));
        let mut file = match mode {
            WriteMode::Overwrite => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)?,
            WriteMode::Append => OpenOptions::new().create(true).append(true).open(&path)?,
        };
        file.write_all(self.to_html().as_bytes())?;

        info!("Wrote report with {} charts to {}", self.charts.len(), path.display());
        Ok(path)
    }
}
