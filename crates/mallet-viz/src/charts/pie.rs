//! Pie charts of numeric totals per category value.

use super::traces::PieTrace;
use super::{Chart, build_chart, float_column, label_column, labelled_values, titled_layout};
use crate::eligibility::ChartKind;
use crate::error::Result;
use mallet_tabular::{ColumnTypeMap, Table};
use plotly::Trace;
use std::collections::HashMap;
use tracing::debug;

/// One pie per (value column, category column) pair, each sector holding the
/// sum of the value column for one category value.
///
/// Value columns that are not numeric and category columns that are not in
/// the category set are skipped.
pub fn create_pie(
    table: &Table,
    types: &ColumnTypeMap,
    numeric_cols: &[String],
    categories: &[String],
    hole: bool,
) -> Result<Vec<Chart>> {
    let df = table.frame();
    let category_set = types.categorical_set();
    let mut charts = Vec::new();

    for value in numeric_cols {
        if !types.numeric().contains(value) {
            debug!("Pie skipped for {}: not a numeric column", value);
            continue;
        }
        for category in categories {
            if !category_set.contains(category) {
                debug!("Pie skipped for {}: not a category column", category);
                continue;
            }

            let (labels, values) =
                labelled_values(label_column(df, category)?, float_column(df, value)?);
            let (labels, totals) = sector_totals(labels, values);

            let title = format!(
                "Pie chart showing distribution of {} across {} segments",
                value, category
            );
            let traces: Vec<Box<dyn Trace>> = vec![PieTrace::new(value, labels, totals, hole)];
            charts.push(build_chart(
                ChartKind::Pie,
                title.clone(),
                traces,
                titled_layout(&title, false, false),
            ));
        }
    }
    Ok(charts)
}

/// Sum values per label, labels in order of first appearance.
fn sector_totals(labels: Vec<String>, values: Vec<f64>) -> (Vec<String>, Vec<f64>) {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut sectors: Vec<String> = Vec::new();
    let mut totals: Vec<f64> = Vec::new();

    for (label, value) in labels.into_iter().zip(values) {
        match positions.get(&label) {
            Some(&i) => totals[i] += value,
            None => {
                positions.insert(label.clone(), sectors.len());
                sectors.push(label);
                totals.push(value);
            }
        }
    }
    (sectors, totals)
}
