//! Treemaps and sunburst charts over a path of category columns.

use super::traces::{HierarchyNode, HierarchyTrace};
use super::{Chart, bracketed, build_chart, float_column, label_column, titled_layout};
use crate::eligibility::ChartKind;
use crate::error::Result;
use crate::selection::hierarchical_path;
use mallet_tabular::{ColumnTypeMap, Table};
use plotly::Trace;
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// One treemap per numeric column, nested along the category path.
///
/// Needs at least one category column.
pub fn create_treemap(table: &Table, types: &ColumnTypeMap, limit: usize) -> Result<Vec<Chart>> {
    let path = hierarchical_path(table.frame(), types, limit)?;
    if path.is_empty() {
        debug!("Treemaps skipped: no category column");
        return Ok(Vec::new());
    }
    build_hierarchies(table, types, &path, ChartKind::Treemap)
}

/// One sunburst per numeric column, ringed along the category path.
///
/// Needs at least two category columns.
pub fn create_sunburst(table: &Table, types: &ColumnTypeMap, limit: usize) -> Result<Vec<Chart>> {
    let path = hierarchical_path(table.frame(), types, limit)?;
    if path.len() < 2 {
        debug!("Sunburst charts skipped: path {} is shorter than two levels", bracketed(&path));
        return Ok(Vec::new());
    }
    build_hierarchies(table, types, &path, ChartKind::Sunburst)
}

fn build_hierarchies(
    table: &Table,
    types: &ColumnTypeMap,
    path: &[String],
    kind: ChartKind,
) -> Result<Vec<Chart>> {
    let df = table.frame();
    let mut charts = Vec::new();

    for value in types.numeric() {
        let nodes = hierarchy_nodes(df, path, value)?;
        let (title, trace) = match kind {
            ChartKind::Sunburst => (
                format!("Sunburst chart of {} across paths {}", value, bracketed(path)),
                HierarchyTrace::sunburst(value, nodes),
            ),
            _ => (
                format!("Treemap of {} across paths {}", value, bracketed(path)),
                HierarchyTrace::treemap(value, nodes),
            ),
        };
        let traces: Vec<Box<dyn Trace>> = vec![trace];
        let layout = titled_layout(&title, false, false);
        charts.push(build_chart(kind, title, traces, layout));
    }
    Ok(charts)
}

/// Nodes of every path prefix with the summed value beneath them.
///
/// Rows with a missing path label or value are left out. Nodes are keyed on
/// the full label prefix and get opaque ids, so labels may contain any text.
fn hierarchy_nodes(df: &DataFrame, path: &[String], value: &str) -> Result<Vec<HierarchyNode>> {
    let levels = path
        .iter()
        .map(|name| label_column(df, name))
        .collect::<Result<Vec<_>>>()?;
    let values = float_column(df, value)?;

    let mut positions: HashMap<Vec<&str>, usize> = HashMap::new();
    let mut nodes: Vec<HierarchyNode> = Vec::new();

    for (row, amount) in values.into_iter().enumerate() {
        let Some(amount) = amount.filter(|v| v.is_finite()) else {
            continue;
        };
        let labels: Option<Vec<&str>> = levels.iter().map(|level| level[row].as_deref()).collect();
        let Some(labels) = labels else {
            continue;
        };

        let mut parent = String::new();
        for depth in 0..labels.len() {
            let prefix = labels[..=depth].to_vec();
            let at = match positions.get(&prefix) {
                Some(&i) => {
                    nodes[i].value += amount;
                    i
                }
                None => {
                    let i = nodes.len();
                    nodes.push(HierarchyNode {
                        id: format!("node-{}", i),
                        label: labels[depth].to_string(),
                        parent: parent.clone(),
                        value: amount,
                    });
                    positions.insert(prefix, i);
                    i
                }
            };
            parent = nodes[at].id.clone();
        }
    }
    Ok(nodes)
}
