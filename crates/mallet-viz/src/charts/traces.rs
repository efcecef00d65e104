//! plotly.js trace types drawn through their JSON attributes.
//!
//! Each struct serializes to the attribute names plotly.js reads, and
//! implements [`Trace`] so it can be added to a [`plotly::Plot`] like the
//! built-in traces.

use crate::config::{Marginal, PointDisplay};
use plotly::Trace;
use serde::Serialize;

macro_rules! json_trace {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Trace for $ty {
                fn to_json(&self) -> String {
                    serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
                }
            }
        )*
    };
}

json_trace!(PieTrace, ViolinTrace, HierarchyTrace, DensityTrace, MarginalTrace);

#[derive(Debug, Clone, Serialize)]
pub struct PieTrace {
    #[serde(rename = "type")]
    r#type: &'static str,
    name: String,
    labels: Vec<String>,
    values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hole: Option<f64>,
}

impl PieTrace {
    pub fn new(name: &str, labels: Vec<String>, values: Vec<f64>, hole: bool) -> Box<Self> {
        Box::new(Self {
            r#type: "pie",
            name: name.to_string(),
            labels,
            values,
            hole: hole.then_some(0.3),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct Visible {
    visible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViolinTrace {
    #[serde(rename = "type")]
    r#type: &'static str,
    name: String,
    x: Vec<String>,
    y: Vec<f64>,
    points: serde_json::Value,
    #[serde(rename = "box")]
    inner_box: Visible,
}

impl ViolinTrace {
    pub fn new(
        name: &str,
        x: Vec<String>,
        y: Vec<f64>,
        points: PointDisplay,
        display_box: bool,
    ) -> Box<Self> {
        Box::new(Self {
            r#type: "violin",
            name: name.to_string(),
            x,
            y,
            points: points.plotly_value(),
            inner_box: Visible {
                visible: display_box,
            },
        })
    }
}

/// A treemap or sunburst given as explicit nodes.
///
/// `values` of a parent equal the sum of its children.
#[derive(Debug, Clone, Serialize)]
pub struct HierarchyTrace {
    #[serde(rename = "type")]
    r#type: &'static str,
    name: String,
    ids: Vec<String>,
    labels: Vec<String>,
    parents: Vec<String>,
    values: Vec<f64>,
    branchvalues: &'static str,
}

impl HierarchyTrace {
    pub fn treemap(name: &str, nodes: Vec<HierarchyNode>) -> Box<Self> {
        Self::with_type("treemap", name, nodes)
    }

    pub fn sunburst(name: &str, nodes: Vec<HierarchyNode>) -> Box<Self> {
        Self::with_type("sunburst", name, nodes)
    }

    fn with_type(r#type: &'static str, name: &str, nodes: Vec<HierarchyNode>) -> Box<Self> {
        let mut trace = Self {
            r#type,
            name: name.to_string(),
            ids: Vec::with_capacity(nodes.len()),
            labels: Vec::with_capacity(nodes.len()),
            parents: Vec::with_capacity(nodes.len()),
            values: Vec::with_capacity(nodes.len()),
            branchvalues: "total",
        };
        for node in nodes {
            trace.ids.push(node.id);
            trace.labels.push(node.label);
            trace.parents.push(node.parent);
            trace.values.push(node.value);
        }
        Box::new(trace)
    }
}

/// One rectangle or ring segment of a hierarchy chart.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    pub id: String,
    pub label: String,
    /// Empty for top-level nodes.
    pub parent: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DensityTrace {
    #[serde(rename = "type")]
    r#type: &'static str,
    name: String,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl DensityTrace {
    pub fn contour(name: &str, x: Vec<f64>, y: Vec<f64>) -> Box<Self> {
        Box::new(Self {
            r#type: "histogram2dcontour",
            name: name.to_string(),
            x,
            y,
        })
    }

    pub fn heatmap(name: &str, x: Vec<f64>, y: Vec<f64>) -> Box<Self> {
        Box::new(Self {
            r#type: "histogram2d",
            name: name.to_string(),
            x,
            y,
        })
    }
}

/// A small distribution plot on its own axis beside the main one.
///
/// Top marginals summarize x values on `y2`; right marginals summarize y
/// values on `x2`. plotly.js orients the box or violin from the filled side.
#[derive(Debug, Clone, Serialize)]
pub struct MarginalTrace {
    #[serde(rename = "type")]
    r#type: &'static str,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    x: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<Vec<f64>>,
    xaxis: &'static str,
    yaxis: &'static str,
    showlegend: bool,
}

impl MarginalTrace {
    pub fn top(kind: Marginal, name: &str, values: Vec<f64>) -> Box<Self> {
        Box::new(Self {
            r#type: kind.trace_type(),
            name: name.to_string(),
            x: Some(values),
            y: None,
            xaxis: "x",
            yaxis: "y2",
            showlegend: false,
        })
    }

    pub fn right(kind: Marginal, name: &str, values: Vec<f64>) -> Box<Self> {
        Box::new(Self {
            r#type: kind.trace_type(),
            name: name.to_string(),
            x: None,
            y: Some(values),
            xaxis: "x2",
            yaxis: "y",
            showlegend: false,
        })
    }
}
