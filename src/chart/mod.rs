//! Declarative chart specifications.
//!
//! A [`ChartSpec`] is pure data: it describes what a renderer should draw
//! and serializes to JSON with a `"type"` tag. Nothing here renders.

mod gauge;

pub use gauge::{BandColor, GaugeChart, GaugeStep, Threshold};

use serde::{Deserialize, Serialize};

use crate::db::Table;
use crate::error::Result;

/// A chart of one of the supported kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartSpec {
    Pie(PieChart),
    Line(XyChart),
    Bar(XyChart),
    Gauge(GaugeChart),
    Scatter3d(Scatter3dChart),
}

impl ChartSpec {
    /// The serialized type tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pie(_) => "pie",
            Self::Line(_) => "line",
            Self::Bar(_) => "bar",
            Self::Gauge(_) => "gauge",
            Self::Scatter3d(_) => "scatter3d",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Pie(c) => &c.title,
            Self::Line(c) | Self::Bar(c) => &c.title,
            Self::Gauge(c) => &c.title,
            Self::Scatter3d(c) => &c.title,
        }
    }

    /// Number of data points. A gauge always has one.
    pub fn series_len(&self) -> usize {
        match self {
            Self::Pie(c) => c.values.len(),
            Self::Line(c) | Self::Bar(c) => c.y.len(),
            Self::Gauge(_) => 1,
            Self::Scatter3d(c) => c.x.len(),
        }
    }
}

/// Slices of a whole, one per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub title: String,
    /// Column the labels came from.
    pub label_field: String,
    /// Column the values came from.
    pub value_field: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl PieChart {
    /// Builds a pie from a label column and a numeric column.
    pub fn from_table(table: &Table, names: &str, values: &str, title: &str) -> Result<Self> {
        Ok(Self {
            title: title.to_string(),
            label_field: names.to_string(),
            value_field: values.to_string(),
            labels: table.label_column(names)?,
            values: table.f64_column(values)?,
        })
    }
}

/// Paired x/y series, used for both line and bar charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XyChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

impl XyChart {
    /// Builds a series from a category column and a numeric column,
    /// keeping row order. Axis labels default to the column names.
    pub fn from_table(table: &Table, x: &str, y: &str, title: &str) -> Result<Self> {
        Ok(Self {
            title: title.to_string(),
            x_label: x.to_string(),
            y_label: y.to_string(),
            x: table.label_column(x)?,
            y: table.f64_column(y)?,
        })
    }
}

/// Points in three numeric dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scatter3dChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub z_label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl Scatter3dChart {
    /// Builds a scatter from three `(column, axis label)` pairs.
    pub fn from_table(table: &Table, axes: [(&str, &str); 3], title: &str) -> Result<Self> {
        let [(x, x_label), (y, y_label), (z, z_label)] = axes;
        Ok(Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            z_label: z_label.to_string(),
            x: table.f64_column(x)?,
            y: table.f64_column(y)?,
            z: table.f64_column(z)?,
        })
    }
}
