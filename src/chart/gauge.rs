//! Gauge chart with colored bands and a threshold marker.

use serde::{Deserialize, Serialize};

/// Lower and upper bound of the gauge axis.
pub const GAUGE_AXIS: [f64; 2] = [0.0, 10.0];

/// Color of a gauge band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandColor {
    Red,
    Yellow,
    Green,
}

/// A colored band on the gauge. Bands are half-open except the last,
/// which includes its upper bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeStep {
    pub range: [f64; 2],
    pub color: BandColor,
}

/// Marker line drawn at the reported value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub value: f64,
    pub line_color: String,
    pub line_width: u32,
    pub thickness: f64,
    /// Band the threshold falls in; None when the value is off the axis.
    pub band: Option<BandColor>,
}

/// A single value on a banded dial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeChart {
    pub title: String,
    pub value: f64,
    pub axis_range: [f64; 2],
    pub steps: Vec<GaugeStep>,
    pub threshold: Threshold,
}

impl GaugeChart {
    /// Builds the 0–10 gauge: red below 3, yellow below 7, green up to 10,
    /// with the threshold marker at `value`.
    pub fn new(title: &str, value: f64) -> Self {
        let steps = vec![
            GaugeStep {
                range: [0.0, 3.0],
                color: BandColor::Red,
            },
            GaugeStep {
                range: [3.0, 7.0],
                color: BandColor::Yellow,
            },
            GaugeStep {
                range: [7.0, 10.0],
                color: BandColor::Green,
            },
        ];
        let band = band_for(&steps, value);

        Self {
            title: title.to_string(),
            value,
            axis_range: GAUGE_AXIS,
            steps,
            threshold: Threshold {
                value,
                line_color: "black".to_string(),
                line_width: 4,
                thickness: 0.75,
                band,
            },
        }
    }

    /// Band containing `value`, if any.
    pub fn band_for(&self, value: f64) -> Option<BandColor> {
        band_for(&self.steps, value)
    }
}

fn band_for(steps: &[GaugeStep], value: f64) -> Option<BandColor> {
    let last = steps.len().checked_sub(1)?;
    steps
        .iter()
        .enumerate()
        .find(|(i, step)| {
            let [low, high] = step.range;
            value >= low && (value < high || (*i == last && value <= high))
        })
        .map(|(_, step)| step.color)
}
