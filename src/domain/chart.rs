// Chart series domain models
use serde::Serialize;
use thiserror::Error;

/// The two named series drawn on the dashboard chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SeriesKind {
    Actuals,
    Predictions,
}

impl SeriesKind {
    pub const ALL: [SeriesKind; 2] = [SeriesKind::Actuals, SeriesKind::Predictions];

    /// Trace index on the chart
    pub fn index(&self) -> usize {
        match self {
            SeriesKind::Actuals => 0,
            SeriesKind::Predictions => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SeriesKind::Actuals => "Actuals",
            SeriesKind::Predictions => "Predictions",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("series has {x_len} timestamps but {y_len} values")]
pub struct SeriesLengthMismatch {
    pub x_len: usize,
    pub y_len: usize,
}

/// Parallel timestamp/value arrays; both always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesPoints {
    x: Vec<String>,
    y: Vec<f64>,
}

impl SeriesPoints {
    pub fn new(x: Vec<String>, y: Vec<f64>) -> Result<Self, SeriesLengthMismatch> {
        if x.len() != y.len() {
            return Err(SeriesLengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        Ok(Self { x, y })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn x(&self) -> &[String] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn extend(&mut self, other: SeriesPoints) {
        self.x.extend(other.x);
        self.y.extend(other.y);
    }

    /// Drop up to `n` leading points
    pub fn skip_front(&mut self, n: usize) {
        let n = n.min(self.len());
        self.x.drain(..n);
        self.y.drain(..n);
    }
}

/// Points destined for one named series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesBatch {
    pub series: SeriesKind,
    pub points: SeriesPoints,
}

impl SeriesBatch {
    pub fn new(series: SeriesKind, points: SeriesPoints) -> Self {
        Self { series, points }
    }

    pub fn cleared(series: SeriesKind) -> Self {
        Self::new(series, SeriesPoints::empty())
    }
}

/// A chart mutation as published to stream subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ChartUpdate {
    Replace { batches: Vec<SeriesBatch> },
    Append { batches: Vec<SeriesBatch> },
    Relayout { autosize: bool },
    Title { title: String },
}
