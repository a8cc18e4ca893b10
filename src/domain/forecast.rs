// Payloads returned by the /fetch and /predict endpoints
use super::chart::{SeriesBatch, SeriesKind, SeriesLengthMismatch, SeriesPoints};
use super::time::LocalTimestamp;
use serde::Deserialize;

/// Historical values over a requested range
#[derive(Debug, Clone, Deserialize)]
pub struct FetchResponse {
    pub timestamp: Vec<String>,
    pub results: Vec<f64>,
}

impl FetchResponse {
    pub fn validate(&self) -> Result<(), SeriesLengthMismatch> {
        if self.timestamp.len() != self.results.len() {
            return Err(SeriesLengthMismatch {
                x_len: self.timestamp.len(),
                y_len: self.results.len(),
            });
        }
        Ok(())
    }

    pub fn into_points(self) -> Result<SeriesPoints, SeriesLengthMismatch> {
        SeriesPoints::new(self.timestamp, self.results)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputData {
    pub timestamp: Vec<String>,
    pub data: Vec<f64>,
}

/// One point forecast: the model input window plus the predicted horizon
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub input_data: InputData,
    pub predict: Vec<f64>,
    pub timestamp: Vec<String>,
    /// Time to feed into the following prediction; null or empty at the end of the window
    #[serde(default)]
    pub next: Option<String>,
}

impl PredictResponse {
    pub fn validate(&self) -> Result<(), SeriesLengthMismatch> {
        if self.input_data.timestamp.len() != self.input_data.data.len() {
            return Err(SeriesLengthMismatch {
                x_len: self.input_data.timestamp.len(),
                y_len: self.input_data.data.len(),
            });
        }
        if self.timestamp.len() != self.predict.len() {
            return Err(SeriesLengthMismatch {
                x_len: self.timestamp.len(),
                y_len: self.predict.len(),
            });
        }
        Ok(())
    }

    /// The parsed `next` timestamp, or `None` when no further prediction is possible
    pub fn next_time(&self) -> Result<Option<LocalTimestamp>, String> {
        match self.next.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }

    /// First and last predicted timestamps
    pub fn predicted_window(&self) -> Result<Option<(LocalTimestamp, LocalTimestamp)>, String> {
        match (self.timestamp.first(), self.timestamp.last()) {
            (Some(first), Some(last)) => Ok(Some((first.parse()?, last.parse()?))),
            _ => Ok(None),
        }
    }

    pub fn into_increment(self) -> Result<ForecastIncrement, SeriesLengthMismatch> {
        Ok(ForecastIncrement {
            actuals: SeriesPoints::new(self.input_data.timestamp, self.input_data.data)?,
            predictions: SeriesPoints::new(self.timestamp, self.predict)?,
        })
    }
}

/// Chart points derived from one prediction
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastIncrement {
    pub actuals: SeriesPoints,
    pub predictions: SeriesPoints,
}

impl ForecastIncrement {
    /// Drop input points that an earlier increment already drew
    pub fn trim_history(&mut self, overlap: usize) {
        self.actuals.skip_front(overlap);
    }

    pub fn into_batches(self) -> Vec<SeriesBatch> {
        vec![
            SeriesBatch::new(SeriesKind::Actuals, self.actuals),
            SeriesBatch::new(SeriesKind::Predictions, self.predictions),
        ]
    }
}
