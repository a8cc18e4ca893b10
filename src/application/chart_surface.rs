// Chart surface trait
use crate::domain::chart::SeriesBatch;

/// A line chart with the Actuals and Predictions series.
///
/// Implementations use interior mutability so one surface can be shared by
/// request handlers and the predict-all task.
pub trait ChartSurface: Send + Sync {
    /// Swap the points of every named series in `batches`
    fn replace(&self, batches: Vec<SeriesBatch>);

    /// Concatenate points onto every named series in `batches`
    fn append(&self, batches: Vec<SeriesBatch>);

    /// Recompute layout after a viewport change
    fn resize(&self);

    fn set_title(&self, title: &str);
}
