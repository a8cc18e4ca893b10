// Client trait for the external forecasting service
use crate::application::error::DashboardError;
use crate::domain::forecast::{FetchResponse, PredictResponse};
use crate::domain::meta::StreamMeta;
use crate::domain::time::LocalTimestamp;
use crate::domain::tunnel::Tunnel;
use async_trait::async_trait;

/// Read-only calls against the forecasting service. Each call is one-shot:
/// failures are returned immediately and never retried.
#[async_trait]
pub trait ForecastApi: Send + Sync {
    /// Query window and model window sizes
    async fn get_meta(&self) -> Result<StreamMeta, DashboardError>;

    /// Historical values for `tunnel` in `[start, end]`
    async fn fetch_range(
        &self,
        tunnel: Tunnel,
        start: LocalTimestamp,
        end: LocalTimestamp,
    ) -> Result<FetchResponse, DashboardError>;

    /// Point forecast starting at `time`
    async fn predict_at(
        &self,
        tunnel: Tunnel,
        time: LocalTimestamp,
    ) -> Result<PredictResponse, DashboardError>;
}
