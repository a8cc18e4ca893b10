// Scripted collaborators for controller and predict-all tests
use crate::application::chart_surface::ChartSurface;
use crate::application::error::{DashboardError, Endpoint};
use crate::application::forecast_api::ForecastApi;
use crate::application::lock;
use crate::application::predict_all::Delay;
use crate::domain::chart::{ChartUpdate, SeriesBatch, SeriesKind, SeriesPoints};
use crate::domain::forecast::{FetchResponse, InputData, PredictResponse};
use crate::domain::meta::StreamMeta;
use crate::domain::time::LocalTimestamp;
use crate::domain::tunnel::Tunnel;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDateTime};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use std::time::Duration;

pub fn sample_meta() -> StreamMeta {
    StreamMeta {
        timestamp_start: "2023-01-01T00:00".parse().unwrap(),
        timestamp_end: "2023-01-10T00:00".parse().unwrap(),
        earliest_predict_start: "2023-01-02T00:00".parse().unwrap(),
        n_steps: 24,
        n_horizon: 6,
    }
}

fn naive(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
}

fn five_minute_series(start: NaiveDateTime, n: usize) -> Vec<String> {
    (0..n)
        .map(|i| LocalTimestamp::new(start + ChronoDuration::minutes(5 * i as i64)).to_string())
        .collect()
}

/// A prediction for `at` with `n_input` input points followed by `n_predict` predicted points
pub fn predict_response(at: &str, n_input: usize, n_predict: usize, next: Option<&str>) -> PredictResponse {
    let at = naive(at);
    let input_start = at - ChronoDuration::minutes(5 * n_input as i64);
    PredictResponse {
        input_data: InputData {
            timestamp: five_minute_series(input_start, n_input),
            data: (0..n_input).map(|i| 10.0 + i as f64).collect(),
        },
        predict: (0..n_predict).map(|i| 20.0 + i as f64).collect(),
        timestamp: five_minute_series(at, n_predict),
        next: next.map(str::to_string),
    }
}

pub fn fetch_response(start: &str, n: usize) -> FetchResponse {
    let start = naive(start);
    FetchResponse {
        timestamp: five_minute_series(start, n),
        results: (0..n).map(|i| 5.0 + i as f64).collect(),
    }
}

/// Replays queued results; an empty queue answers with `ServiceUnavailable`
#[derive(Default)]
pub struct FakeForecastApi {
    meta: Mutex<VecDeque<Result<StreamMeta, DashboardError>>>,
    fetches: Mutex<VecDeque<Result<FetchResponse, DashboardError>>>,
    predictions: Mutex<VecDeque<Result<PredictResponse, DashboardError>>>,
    fetch_calls: Mutex<Vec<(Tunnel, LocalTimestamp, LocalTimestamp)>>,
    predict_calls: Mutex<Vec<(Tunnel, LocalTimestamp)>>,
    predict_gate: Mutex<Option<Arc<Notify>>>,
    predicts_in_flight: AtomicUsize,
    max_predicts_in_flight: AtomicUsize,
}

impl FakeForecastApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_meta(&self, result: Result<StreamMeta, DashboardError>) {
        lock(&self.meta).push_back(result);
    }

    pub fn push_fetch(&self, result: Result<FetchResponse, DashboardError>) {
        lock(&self.fetches).push_back(result);
    }

    pub fn push_prediction(&self, result: Result<PredictResponse, DashboardError>) {
        lock(&self.predictions).push_back(result);
    }

    /// The next `predict_at` blocks until the returned gate is notified
    pub fn hold_next_prediction(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.predict_gate) = Some(gate.clone());
        gate
    }

    /// Highest number of `predict_at` calls seen outstanding at once
    pub fn max_predicts_in_flight(&self) -> usize {
        self.max_predicts_in_flight.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> Vec<(Tunnel, LocalTimestamp, LocalTimestamp)> {
        lock(&self.fetch_calls).clone()
    }

    pub fn predict_calls(&self) -> Vec<(Tunnel, LocalTimestamp)> {
        lock(&self.predict_calls).clone()
    }
}

fn next_scripted<T>(
    queue: &Mutex<VecDeque<Result<T, DashboardError>>>,
    endpoint: Endpoint,
) -> Result<T, DashboardError> {
    lock(queue)
        .pop_front()
        .unwrap_or_else(|| Err(DashboardError::unavailable(endpoint, "no scripted response")))
}

#[async_trait]
impl ForecastApi for FakeForecastApi {
    async fn get_meta(&self) -> Result<StreamMeta, DashboardError> {
        next_scripted(&self.meta, Endpoint::Meta)
    }

    async fn fetch_range(
        &self,
        tunnel: Tunnel,
        start: LocalTimestamp,
        end: LocalTimestamp,
    ) -> Result<FetchResponse, DashboardError> {
        lock(&self.fetch_calls).push((tunnel, start, end));
        next_scripted(&self.fetches, Endpoint::Fetch)
    }

    async fn predict_at(
        &self,
        tunnel: Tunnel,
        time: LocalTimestamp,
    ) -> Result<PredictResponse, DashboardError> {
        lock(&self.predict_calls).push((tunnel, time));
        let outstanding = self.predicts_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_predicts_in_flight.fetch_max(outstanding, Ordering::SeqCst);

        let gate = lock(&self.predict_gate).take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.predicts_in_flight.fetch_sub(1, Ordering::SeqCst);
        next_scripted(&self.predictions, Endpoint::Predict)
    }
}

type WaitHook = Box<dyn Fn(usize) + Send + Sync>;

/// Returns immediately and counts calls; an optional hook sees the call number
#[derive(Default)]
pub struct InstantDelay {
    calls: AtomicUsize,
    hook: Mutex<Option<WaitHook>>,
}

impl InstantDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_wait(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        *lock(&self.hook) = Some(Box::new(hook));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Delay for InstantDelay {
    async fn wait(&self, _duration: Duration) {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(hook) = lock(&self.hook).as_ref() {
            hook(n);
        }
        tokio::task::yield_now().await;
    }
}

/// Keeps every chart operation and the resulting series
#[derive(Default)]
pub struct RecordingChart {
    updates: Mutex<Vec<ChartUpdate>>,
    series: Mutex<[SeriesPoints; 2]>,
}

impl RecordingChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<ChartUpdate> {
        lock(&self.updates).clone()
    }

    pub fn appends(&self) -> Vec<Vec<SeriesBatch>> {
        self.updates()
            .into_iter()
            .filter_map(|u| match u {
                ChartUpdate::Append { batches } => Some(batches),
                _ => None,
            })
            .collect()
    }

    pub fn append_count(&self) -> usize {
        self.appends().len()
    }

    pub fn series(&self, kind: SeriesKind) -> SeriesPoints {
        lock(&self.series)[kind.index()].clone()
    }
}

impl ChartSurface for RecordingChart {
    fn replace(&self, batches: Vec<SeriesBatch>) {
        {
            let mut series = lock(&self.series);
            for batch in &batches {
                series[batch.series.index()] = batch.points.clone();
            }
        }
        lock(&self.updates).push(ChartUpdate::Replace { batches });
    }

    fn append(&self, batches: Vec<SeriesBatch>) {
        {
            let mut series = lock(&self.series);
            for batch in &batches {
                series[batch.series.index()].extend(batch.points.clone());
            }
        }
        lock(&self.updates).push(ChartUpdate::Append { batches });
    }

    fn resize(&self) {
        lock(&self.updates).push(ChartUpdate::Relayout { autosize: true });
    }

    fn set_title(&self, title: &str) {
        lock(&self.updates).push(ChartUpdate::Title {
            title: title.to_string(),
        });
    }
}
