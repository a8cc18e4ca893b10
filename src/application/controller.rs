// Interaction controller - Binds dashboard actions to service calls and chart updates
use crate::application::chart_surface::ChartSurface;
use crate::application::error::{DashboardError, Endpoint};
use crate::application::forecast_api::ForecastApi;
use crate::application::lock;
use crate::application::predict_all::{
    Delay, PredictAllControl, RunOutcome, RunPhase, run_predict_all,
};
use crate::application::view_state::{Control, ViewSnapshot, ViewState};
use crate::domain::chart::{SeriesBatch, SeriesKind};
use crate::domain::notification::Notification;
use crate::domain::time::LocalTimestamp;
use crate::domain::tunnel::Tunnel;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    /// Pause between predict-all requests
    pub predict_all_interval: Duration,
    /// How long a success icon stays before reverting
    pub indicator_hold: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            predict_all_interval: Duration::from_millis(250),
            indicator_hold: Duration::from_secs(3),
        }
    }
}

/// Partial update of the dashboard inputs; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputUpdate {
    pub start_time: Option<LocalTimestamp>,
    pub end_time: Option<LocalTimestamp>,
    pub predict_time: Option<LocalTimestamp>,
    pub show_actual: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictAllToggle {
    Started,
    Paused,
    /// A paused run is still finishing its last request; nothing was started
    Busy,
}

pub struct InteractionController {
    api: Arc<dyn ForecastApi>,
    chart: Arc<dyn ChartSurface>,
    delay: Arc<dyn Delay>,
    state: Arc<Mutex<ViewState>>,
    predict_all: PredictAllControl,
    interval: Duration,
}

impl InteractionController {
    pub fn new(
        api: Arc<dyn ForecastApi>,
        chart: Arc<dyn ChartSurface>,
        delay: Arc<dyn Delay>,
        settings: ControllerSettings,
    ) -> Self {
        let state = ViewState::new(settings.indicator_hold);
        chart.set_title(state.tunnel.display_name());
        Self {
            api,
            chart,
            delay,
            state: Arc::new(Mutex::new(state)),
            predict_all: PredictAllControl::new(),
            interval: settings.predict_all_interval,
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let phase = self.predict_all.phase();
        lock(&self.state).snapshot(phase)
    }

    /// Log the failure, update the control icon and show a danger notification
    fn report(&self, control: Option<Control>, error: DashboardError) -> DashboardError {
        if error.is_upstream() {
            tracing::error!("{}", error);
        } else {
            tracing::warn!("{}", error);
        }
        let mut state = lock(&self.state);
        match control {
            Some(control) => state.mark_failed(control, &error),
            None => state.notify(Notification::danger(error.user_message())),
        }
        error
    }

    /// Fetch metadata and install input bounds. Until this succeeds every
    /// metadata-dependent action fails with `MetaNotLoaded`.
    pub async fn load_meta(&self) -> Result<(), DashboardError> {
        let meta = match self.api.get_meta().await {
            Ok(meta) => meta,
            Err(e) => return Err(self.report(None, e)),
        };
        tracing::info!(
            "Loaded metadata: {} to {}, n_steps={}, n_horizon={}",
            meta.timestamp_start,
            meta.timestamp_end,
            meta.n_steps,
            meta.n_horizon
        );
        lock(&self.state).apply_meta(meta, &mut rand::rng());
        Ok(())
    }

    pub async fn reload_meta(&self) -> Result<(), DashboardError> {
        self.load_meta().await?;
        lock(&self.state).notify(Notification::primary("Metadata reloaded"));
        Ok(())
    }

    /// Change the active tunnel. Data already on the chart is left as is.
    pub fn select_tunnel(&self, tunnel: Tunnel) {
        tracing::debug!("Selected tunnel {}", tunnel);
        lock(&self.state).tunnel = tunnel;
    }

    pub fn set_inputs(&self, update: InputUpdate) {
        let mut state = lock(&self.state);
        if let Some(start) = update.start_time {
            state.start_input.set(start);
        }
        if let Some(end) = update.end_time {
            state.end_input.set(end);
        }
        if let Some(time) = update.predict_time {
            state.predict_input.set(time);
        }
        if let Some(show_actual) = update.show_actual {
            state.show_actual = show_actual;
        }
    }

    /// Replace Actuals with the selected range and clear Predictions
    pub async fn fetch_range(&self) -> Result<(), DashboardError> {
        match self.try_fetch_range().await {
            Ok(()) => {
                lock(&self.state).mark_succeeded(Control::Fetch);
                Ok(())
            }
            Err(e) => Err(self.report(Some(Control::Fetch), e)),
        }
    }

    async fn try_fetch_range(&self) -> Result<(), DashboardError> {
        let (tunnel, (start, end)) = {
            let state = lock(&self.state);
            (state.tunnel, state.fetch_window()?)
        };
        let points = self
            .api
            .fetch_range(tunnel, start, end)
            .await?
            .into_points()
            .map_err(|e| DashboardError::invalid_response(Endpoint::Fetch, e))?;
        tracing::debug!("Fetched {} points for {}", points.len(), tunnel);

        self.chart.set_title(tunnel.display_name());
        self.chart.replace(vec![
            SeriesBatch::new(SeriesKind::Actuals, points),
            SeriesBatch::cleared(SeriesKind::Predictions),
        ]);
        Ok(())
    }

    /// Draw one prediction. With "show actual" set, the recorded values over
    /// the predicted window are appended to Actuals.
    pub async fn predict_once(&self) -> Result<(), DashboardError> {
        match self.try_predict_once().await {
            Ok(()) => {
                lock(&self.state).mark_succeeded(Control::Predict);
                Ok(())
            }
            Err(e) => Err(self.report(Some(Control::Predict), e)),
        }
    }

    async fn try_predict_once(&self) -> Result<(), DashboardError> {
        let (tunnel, time, show_actual) = {
            let state = lock(&self.state);
            (state.tunnel, state.predict_time()?, state.show_actual)
        };
        let invalid = |reason: String| DashboardError::invalid_response(Endpoint::Predict, reason);

        let response = self.api.predict_at(tunnel, time).await?;
        let has_next = response.next_time().map_err(invalid)?.is_some();

        let follow_up = match response.predicted_window().map_err(invalid)? {
            Some((first, last)) if show_actual && has_next => Some(
                self.api
                    .fetch_range(tunnel, first, last)
                    .await?
                    .into_points()
                    .map_err(|e| DashboardError::invalid_response(Endpoint::Fetch, e))?,
            ),
            _ => None,
        };

        let mut increment = response
            .into_increment()
            .map_err(|e| DashboardError::invalid_response(Endpoint::Predict, e))?;
        if let Some(actual) = follow_up {
            increment.actuals.extend(actual);
        }

        self.chart.set_title(tunnel.display_name());
        self.chart.replace(increment.into_batches());
        Ok(())
    }

    /// Start a predict-all run, or pause the one in progress
    pub fn toggle_predict_all(&self) -> Result<PredictAllToggle, DashboardError> {
        if self.pause_predict_all() {
            tracing::info!("Predict-all pause requested");
            return Ok(PredictAllToggle::Paused);
        }
        if self.predict_all.phase() == RunPhase::Stopping {
            tracing::debug!("Predict-all still stopping, not restarting");
            return Ok(PredictAllToggle::Busy);
        }

        let plan = lock(&self.state).predict_all_plan();
        let plan = plan.map_err(|e| self.report(Some(Control::PredictAll), e))?;

        let api = self.api.clone();
        let chart = self.chart.clone();
        let delay = self.delay.clone();
        let state = self.state.clone();
        let interval = self.interval;

        let started = self.predict_all.start(move |flag| async move {
            chart.set_title(plan.tunnel.display_name());
            chart.replace(vec![
                SeriesBatch::cleared(SeriesKind::Actuals),
                SeriesBatch::cleared(SeriesKind::Predictions),
            ]);

            let outcome = run_predict_all(
                &plan,
                api.as_ref(),
                chart.as_ref(),
                delay.as_ref(),
                interval,
                &flag,
            )
            .await;

            {
                let mut state = lock(&state);
                match &outcome {
                    RunOutcome::Failed { error, .. } => {
                        state.mark_failed(Control::PredictAll, error)
                    }
                    _ => state.mark_succeeded(Control::PredictAll),
                }
            }
            outcome
        });
        if !started {
            tracing::debug!("Predict-all task already active");
            return Ok(PredictAllToggle::Busy);
        }
        Ok(PredictAllToggle::Started)
    }

    /// Pause a running predict-all; `false` when idle
    pub fn pause_predict_all(&self) -> bool {
        let paused = self.predict_all.pause();
        if paused {
            lock(&self.state).mark_succeeded(Control::PredictAll);
        }
        paused
    }

    /// Resolves when the latest predict-all run has finished
    pub async fn wait_predict_all(&self) -> Option<RunOutcome> {
        self.predict_all.completion().await
    }

    /// Advance the predict time by a day; `Ok(false)` when it would pass the end of data
    pub fn step_day(&self) -> Result<bool, DashboardError> {
        let stepped = lock(&self.state).step_predict_day();
        stepped.map_err(|e| self.report(None, e))
    }

    pub fn randomize_time(&self) -> Result<LocalTimestamp, DashboardError> {
        let sampled = lock(&self.state).randomize_predict_time(&mut rand::rng());
        sampled.map_err(|e| self.report(None, e))
    }

    pub fn resize(&self) {
        self.chart.resize();
    }

    pub fn dismiss_notification(&self) {
        lock(&self.state).dismiss_notification();
    }
}
