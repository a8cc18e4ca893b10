// Session view state owned by the interaction controller
use crate::application::error::DashboardError;
use crate::application::predict_all::RunPhase;
use crate::domain::meta::StreamMeta;
use crate::domain::notification::Notification;
use crate::domain::time::LocalTimestamp;
use crate::domain::tunnel::Tunnel;
use rand::Rng;
use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub enum MetaState {
    NotLoaded,
    Loaded(StreamMeta),
}

/// A datetime input with optional bounds. Values are clamped into the bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeInput {
    value: Option<LocalTimestamp>,
    min: Option<LocalTimestamp>,
    max: Option<LocalTimestamp>,
}

impl TimeInput {
    pub fn value(&self) -> Option<LocalTimestamp> {
        self.value
    }

    pub fn set(&mut self, value: LocalTimestamp) -> LocalTimestamp {
        let clamped = value.clamp_to(self.min, self.max);
        self.value = Some(clamped);
        clamped
    }

    pub fn set_bounds(&mut self, min: LocalTimestamp, max: LocalTimestamp) {
        self.min = Some(min);
        self.max = Some(max);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    ChevronRight,
    CheckLg,
    X,
    Pause,
}

/// Button icon. A success icon reverts to the ready icon after the hold period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicator {
    icon: Icon,
    reset_at: Option<Instant>,
}

impl Default for Indicator {
    fn default() -> Self {
        Self {
            icon: Icon::ChevronRight,
            reset_at: None,
        }
    }
}

impl Indicator {
    pub fn show(&mut self, icon: Icon) {
        self.icon = icon;
        self.reset_at = None;
    }

    pub fn flash_success(&mut self, hold: Duration) {
        self.icon = Icon::CheckLg;
        self.reset_at = Some(Instant::now() + hold);
    }

    pub fn icon_at(&self, now: Instant) -> Icon {
        match self.reset_at {
            Some(reset_at) if now >= reset_at => Icon::ChevronRight,
            _ => self.icon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Fetch,
    Predict,
    PredictAll,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    pub tunnel: Tunnel,
    pub meta: MetaState,
    pub start_input: TimeInput,
    pub end_input: TimeInput,
    pub predict_input: TimeInput,
    pub show_actual: bool,
    pub notification: Option<Notification>,
    fetch_indicator: Indicator,
    predict_indicator: Indicator,
    predict_all_indicator: Indicator,
    indicator_hold: Duration,
}

/// Parameters of one predict-all run, resolved from the inputs and metadata
#[derive(Debug, Clone, PartialEq)]
pub struct PredictAllPlan {
    pub tunnel: Tunnel,
    pub start: LocalTimestamp,
    pub end: LocalTimestamp,
    pub history_overlap: usize,
}

impl ViewState {
    pub fn new(indicator_hold: Duration) -> Self {
        Self {
            tunnel: Tunnel::default(),
            meta: MetaState::NotLoaded,
            start_input: TimeInput::default(),
            end_input: TimeInput::default(),
            predict_input: TimeInput::default(),
            show_actual: false,
            notification: None,
            fetch_indicator: Indicator::default(),
            predict_indicator: Indicator::default(),
            predict_all_indicator: Indicator::default(),
            indicator_hold,
        }
    }

    pub fn meta(&self) -> Result<&StreamMeta, DashboardError> {
        match &self.meta {
            MetaState::Loaded(meta) => Ok(meta),
            MetaState::NotLoaded => Err(DashboardError::MetaNotLoaded),
        }
    }

    /// Install freshly loaded metadata: input bounds, defaults and a random predict time
    pub fn apply_meta<R: Rng + ?Sized>(&mut self, meta: StreamMeta, rng: &mut R) {
        self.start_input.set_bounds(meta.timestamp_start, meta.timestamp_end);
        self.start_input.set(meta.timestamp_start);
        self.end_input.set_bounds(meta.timestamp_start, meta.timestamp_end);
        self.end_input.set(meta.timestamp_end);
        self.predict_input
            .set_bounds(meta.earliest_predict_start, meta.timestamp_end);
        self.predict_input.set(LocalTimestamp::random_between(
            meta.timestamp_start,
            meta.timestamp_end,
            rng,
        ));
        self.meta = MetaState::Loaded(meta);
    }

    pub fn fetch_window(&self) -> Result<(LocalTimestamp, LocalTimestamp), DashboardError> {
        let start = self
            .start_input
            .value()
            .ok_or_else(|| DashboardError::InvalidUserInput("Start time is not set".into()))?;
        let end = self
            .end_input
            .value()
            .ok_or_else(|| DashboardError::InvalidUserInput("End time is not set".into()))?;
        if start > end {
            return Err(DashboardError::InvalidUserInput(format!(
                "Start time {} is after end time {}",
                start, end
            )));
        }
        Ok((start, end))
    }

    pub fn predict_time(&self) -> Result<LocalTimestamp, DashboardError> {
        self.predict_input
            .value()
            .ok_or_else(|| DashboardError::InvalidUserInput("Prediction time is not set".into()))
    }

    /// Effective start is never earlier than `earliest_predict_start`
    pub fn predict_all_plan(&self) -> Result<PredictAllPlan, DashboardError> {
        let meta = self.meta()?;
        let (start, end) = self.fetch_window()?;
        Ok(PredictAllPlan {
            tunnel: self.tunnel,
            start: start.max(meta.earliest_predict_start),
            end,
            history_overlap: meta.history_overlap(),
        })
    }

    /// Advance the predict time by one day. Returns `false` and leaves the input
    /// untouched when the result would pass `timestamp_end`.
    pub fn step_predict_day(&mut self) -> Result<bool, DashboardError> {
        let max = self.meta()?.timestamp_end;
        let current = self.predict_time()?;
        match current.checked_add_days(1) {
            Some(next) if next <= max => {
                self.predict_input.set(next);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn randomize_predict_time<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<LocalTimestamp, DashboardError> {
        let meta = self.meta()?;
        let sampled = LocalTimestamp::random_between(meta.timestamp_start, meta.timestamp_end, rng);
        Ok(self.predict_input.set(sampled))
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    fn indicator_mut(&mut self, control: Control) -> &mut Indicator {
        match control {
            Control::Fetch => &mut self.fetch_indicator,
            Control::Predict => &mut self.predict_indicator,
            Control::PredictAll => &mut self.predict_all_indicator,
        }
    }

    pub fn mark_succeeded(&mut self, control: Control) {
        let hold = self.indicator_hold;
        self.indicator_mut(control).flash_success(hold);
    }

    /// Show the failure icon and a danger notification
    pub fn mark_failed(&mut self, control: Control, error: &DashboardError) {
        self.indicator_mut(control).show(Icon::X);
        self.notify(Notification::danger(error.user_message()));
    }

    pub fn snapshot(&self, predict_all: RunPhase) -> ViewSnapshot {
        let now = Instant::now();
        ViewSnapshot {
            tunnel: self.tunnel,
            tunnel_name: self.tunnel.display_name(),
            meta: self.meta().ok().cloned(),
            start_time: self.start_input.clone(),
            end_time: self.end_input.clone(),
            predict_time: self.predict_input.clone(),
            show_actual: self.show_actual,
            controls: ControlsSnapshot {
                fetch: self.fetch_indicator.icon_at(now),
                predict: self.predict_indicator.icon_at(now),
                predict_all: PredictAllSnapshot {
                    running: predict_all == RunPhase::Running,
                    stopping: predict_all == RunPhase::Stopping,
                    label: match predict_all {
                        RunPhase::Running => "Pause",
                        RunPhase::Stopping => "Pausing",
                        RunPhase::Idle => "Predict All",
                    },
                    icon: match predict_all {
                        RunPhase::Idle => self.predict_all_indicator.icon_at(now),
                        _ => Icon::Pause,
                    },
                },
            },
            notification: self.notification.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub tunnel: Tunnel,
    pub tunnel_name: &'static str,
    pub meta: Option<StreamMeta>,
    pub start_time: TimeInput,
    pub end_time: TimeInput,
    pub predict_time: TimeInput,
    pub show_actual: bool,
    pub controls: ControlsSnapshot,
    pub notification: Option<Notification>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControlsSnapshot {
    pub fetch: Icon,
    pub predict: Icon,
    pub predict_all: PredictAllSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictAllSnapshot {
    pub running: bool,
    /// Paused but the last request has not returned yet
    pub stopping: bool,
    pub label: &'static str,
    pub icon: Icon,
}
