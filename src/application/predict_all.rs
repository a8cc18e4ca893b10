// Predict-all: chain single-point predictions across a time range
use crate::application::chart_surface::ChartSurface;
use crate::application::error::{DashboardError, Endpoint};
use crate::application::forecast_api::ForecastApi;
use crate::application::lock;
use crate::application::view_state::PredictAllPlan;
use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Pause between two prediction requests
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Running flag of a single run. Each run owns its own flag, so a later run
/// never revives one that was paused.
#[derive(Debug, Clone)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Sentinel `next` or end bound reached
    Completed { steps: usize },
    /// Flag cleared by the user; appended points are kept
    Paused { steps: usize },
    Failed { steps: usize, error: DashboardError },
}

/// Where the predict-all control stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    /// Paused, but the task is still finishing its in-flight request
    Stopping,
}

/// Clears the busy marker when the task ends, including by panic or abort
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Idle/Running control for the predict-all task. At most one task exists at
/// a time: a paused run must finish before another can start.
#[derive(Default)]
pub struct PredictAllControl {
    current: Mutex<Option<RunFlag>>,
    busy: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<RunOutcome>>>,
}

impl PredictAllControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RunPhase {
        let current = lock(&self.current);
        if current.as_ref().is_some_and(RunFlag::is_set) {
            RunPhase::Running
        } else if self.busy.load(Ordering::SeqCst) {
            RunPhase::Stopping
        } else {
            RunPhase::Idle
        }
    }

    /// Spawn a run built by `run` unless a previous task is still alive
    pub fn start<F, Fut>(&self, run: F) -> bool
    where
        F: FnOnce(RunFlag) -> Fut,
        Fut: Future<Output = RunOutcome> + Send + 'static,
    {
        let mut current = lock(&self.current);
        if self.busy.swap(true, Ordering::SeqCst) {
            return false;
        }
        let flag = RunFlag::new();
        *current = Some(flag.clone());

        let guard = BusyGuard(self.busy.clone());
        let run = run(flag);
        let handle = tokio::spawn(async move {
            let _guard = guard;
            run.await
        });
        *lock(&self.task) = Some(handle);
        true
    }

    /// Request a stop; observed before the next iteration
    pub fn pause(&self) -> bool {
        match lock(&self.current).as_ref() {
            Some(flag) if flag.is_set() => {
                flag.clear();
                true
            }
            _ => false,
        }
    }

    /// Wait for the most recently started run. `None` when there is nothing to wait for.
    pub async fn completion(&self) -> Option<RunOutcome> {
        let handle = lock(&self.task).take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!("Predict-all task ended abnormally: {}", e);
                None
            }
        }
    }
}

/// Run the prediction loop until paused, out of data, past the end bound or failed.
/// Clears `flag` on exit.
pub async fn run_predict_all(
    plan: &PredictAllPlan,
    api: &dyn ForecastApi,
    chart: &dyn ChartSurface,
    delay: &dyn Delay,
    interval: Duration,
    flag: &RunFlag,
) -> RunOutcome {
    tracing::info!(
        "Predict-all started for {} from {} to {}",
        plan.tunnel,
        plan.start,
        plan.end
    );
    let outcome = match drive(plan, api, chart, delay, interval, flag).await {
        // The user already stopped this run; its in-flight failure is not theirs to see
        RunOutcome::Failed { steps, error } if !flag.is_set() => {
            tracing::warn!("Predict-all request failed after pause: {}", error);
            RunOutcome::Paused { steps }
        }
        outcome => outcome,
    };
    flag.clear();

    match &outcome {
        RunOutcome::Completed { steps } => tracing::info!("Predict-all completed after {} steps", steps),
        RunOutcome::Paused { steps } => tracing::info!("Predict-all paused after {} steps", steps),
        RunOutcome::Failed { steps, error } => {
            tracing::warn!("Predict-all failed after {} steps: {}", steps, error)
        }
    }
    outcome
}

async fn drive(
    plan: &PredictAllPlan,
    api: &dyn ForecastApi,
    chart: &dyn ChartSurface,
    delay: &dyn Delay,
    interval: Duration,
    flag: &RunFlag,
) -> RunOutcome {
    let mut time = plan.start;
    let mut steps = 0;

    loop {
        if !flag.is_set() {
            return RunOutcome::Paused { steps };
        }
        if time >= plan.end {
            return RunOutcome::Completed { steps };
        }

        let response = match api.predict_at(plan.tunnel, time).await {
            Ok(response) => response,
            Err(error) => return RunOutcome::Failed { steps, error },
        };
        let next = response
            .next_time()
            .map_err(|reason| DashboardError::invalid_response(Endpoint::Predict, reason));
        let mut increment = match response.into_increment() {
            Ok(increment) => increment,
            Err(e) => {
                return RunOutcome::Failed {
                    steps,
                    error: DashboardError::invalid_response(Endpoint::Predict, e),
                };
            }
        };

        if steps > 0 {
            increment.trim_history(plan.history_overlap);
        }
        chart.append(increment.into_batches());
        steps += 1;
        tracing::debug!("Predict-all step {} at {}", steps, time);

        time = match next {
            Ok(Some(next)) => next,
            Ok(None) => return RunOutcome::Completed { steps },
            Err(error) => return RunOutcome::Failed { steps, error },
        };
        if time >= plan.end {
            return RunOutcome::Completed { steps };
        }

        delay.wait(interval).await;
    }
}
