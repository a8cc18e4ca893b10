// In-memory chart that publishes every change to stream subscribers
use crate::application::chart_surface::ChartSurface;
use crate::application::lock;
use crate::domain::chart::{ChartUpdate, SeriesBatch, SeriesKind, SeriesPoints};
use crate::infrastructure::config::ChartConfig;
use serde_json::{Value, json};
use std::sync::Mutex;
use tokio::sync::broadcast;

const UPDATE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct ChartState {
    title: String,
    series: [SeriesPoints; 2],
}

pub struct BroadcastChart {
    config: ChartConfig,
    state: Mutex<ChartState>,
    tx: broadcast::Sender<ChartUpdate>,
}

impl BroadcastChart {
    pub fn new(config: ChartConfig) -> Self {
        let (tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            config,
            state: Mutex::new(ChartState::default()),
            tx,
        }
    }

    /// Apply `mutate` and publish `update` under one lock so subscribers never miss or double-apply it
    fn apply(&self, update: ChartUpdate, mutate: impl FnOnce(&mut ChartState)) {
        let mut state = lock(&self.state);
        mutate(&mut state);
        // No receivers is fine
        let _ = self.tx.send(update);
    }

    /// Full figure as `{ data, layout, config }`
    pub fn figure(&self) -> Value {
        let state = lock(&self.state);
        self.render(&state)
    }

    /// Current figure plus a receiver positioned right after it
    pub fn subscribe(&self) -> (Value, broadcast::Receiver<ChartUpdate>) {
        let state = lock(&self.state);
        (self.render(&state), self.tx.subscribe())
    }

    #[cfg(test)]
    pub fn series(&self, kind: SeriesKind) -> SeriesPoints {
        lock(&self.state).series[kind.index()].clone()
    }

    fn render(&self, state: &ChartState) -> Value {
        let colors = [&self.config.actuals_color, &self.config.predictions_color];
        let data: Vec<Value> = SeriesKind::ALL
            .iter()
            .map(|kind| {
                let points = &state.series[kind.index()];
                json!({
                    "x": points.x(),
                    "y": points.y(),
                    "mode": "lines",
                    "name": kind.name(),
                    "line": { "color": colors[kind.index()] },
                })
            })
            .collect();

        let mut yaxis = json!({
            "title": self.config.y_axis_title,
            "gridcolor": self.config.grid_color,
        });
        if let Some(range) = self.config.y_range() {
            yaxis["range"] = json!(range);
        }

        json!({
            "data": data,
            "layout": {
                "autosize": true,
                "hovermode": "closest",
                "title": state.title,
                "plot_bgcolor": self.config.plot_bgcolor,
                "xaxis": {
                    "title": self.config.x_axis_title,
                    "gridcolor": self.config.grid_color,
                },
                "yaxis": yaxis,
            },
            "config": {
                "responsive": true,
                "showTips": false,
            },
        })
    }
}

impl ChartSurface for BroadcastChart {
    fn replace(&self, batches: Vec<SeriesBatch>) {
        let applied = batches.clone();
        self.apply(ChartUpdate::Replace { batches }, move |state| {
            for batch in applied {
                state.series[batch.series.index()] = batch.points;
            }
        });
    }

    fn append(&self, batches: Vec<SeriesBatch>) {
        let applied = batches.clone();
        self.apply(ChartUpdate::Append { batches }, move |state| {
            for batch in applied {
                state.series[batch.series.index()].extend(batch.points);
            }
        });
    }

    fn resize(&self) {
        self.apply(ChartUpdate::Relayout { autosize: true }, |_| {});
    }

    fn set_title(&self, title: &str) {
        let owned = title.to_string();
        self.apply(
            ChartUpdate::Title {
                title: title.to_string(),
            },
            move |state| state.title = owned,
        );
    }
}
