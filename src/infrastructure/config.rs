use crate::application::controller::ControllerSettings;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerSettings,
    pub service: ServiceSettings,
    pub predict_all: PredictAllSettings,
    pub ui: UiSettings,
    pub chart: ChartConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceSettings {
    /// Base URL of the forecasting service
    pub endpoint: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8881".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PredictAllSettings {
    pub interval_ms: u64,
}

impl Default for PredictAllSettings {
    fn default() -> Self {
        Self { interval_ms: 250 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UiSettings {
    pub indicator_reset_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            indicator_reset_ms: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChartConfig {
    pub x_axis_title: String,
    pub y_axis_title: String,
    /// The y-axis range is fixed only when both bounds are set
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub actuals_color: String,
    pub predictions_color: String,
    pub plot_bgcolor: String,
    pub grid_color: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            x_axis_title: "Timestamp".to_string(),
            y_axis_title: "Journey time".to_string(),
            y_min: None,
            y_max: None,
            actuals_color: "#636efa".to_string(),
            predictions_color: "#ef553b".to_string(),
            plot_bgcolor: "#e5ecf6".to_string(),
            grid_color: "#ffffff".to_string(),
        }
    }
}

impl ChartConfig {
    pub fn y_range(&self) -> Option<[f64; 2]> {
        match (self.y_min, self.y_max) {
            (Some(min), Some(max)) => Some([min, max]),
            _ => None,
        }
    }
}

impl DashboardConfig {
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            predict_all_interval: Duration::from_millis(self.predict_all.interval_ms),
            indicator_hold: Duration::from_millis(self.ui.indicator_reset_ms),
        }
    }
}

/// Load `config/dashboard.*` (optional) overlaid with `DASHBOARD__SECTION__KEY` variables
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
