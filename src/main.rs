// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::controller::InteractionController;
use crate::application::predict_all::TokioDelay;
use crate::infrastructure::broadcast_chart::BroadcastChart;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_client::HttpForecastClient;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    chart_figure, chart_stream, dismiss_notification, fetch, get_state, health_check, next_day,
    predict, predict_all, reload_meta, resize_chart, select_tunnel, shuffle, update_inputs,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create the forecasting service client and chart (infrastructure layer)
    let api = Arc::new(HttpForecastClient::new(config.service.endpoint.clone()));
    let chart = Arc::new(BroadcastChart::new(config.chart.clone()));

    // Create the controller (application layer)
    let controller = Arc::new(InteractionController::new(
        api,
        chart.clone(),
        Arc::new(TokioDelay),
        config.controller_settings(),
    ));

    // Metadata can be reloaded later through /meta/reload
    if let Err(e) = controller.load_meta().await {
        tracing::warn!("Starting without metadata: {}", e);
    }

    let shutdown_controller = controller.clone();
    let state = Arc::new(AppState { controller, chart });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/state", get(get_state))
        .route("/meta/reload", post(reload_meta))
        .route("/tunnel", post(select_tunnel))
        .route("/inputs", put(update_inputs))
        .route("/fetch", post(fetch))
        .route("/predict", post(predict))
        .route("/predict-all", post(predict_all))
        .route("/next-day", post(next_day))
        .route("/shuffle", post(shuffle))
        .route("/notification", delete(dismiss_notification))
        .route("/chart", get(chart_figure))
        .route("/chart/stream", get(chart_stream))
        .route("/chart/resize", post(resize_chart))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!(
        "Starting tunnel forecast dashboard on {} (service {})",
        addr,
        config.service.endpoint
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal(shutdown_controller))
        .await?;

    Ok(())
}

/// Resolve on Ctrl-C once any predict-all task has stopped
async fn shutdown_signal(controller: Arc<InteractionController>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    if controller.pause_predict_all() {
        tracing::info!("Waiting for predict-all to stop");
    }
    // A run paused earlier may still be finishing its last request
    controller.wait_predict_all().await;
}
