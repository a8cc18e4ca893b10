// HTTP request handlers
use crate::application::controller::InputUpdate;
use crate::application::error::DashboardError;
use crate::domain::tunnel::Tunnel;
use crate::infrastructure::chunked_json::stream_chart;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct TunnelSelection {
    pub tunnel: Tunnel,
}

fn status_for(error: &DashboardError) -> StatusCode {
    if error.is_upstream() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

/// Answer an action with the current view, using the error status on failure
fn view_response<T>(state: &AppState, result: Result<T, DashboardError>) -> Response {
    let snapshot = state.controller.snapshot();
    match result {
        Ok(_) => Json(snapshot).into_response(),
        Err(e) => (status_for(&e), Json(snapshot)).into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.controller.snapshot())
}

pub async fn reload_meta(State(state): State<Arc<AppState>>) -> Response {
    let result = state.controller.reload_meta().await;
    view_response(&state, result)
}

pub async fn select_tunnel(
    State(state): State<Arc<AppState>>,
    Json(selection): Json<TunnelSelection>,
) -> Response {
    state.controller.select_tunnel(selection.tunnel);
    view_response(&state, Ok(()))
}

pub async fn update_inputs(
    State(state): State<Arc<AppState>>,
    Json(update): Json<InputUpdate>,
) -> Response {
    state.controller.set_inputs(update);
    view_response(&state, Ok(()))
}

pub async fn fetch(State(state): State<Arc<AppState>>) -> Response {
    let result = state.controller.fetch_range().await;
    view_response(&state, result)
}

pub async fn predict(State(state): State<Arc<AppState>>) -> Response {
    let result = state.controller.predict_once().await;
    view_response(&state, result)
}

/// Start predict-all, or pause it when already running. While a paused run is
/// still finishing nothing starts and the snapshot reports `stopping`.
pub async fn predict_all(State(state): State<Arc<AppState>>) -> Response {
    let result = state.controller.toggle_predict_all();
    view_response(&state, result)
}

pub async fn next_day(State(state): State<Arc<AppState>>) -> Response {
    let result = state.controller.step_day();
    view_response(&state, result)
}

pub async fn shuffle(State(state): State<Arc<AppState>>) -> Response {
    let result = state.controller.randomize_time();
    view_response(&state, result)
}

pub async fn dismiss_notification(State(state): State<Arc<AppState>>) -> Response {
    state.controller.dismiss_notification();
    view_response(&state, Ok(()))
}

/// Full chart figure
pub async fn chart_figure(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let figure = state.chart.figure();
    match json_response(&figure, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Stream chart updates as NDJSON
pub async fn chart_stream(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    stream_chart(state.chart.clone())
}

pub async fn resize_chart(State(state): State<Arc<AppState>>) -> StatusCode {
    state.controller.resize();
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::controller::{ControllerSettings, InteractionController};
    use crate::application::error::Endpoint;
    use crate::application::test_support::{
        FakeForecastApi, InstantDelay, fetch_response, sample_meta,
    };
    use crate::infrastructure::broadcast_chart::BroadcastChart;
    use crate::infrastructure::config::ChartConfig;
    use axum::http::{HeaderValue, header};
    use serde_json::Value;

    async fn app(meta_loaded: bool) -> (Arc<FakeForecastApi>, Arc<AppState>) {
        let api = Arc::new(FakeForecastApi::new());
        let chart = Arc::new(BroadcastChart::new(ChartConfig::default()));
        let controller = Arc::new(InteractionController::new(
            api.clone(),
            chart.clone(),
            Arc::new(InstantDelay::new()),
            ControllerSettings::default(),
        ));
        if meta_loaded {
            api.push_meta(Ok(sample_meta()));
            controller.load_meta().await.unwrap();
        }
        (api, Arc::new(AppState { controller, chart }))
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success_returns_view() {
        let (api, state) = app(true).await;
        api.push_fetch(Ok(fetch_response("2023-01-01T00:00", 3)));

        let response = fetch(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["controls"]["fetch"], "check-lg");
        assert_eq!(state.chart.figure()["data"][0]["y"], serde_json::json!([5.0, 6.0, 7.0]));
    }

    #[tokio::test]
    async fn test_fetch_upstream_failure_is_bad_gateway() {
        let (api, state) = app(true).await;
        api.push_fetch(Err(DashboardError::unavailable(Endpoint::Fetch, "HTTP 500")));

        let response = fetch(State(state)).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["notification"]["level"], "danger");
        assert_eq!(body["notification"]["message"], "Unable to fetch data");
    }

    #[tokio::test]
    async fn test_actions_before_meta_are_unprocessable() {
        let (_, state) = app(false).await;

        let response = next_day(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = predict_all(State(state)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["controls"]["predict_all"]["label"], "Predict All");
        assert_eq!(body["meta"], Value::Null);
    }

    #[tokio::test]
    async fn test_select_tunnel_and_inputs() {
        let (_, state) = app(true).await;

        let response = select_tunnel(
            State(state.clone()),
            Json(TunnelSelection { tunnel: Tunnel::Wht }),
        )
        .await;
        let body = json_body(response).await;
        assert_eq!(body["tunnel"], "wht");
        assert_eq!(body["tunnel_name"], "Western Harbour Crossing");

        let update: InputUpdate =
            serde_json::from_str(r#"{"start_time": "2022-01-01T00:00", "show_actual": true}"#)
                .unwrap();
        let body = json_body(update_inputs(State(state), Json(update)).await).await;
        assert_eq!(body["start_time"]["value"], "2023-01-01T00:00");
        assert_eq!(body["show_actual"], true);
    }

    #[tokio::test]
    async fn test_chart_figure_honours_accept_encoding() {
        let (_, state) = app(false).await;
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("br"));

        let response = chart_figure(headers, State(state.clone())).await;
        assert_eq!(response.headers()[header::CONTENT_ENCODING], "br");

        let response = chart_figure(HeaderMap::new(), State(state)).await;
        let body = json_body(response).await;
        assert_eq!(body["layout"]["title"], "Cross-Harbour Tunnel");
    }

    #[tokio::test]
    async fn test_notification_dismissal() {
        let (api, state) = app(true).await;
        api.push_fetch(Err(DashboardError::unavailable(Endpoint::Fetch, "HTTP 500")));
        fetch(State(state.clone())).await;

        let body = json_body(dismiss_notification(State(state)).await).await;
        assert_eq!(body["notification"], Value::Null);
    }
}
