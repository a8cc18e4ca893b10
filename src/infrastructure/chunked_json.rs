// Newline-delimited JSON streaming of chart updates
use crate::infrastructure::broadcast_chart::BroadcastChart;
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::Stream;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

/// Create a chunked NDJSON response, one JSON document per line
pub fn ndjson_stream<S>(stream: S) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = Value> + Send + 'static,
{
    let byte_stream = stream.map(|value| serialize_line(&value));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(byte_stream))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

fn serialize_line(value: &Value) -> Result<Bytes, std::io::Error> {
    let payload = serde_json::to_vec(value).map_err(std::io::Error::other)?;
    let mut line = BytesMut::with_capacity(payload.len() + 1);
    line.put_slice(&payload);
    line.put_u8(b'\n');
    Ok(line.freeze())
}

fn snapshot_message(figure: Value) -> Value {
    json!({ "op": "snapshot", "figure": figure })
}

/// Messages for a chart subscriber: a snapshot first, then every update.
/// A subscriber that falls behind gets a fresh snapshot instead of the missed updates.
pub fn chart_messages(chart: Arc<BroadcastChart>) -> impl Stream<Item = Value> + Send + 'static {
    async_stream::stream! {
        let (figure, mut rx) = chart.subscribe();
        yield snapshot_message(figure);

        loop {
            match rx.recv().await {
                Ok(update) => match serde_json::to_value(&update) {
                    Ok(value) => yield value,
                    Err(e) => tracing::warn!("Skipping unserializable chart update: {}", e),
                },
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("Chart subscriber lagged by {} updates, resyncing", missed);
                    let (figure, fresh) = chart.subscribe();
                    rx = fresh;
                    yield snapshot_message(figure);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

/// Helper to create the streaming response for a chart
pub fn stream_chart(chart: Arc<BroadcastChart>) -> impl IntoResponse {
    match ndjson_stream(chart_messages(chart)) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
