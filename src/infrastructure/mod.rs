// Infrastructure layer - External dependencies and adapters
pub mod broadcast_chart;
pub mod chunked_json;
pub mod config;
pub mod http_client;
pub mod http_response;
