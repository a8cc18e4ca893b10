// Presentation layer - HTTP routes driving the dashboard
pub mod app_state;
pub mod handlers;
