// Application state for HTTP handlers
use crate::application::controller::InteractionController;
use crate::infrastructure::broadcast_chart::BroadcastChart;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<InteractionController>,
    pub chart: Arc<BroadcastChart>,
}
