// Error taxonomy for dashboard actions
use std::fmt;
use thiserror::Error;

/// Forecasting service endpoints consumed by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Meta,
    Fetch,
    Predict,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Meta => "/get_meta",
            Endpoint::Fetch => "/fetch",
            Endpoint::Predict => "/predict",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Endpoint::Meta => "Unable to fetch metadata",
            Endpoint::Fetch => "Unable to fetch data",
            Endpoint::Predict => "Unable to fetch prediction result",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DashboardError {
    /// Non-success status or transport failure
    #[error("{endpoint} unavailable: {reason}")]
    ServiceUnavailable { endpoint: Endpoint, reason: String },

    /// The service answered with a payload that cannot be used
    #[error("{endpoint} returned an invalid response: {reason}")]
    InvalidResponse { endpoint: Endpoint, reason: String },

    #[error("{0}")]
    InvalidUserInput(String),

    #[error("Metadata has not been loaded yet")]
    MetaNotLoaded,
}

impl DashboardError {
    pub fn unavailable(endpoint: Endpoint, reason: impl fmt::Display) -> Self {
        Self::ServiceUnavailable {
            endpoint,
            reason: reason.to_string(),
        }
    }

    pub fn invalid_response(endpoint: Endpoint, reason: impl fmt::Display) -> Self {
        Self::InvalidResponse {
            endpoint,
            reason: reason.to_string(),
        }
    }

    /// Text shown in the notification banner
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::ServiceUnavailable { endpoint, .. } => {
                endpoint.failure_message().to_string()
            }
            DashboardError::InvalidResponse { endpoint, reason } => {
                format!("{} ({})", endpoint.failure_message(), reason)
            }
            other => other.to_string(),
        }
    }

    /// Whether the failure came from the forecasting service rather than the user
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            DashboardError::ServiceUnavailable { .. } | DashboardError::InvalidResponse { .. }
        )
    }
}
