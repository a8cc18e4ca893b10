// Tunnel domain model
use serde::{Deserialize, Serialize};
use std::fmt;

/// A monitored tunnel, i.e. one data stream exposed by the forecasting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tunnel {
    #[default]
    Cht,
    Eht,
    Wht,
}

impl Tunnel {
    /// Value sent as the `tunnel` query parameter
    pub fn code(&self) -> &'static str {
        match self {
            Tunnel::Cht => "cht",
            Tunnel::Eht => "eht",
            Tunnel::Wht => "wht",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Tunnel::Cht => "Cross-Harbour Tunnel",
            Tunnel::Eht => "Eastern Harbour Crossing",
            Tunnel::Wht => "Western Harbour Crossing",
        }
    }
}

impl fmt::Display for Tunnel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
