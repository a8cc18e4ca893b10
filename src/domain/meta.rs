// Stream metadata describing the queryable window and model window sizes
use super::time::LocalTimestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamMeta {
    pub timestamp_start: LocalTimestamp,
    pub timestamp_end: LocalTimestamp,
    pub earliest_predict_start: LocalTimestamp,
    /// Historical input steps consumed by one prediction
    pub n_steps: usize,
    /// Future steps produced by one prediction
    pub n_horizon: usize,
}

impl StreamMeta {
    /// Check `timestamp_start <= earliest_predict_start <= timestamp_end`
    pub fn validate(&self) -> Result<(), String> {
        if self.timestamp_start > self.earliest_predict_start {
            return Err(format!(
                "earliest_predict_start {} precedes timestamp_start {}",
                self.earliest_predict_start, self.timestamp_start
            ));
        }
        if self.earliest_predict_start > self.timestamp_end {
            return Err(format!(
                "earliest_predict_start {} is after timestamp_end {}",
                self.earliest_predict_start, self.timestamp_end
            ));
        }
        Ok(())
    }

    /// Input points already on the chart from the previous prediction
    pub fn history_overlap(&self) -> usize {
        self.n_steps.saturating_sub(self.n_horizon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(start: &str, earliest: &str, end: &str) -> StreamMeta {
        StreamMeta {
            timestamp_start: start.parse().unwrap(),
            timestamp_end: end.parse().unwrap(),
            earliest_predict_start: earliest.parse().unwrap(),
            n_steps: 24,
            n_horizon: 6,
        }
    }

    #[test]
    fn test_deserialize_service_payload() {
        let json = r#"{
            "timestamp_start": "2023-01-01T00:00:00",
            "timestamp_end": "2023-01-10T00:00:00",
            "earliest_predict_start": "2023-01-02T00:00:00",
            "n_steps": 72,
            "n_horizon": 36
        }"#;
        let meta: StreamMeta = serde_json::from_str(json).unwrap();
        assert_eq!(meta.earliest_predict_start.to_string(), "2023-01-02T00:00");
        assert_eq!(meta.history_overlap(), 36);
        assert!(meta.validate().is_ok());
    }

    #[test]
    fn test_validate_ordering() {
        assert!(meta("2023-01-01T00:00", "2023-01-01T00:00", "2023-01-01T00:00").validate().is_ok());
        assert!(meta("2023-01-02T00:00", "2023-01-01T00:00", "2023-01-10T00:00").validate().is_err());
        assert!(meta("2023-01-01T00:00", "2023-01-11T00:00", "2023-01-10T00:00").validate().is_err());
    }

    #[test]
    fn test_overlap_saturates() {
        let mut m = meta("2023-01-01T00:00", "2023-01-02T00:00", "2023-01-10T00:00");
        m.n_steps = 4;
        m.n_horizon = 6;
        assert_eq!(m.history_overlap(), 0);
    }
}
