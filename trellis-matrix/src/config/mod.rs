use crate::model::costing::TravelMode;
use serde::{Deserialize, Serialize};

const DEFAULT_RESERVED_LABELS: usize = 4_096;
const DEFAULT_MAX_LABELS: usize = 16_777_216;
const DEFAULT_PAIR_MEETING_THRESHOLD: u32 = 16;
const DEFAULT_AUTO_DIVISOR: f64 = 56.0;
const DEFAULT_BICYCLE_DIVISOR: f64 = 56.0;
const DEFAULT_PEDESTRIAN_DIVISOR: f64 = 28.0;

/// Per-query tunables of the cost matrix engine. All fields default, so a
/// configuration section only needs the keys it overrides.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// initial capacity of each per-location edge label buffer; a
    /// memory/performance tradeoff only
    pub max_reserved_labels_count: usize,
    /// hard cap on labels in any one per-location search; exceeding it is
    /// a fatal resource exhaustion error
    pub max_label_count: usize,
    /// iterations after a pair's first meeting during which a cheaper
    /// meeting may supersede it; also the per-location iteration window
    /// after its last new connection
    pub pair_meeting_threshold: u32,
    /// divisors applied to `max_matrix_distance` to derive the cost
    /// ceiling, roughly travel time at modal speed
    pub cost_threshold_auto_divisor: f64,
    pub cost_threshold_bicycle_divisor: f64,
    pub cost_threshold_pedestrian_divisor: f64,
}

impl Default for MatrixConfig {
    fn default() -> MatrixConfig {
        MatrixConfig {
            max_reserved_labels_count: DEFAULT_RESERVED_LABELS,
            max_label_count: DEFAULT_MAX_LABELS,
            pair_meeting_threshold: DEFAULT_PAIR_MEETING_THRESHOLD,
            cost_threshold_auto_divisor: DEFAULT_AUTO_DIVISOR,
            cost_threshold_bicycle_divisor: DEFAULT_BICYCLE_DIVISOR,
            cost_threshold_pedestrian_divisor: DEFAULT_PEDESTRIAN_DIVISOR,
        }
    }
}

impl MatrixConfig {
    /// the cost ceiling for one query: labels popped above this cost
    /// terminate their search
    pub fn cost_threshold(&self, mode: TravelMode, max_matrix_distance: f64) -> f64 {
        let divisor = match mode {
            TravelMode::Auto => self.cost_threshold_auto_divisor,
            TravelMode::Bicycle => self.cost_threshold_bicycle_divisor,
            TravelMode::Pedestrian => self.cost_threshold_pedestrian_divisor,
        };
        max_matrix_distance / divisor
    }

    /// reject configurations that could never run a query
    pub fn validate(&self) -> Result<(), String> {
        if self.max_label_count == 0 {
            return Err("max_label_count must be positive".to_string());
        }
        if self.pair_meeting_threshold == 0 {
            return Err("pair_meeting_threshold must be positive".to_string());
        }
        for (name, divisor) in [
            ("auto", self.cost_threshold_auto_divisor),
            ("bicycle", self.cost_threshold_bicycle_divisor),
            ("pedestrian", self.cost_threshold_pedestrian_divisor),
        ] {
            if !divisor.is_finite() || divisor <= 0.0 {
                return Err(format!("cost threshold divisor for {} must be positive", name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize_from_empty_object() {
        let config: MatrixConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.pair_meeting_threshold, 16);
        assert_eq!(config.max_reserved_labels_count, 4_096);
        config.validate().unwrap();
    }

    #[test]
    fn test_mode_divisors() {
        let config = MatrixConfig::default();
        let auto = config.cost_threshold(TravelMode::Auto, 5600.0);
        let ped = config.cost_threshold(TravelMode::Pedestrian, 5600.0);
        assert_eq!(auto, 100.0);
        assert_eq!(ped, 200.0);
    }

    #[test]
    fn test_validate_rejects_zero_divisor() {
        let config: MatrixConfig =
            serde_json::from_str(r#"{"cost_threshold_auto_divisor": 0.0}"#).unwrap();
        assert!(config.validate().is_err());
    }
}
