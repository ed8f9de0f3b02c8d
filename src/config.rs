//! Runtime configuration from the environment.

use serde::Serialize;

use crate::playback::{MAX_SPEED, MIN_SPEED};

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the metrics JSON array.
    pub dataset_path: String,
    /// Initial playback speed factor.
    pub speed: f64,
    /// Start playing immediately instead of holding frame 0.
    pub autoplay: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            dataset_path: std::env::var("METRICS_PATH")
                .unwrap_or_else(|_| "data/metrics.json".to_string()),
            speed: std::env::var("SPEED")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .map(|v| v.clamp(MIN_SPEED, MAX_SPEED))
                .unwrap_or(1.0),
            autoplay: std::env::var("AUTOPLAY")
                .map(|v| v != "0" && v.to_lowercase() != "false")
                .unwrap_or(true),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        // Env vars are process-global; only assert the defaults hold when
        // the variables are unset, which is the normal test environment.
        if std::env::var("METRICS_PATH").is_err()
            && std::env::var("SPEED").is_err()
            && std::env::var("AUTOPLAY").is_err()
        {
            let cfg = Config::from_env();
            assert_eq!(cfg.dataset_path, "data/metrics.json");
            assert_eq!(cfg.speed, 1.0);
            assert!(cfg.autoplay);
        }
    }

    #[test]
    fn config_serializes_to_json() {
        let cfg = Config {
            dataset_path: "x.json".into(),
            speed: 2.0,
            autoplay: false,
        };
        let json = cfg.to_json();
        assert!(json.contains("\"dataset_path\""));
        assert!(json.contains("\"speed\""));
    }
}
