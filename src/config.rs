// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Charge Arena Simulation Suite - Configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("agent_count must be at least 1")]
    EmptyPopulation,
    #[error("player_count {players} exceeds agent_count {agents}")]
    TooManyPlayers { players: usize, agents: usize },
    #[error("{field} must be finite and positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("learning_rate must be finite and non-negative, got {0}")]
    InvalidLearningRate(f64),
    #[error("randomness must lie in [0, 1), got {0}")]
    InvalidRandomness(f64),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Base seed; every agent derives its own stream from it.
    pub seed: u64,
    /// Total number of agents, players included.
    pub agent_count: usize,
    /// Agents `0..player_count` are driven by begin_hold/end_hold.
    pub player_count: usize,
    /// Nominal frames per second. Sets the fixed step and the cool-down scale.
    pub frame_rate: f64,
    /// Use caller-supplied frame times instead of a fixed step.
    pub variable_step: bool,
    /// Upper bound on a single variable step, in seconds.
    pub max_step: f64,
    /// How quickly lagging agents adapt toward the leader.
    pub learning_rate: f64,
    /// Half-width of the multiplicative hold-duration noise at skill 1.0.
    pub randomness: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            agent_count: 10,
            player_count: 0,
            frame_rate: 60.0,
            variable_step: false,
            max_step: 0.25,
            learning_rate: 0.1,
            randomness: 0.2,
        }
    }
}

impl SimConfig {
    /// Seconds per nominal frame.
    pub fn reference_dt(&self) -> f64 {
        1.0 / self.frame_rate
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent_count == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.player_count > self.agent_count {
            return Err(ConfigError::TooManyPlayers {
                players: self.player_count,
                agents: self.agent_count,
            });
        }
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(ConfigError::NotPositive { field: "frame_rate", value: self.frame_rate });
        }
        if !(self.max_step.is_finite() && self.max_step > 0.0) {
            return Err(ConfigError::NotPositive { field: "max_step", value: self.max_step });
        }
        if !(self.learning_rate.is_finite() && self.learning_rate >= 0.0) {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        // noise >= 1 could make a planned hold duration negative before the floor
        if !(self.randomness.is_finite() && (0.0..1.0).contains(&self.randomness)) {
            return Err(ConfigError::InvalidRandomness(self.randomness));
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        let cfg = SimConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.agent_count, 10);
        assert!((cfg.reference_dt() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg = SimConfig::from_json_str(r#"{ "agent_count": 3, "seed": 9 }"#)
            .expect("partial config should parse");
        assert_eq!(cfg.agent_count, 3);
        assert_eq!(cfg.seed, 9);
        assert_eq!(cfg.learning_rate, 0.1);
        assert_eq!(cfg.randomness, 0.2);
    }

    #[test]
    fn test_rejects_empty_population() {
        let err = SimConfig::from_json_str(r#"{ "agent_count": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPopulation));
    }

    #[test]
    fn test_rejects_too_many_players() {
        let cfg = SimConfig { agent_count: 2, player_count: 3, ..SimConfig::default() };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::TooManyPlayers { players: 3, agents: 2 })
        ));
    }

    #[test]
    fn test_players_count_toward_agents() {
        let cfg = SimConfig { agent_count: 3, player_count: 3, ..SimConfig::default() };
        assert!(cfg.validate().is_ok());
        let pop = crate::population::Population::new(&cfg);
        assert_eq!(pop.len(), 3);
        assert!(pop.agents().iter().all(|a| a.control() == crate::types::Control::Player));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let cfg = SimConfig { frame_rate: 0.0, ..SimConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::NotPositive { field: "frame_rate", .. })));

        let cfg = SimConfig { learning_rate: f64::NAN, ..SimConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidLearningRate(_))));

        let cfg = SimConfig { randomness: 1.0, ..SimConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidRandomness(_))));
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let err = SimConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "agent_count": 4, "player_count": 1 }}"#).expect("write config");
        let cfg = SimConfig::load(file.path()).expect("config should load");
        assert_eq!(cfg.agent_count, 4);
        assert_eq!(cfg.player_count, 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = SimConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
