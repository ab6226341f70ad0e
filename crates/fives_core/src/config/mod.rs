//! # Engine Configuration
//!
//! Every tunable constant of the rating, badge, processor and news pipeline
//! lives here so club balancing does not require code changes.
//!
//! ## Usage
//! ```rust
//! use fives_core::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let casual = EngineConfig::casual();
//! assert!(casual.validate().is_ok());
//! ```

mod badge_config;
mod env;
mod processor_config;
mod rating_config;

pub use badge_config::BadgeThresholds;
pub use env::{load_from_env, ENGINE_CONFIG_PATH_ENV};
pub use processor_config::{NewsConfig, ProcessorConfig};
pub use rating_config::{IndividualPointsConfig, KFactorBracket, RatingConfig, TeamPointsConfig};

use crate::error::{CoreError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<EngineConfig> = Lazy::new(EngineConfig::default);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub rating: RatingConfig,
    #[serde(default)]
    pub badges: BadgeThresholds,
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub news: NewsConfig,
}

impl EngineConfig {
    /// Shared default instance.
    pub fn global_default() -> &'static EngineConfig {
        &DEFAULT_CONFIG
    }

    /// Club defaults
    pub fn club() -> Self {
        Self::default()
    }

    /// Slower rating movement for casual groups
    pub fn casual() -> Self {
        let mut cfg = Self::default();
        cfg.rating.k_brackets = vec![
            KFactorBracket { below_sessions: 3, k: 0.15 },
            KFactorBracket { below_sessions: 15, k: 0.07 },
            KFactorBracket { below_sessions: 30, k: 0.05 },
        ];
        cfg.rating.veteran_k = 0.03;
        cfg.rating.zero_contribution_penalty = -0.25;
        cfg.processor.penalty_interval = 8;
        cfg
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let rating = &self.rating;
        if rating.performance_min > rating.performance_max {
            return Err(CoreError::InvalidConfig(
                "performance_min must not exceed performance_max".into(),
            ));
        }
        let all_k = rating.k_brackets.iter().map(|b| b.k).chain(std::iter::once(rating.veteran_k));
        for k in all_k {
            if !(0.0..=1.0).contains(&k) {
                return Err(CoreError::InvalidConfig(format!("k-factor {k} outside 0..=1")));
            }
        }
        if rating.new_player_delta_cap < 0.0 || rating.veteran_delta_cap < 0.0 {
            return Err(CoreError::InvalidConfig("delta caps must be non-negative".into()));
        }
        if self.processor.penalty_interval == 0 {
            return Err(CoreError::InvalidConfig("penalty_interval must be at least 1".into()));
        }
        if self.processor.session_history_cap == 0 || self.processor.history_data_cap == 0 {
            return Err(CoreError::InvalidConfig("history caps must be at least 1".into()));
        }
        if self.news.ttl_hours <= 0 {
            return Err(CoreError::InvalidConfig("news ttl_hours must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(EngineConfig::club().validate().is_ok());
        assert!(EngineConfig::casual().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{"rating": {"veteran_k": 0.05}}"#).unwrap();
        assert_eq!(config.rating.veteran_k, 0.05);
        assert_eq!(config.rating.base_match_rating, 6.0);
        assert_eq!(config.badges.dynasty_streak, 9);
    }

    #[test]
    fn test_yaml_config() {
        let yaml = "processor:\n  penalty_interval: 3\nnews:\n  ttl_hours: 12\n";
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.processor.penalty_interval, 3);
        assert_eq!(config.news.ttl_hours, 12);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(EngineConfig::from_json(r#"{"processor": {"penalty_interval": 0}}"#).is_err());
        assert!(EngineConfig::from_json(r#"{"rating": {"veteran_k": 3.0}}"#).is_err());
    }
}
