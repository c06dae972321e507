//! Analyzer configuration
//!
//! Every threshold defaults to its documented constant. Overrides come from
//! an optional config file and then from `FORMCHECK_*` environment
//! variables, with `__` separating nested keys:
//!
//! ```text
//! FORMCHECK_RISK__MIN_HISTORY_ENTRIES=5
//! FORMCHECK_RULES__BADMINTON__SHOULDER_LEVEL_MAX=0.08
//! ```

use crate::aggregator::AggregatorThresholds;
use crate::risk::RiskThresholds;
use crate::rules::RuleThresholds;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FORMCHECK";

/// Separator between nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

/// Analyzer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Frame-level rule thresholds
    pub rules: RuleThresholds,
    /// Session aggregation thresholds
    pub aggregator: AggregatorThresholds,
    /// Injury risk scoring thresholds
    pub risk: RiskThresholds,
}

impl AnalyzerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an optional file, then the environment
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        Self::build(path, environment())
    }

    fn build(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let config = builder
            .add_source(env)
            .build()
            .context("Failed to read analyzer configuration")?;

        let loaded: Self = config
            .try_deserialize()
            .context("Invalid analyzer configuration")?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject threshold combinations that cannot classify anything sensibly
    pub fn validate(&self) -> Result<()> {
        let risk = &self.risk;
        if risk.medium_score > risk.high_score {
            anyhow::bail!(
                "risk.medium_score ({}) exceeds risk.high_score ({})",
                risk.medium_score,
                risk.high_score
            );
        }
        if risk.pose_only_medium > risk.pose_only_high {
            anyhow::bail!("risk.pose_only_medium exceeds risk.pose_only_high");
        }
        let badminton = &self.rules.badminton;
        if badminton.elbow_wrist_min >= badminton.elbow_wrist_max {
            anyhow::bail!("rules.badminton.elbow_wrist_min must be below elbow_wrist_max");
        }
        let aggregator = &self.aggregator;
        if aggregator.minimal_oscillation > aggregator.moderate_oscillation {
            anyhow::bail!("aggregator.minimal_oscillation exceeds moderate_oscillation");
        }
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}
