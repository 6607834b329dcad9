use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{Stage, StageTable};

/// A century; longer windows cover every realistic deal history.
pub const MAX_CLOSE_RATE_WINDOW_DAYS: i64 = 36_500;

/// Tunable tables and thresholds shared by every calculator.
///
/// Defaults reproduce the canonical stage tables; a JSON file may override
/// any top-level field. Stage tables are replaced whole, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Probability that a deal in each stage closes, `0..=1`.
    pub close_probabilities: StageTable<f64>,
    /// Starting score of a deal in each stage, before idle/value adjustments.
    pub base_points: StageTable<f64>,
    pub idle_penalty_per_day: f64,
    pub max_idle_penalty: f64,
    /// `(minimum value, bonus)` pairs in any order; the highest tier a deal
    /// reaches wins.
    pub value_bonus_tiers: Vec<(f64, f64)>,
    pub projection_horizon_months: u32,
    pub runway_alert_months: f64,
    pub close_rate_window_days: i64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            close_probabilities: StageTable {
                lead: 0.10,
                qualified: 0.25,
                proposal: 0.45,
                negotiating: 0.75,
                won: 1.0,
                lost: 0.0,
            },
            base_points: StageTable {
                lead: 15.0,
                qualified: 35.0,
                proposal: 60.0,
                negotiating: 75.0,
                won: 100.0,
                lost: 0.0,
            },
            idle_penalty_per_day: 1.5,
            max_idle_penalty: 30.0,
            value_bonus_tiers: vec![(10_000.0, 5.0), (5_000.0, 3.0), (1_000.0, 1.0)],
            projection_horizon_months: 12,
            runway_alert_months: 6.0,
            close_rate_window_days: 90,
        }
    }
}

impl MetricsConfig {
    /// Reads a JSON config file and validates it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: MetricsConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config JSON in {}", path.display()))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded metrics config");
        Ok(config)
    }

    /// Loads from `path` when given, otherwise falls back to defaults.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for stage in Stage::ALL {
            let probability = *self.close_probabilities.get(stage);
            if !(0.0..=1.0).contains(&probability) {
                bail!("close probability for {stage} must be within 0..=1, got {probability}");
            }
            let points = *self.base_points.get(stage);
            if !points.is_finite() || points < 0.0 {
                bail!("base points for {stage} must be a non-negative number, got {points}");
            }
        }

        if !(self.idle_penalty_per_day >= 0.0 && self.max_idle_penalty >= 0.0) {
            bail!("idle penalties must be non-negative");
        }
        if self
            .value_bonus_tiers
            .iter()
            .any(|(threshold, bonus)| !(*threshold >= 0.0 && *bonus >= 0.0))
        {
            bail!("value bonus tiers must be non-negative");
        }
        if self.projection_horizon_months == 0 {
            bail!("projection horizon must be at least one month");
        }
        if !(1..=MAX_CLOSE_RATE_WINDOW_DAYS).contains(&self.close_rate_window_days) {
            bail!(
                "close rate window must be between 1 and {MAX_CLOSE_RATE_WINDOW_DAYS} days, got {}",
                self.close_rate_window_days
            );
        }
        Ok(())
    }
}
