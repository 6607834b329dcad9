use chrono::{DateTime, Utc};

use crate::config::MetricsConfig;
use crate::models::{Deal, DealScore};

/// Closing-likelihood score in `0..=100` for one deal as of `now`.
pub fn score_deal(deal: &Deal, now: DateTime<Utc>, config: &MetricsConfig) -> DealScore {
    let idle_days = idle_days(deal, now);
    let stage_base = match deal.stage() {
        Some(stage) => *config.base_points.get(stage),
        None => 0.0,
    };

    let raw = stage_base - idle_penalty(idle_days, config) + value_bonus(deal.amount(), config);

    DealScore {
        deal_id: deal.id.clone(),
        company: deal.company.clone(),
        stage: deal.stage.clone(),
        score: raw.clamp(0.0, 100.0).round() as u8,
        idle_days,
    }
}

/// Scores every deal, highest first. Equal scores keep input order.
pub fn rank_deals(deals: &[Deal], now: DateTime<Utc>, config: &MetricsConfig) -> Vec<DealScore> {
    let mut scores: Vec<DealScore> = deals
        .iter()
        .map(|deal| score_deal(deal, now, config))
        .collect();
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    scores
}

/// Whole days since the deal was last touched, never negative.
///
/// Measured from `updated_at`, or `created_at` when the deal was never
/// updated. Missing or unreadable timestamps count as touched just now.
pub fn idle_days(deal: &Deal, now: DateTime<Utc>) -> i64 {
    match deal.last_touched() {
        Some(at) => (now - at).num_days().max(0),
        None => {
            if deal.updated_at.is_some() || deal.created_at.is_some() {
                tracing::debug!(deal_id = %deal.id, "unreadable deal timestamps, idle time set to 0");
            }
            0
        }
    }
}

pub fn idle_penalty(idle_days: i64, config: &MetricsConfig) -> f64 {
    (idle_days.max(0) as f64 * config.idle_penalty_per_day).min(config.max_idle_penalty)
}

/// Bonus of the highest tier the value reaches, whatever order the tiers
/// are listed in.
pub fn value_bonus(value: f64, config: &MetricsConfig) -> f64 {
    config
        .value_bonus_tiers
        .iter()
        .filter(|(threshold, _)| value >= *threshold)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0.0)
}
