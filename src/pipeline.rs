use chrono::{DateTime, Duration, Utc};

use crate::models::{CloseRate, Deal, PipelineSnapshot, Stage, StageSummary};

/// Buckets deals by stage. Deals with an unknown stage label land in
/// `unclassified` and in no bucket.
pub fn group_by_stage(deals: &[Deal]) -> PipelineSnapshot<'_> {
    let mut snapshot = PipelineSnapshot::default();

    for deal in deals {
        match deal.stage() {
            Some(stage) => snapshot.buckets.get_mut(stage).push(deal),
            None => {
                tracing::debug!(deal_id = %deal.id, stage = %deal.stage, "unclassified deal stage");
                snapshot.unclassified.push(deal);
            }
        }
    }

    snapshot
}

pub fn summarize(snapshot: &PipelineSnapshot<'_>) -> Vec<StageSummary> {
    snapshot
        .buckets
        .iter()
        .map(|(stage, deals)| StageSummary {
            stage,
            count: deals.len(),
            total_value: deals.iter().map(|deal| deal.amount()).sum(),
        })
        .collect()
}

/// Share of closed value that was won within the trailing window.
///
/// Closing time is [`Deal::last_touched`]; deals without a readable
/// timestamp are left out.
/// A window reaching past the earliest representable date has no cutoff.
pub fn close_rate(deals: &[Deal], now: DateTime<Utc>, window_days: i64) -> Option<CloseRate> {
    let cutoff = Duration::try_days(window_days.max(1))
        .and_then(|window| now.checked_sub_signed(window));
    let mut won_value = 0.0;
    let mut lost_value = 0.0;

    for deal in deals {
        let stage = match deal.stage() {
            Some(stage @ (Stage::Won | Stage::Lost)) => stage,
            _ => continue,
        };
        match deal.last_touched() {
            Some(at) if at <= now && cutoff.map_or(true, |cutoff| at >= cutoff) => {}
            _ => continue,
        }

        if stage == Stage::Won {
            won_value += deal.amount();
        } else {
            lost_value += deal.amount();
        }
    }

    let total = won_value + lost_value;
    if total <= 0.0 {
        return None;
    }

    Some(CloseRate {
        won_value,
        lost_value,
        rate_percent: (won_value / total * 100.0).round() as u32,
    })
}
