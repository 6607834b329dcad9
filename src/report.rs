use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::config::MetricsConfig;
use crate::models::{Deal, FinancialModel};
use crate::{financials, forecast, pipeline, score};

pub fn build_report(
    model: &FinancialModel,
    deals: &[Deal],
    now: DateTime<Utc>,
    config: &MetricsConfig,
) -> String {
    let derived = financials::derive_metrics(model);
    let projection = financials::project(model, config.projection_horizon_months);
    let snapshot = pipeline::group_by_stage(deals);
    let summaries = pipeline::summarize(&snapshot);
    let revenue = forecast::forecast(&snapshot, &config.close_probabilities);
    let scores = score::rank_deals(deals, now, config);

    let mut output = String::new();

    let _ = writeln!(output, "# Founder Metrics Report");
    let _ = writeln!(output, "Generated {}", now.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Financial Health");
    let _ = writeln!(output, "- ARR: ${:.0}", derived.arr);
    let _ = writeln!(output, "- Gross profit: ${:.0}/mo", derived.gross_profit);
    let _ = writeln!(output, "- Net burn: ${:.0}/mo", derived.net_burn);
    let _ = writeln!(output, "- Runway: {} months", derived.runway_months);
    let _ = writeln!(output, "- LTV:CAC: {:.1}x", derived.ltv_cac_ratio);
    let _ = writeln!(output, "- CAC payback: {} months", derived.payback_months);

    if let Some(alert) = financials::runway_alert(&derived, config.runway_alert_months) {
        let _ = writeln!(
            output,
            "- **{} runway alert**: {:.1} months of cash left",
            alert.urgency, alert.runway_months
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Cash Projection");
    let _ = writeln!(output, "| Month | MRR | Net burn | Cash remaining |");
    let _ = writeln!(output, "|---|---|---|---|");
    for point in projection.iter() {
        let _ = writeln!(
            output,
            "| {} | ${:.0} | ${:.0} | ${:.0} |",
            point.month, point.mrr, point.net_burn, point.cash_remaining
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Pipeline");

    if deals.is_empty() {
        let _ = writeln!(output, "No deals in the pipeline.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} deals (${:.0})",
                summary.stage, summary.count, summary.total_value
            );
        }
        if !snapshot.unclassified.is_empty() {
            let _ = writeln!(output, "- unclassified: {} deals", snapshot.unclassified.len());
        }
        if let Some(rate) = pipeline::close_rate(deals, now, config.close_rate_window_days) {
            let _ = writeln!(
                output,
                "- Close rate ({}d): {}% (won ${:.0}, lost ${:.0})",
                config.close_rate_window_days, rate.rate_percent, rate.won_value, rate.lost_value
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Revenue Forecast");
    let _ = writeln!(
        output,
        "Open pipeline ${:.0}, weighted expected revenue ${:.0}",
        revenue.total_pipeline_value, revenue.weighted_expected_revenue
    );
    for contribution in revenue.per_stage_contribution.iter() {
        let _ = writeln!(
            output,
            "- {}: ${:.0} expected ({:.1}%)",
            contribution.stage, contribution.expected_value, contribution.percent_of_weighted
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Deals");

    if scores.is_empty() {
        let _ = writeln!(output, "No deals to score.");
    } else {
        for deal_score in scores.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} ({}) score {} after {} idle days",
                deal_score.company, deal_score.stage, deal_score.score, deal_score.idle_days
            );
        }
    }

    output
}
