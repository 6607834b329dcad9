use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use founder_metrics::config::MetricsConfig;
use founder_metrics::{financials, forecast, import, pipeline, report, score};

#[derive(Parser)]
#[command(name = "founder-metrics")]
#[command(about = "Financial health, pipeline forecast and deal scoring for founders", long_about = None)]
struct Cli {
    /// JSON file overriding stage tables and thresholds
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OutputArgs {
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive ARR, net burn, runway and unit economics
    Metrics {
        #[arg(long)]
        model: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Project MRR, net burn and cash month by month
    Project {
        #[arg(long)]
        model: PathBuf,
        #[arg(long)]
        horizon: Option<u32>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Count and total deals per stage
    Pipeline {
        #[arg(long)]
        deals: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Probability-weighted revenue of the open pipeline
    Forecast {
        #[arg(long)]
        deals: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Rank deals by closing likelihood
    Score {
        #[arg(long)]
        deals: PathBuf,
        /// RFC 3339 timestamp to score against, defaults to the current time
        #[arg(long)]
        now: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        model: PathBuf,
        #[arg(long)]
        deals: PathBuf,
        #[arg(long)]
        now: Option<String>,
        #[arg(long, default_value = "founder-metrics.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = MetricsConfig::load_optional(cli.config.as_deref())?;

    match cli.command {
        Commands::Metrics { model, output } => {
            let model = import::load_model(&model)?;
            let derived = financials::derive_metrics(&model);
            let alert = financials::runway_alert(&derived, config.runway_alert_months);

            if output.json {
                return print_json(&derived);
            }

            println!("ARR           ${:.0}", derived.arr);
            println!("Gross profit  ${:.0}/mo", derived.gross_profit);
            println!("Net burn      ${:.0}/mo", derived.net_burn);
            println!("Runway        {} months", derived.runway_months);
            println!("LTV:CAC       {:.1}x", derived.ltv_cac_ratio);
            println!("CAC payback   {} months", derived.payback_months);
            if let Some(alert) = alert {
                println!(
                    "{} runway alert: {:.1} months of cash left",
                    alert.urgency, alert.runway_months
                );
            }
        }
        Commands::Project {
            model,
            horizon,
            output,
        } => {
            let model = import::load_model(&model)?;
            let horizon = horizon.unwrap_or(config.projection_horizon_months);
            let points = financials::project(&model, horizon);

            if output.json {
                return print_json(&points);
            }

            for point in points.iter() {
                println!(
                    "month {:>3}: MRR ${:.0}, net burn ${:.0}, cash ${:.0}",
                    point.month, point.mrr, point.net_burn, point.cash_remaining
                );
            }
        }
        Commands::Pipeline { deals, output } => {
            let deals = import::load_deals(&deals)?;
            let snapshot = pipeline::group_by_stage(&deals);
            if !snapshot.unclassified.is_empty() {
                tracing::warn!(
                    count = snapshot.unclassified.len(),
                    "deals with unknown stages were left out"
                );
            }

            if output.json {
                return print_json(&snapshot);
            }

            for summary in pipeline::summarize(&snapshot).iter() {
                println!(
                    "{:<12} {:>4} deals  ${:.0}",
                    summary.stage, summary.count, summary.total_value
                );
            }
            for deal in snapshot.unclassified.iter() {
                println!("unclassified: {} ({}) stage {:?}", deal.company, deal.id, deal.stage);
            }
        }
        Commands::Forecast { deals, output } => {
            let deals = import::load_deals(&deals)?;
            let snapshot = pipeline::group_by_stage(&deals);
            let revenue = forecast::forecast(&snapshot, &config.close_probabilities);

            if output.json {
                return print_json(&revenue);
            }

            println!("Open pipeline        ${:.0}", revenue.total_pipeline_value);
            println!("Weighted expectation ${:.0}", revenue.weighted_expected_revenue);
            for contribution in revenue.per_stage_contribution.iter() {
                println!(
                    "- {}: {} deals, ${:.0} expected ({:.1}%)",
                    contribution.stage,
                    contribution.deal_count,
                    contribution.expected_value,
                    contribution.percent_of_weighted
                );
            }
        }
        Commands::Score {
            deals,
            now,
            limit,
            output,
        } => {
            let deals = import::load_deals(&deals)?;
            let now = resolve_now(now.as_deref())?;
            let scores = score::rank_deals(&deals, now, &config);

            if output.json {
                return print_json(&scores);
            }

            if scores.is_empty() {
                println!("No deals to score.");
                return Ok(());
            }

            println!("Top deals by closing likelihood:");
            for deal_score in scores.iter().take(limit) {
                println!(
                    "- {} ({}, {}) score {} after {} idle days",
                    deal_score.company,
                    deal_score.deal_id,
                    deal_score.stage,
                    deal_score.score,
                    deal_score.idle_days
                );
            }
        }
        Commands::Report {
            model,
            deals,
            now,
            out,
        } => {
            let model = import::load_model(&model)?;
            let deals = import::load_deals(&deals)?;
            let now = resolve_now(now.as_deref())?;
            let report = report::build_report(&model, &deals, now, &config);
            std::fs::write(&out, report)
                .with_context(|| format!("writing report to {}", out.display()))?;
            tracing::info!(path = %out.display(), "report written");
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn resolve_now(value: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match value {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map(|parsed| parsed.with_timezone(&Utc))
            .with_context(|| format!("--now must be an RFC 3339 timestamp, got {text:?}")),
        None => Ok(Utc::now()),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
