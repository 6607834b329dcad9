use chrono::{DateTime, Duration, TimeZone, Utc};

use founder_metrics::config::MetricsConfig;
use founder_metrics::models::{Deal, FinancialModel};
use founder_metrics::{financials, forecast, pipeline, score};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()
}

fn deal(id: &str, stage: &str, value: &str, idle_days: i64) -> Deal {
    Deal {
        id: id.to_string(),
        company: format!("{id} Inc"),
        stage: stage.to_string(),
        value: Some(value.to_string()),
        created_at: Some("2026-01-01".to_string()),
        updated_at: Some((now() - Duration::days(idle_days)).to_rfc3339()),
    }
}

fn sample_pipeline() -> Vec<Deal> {
    vec![
        deal("alpha", "lead", "$1,000", 3),
        deal("beta", "qualified", "5000", 12),
        deal("gamma", "negotiating", "20,000", 1),
        deal("delta", "won", "15000", 30),
        deal("epsilon", "lost", "8000", 45),
        deal("zeta", "Negotiating", "70000", 0),
        deal("eta", "proposal", "12000", 10),
    ]
}

#[test]
fn cash_burning_company() {
    let model = FinancialModel {
        mrr: "$10,000".to_string(),
        growth_rate: "10%".to_string(),
        burn: "15,000".to_string(),
        gross_margin: "70".to_string(),
        cash: "40000".to_string(),
        ..FinancialModel::default()
    };
    let derived = financials::derive_metrics(&model);

    assert!((derived.gross_profit - 7000.0).abs() < 0.001);
    assert!((derived.net_burn - 8000.0).abs() < 0.001);
    assert!((derived.runway_months.months().unwrap() - 5.0).abs() < 0.001);

    let points = financials::project(&model, 12);
    assert_eq!(points.len(), 12);
    assert!(points.windows(2).all(|pair| pair[1].mrr >= pair[0].mrr));
    assert_eq!(points, financials::project(&model, 12));
}

#[test]
fn cash_flow_positive_company_has_unbounded_runway() {
    for cash in ["0", "1", "2500000"] {
        let model = FinancialModel {
            mrr: "20000".to_string(),
            burn: "8000".to_string(),
            gross_margin: "80".to_string(),
            cash: cash.to_string(),
            ..FinancialModel::default()
        };
        let derived = financials::derive_metrics(&model);
        assert_eq!(derived.net_burn, 0.0);
        assert!(derived.runway_months.is_unbounded());
    }
}

#[test]
fn unbounded_runway_serializes_as_sentinel() {
    let derived = financials::derive_metrics(&FinancialModel::default());
    let json = serde_json::to_value(derived).unwrap();
    assert_eq!(json["runwayMonths"], "unbounded");
    assert_eq!(json["paybackMonths"], "unbounded");
    assert_eq!(json["ltvCacRatio"], 0.0);
}

#[test]
fn grouping_accounts_for_every_deal() {
    let deals = sample_pipeline();
    let snapshot = pipeline::group_by_stage(&deals);

    assert_eq!(snapshot.unclassified.len(), 1);
    assert_eq!(snapshot.unclassified[0].id, "zeta");
    assert_eq!(
        snapshot.classified_len(),
        deals.len() - snapshot.unclassified.len()
    );
}

#[test]
fn weighted_forecast_of_open_deals() {
    let deals: Vec<Deal> = sample_pipeline().into_iter().take(3).collect();
    let config = MetricsConfig::default();
    let snapshot = pipeline::group_by_stage(&deals);
    let revenue = forecast::forecast(&snapshot, &config.close_probabilities);

    assert!((revenue.weighted_expected_revenue - 16350.0).abs() < 0.001);
    assert!(revenue.weighted_expected_revenue <= revenue.total_pipeline_value);
}

#[test]
fn forecast_ignores_closed_and_unclassified_deals() {
    let deals = sample_pipeline();
    let config = MetricsConfig::default();
    let revenue = forecast::forecast(&pipeline::group_by_stage(&deals), &config.close_probabilities);

    // 1000 + 5000 + 20000 + 12000
    assert!((revenue.total_pipeline_value - 38000.0).abs() < 0.001);
    assert!((revenue.weighted_expected_revenue - (16350.0 + 5400.0)).abs() < 0.001);
}

#[test]
fn ranking_is_bounded_sorted_and_repeatable() {
    let deals = sample_pipeline();
    let config = MetricsConfig::default();
    let ranked = score::rank_deals(&deals, now(), &config);

    assert_eq!(ranked.len(), deals.len());
    assert!(ranked.iter().all(|deal_score| deal_score.score <= 100));
    assert!(ranked.windows(2).all(|pair| pair[0].score >= pair[1].score));
    // negotiating at one idle day edges out the won deal that sat for a month
    assert_eq!(ranked[0].deal_id, "gamma");
    assert_eq!(ranked[1].deal_id, "delta");

    let proposal = ranked.iter().find(|s| s.deal_id == "eta").unwrap();
    assert_eq!(proposal.idle_days, 10);
    assert_eq!(proposal.score, 50);

    let again = score::rank_deals(&deals, now(), &config);
    assert_eq!(
        serde_json::to_string(&ranked).unwrap(),
        serde_json::to_string(&again).unwrap()
    );
}

#[test]
fn custom_tables_change_results() {
    let config: MetricsConfig = serde_json::from_str(
        r#"{
            "close_probabilities": {
                "lead": 0.05, "qualified": 0.2, "proposal": 0.4,
                "negotiating": 0.7, "won": 1.0, "lost": 0.0
            },
            "max_idle_penalty": 10
        }"#,
    )
    .unwrap();
    config.validate().unwrap();

    let deals = vec![deal("old", "negotiating", "0", 365)];
    let revenue = forecast::forecast(
        &pipeline::group_by_stage(&[deal("n", "negotiating", "1000", 0)]),
        &config.close_probabilities,
    );
    assert!((revenue.weighted_expected_revenue - 700.0).abs() < 0.001);
    assert_eq!(score::score_deal(&deals[0], now(), &config).score, 65);
}
