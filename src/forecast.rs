use crate::models::{PipelineSnapshot, RevenueForecast, Stage, StageContribution, StageTable};

/// Probability-weighted value of the open pipeline.
///
/// Only active stages count: won and lost deals are already decided and
/// are left out of both totals.
pub fn forecast(
    snapshot: &PipelineSnapshot<'_>,
    probabilities: &StageTable<f64>,
) -> RevenueForecast {
    let mut per_stage_contribution: Vec<StageContribution> = snapshot
        .buckets
        .iter()
        .filter(|(stage, _)| stage.is_active())
        .map(|(stage, deals)| {
            let pipeline_value: f64 = deals.iter().map(|deal| deal.amount()).sum();
            StageContribution {
                stage,
                deal_count: deals.len(),
                pipeline_value,
                expected_value: pipeline_value * probabilities.get(stage),
                percent_of_weighted: 0.0,
            }
        })
        .collect();

    let total_pipeline_value: f64 = per_stage_contribution
        .iter()
        .map(|contribution| contribution.pipeline_value)
        .sum();
    let weighted_expected_revenue: f64 = per_stage_contribution
        .iter()
        .map(|contribution| contribution.expected_value)
        .sum();

    if weighted_expected_revenue > 0.0 {
        for contribution in per_stage_contribution.iter_mut() {
            contribution.percent_of_weighted =
                contribution.expected_value / weighted_expected_revenue * 100.0;
        }
    }

    RevenueForecast {
        total_pipeline_value,
        weighted_expected_revenue,
        per_stage_contribution,
    }
}

/// Expected value a single stage contributes, `0` for closed stages.
pub fn stage_contribution(forecast: &RevenueForecast, stage: Stage) -> f64 {
    forecast
        .per_stage_contribution
        .iter()
        .find(|contribution| contribution.stage == stage)
        .map(|contribution| contribution.expected_value)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetricsConfig;
    use crate::models::Deal;
    use crate::pipeline::group_by_stage;

    fn sample_deal(stage: &str, value: &str) -> Deal {
        Deal {
            id: format!("{stage}-{value}"),
            company: "Northwind".to_string(),
            stage: stage.to_string(),
            value: Some(value.to_string()),
            ..Deal::default()
        }
    }

    #[test]
    fn weights_active_deals_by_stage() {
        let deals = vec![
            sample_deal("lead", "1000"),
            sample_deal("qualified", "5000"),
            sample_deal("negotiating", "20000"),
        ];
        let config = MetricsConfig::default();
        let result = forecast(&group_by_stage(&deals), &config.close_probabilities);

        assert!((result.weighted_expected_revenue - 16350.0).abs() < 0.001);
        assert!((result.total_pipeline_value - 26000.0).abs() < 0.001);
        assert_eq!(result.per_stage_contribution.len(), 4);
        assert!((stage_contribution(&result, Stage::Negotiating) - 15000.0).abs() < 0.001);

        let share: f64 = result
            .per_stage_contribution
            .iter()
            .map(|contribution| contribution.percent_of_weighted)
            .sum();
        assert!((share - 100.0).abs() < 0.001);
    }

    #[test]
    fn closed_deals_are_excluded() {
        let deals = vec![
            sample_deal("won", "50000"),
            sample_deal("lost", "40000"),
            sample_deal("proposal", "10000"),
        ];
        let config = MetricsConfig::default();
        let result = forecast(&group_by_stage(&deals), &config.close_probabilities);

        assert!((result.total_pipeline_value - 10000.0).abs() < 0.001);
        assert!((result.weighted_expected_revenue - 4500.0).abs() < 0.001);
        assert_eq!(stage_contribution(&result, Stage::Won), 0.0);
    }

    #[test]
    fn unreadable_values_count_as_zero() {
        let deals = vec![sample_deal("lead", "call me"), sample_deal("lead", "2,000")];
        let config = MetricsConfig::default();
        let result = forecast(&group_by_stage(&deals), &config.close_probabilities);

        assert_eq!(result.per_stage_contribution[0].deal_count, 2);
        assert!((result.weighted_expected_revenue - 200.0).abs() < 0.001);
        assert!(result.weighted_expected_revenue <= result.total_pipeline_value);
    }

    #[test]
    fn empty_pipeline_has_zero_shares() {
        let config = MetricsConfig::default();
        let result = forecast(&group_by_stage(&[]), &config.close_probabilities);
        assert_eq!(result.weighted_expected_revenue, 0.0);
        assert!(result
            .per_stage_contribution
            .iter()
            .all(|contribution| contribution.percent_of_weighted == 0.0));
    }
}
