use crate::models::{
    Bounded, DerivedFinancials, FinancialInputs, FinancialModel, ProjectionPoint, RunwayAlert,
    RunwayUrgency,
};

pub fn derive_metrics(model: &FinancialModel) -> DerivedFinancials {
    derive_from_inputs(&model.parsed())
}

pub fn derive_from_inputs(inputs: &FinancialInputs) -> DerivedFinancials {
    let gross_profit = gross_profit(inputs.mrr, inputs.gross_margin);
    let net_burn = net_burn(inputs.burn, gross_profit);

    let runway_months = if net_burn > 0.0 {
        Bounded::Months(inputs.cash / net_burn)
    } else {
        Bounded::Unbounded
    };
    let ltv_cac_ratio = if inputs.cac > 0.0 {
        inputs.ltv / inputs.cac
    } else {
        0.0
    };
    let payback_months = if gross_profit > 0.0 {
        Bounded::Months(inputs.cac / gross_profit)
    } else {
        Bounded::Unbounded
    };

    DerivedFinancials {
        arr: inputs.mrr * 12.0,
        gross_profit,
        net_burn,
        runway_months,
        ltv_cac_ratio,
        payback_months,
    }
}

pub fn project(model: &FinancialModel, horizon_months: u32) -> Vec<ProjectionPoint> {
    project_from_inputs(&model.parsed(), horizon_months)
}

/// Month-by-month outlook with compound MRR growth.
///
/// `cash_remaining` is the month's own net burn times the elapsed months,
/// not a running sum of each month's burn.
pub fn project_from_inputs(inputs: &FinancialInputs, horizon_months: u32) -> Vec<ProjectionPoint> {
    let growth = 1.0 + inputs.growth_rate / 100.0;

    (1..=horizon_months)
        .map(|month| {
            // zero MRR stays zero however far growth compounds
            let mrr = if inputs.mrr > 0.0 {
                saturate(inputs.mrr * growth.powf(f64::from(month)))
            } else {
                0.0
            };
            let net_burn = net_burn(inputs.burn, gross_profit(mrr, inputs.gross_margin));
            ProjectionPoint {
                month,
                mrr,
                net_burn,
                cash_remaining: saturate(inputs.cash - net_burn * f64::from(month)),
            }
        })
        .collect()
}

/// Flags a short but finite runway. Unbounded runway never alerts.
pub fn runway_alert(derived: &DerivedFinancials, threshold_months: f64) -> Option<RunwayAlert> {
    let months = derived.runway_months.months()?;
    if months <= 0.0 || months >= threshold_months {
        return None;
    }

    let urgency = if months <= 2.0 {
        RunwayUrgency::Critical
    } else if months <= 4.0 {
        RunwayUrgency::High
    } else {
        RunwayUrgency::Medium
    };
    tracing::debug!(runway_months = months, %urgency, "runway below alert threshold");

    Some(RunwayAlert {
        runway_months: months,
        urgency,
    })
}

fn gross_profit(mrr: f64, gross_margin: f64) -> f64 {
    saturate(mrr * (gross_margin / 100.0))
}

fn net_burn(burn: f64, gross_profit: f64) -> f64 {
    saturate((burn - gross_profit).max(0.0))
}

// Extreme growth over long horizons can overflow f64; pin to the largest
// finite magnitude so ordering between months survives.
fn saturate(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(f64::MIN, f64::MAX)
    }
}
