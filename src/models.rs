use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::parse::{parse_number, parse_timestamp};

/// Position of a deal in the sales lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Lead,
    Qualified,
    Proposal,
    Negotiating,
    Won,
    Lost,
}

impl Stage {
    /// Lifecycle order, used everywhere a per-stage listing is produced.
    pub const ALL: [Stage; 6] = [
        Stage::Lead,
        Stage::Qualified,
        Stage::Proposal,
        Stage::Negotiating,
        Stage::Won,
        Stage::Lost,
    ];

    /// Case-sensitive lookup of a stored stage label.
    pub fn parse(label: &str) -> Option<Stage> {
        match label {
            "lead" => Some(Stage::Lead),
            "qualified" => Some(Stage::Qualified),
            "proposal" => Some(Stage::Proposal),
            "negotiating" => Some(Stage::Negotiating),
            "won" => Some(Stage::Won),
            "lost" => Some(Stage::Lost),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Lead => "lead",
            Stage::Qualified => "qualified",
            Stage::Proposal => "proposal",
            Stage::Negotiating => "negotiating",
            Stage::Won => "won",
            Stage::Lost => "lost",
        }
    }

    /// Deals that are still open, i.e. neither won nor lost.
    pub fn is_active(self) -> bool {
        !matches!(self, Stage::Won | Stage::Lost)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One value per pipeline stage. Every stage is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTable<T> {
    pub lead: T,
    pub qualified: T,
    pub proposal: T,
    pub negotiating: T,
    pub won: T,
    pub lost: T,
}

impl<T> StageTable<T> {
    pub fn get(&self, stage: Stage) -> &T {
        match stage {
            Stage::Lead => &self.lead,
            Stage::Qualified => &self.qualified,
            Stage::Proposal => &self.proposal,
            Stage::Negotiating => &self.negotiating,
            Stage::Won => &self.won,
            Stage::Lost => &self.lost,
        }
    }

    pub fn get_mut(&mut self, stage: Stage) -> &mut T {
        match stage {
            Stage::Lead => &mut self.lead,
            Stage::Qualified => &mut self.qualified,
            Stage::Proposal => &mut self.proposal,
            Stage::Negotiating => &mut self.negotiating,
            Stage::Won => &mut self.won,
            Stage::Lost => &mut self.lost,
        }
    }

    /// Entries in lifecycle order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, &T)> + '_ {
        Stage::ALL.into_iter().map(move |stage| (stage, self.get(stage)))
    }
}

/// Raw founder inputs exactly as typed into the financial form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinancialModel {
    pub mrr: String,
    /// Monthly growth in percent, `8` meaning 8%.
    pub growth_rate: String,
    /// Gross monthly outflow before revenue is offset.
    pub burn: String,
    pub gross_margin: String,
    pub cac: String,
    pub ltv: String,
    pub cash: String,
}

impl FinancialModel {
    pub fn parsed(&self) -> FinancialInputs {
        FinancialInputs {
            mrr: parse_number(&self.mrr),
            growth_rate: parse_number(&self.growth_rate),
            burn: parse_number(&self.burn),
            gross_margin: parse_number(&self.gross_margin),
            cac: parse_number(&self.cac),
            ltv: parse_number(&self.ltv),
            cash: parse_number(&self.cash),
        }
    }
}

/// [`FinancialModel`] after every field went through [`parse_number`].
/// Each value is finite and non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinancialInputs {
    pub mrr: f64,
    pub growth_rate: f64,
    pub burn: f64,
    pub gross_margin: f64,
    pub cac: f64,
    pub ltv: f64,
    pub cash: f64,
}

/// A month count that may have no finite bound, e.g. runway of a
/// cash-flow-positive company.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounded {
    Months(f64),
    Unbounded,
}

impl Bounded {
    pub fn months(self) -> Option<f64> {
        match self {
            Bounded::Months(value) => Some(value),
            Bounded::Unbounded => None,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Bounded::Unbounded)
    }
}

impl fmt::Display for Bounded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bounded::Months(value) => write!(f, "{value:.1}"),
            Bounded::Unbounded => f.write_str("∞"),
        }
    }
}

impl Serialize for Bounded {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Bounded::Months(value) => serializer.serialize_f64(*value),
            Bounded::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFinancials {
    pub arr: f64,
    pub gross_profit: f64,
    pub net_burn: f64,
    pub runway_months: Bounded,
    pub ltv_cac_ratio: f64,
    pub payback_months: Bounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub month: u32,
    pub mrr: f64,
    pub net_burn: f64,
    pub cash_remaining: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunwayUrgency {
    Medium,
    High,
    Critical,
}

impl fmt::Display for RunwayUrgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunwayUrgency::Medium => "MEDIUM",
            RunwayUrgency::High => "HIGH",
            RunwayUrgency::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunwayAlert {
    pub runway_months: f64,
    pub urgency: RunwayUrgency,
}

/// A pipeline record owned by the persistence layer. `stage` is kept as
/// the stored label so unknown values can be reported instead of coerced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: String,
    pub company: String,
    pub stage: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Deal {
    pub fn stage(&self) -> Option<Stage> {
        Stage::parse(&self.stage)
    }

    /// Parsed deal value, `0` when missing or unreadable.
    pub fn amount(&self) -> f64 {
        self.value.as_deref().map(parse_number).unwrap_or(0.0)
    }

    /// `updated_at`, or `created_at` when no update was recorded. An
    /// unreadable value gives `None`; it does not fall through.
    pub fn last_touched(&self) -> Option<DateTime<Utc>> {
        self.updated_at
            .as_deref()
            .or(self.created_at.as_deref())
            .and_then(parse_timestamp)
    }
}

/// Deals grouped by stage for a single call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineSnapshot<'a> {
    pub buckets: StageTable<Vec<&'a Deal>>,
    /// Deals whose stage label is not one of the six known stages.
    pub unclassified: Vec<&'a Deal>,
}

impl PipelineSnapshot<'_> {
    pub fn classified_len(&self) -> usize {
        self.buckets.iter().map(|(_, deals)| deals.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub stage: Stage,
    pub count: usize,
    pub total_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseRate {
    pub won_value: f64,
    pub lost_value: f64,
    pub rate_percent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageContribution {
    pub stage: Stage,
    pub deal_count: usize,
    pub pipeline_value: f64,
    pub expected_value: f64,
    /// Share of the total weighted revenue, 0..=100.
    pub percent_of_weighted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueForecast {
    pub total_pipeline_value: f64,
    pub weighted_expected_revenue: f64,
    pub per_stage_contribution: Vec<StageContribution>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealScore {
    pub deal_id: String,
    pub company: String,
    pub stage: String,
    pub score: u8,
    pub idle_days: i64,
}
