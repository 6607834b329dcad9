use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::models::{Deal, FinancialModel};

/// Reads deals from a CSV export with header
/// `id,company,stage,value,created_at,updated_at`. Blank cells become `None`.
pub fn load_deals(csv_path: &Path) -> anyhow::Result<Vec<Deal>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("opening deals CSV {}", csv_path.display()))?;
    read_deals(file).with_context(|| format!("reading deals from {}", csv_path.display()))
}

pub fn read_deals<R: std::io::Read>(source: R) -> anyhow::Result<Vec<Deal>> {
    #[derive(Deserialize)]
    struct CsvRow {
        id: String,
        company: String,
        stage: String,
        value: Option<String>,
        created_at: Option<String>,
        updated_at: Option<String>,
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    let mut deals = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid deal row {}", index + 1))?;
        deals.push(Deal {
            id: row.id,
            company: row.company,
            stage: row.stage,
            value: non_blank(row.value),
            created_at: non_blank(row.created_at),
            updated_at: non_blank(row.updated_at),
        });
    }

    tracing::debug!(count = deals.len(), "loaded deals");
    Ok(deals)
}

/// Reads the seven financial form fields from a JSON object. Absent fields
/// are treated as blank input.
pub fn load_model(json_path: &Path) -> anyhow::Result<FinancialModel> {
    let raw = std::fs::read_to_string(json_path)
        .with_context(|| format!("reading financial model {}", json_path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing financial model JSON in {}", json_path.display()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
