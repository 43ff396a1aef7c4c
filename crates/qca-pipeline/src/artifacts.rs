//! Artifact writers: the JSON/CSV output contract

use crate::error::Result;
use qca_domain::{CalibratedCase, TruthTable};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Write a pretty-printed JSON artifact with a trailing newline
///
/// Pretty output plus stable field ordering (serde structs and BTreeMaps
/// only) is what makes rerun artifacts byte-identical.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    std::fs::write(path, text)?;
    debug!(artifact = %path.display(), "artifact written");
    Ok(())
}

/// Read a JSON artifact back (used when a phase is skipped and a previous
/// run's materialized output is consumed instead)
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Render the case × condition membership matrix with row and column totals
pub fn calibration_matrix_csv(cases: &[CalibratedCase], condition_ids: &[String]) -> String {
    let mut out = String::new();
    out.push_str("case_id");
    for id in condition_ids {
        out.push(',');
        out.push_str(&csv_field(id));
    }
    out.push_str(",total\n");

    let mut column_totals = vec![0.0_f64; condition_ids.len()];
    for case in cases {
        out.push_str(&csv_field(&case.case_id));
        let mut row_total = 0.0;
        for (idx, id) in condition_ids.iter().enumerate() {
            let score = case.condition_membership(id).unwrap_or(0.0);
            column_totals[idx] += score;
            row_total += score;
            out.push_str(&format!(",{score:.3}"));
        }
        out.push_str(&format!(",{row_total:.3}\n"));
    }

    out.push_str("TOTAL");
    let grand_total: f64 = column_totals.iter().sum();
    for total in &column_totals {
        out.push_str(&format!(",{total:.3}"));
    }
    out.push_str(&format!(",{grand_total:.3}\n"));
    out
}

/// Render one truth table as CSV, one row per configuration
pub fn truth_table_csv(table: &TruthTable) -> String {
    let mut out = String::new();
    for id in &table.conditions {
        out.push_str(&csv_field(id));
        out.push(',');
    }
    out.push_str("outcome,consistency,coverage,n_cases,case_ids\n");

    for row in &table.rows {
        for cv in &row.configuration {
            out.push_str(&format!("{:.3},", cv.value));
        }
        out.push_str(&format!(
            "{:.3},{:.3},{:.3},{},{}\n",
            row.outcome,
            row.consistency,
            row.coverage,
            row.case_ids.len(),
            csv_field(&row.case_ids.join(";")),
        ));
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One entry of `truth_tables_summary.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub outcome_id: String,
    pub mode: String,
    pub total_cases: usize,
    pub configurations_found: usize,
    pub logical_remainders: u64,
}

impl TableSummary {
    /// Summarize one built table
    pub fn of(table: &TruthTable) -> Self {
        Self {
            outcome_id: table.outcome_id.clone(),
            mode: table.mode.as_str().to_string(),
            total_cases: table.total_cases,
            configurations_found: table.configurations_found,
            logical_remainders: table.logical_remainders,
        }
    }
}

/// The `truth_tables_summary.json` artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthTablesSummary {
    pub tables: Vec<TableSummary>,
}
