//! The TruthTableBuilder

use qca_audit::trail::event;
use qca_audit::AuditTrail;
use qca_domain::{CalibratedCase, ConditionValue, TableMode, TruthTable, TruthTableRow};
use serde_json::json;
use tracing::{info, warn};

/// Builds truth tables for one fixed condition ordering
///
/// The condition order fixes configuration-key semantics for every table the
/// builder produces; tables are immutable once built.
pub struct TruthTableBuilder {
    conditions: Vec<String>,
    membership_threshold: f64,
}

struct RowGroup {
    key: Vec<i64>,
    values: Vec<f64>,
    case_ids: Vec<String>,
    member_outcomes: Vec<f64>,
}

impl TruthTableBuilder {
    /// Create a builder over an ordered condition list
    pub fn new(conditions: Vec<String>, membership_threshold: f64) -> Self {
        Self {
            conditions,
            membership_threshold,
        }
    }

    /// Build one table for one outcome in one mode
    ///
    /// An empty case set yields an empty table, not an error.
    pub fn build(
        &self,
        cases: &[CalibratedCase],
        outcome_id: &str,
        mode: TableMode,
        audit: &mut AuditTrail,
    ) -> TruthTable {
        // Pass 1: group cases by configuration key and aggregate outcomes.
        let mut groups: Vec<RowGroup> = Vec::new();
        for case in cases {
            let values = self.condition_values(case, mode);
            let outcome = self.outcome_value(case, outcome_id, mode);
            let key: Vec<i64> = values.iter().map(|v| (v * 1000.0).round() as i64).collect();
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => {
                    group.case_ids.push(case.case_id.clone());
                    group.member_outcomes.push(outcome);
                }
                None => groups.push(RowGroup {
                    key,
                    values,
                    case_ids: vec![case.case_id.clone()],
                    member_outcomes: vec![outcome],
                }),
            }
        }

        let mut rows: Vec<TruthTableRow> = groups
            .iter()
            .map(|group| {
                let outcome = mean(&group.member_outcomes);
                TruthTableRow {
                    configuration: self
                        .conditions
                        .iter()
                        .zip(&group.values)
                        .map(|(condition_id, &value)| ConditionValue {
                            condition_id: condition_id.clone(),
                            value,
                        })
                        .collect(),
                    outcome,
                    case_ids: group.case_ids.clone(),
                    consistency: consistency(&group.member_outcomes, outcome),
                    coverage: 0.0,
                }
            })
            .collect();

        // Pass 2: coverage needs the global denominator, which only exists
        // once every row has been built. Do not fuse with pass 1.
        let denominator: f64 = groups
            .iter()
            .map(|g| {
                let best = g
                    .member_outcomes
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max);
                best * g.case_ids.len() as f64
            })
            .sum();
        if denominator > 0.0 {
            for row in &mut rows {
                row.coverage = row.outcome * row.case_ids.len() as f64 / denominator;
            }
        }

        let configurations_found = rows.len();
        let logical_remainders = self.logical_remainders(mode, configurations_found);
        let table = TruthTable {
            conditions: self.conditions.clone(),
            outcome_id: outcome_id.to_string(),
            mode,
            rows,
            total_cases: cases.len(),
            configurations_found,
            logical_remainders,
        };

        audit.record(
            event::TRUTH_TABLE_BUILT,
            json!({
                "outcome_id": outcome_id,
                "mode": mode.as_str(),
                "total_cases": table.total_cases,
                "configurations_found": table.configurations_found,
                "logical_remainders": table.logical_remainders,
            }),
        );
        info!(
            outcome = outcome_id,
            mode = mode.as_str(),
            configurations = configurations_found,
            "truth table built"
        );
        table
    }

    fn condition_values(&self, case: &CalibratedCase, mode: TableMode) -> Vec<f64> {
        self.conditions
            .iter()
            .map(|condition_id| {
                let score = case.condition_membership(condition_id).unwrap_or_else(|| {
                    warn!(
                        case = %case.case_id,
                        condition = %condition_id,
                        "condition missing from case, using 0.0"
                    );
                    0.0
                });
                match mode {
                    TableMode::Crisp => self.discretize(score),
                    // Rounded for grouping-key stability only; fuzzy values
                    // stay fuzzy.
                    TableMode::Fuzzy => (score * 1000.0).round() / 1000.0,
                }
            })
            .collect()
    }

    fn outcome_value(&self, case: &CalibratedCase, outcome_id: &str, mode: TableMode) -> f64 {
        let score = case.outcome_membership(outcome_id).unwrap_or_else(|| {
            warn!(
                case = %case.case_id,
                outcome = %outcome_id,
                "outcome missing from case, using 0.0"
            );
            0.0
        });
        match mode {
            TableMode::Crisp => self.discretize(score),
            TableMode::Fuzzy => score,
        }
    }

    fn discretize(&self, score: f64) -> f64 {
        if score >= self.membership_threshold {
            1.0
        } else {
            0.0
        }
    }

    fn logical_remainders(&self, mode: TableMode, configurations_found: usize) -> u64 {
        match mode {
            // Fuzzy configuration space is continuous, not enumerable the
            // way the crisp space is; zero by convention.
            TableMode::Fuzzy => 0,
            TableMode::Crisp => {
                let n = self.conditions.len();
                let total = match 1u64.checked_shl(n as u32) {
                    Some(total) => total,
                    None => {
                        warn!(
                            conditions = n,
                            "2^n overflows u64, logical remainder count saturates"
                        );
                        u64::MAX
                    }
                };
                total.saturating_sub(configurations_found as u64)
            }
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

// 1 − min(1, mean absolute deviation from the row mean): 1.0 when every
// member agrees, clamped so wild spreads cannot go negative.
fn consistency(member_outcomes: &[f64], row_mean: f64) -> f64 {
    if member_outcomes.is_empty() {
        return 1.0;
    }
    let mad = member_outcomes
        .iter()
        .map(|o| (o - row_mean).abs())
        .sum::<f64>()
        / member_outcomes.len() as f64;
    1.0 - mad.min(1.0)
}
