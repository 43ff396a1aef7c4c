//! Per-case derivation records, the `outcome_calculation_<outcome>.json` artifact

use qca_domain::CalibrationMethod;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How one outcome value was computed for one case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDerivation {
    /// The case
    pub case_id: String,
    /// Source-condition memberships that fed the combination
    pub source_values: BTreeMap<String, f64>,
    /// Source conditions the case had no value for (substituted with 0.0)
    pub missing_conditions: Vec<String>,
    /// Human-readable calculation trace
    pub calculation: String,
    /// Combination result before re-calibration, clamped to [0,1]
    pub raw_result: f64,
    /// Final membership after re-calibration (equals raw for fuzzy)
    pub final_result: f64,
    /// Evaluation error, when the combination fell back to 0.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full derivation audit for one outcome across all cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeCalculation {
    /// The outcome
    pub outcome_id: String,
    /// The combination rule as configured
    pub combination_rule: String,
    /// Re-calibration method applied to raw results
    pub calibration_method: CalibrationMethod,
    /// One record per case, in case order
    pub derivations: Vec<OutcomeDerivation>,
}

impl OutcomeCalculation {
    /// Number of cases whose combination fell back on an error
    pub fn error_count(&self) -> usize {
        self.derivations.iter().filter(|d| d.error.is_some()).count()
    }
}
