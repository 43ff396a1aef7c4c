//! Calibrated records: cases after membership scoring

use crate::condition::CalibrationMethod;
use serde::{Deserialize, Serialize};

/// One condition's membership score for one case
///
/// `membership_score` is always inside [0, 1]; the constructor clamps, so the
/// invariant holds no matter which calibration family produced the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibratedCondition {
    /// The condition (or outcome) this score belongs to
    pub condition_id: String,
    /// Set membership in [0, 1]
    pub membership_score: f64,
    /// The (normalized) raw value that was calibrated
    pub raw_value: f64,
    /// Which calibration family produced the score
    pub calibration_method: CalibrationMethod,
}

impl CalibratedCondition {
    /// Create a calibrated condition, clamping the score into [0, 1]
    ///
    /// Non-finite scores (an expression evaluating to NaN/inf) clamp to 0.0.
    pub fn new(
        condition_id: impl Into<String>,
        raw_value: f64,
        membership_score: f64,
        calibration_method: CalibrationMethod,
    ) -> Self {
        let score = if membership_score.is_finite() {
            membership_score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            condition_id: condition_id.into(),
            membership_score: score,
            raw_value,
            calibration_method,
        }
    }
}

/// Source tracking carried on every calibrated case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Provenance {
    /// File the raw case record was loaded from
    pub source_file: String,
    /// Quote count at load time
    pub total_quotes: u64,
    /// Code occurrence count at load time
    pub total_codes: u64,
}

/// A case after calibration
///
/// `conditions` is ordered by configuration order and complete (every defined
/// condition has an entry). `outcomes` starts empty and is filled in by
/// outcome derivation, in outcome-definition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibratedCase {
    /// Stable case identifier
    pub case_id: String,
    /// Membership score per condition, in configuration order
    pub conditions: Vec<CalibratedCondition>,
    /// Membership score per derived outcome, in definition order
    pub outcomes: Vec<CalibratedCondition>,
    /// Source tracking
    pub provenance: Provenance,
}

impl CalibratedCase {
    /// Membership score for a condition id, if this case carries one
    pub fn condition_membership(&self, condition_id: &str) -> Option<f64> {
        self.conditions
            .iter()
            .find(|c| c.condition_id == condition_id)
            .map(|c| c.membership_score)
    }

    /// Membership score for a derived outcome id, if already derived
    pub fn outcome_membership(&self, outcome_id: &str) -> Option<f64> {
        self.outcomes
            .iter()
            .find(|c| c.condition_id == outcome_id)
            .map(|c| c.membership_score)
    }
}
