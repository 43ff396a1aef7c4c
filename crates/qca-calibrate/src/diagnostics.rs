//! Per-condition calibration diagnostics

use qca_domain::{CalibrationMethod, NormalizationMethod};
use serde::{Deserialize, Serialize};

/// Min/max/mean/count over one value series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValueStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

impl ValueStats {
    /// Compute stats; an empty series yields all zeroes
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &v in values {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        Self {
            min,
            max,
            mean: sum / values.len() as f64,
            count: values.len(),
        }
    }
}

/// Cases sharing one distinct membership score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreGroup {
    /// The shared score (rounded to 3 decimals for grouping)
    pub score: f64,
    /// Member cases in input order
    pub case_ids: Vec<String>,
}

/// Diagnostics for one condition's calibration across all cases
///
/// The interesting bit for a methods reviewer is `creates_distinctions`: a
/// calibration that maps every case to the same score carries no information
/// and the configured thresholds should be revisited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationDiagnostics {
    pub condition_id: String,
    pub method: CalibrationMethod,
    pub normalization: NormalizationMethod,
    /// Stats over normalized raw values
    pub raw_value_stats: ValueStats,
    /// Stats over membership scores
    pub membership_stats: ValueStats,
    /// Cases grouped by distinct score, ascending by score
    pub score_groups: Vec<ScoreGroup>,
    /// True when calibration produced at least two distinct scores
    pub creates_distinctions: bool,
    /// True for interactive calibration awaiting researcher validation
    pub pending_validation: bool,
}

impl CalibrationDiagnostics {
    /// Build diagnostics from aligned (case_id, raw, score) series
    pub fn build(
        condition_id: &str,
        method: CalibrationMethod,
        normalization: NormalizationMethod,
        case_ids: &[String],
        raw_values: &[f64],
        scores: &[f64],
        pending_validation: bool,
    ) -> Self {
        // Grouping keys are rounded the same way truth-table keys are, so a
        // score split by floating noise does not fake a distinction.
        let mut groups: Vec<(i64, ScoreGroup)> = Vec::new();
        for (case_id, &score) in case_ids.iter().zip(scores) {
            let key = (score * 1000.0).round() as i64;
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, group)) => group.case_ids.push(case_id.clone()),
                None => groups.push((
                    key,
                    ScoreGroup {
                        score: key as f64 / 1000.0,
                        case_ids: vec![case_id.clone()],
                    },
                )),
            }
        }
        groups.sort_by_key(|(k, _)| *k);
        let score_groups: Vec<ScoreGroup> = groups.into_iter().map(|(_, g)| g).collect();

        Self {
            condition_id: condition_id.to_string(),
            method,
            normalization,
            raw_value_stats: ValueStats::from_values(raw_values),
            membership_stats: ValueStats::from_values(scores),
            creates_distinctions: score_groups.len() >= 2,
            score_groups,
            pending_validation,
        }
    }
}
