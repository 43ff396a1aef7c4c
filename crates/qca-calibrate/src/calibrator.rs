//! One calibration strategy per method family

use qca_domain::{CalibrationMethod, CalibrationRule};
use qca_expr::Expr;
use std::collections::BTreeMap;
use tracing::warn;

/// Maps normalized raw values to membership scores for one condition
///
/// Built once per condition so distribution-dependent methods (percentile,
/// interactive) can precompute their breakpoints over the full value set,
/// and fuzzy expressions parse once instead of per case.
pub struct Calibrator {
    method: CalibrationMethod,
    threshold: f64,
    breakpoints: (f64, f64),
    scores: qca_domain::FrequencyScores,
    direct: qca_domain::DirectAnchors,
    anchors: qca_domain::AnchorSet,
    percentile_breaks: (f64, f64),
    fuzzy_expr: Option<Expr>,
}

impl Calibrator {
    /// Build a calibrator for one condition
    ///
    /// `all_values` must hold the normalized raw values of every case for
    /// this condition; only the percentile family reads it.
    pub fn new(rule: &CalibrationRule, all_values: &[f64]) -> Self {
        let breakpoints = match rule.breakpoints.as_deref() {
            Some([b1, b2, ..]) => (*b1, *b2),
            _ => (1.0, 3.0),
        };
        let bands = rule.percentiles.unwrap_or_default();
        let percentile_breaks = (
            percentile(all_values, bands.lower),
            percentile(all_values, bands.upper),
        );
        let fuzzy_expr = match (rule.method, rule.function.as_deref()) {
            (CalibrationMethod::Fuzzy, Some(source)) => match Expr::parse(source) {
                Ok(expr) => Some(expr),
                Err(e) => {
                    warn!("fuzzy function failed to parse, all scores fall back to 0.0: {e}");
                    None
                }
            },
            _ => None,
        };
        Self {
            method: rule.method,
            threshold: rule.threshold.unwrap_or(1.0),
            breakpoints,
            scores: rule.scores.unwrap_or_default(),
            direct: rule.direct.unwrap_or_default(),
            anchors: rule.anchors.unwrap_or_default(),
            percentile_breaks,
            fuzzy_expr,
        }
    }

    /// Membership score for one normalized raw value, always in [0, 1]
    pub fn calibrate(&self, raw: f64) -> f64 {
        let score = match self.method {
            CalibrationMethod::Binary => self.binary(raw),
            CalibrationMethod::Frequency => self.frequency(raw),
            CalibrationMethod::Fuzzy => self.fuzzy(raw),
            CalibrationMethod::Percentile | CalibrationMethod::Interactive => {
                self.percentile_bands(raw)
            }
            CalibrationMethod::Direct => self.direct(raw),
            CalibrationMethod::AnchorPoints => self.anchor_points(raw),
        };
        if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// True when the scores still await researcher validation
    ///
    /// Interactive calibration permanently falls back to the percentile
    /// strategy; the tag travels with diagnostics and audit events.
    pub fn pending_validation(&self) -> bool {
        self.method == CalibrationMethod::Interactive
    }

    fn binary(&self, raw: f64) -> f64 {
        if raw >= self.threshold {
            1.0
        } else {
            0.0
        }
    }

    fn frequency(&self, raw: f64) -> f64 {
        let (b1, b2) = self.breakpoints;
        if raw == 0.0 {
            0.0
        } else if raw < b1 {
            self.scores.rare
        } else if raw < b2 {
            self.scores.moderate
        } else {
            self.scores.frequent
        }
    }

    fn fuzzy(&self, raw: f64) -> f64 {
        let Some(expr) = &self.fuzzy_expr else {
            return 0.0;
        };
        let scope = BTreeMap::from([("count".to_string(), raw)]);
        match expr.evaluate(&scope) {
            Ok(value) => value,
            Err(e) => {
                warn!("fuzzy function failed for count={raw}, falling back to 0.0: {e}");
                0.0
            }
        }
    }

    fn percentile_bands(&self, raw: f64) -> f64 {
        let (p1, p2) = self.percentile_breaks;
        if raw <= p1 {
            0.2
        } else if raw <= p2 {
            0.5
        } else {
            0.8
        }
    }

    fn direct(&self, raw: f64) -> f64 {
        if raw > 1.0 {
            self.direct.full_membership
        } else if raw == 1.0 {
            self.direct.crossover
        } else {
            self.direct.non_membership
        }
    }

    fn anchor_points(&self, raw: f64) -> f64 {
        let a = &self.anchors;
        if raw <= a.non_member {
            0.0
        } else if raw <= a.crossover {
            let span = a.crossover - a.non_member;
            if span <= 0.0 {
                // Coincident anchors: the segment degenerates to a step.
                0.5
            } else {
                (raw - a.non_member) / span * 0.5
            }
        } else if raw <= a.full_member {
            let span = a.full_member - a.crossover;
            if span <= 0.0 {
                1.0
            } else {
                0.5 + (raw - a.crossover) / span * 0.5
            }
        } else {
            1.0
        }
    }
}

/// Percentile over unsorted values, linear interpolation between order
/// statistics; 0.0 for an empty set
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let p = p.clamp(0.0, 100.0);
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let weight = rank - lo as f64;
        sorted[lo] * (1.0 - weight) + sorted[hi] * weight
    }
}
