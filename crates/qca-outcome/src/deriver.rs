//! The OutcomeDeriver

use crate::trace::{OutcomeCalculation, OutcomeDerivation};
use qca_audit::trail::event;
use qca_audit::AuditTrail;
use qca_calibrate::Calibrator;
use qca_domain::{CalibratedCase, CalibratedCondition, CalibrationMethod, OutcomeDefinition};
use qca_expr::Expr;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

enum Combination {
    Any,
    All,
    Expression(Result<Expr, String>),
}

impl Combination {
    fn parse(rule: &str) -> Self {
        match rule.trim() {
            "any" => Combination::Any,
            "all" => Combination::All,
            other => Combination::Expression(Expr::parse(other).map_err(|e| e.to_string())),
        }
    }
}

/// Derives outcome memberships for every calibrated case
pub struct OutcomeDeriver<'a> {
    outcomes: &'a [OutcomeDefinition],
}

impl<'a> OutcomeDeriver<'a> {
    /// Create a deriver over the configured outcomes
    pub fn new(outcomes: &'a [OutcomeDefinition]) -> Self {
        Self { outcomes }
    }

    /// Derive every outcome, appending to each case's outcomes list
    ///
    /// Returns one full derivation audit per outcome, in definition order.
    pub fn derive_all(
        &self,
        cases: &mut [CalibratedCase],
        audit: &mut AuditTrail,
    ) -> Vec<OutcomeCalculation> {
        let mut calculations = Vec::with_capacity(self.outcomes.len());
        for outcome in self.outcomes {
            let calculation = self.derive_outcome(outcome, cases);
            audit.record(
                event::OUTCOME_DERIVED,
                json!({
                    "outcome_id": outcome.outcome_id,
                    "combination_rule": outcome.combination_rule,
                    "calibration_method": outcome.calibration.method.as_str(),
                    "justification": outcome.calibration.theoretical_justification,
                    "cases": calculation.derivations.len(),
                    "errors": calculation.error_count(),
                    "traced": true,
                }),
            );
            info!(
                outcome = %outcome.outcome_id,
                cases = calculation.derivations.len(),
                errors = calculation.error_count(),
                "outcome derived"
            );
            calculations.push(calculation);
        }
        calculations
    }

    fn derive_outcome(
        &self,
        outcome: &OutcomeDefinition,
        cases: &mut [CalibratedCase],
    ) -> OutcomeCalculation {
        let combination = Combination::parse(&outcome.combination_rule);

        // Pass 1: raw combination per case. Re-calibration may need the full
        // raw distribution (percentile), so finals wait for pass 2.
        let mut partials: Vec<OutcomeDerivation> = cases
            .iter()
            .map(|case| combine_for_case(outcome, &combination, case))
            .collect();

        // Pass 2: re-calibrate unless the outcome itself is fuzzy, in which
        // case the raw combination already is the membership.
        if outcome.calibration.method == CalibrationMethod::Fuzzy {
            for d in &mut partials {
                d.final_result = d.raw_result;
            }
        } else {
            let raws: Vec<f64> = partials.iter().map(|d| d.raw_result).collect();
            let calibrator = Calibrator::new(&outcome.calibration, &raws);
            for d in &mut partials {
                d.final_result = calibrator.calibrate(d.raw_result);
            }
        }

        for (case, derivation) in cases.iter_mut().zip(&partials) {
            case.outcomes.push(CalibratedCondition::new(
                &outcome.outcome_id,
                derivation.raw_result,
                derivation.final_result,
                outcome.calibration.method,
            ));
            debug!(
                outcome = %outcome.outcome_id,
                case = %case.case_id,
                raw = derivation.raw_result,
                final_result = derivation.final_result,
                "case outcome derived"
            );
        }

        OutcomeCalculation {
            outcome_id: outcome.outcome_id.clone(),
            combination_rule: outcome.combination_rule.clone(),
            calibration_method: outcome.calibration.method,
            derivations: partials,
        }
    }
}

fn combine_for_case(
    outcome: &OutcomeDefinition,
    combination: &Combination,
    case: &CalibratedCase,
) -> OutcomeDerivation {
    let mut source_values = BTreeMap::new();
    let mut missing_conditions = Vec::new();
    for condition_id in &outcome.source_conditions {
        match case.condition_membership(condition_id) {
            Some(score) => {
                source_values.insert(condition_id.clone(), score);
            }
            None => {
                warn!(
                    outcome = %outcome.outcome_id,
                    case = %case.case_id,
                    condition = %condition_id,
                    "source condition missing, substituting 0.0"
                );
                missing_conditions.push(condition_id.clone());
                source_values.insert(condition_id.clone(), 0.0);
            }
        }
    }

    let shown: Vec<String> = outcome
        .source_conditions
        .iter()
        .map(|id| format!("{id}={:.4}", source_values.get(id).copied().unwrap_or(0.0)))
        .collect();
    let values: Vec<f64> = outcome
        .source_conditions
        .iter()
        .map(|id| source_values.get(id).copied().unwrap_or(0.0))
        .collect();

    let (raw, calculation, error) = match combination {
        Combination::Any => {
            let raw = values.iter().copied().fold(0.0_f64, f64::max);
            (raw, format!("any({}) = {raw:.4}", shown.join(", ")), None)
        }
        Combination::All => {
            let raw = values.iter().copied().fold(1.0_f64, f64::min);
            let raw = if values.is_empty() { 0.0 } else { raw };
            (raw, format!("all({}) = {raw:.4}", shown.join(", ")), None)
        }
        Combination::Expression(parsed) => match parsed {
            Ok(expr) => match expr.evaluate(&source_values) {
                Ok(value) => {
                    let raw = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
                    (
                        raw,
                        format!(
                            "{} with {} = {raw:.4}",
                            outcome.combination_rule,
                            shown.join(", ")
                        ),
                        None,
                    )
                }
                Err(e) => {
                    warn!(
                        outcome = %outcome.outcome_id,
                        case = %case.case_id,
                        "combination expression failed, falling back to 0.0: {e}"
                    );
                    (
                        0.0,
                        format!("{} failed, fell back to 0.0", outcome.combination_rule),
                        Some(e.to_string()),
                    )
                }
            },
            Err(e) => (
                0.0,
                format!("{} failed to parse, fell back to 0.0", outcome.combination_rule),
                Some(e.clone()),
            ),
        },
    };

    OutcomeDerivation {
        case_id: case.case_id.clone(),
        source_values,
        missing_conditions,
        calculation,
        raw_result: raw,
        final_result: raw,
        error,
    }
}
