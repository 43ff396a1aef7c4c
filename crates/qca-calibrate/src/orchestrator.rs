//! Runs calibration across all conditions and assembles calibrated cases

use crate::calibrator::Calibrator;
use crate::diagnostics::CalibrationDiagnostics;
use crate::normalize::normalize;
use qca_audit::trail::event;
use qca_audit::AuditTrail;
use qca_domain::{
    CalibratedCase, CalibratedCondition, Case, ConditionDefinition, Provenance, SourceType,
};
use serde_json::json;
use tracing::{debug, info, warn};

/// Output of a full calibration pass
#[derive(Debug, Clone)]
pub struct CalibrationRun {
    /// One calibrated case per input case, in input order
    pub calibrated_cases: Vec<CalibratedCase>,
    /// One diagnostics record per condition, in configuration order
    pub diagnostics: Vec<CalibrationDiagnostics>,
}

/// Applies normalization and calibration per condition across all cases
///
/// Deterministic by construction: cases are processed in input order and
/// conditions in configuration order, so identical inputs and configuration
/// yield byte-identical artifacts downstream.
pub struct CaseCalibrationOrchestrator<'a> {
    conditions: &'a [ConditionDefinition],
}

impl<'a> CaseCalibrationOrchestrator<'a> {
    /// Create an orchestrator over the configured conditions
    pub fn new(conditions: &'a [ConditionDefinition]) -> Self {
        Self { conditions }
    }

    /// Normalized raw value per case for one condition, aligned to case order
    pub fn extract_raw_values(&self, condition: &ConditionDefinition, cases: &[Case]) -> Vec<f64> {
        if condition.source_type == SourceType::Unknown {
            warn!(
                condition = %condition.id,
                "unknown source_type, raw values default to 0.0"
            );
        }
        cases
            .iter()
            .map(|case| {
                let raw = case.raw_value(condition.source_type, &condition.source_id);
                normalize(raw, condition.calibration.normalization, &case.metadata)
            })
            .collect()
    }

    /// Calibrate one condition across all cases
    ///
    /// Returns per-case calibrated conditions aligned to case order, plus
    /// the diagnostics record for the condition.
    pub fn calibrate_condition(
        &self,
        condition: &ConditionDefinition,
        cases: &[Case],
    ) -> (Vec<CalibratedCondition>, CalibrationDiagnostics) {
        let raw_values = self.extract_raw_values(condition, cases);
        let calibrator = Calibrator::new(&condition.calibration, &raw_values);

        let scores: Vec<f64> = raw_values.iter().map(|&raw| calibrator.calibrate(raw)).collect();
        let entries: Vec<CalibratedCondition> = raw_values
            .iter()
            .zip(&scores)
            .map(|(&raw, &score)| {
                CalibratedCondition::new(&condition.id, raw, score, condition.calibration.method)
            })
            .collect();

        let case_ids: Vec<String> = cases.iter().map(|c| c.case_id.clone()).collect();
        let diagnostics = CalibrationDiagnostics::build(
            &condition.id,
            condition.calibration.method,
            condition.calibration.normalization,
            &case_ids,
            &raw_values,
            &scores,
            calibrator.pending_validation(),
        );
        if !diagnostics.creates_distinctions {
            warn!(
                condition = %condition.id,
                "calibration produced a single distinct score across all cases"
            );
        }
        debug!(
            condition = %condition.id,
            cases = cases.len(),
            groups = diagnostics.score_groups.len(),
            "condition calibrated"
        );

        (entries, diagnostics)
    }

    /// Calibrate every condition and assemble one CalibratedCase per case
    ///
    /// Every case gets an entry for every condition (extraction always
    /// yields a value, 0.0 when nothing matches), so condition lists are
    /// complete and ordered by configuration order.
    pub fn calibrate_all_conditions(&self, cases: &[Case], audit: &mut AuditTrail) -> CalibrationRun {
        audit.record(
            event::CALIBRATION_STARTED,
            json!({
                "conditions": self.conditions.iter().map(|c| c.id.clone()).collect::<Vec<_>>(),
                "cases": cases.len(),
            }),
        );
        info!(
            conditions = self.conditions.len(),
            cases = cases.len(),
            "calibration started"
        );

        let mut per_condition: Vec<Vec<CalibratedCondition>> = Vec::with_capacity(self.conditions.len());
        let mut diagnostics = Vec::with_capacity(self.conditions.len());
        for condition in self.conditions {
            let (entries, diag) = self.calibrate_condition(condition, cases);
            audit.record(
                event::CONDITION_CALIBRATED,
                json!({
                    "condition_id": condition.id,
                    "method": condition.calibration.method.as_str(),
                    "normalization": condition.calibration.normalization.as_str(),
                    "justification": condition.calibration.theoretical_justification,
                    "creates_distinctions": diag.creates_distinctions,
                    "pending_validation": diag.pending_validation,
                    "cases": entries.len(),
                }),
            );
            per_condition.push(entries);
            diagnostics.push(diag);
        }

        let calibrated_cases: Vec<CalibratedCase> = cases
            .iter()
            .enumerate()
            .map(|(idx, case)| CalibratedCase {
                case_id: case.case_id.clone(),
                conditions: per_condition.iter().map(|entries| entries[idx].clone()).collect(),
                outcomes: Vec::new(),
                provenance: Provenance {
                    source_file: case.source_file.clone(),
                    total_quotes: case.metadata.quote_count,
                    total_codes: case.total_codes(),
                },
            })
            .collect();

        audit.record(
            event::CALIBRATION_COMPLETED,
            json!({"calibrated_cases": calibrated_cases.len()}),
        );
        info!(cases = calibrated_cases.len(), "calibration completed");

        CalibrationRun {
            calibrated_cases,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qca_domain::{CalibrationMethod, CalibrationRule, CaseMetadata, NormalizationMethod};
    use std::collections::BTreeMap;

    fn condition(id: &str, source_id: &str, method: CalibrationMethod) -> ConditionDefinition {
        ConditionDefinition {
            id: id.to_string(),
            name: id.to_string(),
            source_type: SourceType::Code,
            source_id: source_id.to_string(),
            calibration: CalibrationRule::new(method, "test"),
        }
    }

    fn case(id: &str, codes: &[&str]) -> Case {
        Case {
            case_id: id.to_string(),
            codes: codes.iter().map(|s| s.to_string()).collect(),
            entities: vec![],
            relationships: vec![],
            speaker_properties: BTreeMap::new(),
            metadata: CaseMetadata::default(),
            source_file: format!("{id}.json"),
        }
    }

    #[test]
    fn test_extract_raw_values_counts_codes() {
        let cond = condition("trust", "trust", CalibrationMethod::Binary);
        let cases = vec![case("a", &["trust", "trust"]), case("b", &["risk"])];
        let orch = CaseCalibrationOrchestrator::new(std::slice::from_ref(&cond));
        assert_eq!(orch.extract_raw_values(&cond, &cases), vec![2.0, 0.0]);
    }

    #[test]
    fn test_extract_applies_normalization() {
        let mut cond = condition("trust", "trust", CalibrationMethod::Binary);
        cond.calibration.normalization = NormalizationMethod::PerSpeaker;
        let mut c = case("a", &["trust", "trust", "trust", "trust"]);
        c.metadata.speaker_count = 2;
        let orch = CaseCalibrationOrchestrator::new(std::slice::from_ref(&cond));
        assert_eq!(orch.extract_raw_values(&cond, &[c]), vec![2.0]);
    }

    #[test]
    fn test_calibrate_all_assembles_complete_cases() {
        let conds = vec![
            condition("trust", "trust", CalibrationMethod::Binary),
            condition("risk", "risk", CalibrationMethod::Binary),
        ];
        let cases = vec![case("a", &["trust"]), case("b", &["risk", "risk"])];
        let orch = CaseCalibrationOrchestrator::new(&conds);
        let mut audit = AuditTrail::new();
        let run = orch.calibrate_all_conditions(&cases, &mut audit);

        assert_eq!(run.calibrated_cases.len(), 2);
        // Every case carries every condition, in configuration order.
        for cc in &run.calibrated_cases {
            assert_eq!(cc.conditions.len(), 2);
            assert_eq!(cc.conditions[0].condition_id, "trust");
            assert_eq!(cc.conditions[1].condition_id, "risk");
        }
        assert_eq!(run.calibrated_cases[0].condition_membership("trust"), Some(1.0));
        assert_eq!(run.calibrated_cases[0].condition_membership("risk"), Some(0.0));
        assert_eq!(run.calibrated_cases[1].condition_membership("risk"), Some(1.0));
        assert_eq!(run.diagnostics.len(), 2);
    }

    #[test]
    fn test_membership_invariant_holds() {
        let mut cond = condition("weird", "trust", CalibrationMethod::Fuzzy);
        cond.calibration.function = Some("count * 100".to_string());
        let cases = vec![case("a", &["trust", "trust"])];
        let orch = CaseCalibrationOrchestrator::new(std::slice::from_ref(&cond));
        let mut audit = AuditTrail::new();
        let run = orch.calibrate_all_conditions(&cases, &mut audit);
        for cc in &run.calibrated_cases {
            for c in &cc.conditions {
                assert!((0.0..=1.0).contains(&c.membership_score));
            }
        }
    }

    #[test]
    fn test_audit_events_recorded() {
        let conds = vec![condition("trust", "trust", CalibrationMethod::Binary)];
        let cases = vec![case("a", &["trust"])];
        let orch = CaseCalibrationOrchestrator::new(&conds);
        let mut audit = AuditTrail::new();
        orch.calibrate_all_conditions(&cases, &mut audit);

        assert_eq!(audit.events_of_type(event::CALIBRATION_STARTED).count(), 1);
        let calibrated: Vec<_> = audit.events_of_type(event::CONDITION_CALIBRATED).collect();
        assert_eq!(calibrated.len(), 1);
        assert_eq!(calibrated[0].details["justification"], "test");
        assert_eq!(audit.events_of_type(event::CALIBRATION_COMPLETED).count(), 1);
    }

    #[test]
    fn test_provenance_carried() {
        let conds = vec![condition("trust", "trust", CalibrationMethod::Binary)];
        let mut c = case("a", &["trust", "risk"]);
        c.metadata.quote_count = 12;
        let orch = CaseCalibrationOrchestrator::new(&conds);
        let mut audit = AuditTrail::new();
        let run = orch.calibrate_all_conditions(&[c], &mut audit);
        let prov = &run.calibrated_cases[0].provenance;
        assert_eq!(prov.source_file, "a.json");
        assert_eq!(prov.total_quotes, 12);
        assert_eq!(prov.total_codes, 2);
    }

    #[test]
    fn test_empty_case_set() {
        let conds = vec![condition("trust", "trust", CalibrationMethod::Percentile)];
        let orch = CaseCalibrationOrchestrator::new(&conds);
        let mut audit = AuditTrail::new();
        let run = orch.calibrate_all_conditions(&[], &mut audit);
        assert!(run.calibrated_cases.is_empty());
        assert_eq!(run.diagnostics.len(), 1);
        assert_eq!(run.diagnostics[0].raw_value_stats.count, 0);
    }
}
