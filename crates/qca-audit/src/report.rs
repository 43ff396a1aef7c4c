//! Compliance report derived from the audit trail

use crate::trail::{event, AuditTrail};
use serde::{Deserialize, Serialize};

/// The `methodology_validation_report.json` artifact
///
/// Each boolean is derived from recorded events, so the report cannot claim
/// compliance for work that never happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodologyReport {
    /// Run the report was derived from
    pub run_id: String,
    /// Every calibrated condition carried a non-empty justification
    pub theoretical_justification_provided: bool,
    /// Every condition's calibration produced at least two distinct scores
    pub thresholds_create_distinctions: bool,
    /// At least one fuzzy-mode truth table was built
    pub fuzzy_information_preserved: bool,
    /// Every derived outcome recorded a per-case calculation trace
    pub outcome_derivations_traced: bool,
    /// At least one condition was normalized before calibration
    pub normalization_applied: bool,
    /// Conditions calibrated
    pub conditions_calibrated: usize,
    /// Outcomes derived
    pub outcomes_derived: usize,
    /// Truth tables built
    pub truth_tables_built: usize,
    /// Non-fatal anomalies defaulted away during the run
    pub warnings: usize,
}

impl MethodologyReport {
    /// Derive the report from a trail
    pub fn from_trail(trail: &AuditTrail) -> Self {
        let calibrated: Vec<_> = trail.events_of_type(event::CONDITION_CALIBRATED).collect();
        let outcomes: Vec<_> = trail.events_of_type(event::OUTCOME_DERIVED).collect();
        let tables: Vec<_> = trail.events_of_type(event::TRUTH_TABLE_BUILT).collect();

        let theoretical_justification_provided = !calibrated.is_empty()
            && calibrated.iter().all(|e| {
                e.details["justification"]
                    .as_str()
                    .map(|s| !s.trim().is_empty())
                    .unwrap_or(false)
            });
        let thresholds_create_distinctions = !calibrated.is_empty()
            && calibrated
                .iter()
                .all(|e| e.details["creates_distinctions"].as_bool().unwrap_or(false));
        let fuzzy_information_preserved = tables
            .iter()
            .any(|e| e.details["mode"].as_str() == Some("fuzzy"));
        let outcome_derivations_traced = !outcomes.is_empty()
            && outcomes
                .iter()
                .all(|e| e.details["traced"].as_bool().unwrap_or(false));
        let normalization_applied = calibrated
            .iter()
            .any(|e| e.details["normalization"].as_str().is_some_and(|n| n != "none"));

        Self {
            run_id: trail.run_id().to_string(),
            theoretical_justification_provided,
            thresholds_create_distinctions,
            fuzzy_information_preserved,
            outcome_derivations_traced,
            normalization_applied,
            conditions_calibrated: calibrated.len(),
            outcomes_derived: outcomes.len(),
            truth_tables_built: tables.len(),
            warnings: trail.events_of_type(event::WARNING).count(),
        }
    }

    /// Render the `methodology_summary.md` artifact
    pub fn summary_markdown(&self, trail: &AuditTrail) -> String {
        let mut out = String::new();
        out.push_str("# Methodology Summary\n\n");
        out.push_str(&format!("Run: `{}`\n\n", self.run_id));

        out.push_str("## Compliance\n\n");
        for (name, value) in [
            (
                "Theoretical justification provided",
                self.theoretical_justification_provided,
            ),
            (
                "Thresholds create distinctions",
                self.thresholds_create_distinctions,
            ),
            ("Fuzzy information preserved", self.fuzzy_information_preserved),
            ("Outcome derivations traced", self.outcome_derivations_traced),
            ("Normalization applied", self.normalization_applied),
        ] {
            out.push_str(&format!("- {}: **{}**\n", name, if value { "yes" } else { "no" }));
        }

        out.push_str("\n## Calibration decisions\n\n");
        for e in trail.events_of_type(event::CONDITION_CALIBRATED) {
            let id = e.details["condition_id"].as_str().unwrap_or("?");
            let method = e.details["method"].as_str().unwrap_or("?");
            let norm = e.details["normalization"].as_str().unwrap_or("none");
            let just = e.details["justification"].as_str().unwrap_or("");
            out.push_str(&format!(
                "- `{id}` — method `{method}`, normalization `{norm}`: {just}\n"
            ));
            if e.details["pending_validation"].as_bool() == Some(true) {
                out.push_str("  - pending researcher validation\n");
            }
        }

        out.push_str("\n## Outcomes\n\n");
        for e in trail.events_of_type(event::OUTCOME_DERIVED) {
            let id = e.details["outcome_id"].as_str().unwrap_or("?");
            let rule = e.details["combination_rule"].as_str().unwrap_or("?");
            out.push_str(&format!("- `{id}` — combination `{rule}`\n"));
        }

        out.push_str("\n## Truth tables\n\n");
        for e in trail.events_of_type(event::TRUTH_TABLE_BUILT) {
            let id = e.details["outcome_id"].as_str().unwrap_or("?");
            let mode = e.details["mode"].as_str().unwrap_or("?");
            let found = e.details["configurations_found"].as_u64().unwrap_or(0);
            let remainders = e.details["logical_remainders"].as_u64().unwrap_or(0);
            out.push_str(&format!(
                "- `{id}` ({mode}): {found} configurations, {remainders} logical remainders\n"
            ));
        }

        if self.warnings > 0 {
            out.push_str(&format!("\n## Warnings\n\n{} non-fatal anomalies were defaulted; see complete_audit_log.json.\n", self.warnings));
        }

        out
    }
}
