//! The phase orchestrator

use crate::artifacts::{
    calibration_matrix_csv, read_json, truth_table_csv, write_json, TableSummary,
    TruthTablesSummary,
};
use crate::config::{PipelineConfig, TruthTableMode};
use crate::error::{PipelineError, Result};
use crate::loader::load_cases;
use qca_audit::trail::event;
use qca_audit::{AuditTrail, MethodologyReport};
use qca_calibrate::CaseCalibrationOrchestrator;
use qca_domain::CalibratedCase;
use qca_outcome::OutcomeDeriver;
use qca_table::TruthTableBuilder;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

/// The `qca_analysis_results.json` artifact: one run at a glance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub run_id: String,
    pub total_cases: usize,
    pub conditions: Vec<String>,
    pub outcomes: Vec<String>,
    pub truth_table_mode: TruthTableMode,
    pub phases: crate::config::PhaseToggles,
    pub truth_tables: Vec<TableSummary>,
    pub warnings: usize,
}

/// The `methodology_compliance_report.json` artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub run_id: String,
    /// True when every methodology check passed
    pub compliant: bool,
    /// Names of failed checks, empty when compliant
    pub failed_checks: Vec<String>,
    pub report: MethodologyReport,
}

impl ComplianceReport {
    fn from_report(report: MethodologyReport) -> Self {
        let mut failed_checks = Vec::new();
        for (name, ok) in [
            ("theoretical_justification_provided", report.theoretical_justification_provided),
            ("thresholds_create_distinctions", report.thresholds_create_distinctions),
            ("fuzzy_information_preserved", report.fuzzy_information_preserved),
            ("outcome_derivations_traced", report.outcome_derivations_traced),
        ] {
            if !ok {
                failed_checks.push(name.to_string());
            }
        }
        Self {
            run_id: report.run_id.clone(),
            compliant: failed_checks.is_empty(),
            failed_checks,
            report,
        }
    }
}

/// Runs the full calibration → derivation → truth-table pipeline
///
/// Single-threaded and synchronous; each phase consumes the materialized
/// output of the previous one. Fails fast at construction if the
/// configuration is invalid.
#[derive(Debug)]
pub struct QcaPipeline {
    config: PipelineConfig,
}

impl QcaPipeline {
    /// Validate the configuration and create a runnable pipeline
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Execute all enabled phases and write every artifact
    pub fn run(&self) -> Result<AnalysisResults> {
        let config = &self.config;
        let mut audit = AuditTrail::new();
        audit.record(
            event::RUN_STARTED,
            json!({
                "input_dir": config.input_dir.display().to_string(),
                "conditions": config.condition_ids(),
                "outcomes": config.outcomes.iter().map(|o| o.outcome_id.clone()).collect::<Vec<_>>(),
                "truth_table_mode": config.truth_table_mode,
                "minimum_membership_threshold": config.minimum_membership_threshold,
            }),
        );
        std::fs::create_dir_all(&config.output_dir)?;

        let cases = load_cases(&config.input_dir, &config.case_id_field, &mut audit)?;

        // Phase 1: calibration (or resume from a previous run's artifact).
        let mut calibrated_cases: Vec<CalibratedCase>;
        if config.phases.run_calibration {
            let orchestrator = CaseCalibrationOrchestrator::new(&config.conditions);
            let run = orchestrator.calibrate_all_conditions(&cases, &mut audit);
            write_json(
                &config.output_dir.join("calibration_diagnostics.json"),
                &run.diagnostics,
            )?;
            std::fs::write(
                config.output_dir.join("calibration_matrix.csv"),
                calibration_matrix_csv(&run.calibrated_cases, &config.condition_ids()),
            )?;
            calibrated_cases = run.calibrated_cases;
        } else {
            let path = config.output_dir.join("calibrated_cases.json");
            if !path.is_file() {
                return Err(PipelineError::MissingArtifact(format!(
                    "{} (run_calibration is disabled and no previous run left one)",
                    path.display()
                )));
            }
            info!(path = %path.display(), "calibration disabled, consuming previous artifact");
            calibrated_cases = read_json(&path)?;
        }

        // Phase 2: outcome derivation, appending to each case's outcomes.
        let mut outcome_calculations = Vec::new();
        if config.phases.run_outcome_derivation {
            for case in &mut calibrated_cases {
                case.outcomes.clear();
            }
            let deriver = OutcomeDeriver::new(&config.outcomes);
            outcome_calculations = deriver.derive_all(&mut calibrated_cases, &mut audit);
            for calculation in &outcome_calculations {
                write_json(
                    &config
                        .output_dir
                        .join(format!("outcome_calculation_{}.json", calculation.outcome_id)),
                    calculation,
                )?;
            }
        }
        // The calibrated-case artifact includes derived outcomes, so it is
        // written after derivation has (possibly) run.
        write_json(
            &config.output_dir.join("calibrated_cases.json"),
            &calibrated_cases,
        )?;

        // Phase 3: truth tables per outcome × mode.
        let mut table_summaries = Vec::new();
        if config.phases.run_truth_tables {
            let builder = TruthTableBuilder::new(
                config.condition_ids(),
                config.minimum_membership_threshold,
            );
            for outcome in &config.outcomes {
                for mode in config.truth_table_mode.table_modes() {
                    let table =
                        builder.build(&calibrated_cases, &outcome.outcome_id, mode, &mut audit);
                    let stem = format!("truth_table_{}_{}", outcome.outcome_id, mode.as_str());
                    write_json(&config.output_dir.join(format!("{stem}.json")), &table)?;
                    std::fs::write(
                        config.output_dir.join(format!("{stem}.csv")),
                        truth_table_csv(&table),
                    )?;
                    table_summaries.push(TableSummary::of(&table));
                }
            }
            write_json(
                &config.output_dir.join("truth_tables_summary.json"),
                &TruthTablesSummary {
                    tables: table_summaries.clone(),
                },
            )?;
        }

        // Audit flush: reports first, then the complete log so it carries
        // the run_completed event.
        let report = MethodologyReport::from_trail(&audit);
        write_json(
            &config.output_dir.join("methodology_validation_report.json"),
            &report,
        )?;
        let compliance = ComplianceReport::from_report(report.clone());
        write_json(
            &config.output_dir.join("methodology_compliance_report.json"),
            &compliance,
        )?;
        std::fs::write(
            config.output_dir.join("methodology_summary.md"),
            report.summary_markdown(&audit),
        )?;

        let results = AnalysisResults {
            run_id: audit.run_id().to_string(),
            total_cases: calibrated_cases.len(),
            conditions: config.condition_ids(),
            outcomes: config.outcomes.iter().map(|o| o.outcome_id.clone()).collect(),
            truth_table_mode: config.truth_table_mode,
            phases: config.phases,
            truth_tables: table_summaries,
            warnings: report.warnings,
        };
        write_json(&config.output_dir.join("qca_analysis_results.json"), &results)?;

        audit.record(
            event::RUN_COMPLETED,
            json!({
                "cases": results.total_cases,
                "truth_tables": results.truth_tables.len(),
                "outcome_calculations": outcome_calculations.len(),
            }),
        );
        write_json(
            &config.output_dir.join("complete_audit_log.json"),
            &audit.complete_log(),
        )?;

        info!(
            run_id = %results.run_id,
            cases = results.total_cases,
            tables = results.truth_tables.len(),
            "analysis run completed"
        );
        Ok(results)
    }
}
