//! End-to-end pipeline tests
//!
//! These run the full calibration → derivation → truth-table pipeline over
//! real files in temporary directories and check the artifact contract.

use qca_domain::{
    CalibrationMethod, CalibrationRule, ConditionDefinition, OutcomeDefinition, SourceType,
    TruthTable,
};
use qca_pipeline::{PhaseToggles, PipelineConfig, PipelineError, QcaPipeline, TruthTableMode};
use std::fs;
use std::path::{Path, PathBuf};

fn condition(id: &str, method: CalibrationMethod) -> ConditionDefinition {
    ConditionDefinition {
        id: id.to_string(),
        name: id.to_string(),
        source_type: SourceType::Code,
        source_id: id.to_string(),
        calibration: CalibrationRule::new(method, "test justification"),
    }
}

fn outcome(id: &str, sources: &[&str], rule: &str) -> OutcomeDefinition {
    OutcomeDefinition {
        outcome_id: id.to_string(),
        source_conditions: sources.iter().map(|s| s.to_string()).collect(),
        combination_rule: rule.to_string(),
        calibration: CalibrationRule::new(CalibrationMethod::Fuzzy, "keep raw combination"),
    }
}

fn write_case(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn config(input_dir: PathBuf, output_dir: PathBuf) -> PipelineConfig {
    PipelineConfig {
        input_dir,
        output_dir,
        case_id_field: "case_id".to_string(),
        minimum_membership_threshold: 0.5,
        truth_table_mode: TruthTableMode::Dual,
        phases: PhaseToggles::default(),
        conditions: vec![
            condition("trust", CalibrationMethod::Binary),
            condition("risk", CalibrationMethod::Binary),
        ],
        outcomes: vec![outcome("adoption", &["trust", "risk"], "any")],
    }
}

fn seed_cases(input: &Path) {
    write_case(
        input,
        "case_01.json",
        r#"{"case_id": "case_01", "codes": ["trust", "trust"], "word_count": 4000}"#,
    );
    write_case(
        input,
        "case_02.json",
        r#"{"case_id": "case_02", "codes": [{"code_id": "risk"}], "word_count": 3000}"#,
    );
    write_case(
        input,
        "case_03.json",
        r#"{"case_id": "case_03", "codes": [], "word_count": 2000}"#,
    );
}

#[test]
fn test_full_run_writes_artifact_contract() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    seed_cases(input.path());

    let pipeline = QcaPipeline::new(config(
        input.path().to_path_buf(),
        output.path().to_path_buf(),
    ))
    .unwrap();
    let results = pipeline.run().unwrap();

    assert_eq!(results.total_cases, 3);
    // Dual mode: one outcome × two modes.
    assert_eq!(results.truth_tables.len(), 2);

    for artifact in [
        "calibrated_cases.json",
        "calibration_matrix.csv",
        "calibration_diagnostics.json",
        "outcome_calculation_adoption.json",
        "truth_table_adoption_crisp.json",
        "truth_table_adoption_crisp.csv",
        "truth_table_adoption_fuzzy.json",
        "truth_table_adoption_fuzzy.csv",
        "truth_tables_summary.json",
        "complete_audit_log.json",
        "methodology_validation_report.json",
        "methodology_compliance_report.json",
        "methodology_summary.md",
        "qca_analysis_results.json",
    ] {
        assert!(
            output.path().join(artifact).is_file(),
            "missing artifact {artifact}"
        );
    }
}

#[test]
fn test_calibration_is_deterministic() {
    let input = tempfile::tempdir().unwrap();
    seed_cases(input.path());

    let output_a = tempfile::tempdir().unwrap();
    let output_b = tempfile::tempdir().unwrap();
    QcaPipeline::new(config(input.path().to_path_buf(), output_a.path().to_path_buf()))
        .unwrap()
        .run()
        .unwrap();
    QcaPipeline::new(config(input.path().to_path_buf(), output_b.path().to_path_buf()))
        .unwrap()
        .run()
        .unwrap();

    for artifact in [
        "calibrated_cases.json",
        "calibration_matrix.csv",
        "truth_table_adoption_crisp.json",
        "truth_table_adoption_fuzzy.json",
        "truth_tables_summary.json",
    ] {
        let a = fs::read(output_a.path().join(artifact)).unwrap();
        let b = fs::read(output_b.path().join(artifact)).unwrap();
        assert_eq!(a, b, "artifact {artifact} differs between identical runs");
    }
}

#[test]
fn test_crisp_merges_fuzzy_splits() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    // Two cases that discretize identically but differ in exact membership.
    write_case(
        input.path(),
        "a.json",
        r#"{"case_id": "a", "codes": ["trust", "trust", "trust", "trust", "trust", "trust", "trust", "trust", "trust", "trust"]}"#,
    );
    write_case(
        input.path(),
        "b.json",
        r#"{"case_id": "b", "codes": ["trust", "trust", "trust", "trust", "trust", "trust", "trust", "trust"]}"#,
    );

    let mut cfg = config(input.path().to_path_buf(), output.path().to_path_buf());
    cfg.conditions = vec![{
        let mut c = condition("trust", CalibrationMethod::Fuzzy);
        c.calibration.function = Some("min(count / 10, 1)".to_string());
        c
    }];
    cfg.outcomes = vec![outcome("adoption", &["trust"], "any")];
    QcaPipeline::new(cfg).unwrap().run().unwrap();

    let crisp: TruthTable = serde_json::from_str(
        &fs::read_to_string(output.path().join("truth_table_adoption_crisp.json")).unwrap(),
    )
    .unwrap();
    let fuzzy: TruthTable = serde_json::from_str(
        &fs::read_to_string(output.path().join("truth_table_adoption_fuzzy.json")).unwrap(),
    )
    .unwrap();

    // 1.0 and 0.8 both clear the 0.5 threshold: one crisp row, two fuzzy rows.
    assert_eq!(crisp.configurations_found, 1);
    assert_eq!(crisp.rows[0].case_ids.len(), 2);
    assert_eq!(fuzzy.configurations_found, 2);
}

#[test]
fn test_truth_table_reload_reproduces_mapping() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    seed_cases(input.path());
    QcaPipeline::new(config(input.path().to_path_buf(), output.path().to_path_buf()))
        .unwrap()
        .run()
        .unwrap();

    let text = fs::read_to_string(output.path().join("truth_table_adoption_fuzzy.json")).unwrap();
    let table: TruthTable = serde_json::from_str(&text).unwrap();
    let reserialized = serde_json::to_string(&table).unwrap();
    let reloaded: TruthTable = serde_json::from_str(&reserialized).unwrap();
    assert_eq!(reloaded, table);

    // Rows disjointly partition the case set.
    let mut seen: Vec<String> = table
        .rows
        .iter()
        .flat_map(|r| r.case_ids.iter().cloned())
        .collect();
    let total = seen.len();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), total);
    assert_eq!(total, table.total_cases);
}

#[test]
fn test_empty_input_dir_yields_empty_tables() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let results = QcaPipeline::new(config(
        input.path().to_path_buf(),
        output.path().to_path_buf(),
    ))
    .unwrap()
    .run()
    .unwrap();

    assert_eq!(results.total_cases, 0);
    let table: TruthTable = serde_json::from_str(
        &fs::read_to_string(output.path().join("truth_table_adoption_crisp.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(table.configurations_found, 0);
    assert!(table.rows.is_empty());
}

#[test]
fn test_invalid_config_fails_before_any_work() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let mut cfg = config(input.path().to_path_buf(), output.path().to_path_buf());
    cfg.conditions[0].calibration.theoretical_justification = " ".to_string();

    let err = QcaPipeline::new(cfg).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
    // Nothing was written.
    assert!(fs::read_dir(output.path()).unwrap().next().is_none());
}

#[test]
fn test_skipped_calibration_requires_previous_artifact() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    seed_cases(input.path());
    let mut cfg = config(input.path().to_path_buf(), output.path().to_path_buf());
    cfg.phases.run_calibration = false;

    let err = QcaPipeline::new(cfg).unwrap().run().unwrap_err();
    assert!(matches!(err, PipelineError::MissingArtifact(_)));
}

#[test]
fn test_skipped_calibration_resumes_from_artifact() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    seed_cases(input.path());

    // First run materializes calibrated_cases.json.
    QcaPipeline::new(config(input.path().to_path_buf(), output.path().to_path_buf()))
        .unwrap()
        .run()
        .unwrap();

    // Second run consumes it with calibration disabled.
    let mut cfg = config(input.path().to_path_buf(), output.path().to_path_buf());
    cfg.phases.run_calibration = false;
    let results = QcaPipeline::new(cfg).unwrap().run().unwrap();
    assert_eq!(results.total_cases, 3);
}

#[test]
fn test_missing_source_condition_never_raises() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    seed_cases(input.path());
    let mut cfg = config(input.path().to_path_buf(), output.path().to_path_buf());
    cfg.outcomes = vec![outcome("adoption", &["trust", "undefined_condition"], "any")];

    let results = QcaPipeline::new(cfg).unwrap().run().unwrap();
    assert_eq!(results.total_cases, 3);

    let calc: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(output.path().join("outcome_calculation_adoption.json")).unwrap(),
    )
    .unwrap();
    let missing = calc["derivations"][0]["missing_conditions"].as_array().unwrap();
    assert_eq!(missing[0], "undefined_condition");
}

#[test]
fn test_compliance_report_on_full_run() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    seed_cases(input.path());
    QcaPipeline::new(config(input.path().to_path_buf(), output.path().to_path_buf()))
        .unwrap()
        .run()
        .unwrap();

    let report: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(output.path().join("methodology_validation_report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report["theoretical_justification_provided"], true);
    assert_eq!(report["fuzzy_information_preserved"], true);
    assert_eq!(report["outcome_derivations_traced"], true);

    let summary = fs::read_to_string(output.path().join("methodology_summary.md")).unwrap();
    assert!(summary.contains("# Methodology Summary"));
    assert!(summary.contains("`trust`"));
}
