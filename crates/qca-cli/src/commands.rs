//! Command execution

use crate::cli::{ConfigArgs, RunArgs};
use anyhow::{bail, Context, Result};
use qca_pipeline::{PipelineConfig, QcaPipeline, TruthTableMode};

/// `qca run`
pub fn execute_run(args: RunArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(mode) = args.mode {
        config.truth_table_mode = TruthTableMode::parse(&mode)
            .with_context(|| format!("invalid truth-table mode '{mode}' (crisp, fuzzy or dual)"))?;
    }

    let pipeline = QcaPipeline::new(config)?;
    let results = pipeline.run()?;

    println!("Run {} completed", results.run_id);
    println!("  cases:        {}", results.total_cases);
    println!("  conditions:   {}", results.conditions.len());
    println!("  outcomes:     {}", results.outcomes.len());
    println!("  truth tables: {}", results.truth_tables.len());
    for table in &results.truth_tables {
        println!(
            "    {} ({}): {} configurations, {} logical remainders",
            table.outcome_id, table.mode, table.configurations_found, table.logical_remainders
        );
    }
    if results.warnings > 0 {
        println!(
            "  warnings:     {} (see complete_audit_log.json)",
            results.warnings
        );
    }
    Ok(())
}

/// `qca validate`
pub fn execute_validate(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    match config.validate() {
        Ok(()) => {
            println!(
                "Configuration OK: {} conditions, {} outcomes",
                config.conditions.len(),
                config.outcomes.len()
            );
            Ok(())
        }
        Err(e) => bail!("{e}"),
    }
}

/// `qca inspect`
pub fn execute_inspect(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args.config)?;

    println!("input_dir:  {}", config.input_dir.display());
    println!("output_dir: {}", config.output_dir.display());
    println!(
        "mode: {:?}, membership threshold: {}",
        config.truth_table_mode, config.minimum_membership_threshold
    );
    println!("\nConditions:");
    for c in &config.conditions {
        println!(
            "  {} <- {}:{} ({}, normalization {})",
            c.id,
            c.source_type.as_str(),
            c.source_id,
            c.calibration.method.as_str(),
            c.calibration.normalization.as_str()
        );
        println!("      {}", c.calibration.theoretical_justification);
    }
    println!("\nOutcomes:");
    for o in &config.outcomes {
        println!(
            "  {} = {}({}) then {}",
            o.outcome_id,
            o.combination_rule,
            o.source_conditions.join(", "),
            o.calibration.method.as_str()
        );
    }
    Ok(())
}

fn load_config(path: &std::path::Path) -> Result<PipelineConfig> {
    PipelineConfig::from_file(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_config_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qca.toml");
        fs::write(
            &path,
            r#"
                input_dir = "cases"
                output_dir = "out"

                [[conditions]]
                id = "trust"
                name = "Trust"
                source_type = "code"
                source_id = "trust"

                [conditions.calibration]
                method = "binary"
                theoretical_justification = "presence suffices"

                [[outcomes]]
                outcome_id = "adoption"
                source_conditions = ["trust"]
                combination_rule = "any"

                [outcomes.calibration]
                method = "fuzzy"
                theoretical_justification = "keep raw"
            "#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.conditions.len(), 1);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(std::path::Path::new("/no/such/qca.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to load configuration"));
    }
}
