//! Pipeline configuration

use crate::error::{PipelineError, Result};
use qca_domain::{ConditionDefinition, OutcomeDefinition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Which pipeline phases to run; all on by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseToggles {
    /// Calibrate conditions across all cases
    #[serde(default = "enabled")]
    pub run_calibration: bool,
    /// Derive outcomes from calibrated conditions
    #[serde(default = "enabled")]
    pub run_outcome_derivation: bool,
    /// Build truth tables per outcome
    #[serde(default = "enabled")]
    pub run_truth_tables: bool,
}

fn enabled() -> bool {
    true
}

impl Default for PhaseToggles {
    fn default() -> Self {
        Self {
            run_calibration: true,
            run_outcome_derivation: true,
            run_truth_tables: true,
        }
    }
}

/// Which table families to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TruthTableMode {
    /// Discretized tables only
    Crisp,
    /// Exact-membership tables only
    Fuzzy,
    /// Both, the methodological default
    #[default]
    Dual,
}

impl TruthTableMode {
    /// The table modes this setting expands to
    pub fn table_modes(&self) -> Vec<qca_domain::TableMode> {
        match self {
            TruthTableMode::Crisp => vec![qca_domain::TableMode::Crisp],
            TruthTableMode::Fuzzy => vec![qca_domain::TableMode::Fuzzy],
            TruthTableMode::Dual => {
                vec![qca_domain::TableMode::Crisp, qca_domain::TableMode::Fuzzy]
            }
        }
    }

    /// Parse a mode name, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "crisp" => Some(TruthTableMode::Crisp),
            "fuzzy" => Some(TruthTableMode::Fuzzy),
            "dual" => Some(TruthTableMode::Dual),
            _ => None,
        }
    }
}

/// Full configuration for one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding one JSON case record per file
    pub input_dir: PathBuf,
    /// Directory all artifacts are written to
    pub output_dir: PathBuf,
    /// Field in the case record holding the case id
    #[serde(default = "default_case_id_field")]
    pub case_id_field: String,
    /// Crisp discretization threshold
    #[serde(default = "default_membership_threshold")]
    pub minimum_membership_threshold: f64,
    /// Which table families to build
    #[serde(default)]
    pub truth_table_mode: TruthTableMode,
    /// Which phases to run
    #[serde(default)]
    pub phases: PhaseToggles,
    /// Conditions to calibrate
    pub conditions: Vec<ConditionDefinition>,
    /// Outcomes to derive
    pub outcomes: Vec<OutcomeDefinition>,
}

fn default_case_id_field() -> String {
    "case_id".to_string()
}

fn default_membership_threshold() -> f64 {
    0.5
}

impl PipelineConfig {
    /// Parse from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Parse from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Load from a file, dispatching on the extension (.toml or .json)
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text),
            _ => Self::from_toml(&text),
        }
    }

    /// Validate exhaustively; every problem is reported in one error
    ///
    /// Runs before any calibration. Outcome references to undefined
    /// conditions are deliberately not fatal: derivation substitutes 0.0
    /// and records the miss, per the missing-condition policy.
    pub fn validate(&self) -> Result<()> {
        let mut issues = Vec::new();

        if !self.input_dir.is_dir() {
            issues.push(format!(
                "input_dir '{}' does not exist or is not a directory",
                self.input_dir.display()
            ));
        }
        if self.conditions.is_empty() {
            issues.push("at least one condition is required".to_string());
        }
        if self.outcomes.is_empty() {
            issues.push("at least one outcome is required".to_string());
        }
        if !(0.0..=1.0).contains(&self.minimum_membership_threshold) {
            issues.push(format!(
                "minimum_membership_threshold {} must be within [0, 1]",
                self.minimum_membership_threshold
            ));
        }

        let mut condition_ids = BTreeSet::new();
        for condition in &self.conditions {
            issues.extend(condition.issues());
            if !condition_ids.insert(condition.id.as_str()) {
                issues.push(format!("duplicate condition id '{}'", condition.id));
            }
        }
        let mut outcome_ids = BTreeSet::new();
        for outcome in &self.outcomes {
            issues.extend(outcome.issues());
            if !outcome_ids.insert(outcome.outcome_id.as_str()) {
                issues.push(format!("duplicate outcome id '{}'", outcome.outcome_id));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::Config(issues))
        }
    }

    /// Condition ids in configuration order
    pub fn condition_ids(&self) -> Vec<String> {
        self.conditions.iter().map(|c| c.id.clone()).collect()
    }
}
