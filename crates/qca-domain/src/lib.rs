//! QCA Domain Layer
//!
//! This crate contains the data model for the QCA engine: the vocabulary
//! shared by calibration, outcome derivation, truth-table construction and
//! the audit trail. It carries no behaviour beyond invariant enforcement and
//! simple lookups.
//!
//! ## Key Concepts
//!
//! - **Condition**: a researcher-defined factor measured per case, with a
//!   calibration rule mapping raw counts to [0,1] membership
//! - **Case**: one unit of analysis (e.g. one interview) with raw counts
//!   and metadata
//! - **Calibrated case**: a case after calibration, carrying membership
//!   scores for every condition and (later) every outcome
//! - **Truth table**: cases grouped into condition configurations with
//!   summarized outcome, consistency and coverage
//! - **Audit event**: one methodological decision, recorded for the run
//!
//! ## Architecture
//!
//! Downstream crates own the algorithms; this crate owns the shapes and the
//! one invariant that must never break: membership scores stay in [0, 1].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audit;
pub mod calibrated;
pub mod case;
pub mod condition;
pub mod truth_table;

// Re-exports for convenience
pub use audit::AuditEvent;
pub use calibrated::{CalibratedCase, CalibratedCondition, Provenance};
pub use case::{Case, CaseMetadata};
pub use condition::{
    AnchorSet, CalibrationMethod, CalibrationRule, ConditionDefinition, DirectAnchors,
    FrequencyScores, NormalizationMethod, OutcomeDefinition, PercentileBands, SourceType,
};
pub use truth_table::{ConditionValue, TableMode, TruthTable, TruthTableRow};
