//! Pipeline orchestration for the QCA engine
//!
//! Wires the engine crates into one synchronous run:
//! configuration → case loading → calibration → outcome derivation →
//! truth tables → audit flush. Each phase consumes the fully materialized
//! output of the previous one; there is no shared mutable state between
//! phases beyond the explicit [`qca_audit::AuditTrail`].
//!
//! Configuration problems are fatal and reported exhaustively before any
//! calibration begins. Per-case anomalies are warnings with safe defaults.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;

pub use config::{PhaseToggles, PipelineConfig, TruthTableMode};
pub use error::{PipelineError, Result};
pub use pipeline::{AnalysisResults, QcaPipeline};
