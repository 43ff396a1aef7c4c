//! Calibration: raw qualitative counts to [0,1] membership scores
//!
//! Three pieces, applied strictly in order:
//!
//! 1. [`normalize`] rescales a raw count using case metadata (per thousand
//!    words, per speaker, per quote). Normalization always runs before
//!    calibration; percentile and frequency breakpoints are computed over
//!    normalized values, so reversing the order changes results.
//! 2. [`Calibrator`] maps one normalized value to a membership score, one
//!    strategy per calibration family.
//! 3. [`CaseCalibrationOrchestrator`] runs both over every (condition, case)
//!    pair, assembles [`qca_domain::CalibratedCase`] records and emits
//!    per-condition diagnostics plus audit events.

pub mod calibrator;
pub mod diagnostics;
pub mod normalize;
pub mod orchestrator;

pub use calibrator::Calibrator;
pub use diagnostics::{CalibrationDiagnostics, ScoreGroup, ValueStats};
pub use normalize::normalize;
pub use orchestrator::{CalibrationRun, CaseCalibrationOrchestrator};
