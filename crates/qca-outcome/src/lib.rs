//! Outcome derivation: combining condition memberships per outcome
//!
//! For each outcome definition, every calibrated case's source-condition
//! scores are combined ("any" = max, "all" = min, or a restricted
//! expression), optionally re-calibrated, and appended to the case's
//! outcomes list. Every derivation leaves a per-case trace: source values,
//! missing conditions, a readable calculation, raw and final results. That
//! trace is a correctness requirement of the methodology, not telemetry.

pub mod deriver;
pub mod trace;

pub use deriver::OutcomeDeriver;
pub use trace::{OutcomeCalculation, OutcomeDerivation};
