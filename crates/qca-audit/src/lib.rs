//! Methodology audit trail
//!
//! QCA results are only defensible when every methodological decision is
//! recorded: which calibration was applied and why, which outcomes were
//! derived from what, which tables were built in which mode. The
//! [`AuditTrail`] is an explicit context object threaded through every
//! pipeline phase (never a hidden singleton); phases append structured
//! events and the trail is flushed once at run end.
//!
//! The trail also derives the compliance report: a set of booleans a
//! methods reviewer can check without replaying the run.

pub mod report;
pub mod trail;

pub use report::MethodologyReport;
pub use trail::{AuditTrail, CompleteAuditLog};
