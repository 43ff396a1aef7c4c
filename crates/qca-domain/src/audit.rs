//! Audit events: the unit of the methodology audit trail

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// One methodological decision, recorded for the run
///
/// Events are append-only; the audit trail accumulates them for the whole
/// run and flushes once at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Seconds since the Unix epoch, captured when the event was recorded
    pub timestamp: u64,
    /// Stable event name, e.g. `calibration_started` or `condition_calibrated`
    pub event_type: String,
    /// Structured payload describing the decision
    pub details: serde_json::Value,
}

impl AuditEvent {
    /// Record an event now
    pub fn now(event_type: impl Into<String>, details: serde_json::Value) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            timestamp,
            event_type: event_type.into(),
            details,
        }
    }
}
