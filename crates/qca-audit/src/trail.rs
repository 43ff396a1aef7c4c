//! Append-only trail of methodological decisions

use qca_domain::AuditEvent;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Well-known event types recorded by the pipeline phases
pub mod event {
    /// Run started; payload summarizes the configuration
    pub const RUN_STARTED: &str = "run_started";
    /// Raw case records loaded
    pub const CASES_LOADED: &str = "cases_loaded";
    /// Calibration phase started
    pub const CALIBRATION_STARTED: &str = "calibration_started";
    /// One condition calibrated across all cases
    pub const CONDITION_CALIBRATED: &str = "condition_calibrated";
    /// Calibration phase completed
    pub const CALIBRATION_COMPLETED: &str = "calibration_completed";
    /// One outcome derived across all cases
    pub const OUTCOME_DERIVED: &str = "outcome_derived";
    /// One truth table built
    pub const TRUTH_TABLE_BUILT: &str = "truth_table_built";
    /// Run completed
    pub const RUN_COMPLETED: &str = "run_completed";
    /// A non-fatal anomaly was defaulted away
    pub const WARNING: &str = "warning";
}

/// Accumulates audit events for one run
///
/// Created once at run start and passed `&mut` through every phase. Events
/// are never removed or reordered.
#[derive(Debug, Clone)]
pub struct AuditTrail {
    run_id: Uuid,
    started_at: u64,
    events: Vec<AuditEvent>,
}

impl AuditTrail {
    /// Start a new trail with a fresh run id
    pub fn new() -> Self {
        Self {
            run_id: Uuid::now_v7(),
            started_at: unix_now(),
            events: Vec::new(),
        }
    }

    /// Append one event
    pub fn record(&mut self, event_type: &str, details: serde_json::Value) {
        self.events.push(AuditEvent::now(event_type, details));
    }

    /// The run this trail belongs to
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// All events recorded so far, in order
    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    /// Events of one type, in order
    pub fn events_of_type<'a>(&'a self, event_type: &'a str) -> impl Iterator<Item = &'a AuditEvent> {
        self.events
            .iter()
            .filter(move |e| e.event_type == event_type)
    }

    /// Snapshot the trail into the flushable log artifact
    pub fn complete_log(&self) -> CompleteAuditLog {
        CompleteAuditLog {
            run_id: self.run_id.to_string(),
            started_at: self.started_at,
            finished_at: unix_now(),
            event_count: self.events.len(),
            events: self.events.clone(),
        }
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new()
    }
}

/// The `complete_audit_log.json` artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteAuditLog {
    /// UUIDv7 run identifier
    pub run_id: String,
    /// Seconds since epoch when the trail was created
    pub started_at: u64,
    /// Seconds since epoch when the log was flushed
    pub finished_at: u64,
    /// Number of events
    pub event_count: usize,
    /// Every event, in recording order
    pub events: Vec<AuditEvent>,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
