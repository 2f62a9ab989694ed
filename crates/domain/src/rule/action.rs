//! Action: the effect dispatched when a rule fires.

use serde::{Deserialize, Serialize};

/// An operation to dispatch when a rule's condition holds.
///
/// The rule engine only emits these descriptors; executing them is the
/// dispatcher's job, which keeps evaluation free of IO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    /// Recompute the pending stop ordering and apply it to the route.
    OptimizeRoute,
    /// Send a message through the notification channel.
    ///
    /// The message may contain `{pending}`, `{load_percent}`, and
    /// `{urgent}` placeholders, rendered against the snapshot at dispatch
    /// time.
    SendNotification { message: String },
    /// Back up route data through the persistence collaborator.
    BackupData,
    /// Run a bulk operation through the export collaborator.
    BatchProcess { operation: BatchOperation },
}

/// Bulk operations offered by the export collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOperation {
    /// Export the full stop list.
    ExportStops,
    /// Produce the day's delivery summary.
    DailySummary,
}

impl std::fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExportStops => f.write_str("export_stops"),
            Self::DailySummary => f.write_str("daily_summary"),
        }
    }
}

impl std::fmt::Display for RuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OptimizeRoute => f.write_str("optimize_route"),
            Self::SendNotification { .. } => f.write_str("send_notification"),
            Self::BackupData => f.write_str("backup_data"),
            Self::BatchProcess { operation } => write!(f, "batch_process({operation})"),
        }
    }
}
