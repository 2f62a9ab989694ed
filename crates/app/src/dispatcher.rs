//! Action dispatcher: executes the actions emitted by triggered rules.
//!
//! The dispatcher is the only place where rule actions touch IO. Route
//! optimization goes back through the route service (and therefore the
//! registry's mutation contract); everything else is forwarded to the
//! matching collaborator port. One failing action never blocks the rest of
//! the batch.

use std::sync::Arc;

use courier_domain::error::CourierError;
use courier_domain::id::RuleId;
use courier_domain::rule::RuleAction;
use courier_domain::snapshot::RouteSnapshot;
use courier_domain::stop::Priority;

use crate::ports::{
    BackupStore, BatchExporter, EventPublisher, Geocoder, Notifier, RouteStore,
    TravelTimeProvider,
};
use crate::rule_engine::TriggeredAction;
use crate::services::route_service::RouteService;

/// What a successfully dispatched action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    RouteOptimized {
        pending: usize,
        window_violations: usize,
    },
    NotificationSent,
    BackupCompleted {
        label: String,
    },
    BatchCompleted {
        label: String,
    },
}

/// Executes rule actions against the route service and collaborators.
pub struct Dispatcher<S, G, T, P, N, B, X> {
    routes: Arc<RouteService<S, G, T, P>>,
    notifier: N,
    backup: B,
    exporter: X,
}

impl<S, G, T, P, N, B, X> Dispatcher<S, G, T, P, N, B, X>
where
    S: RouteStore + Send + Sync,
    G: Geocoder + Send + Sync,
    T: TravelTimeProvider + Send + Sync,
    P: EventPublisher + Send + Sync,
    N: Notifier + Send + Sync,
    B: BackupStore + Send + Sync,
    X: BatchExporter + Send + Sync,
{
    /// Create a new dispatcher.
    pub fn new(routes: Arc<RouteService<S, G, T, P>>, notifier: N, backup: B, exporter: X) -> Self {
        Self {
            routes,
            notifier,
            backup,
            exporter,
        }
    }

    /// Execute a single action.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`CourierError`]; collaborator failures
    /// arrive as [`CourierError::Dispatch`].
    pub async fn dispatch(
        &self,
        action: &RuleAction,
        snapshot: &RouteSnapshot,
    ) -> Result<DispatchOutcome, CourierError> {
        match action {
            RuleAction::OptimizeRoute => {
                let result = self.routes.optimize().await?;
                Ok(DispatchOutcome::RouteOptimized {
                    pending: result.ordering.len(),
                    window_violations: result.violations.len(),
                })
            }
            RuleAction::SendNotification { message } => {
                let rendered = render_template(message, snapshot);
                self.notifier.notify(&rendered).await?;
                Ok(DispatchOutcome::NotificationSent)
            }
            RuleAction::BackupData => {
                let label = self.backup.backup().await?;
                Ok(DispatchOutcome::BackupCompleted { label })
            }
            RuleAction::BatchProcess { operation } => {
                let label = self.exporter.export(*operation, snapshot).await?;
                Ok(DispatchOutcome::BatchCompleted { label })
            }
        }
    }

    /// Execute a batch of triggered actions, isolating failures.
    ///
    /// The result vector is aligned with the input; a failed dispatch
    /// leaves an `Err` in its slot and the remaining actions still run.
    pub async fn dispatch_all(
        &self,
        triggered: &[TriggeredAction],
        snapshot: &RouteSnapshot,
    ) -> Vec<(RuleId, Result<DispatchOutcome, CourierError>)> {
        let mut outcomes = Vec::with_capacity(triggered.len());
        for entry in triggered {
            let outcome = self.dispatch(&entry.action, snapshot).await;
            outcomes.push((entry.rule_id, outcome));
        }
        outcomes
    }
}

/// Render a notification template against the snapshot.
///
/// Supported placeholders: `{pending}`, `{load_percent}`, `{urgent}`.
#[must_use]
pub fn render_template(template: &str, snapshot: &RouteSnapshot) -> String {
    template
        .replace("{pending}", &snapshot.pending_count().to_string())
        .replace(
            "{load_percent}",
            &format!("{:.0}", snapshot.load_percent()),
        )
        .replace(
            "{urgent}",
            &snapshot.pending_at_least(Priority::Urgent).to_string(),
        )
}
