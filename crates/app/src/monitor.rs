//! Route monitor: the periodic task driving rule evaluation.
//!
//! A two-state machine (`Idle` waiting for the next tick, `Evaluating`
//! running one pass) driven by a cancellable tokio task. Each tick takes
//! one snapshot, evaluates every enabled rule against it, dispatches the
//! triggered actions, and records which rules fired. Any error inside a
//! tick is logged and the loop carries on; only an explicit stop request
//! ends the monitor, and stopping is always safe between ticks.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

use courier_domain::error::CourierError;
use courier_domain::event::{Event, EventType};

use crate::dispatcher::Dispatcher;
use crate::ports::{
    BackupStore, BatchExporter, EventPublisher, Geocoder, Notifier, RouteStore, RuleRepository,
    TravelTimeProvider,
};
use crate::registry::StopRegistry;
use crate::rule_engine;
use crate::services::rule_service::RuleService;

/// Where the monitor currently is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    Idle,
    Evaluating,
}

/// Handle for steering a running monitor from elsewhere.
///
/// Interval changes take effect from the next tick; a stop request is
/// honored at the next cancellation point, never mid-evaluation.
#[derive(Clone)]
pub struct MonitorControls {
    interval: Arc<watch::Sender<Duration>>,
    shutdown: Arc<watch::Sender<bool>>,
    state: watch::Receiver<MonitorState>,
}

impl MonitorControls {
    /// Controls not connected to any running monitor.
    ///
    /// The interval stays readable and settable and the state reads as
    /// `Idle`. Used when the monitor is disabled by configuration.
    #[must_use]
    pub fn detached(interval: Duration) -> Self {
        let (interval_tx, _) = watch::channel(interval);
        let (shutdown_tx, _) = watch::channel(false);
        let (_, state_rx) = watch::channel(MonitorState::Idle);
        Self {
            interval: Arc::new(interval_tx),
            shutdown: Arc::new(shutdown_tx),
            state: state_rx,
        }
    }

    /// Change the tick interval.
    pub fn set_interval(&self, interval: Duration) {
        let _ = self.interval.send(interval);
    }

    /// The currently configured tick interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        *self.interval.borrow()
    }

    /// Request the monitor to stop after the current tick.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// The monitor's current state.
    #[must_use]
    pub fn state(&self) -> MonitorState {
        *self.state.borrow()
    }
}

/// The periodic rule-evaluation task.
pub struct Monitor<R, S, G, T, P, N, B, X> {
    registry: Arc<StopRegistry>,
    rules: Arc<RuleService<R>>,
    dispatcher: Arc<Dispatcher<S, G, T, P, N, B, X>>,
    publisher: P,
    interval: watch::Receiver<Duration>,
    shutdown: watch::Receiver<bool>,
    state: watch::Sender<MonitorState>,
}

impl<R, S, G, T, P, N, B, X> Monitor<R, S, G, T, P, N, B, X>
where
    R: RuleRepository + Send + Sync,
    S: RouteStore + Send + Sync,
    G: Geocoder + Send + Sync,
    T: TravelTimeProvider + Send + Sync,
    P: EventPublisher + Send + Sync,
    N: Notifier + Send + Sync,
    B: BackupStore + Send + Sync,
    X: BatchExporter + Send + Sync,
{
    /// Create a monitor and the controls steering it.
    pub fn new(
        registry: Arc<StopRegistry>,
        rules: Arc<RuleService<R>>,
        dispatcher: Arc<Dispatcher<S, G, T, P, N, B, X>>,
        publisher: P,
        interval: Duration,
    ) -> (Self, MonitorControls) {
        let (interval_tx, interval_rx) = watch::channel(interval);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(MonitorState::Idle);

        let controls = MonitorControls {
            interval: Arc::new(interval_tx),
            shutdown: Arc::new(shutdown_tx),
            state: state_rx,
        };
        let monitor = Self {
            registry,
            rules,
            dispatcher,
            publisher,
            interval: interval_rx,
            shutdown: shutdown_rx,
            state: state_tx,
        };
        (monitor, controls)
    }

    /// Drive the tick loop until a stop is requested.
    pub async fn run(mut self) {
        tracing::info!(interval = ?*self.interval.borrow(), "route monitor started");
        loop {
            let period = *self.interval.borrow();
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                () = tokio::time::sleep(period) => {
                    let _ = self.state.send(MonitorState::Evaluating);
                    if let Err(err) = self.run_once().await {
                        tracing::error!(error = %err, "monitor tick failed");
                    }
                    let _ = self.state.send(MonitorState::Idle);
                }
            }
        }
        tracing::info!("route monitor stopped");
    }

    /// Run a single evaluation pass.
    ///
    /// # Errors
    ///
    /// Returns a storage error when loading the enabled rules fails. All
    /// finer-grained failures (per rule, per action) are logged here and
    /// do not abort the pass.
    pub async fn run_once(&self) -> Result<(), CourierError> {
        let snapshot = self.registry.snapshot();
        let rules = self.rules.list_enabled().await?;
        let evaluation = rule_engine::evaluate(&rules, &snapshot);

        for (rule_id, err) in &evaluation.errors {
            tracing::warn!(rule = %rule_id, error = %err, "rule evaluation failed");
        }
        if evaluation.triggered.is_empty() {
            return Ok(());
        }

        tracing::debug!(count = evaluation.triggered.len(), "rules triggered");
        let outcomes = self
            .dispatcher
            .dispatch_all(&evaluation.triggered, &snapshot)
            .await;

        for (entry, (rule_id, outcome)) in evaluation.triggered.iter().zip(outcomes) {
            match outcome {
                Ok(outcome) => {
                    tracing::info!(
                        rule = %entry.rule_name,
                        outcome = ?outcome,
                        "rule action dispatched"
                    );
                    if let Err(err) = self.rules.mark_fired(rule_id, snapshot.taken_at).await {
                        tracing::warn!(rule = %rule_id, error = %err, "failed to record firing");
                    }
                    let _ = self
                        .publisher
                        .publish(Event::new(
                            EventType::RuleTriggered,
                            None,
                            serde_json::json!({
                                "rule_id": rule_id,
                                "rule_name": entry.rule_name,
                                "action": entry.action.to_string(),
                            }),
                        ))
                        .await;
                }
                Err(err) => {
                    tracing::error!(rule = %entry.rule_name, error = %err, "dispatch failed");
                }
            }
        }
        Ok(())
    }
}
