//! Dispatch collaborator ports: notification, backup, and batch export.
//!
//! Each consumes the dispatcher's action payload and reports success or
//! failure; the core does not depend on their internal formats.

use std::future::Future;

use courier_domain::error::DispatchError;
use courier_domain::rule::BatchOperation;
use courier_domain::snapshot::RouteSnapshot;

/// Delivers operator-facing notifications.
pub trait Notifier {
    /// Send a rendered notification message.
    fn notify(&self, message: &str) -> impl Future<Output = Result<(), DispatchError>> + Send;
}

/// Backs up route data to durable storage.
pub trait BackupStore {
    /// Run a backup, returning a label identifying the produced artifact.
    fn backup(&self) -> impl Future<Output = Result<String, DispatchError>> + Send;
}

/// Runs bulk export operations over a route snapshot.
pub trait BatchExporter {
    /// Execute the operation, returning a label identifying the output.
    ///
    /// An exporter that does not support the requested operation reports
    /// [`DispatchError::Unsupported`] rather than silently ignoring it.
    fn export(
        &self,
        operation: BatchOperation,
        snapshot: &RouteSnapshot,
    ) -> impl Future<Output = Result<String, DispatchError>> + Send;
}
