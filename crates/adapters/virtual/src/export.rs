//! JSON batch export writer.

use std::future::Future;
use std::path::PathBuf;

use courier_app::ports::BatchExporter;
use courier_domain::error::DispatchError;
use courier_domain::rule::BatchOperation;
use courier_domain::snapshot::RouteSnapshot;
use courier_domain::stop::{Priority, StopStatus};

/// Batch exporter that renders reports as JSON files in an export
/// directory.
pub struct JsonExportWriter {
    directory: PathBuf,
}

impl JsonExportWriter {
    /// Create an exporter writing into `directory`.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn write(&self, filename: &str, payload: &serde_json::Value) -> Result<String, DispatchError> {
        let target = self.directory.join(filename);
        let rendered = serde_json::to_vec_pretty(payload)
            .map_err(|err| DispatchError::Export(err.to_string()))?;
        std::fs::create_dir_all(&self.directory)
            .and_then(|()| std::fs::write(&target, rendered))
            .map_err(|err| DispatchError::Export(err.to_string()))?;
        Ok(target.display().to_string())
    }
}

impl BatchExporter for JsonExportWriter {
    fn export(
        &self,
        operation: BatchOperation,
        snapshot: &RouteSnapshot,
    ) -> impl Future<Output = Result<String, DispatchError>> + Send {
        let stamp = snapshot.taken_at.format("%Y%m%d_%H%M%S");
        let result = match operation {
            BatchOperation::ExportStops => self.write(
                &format!("delivery_export_{stamp}.json"),
                &serde_json::json!({
                    "export_date": snapshot.taken_at,
                    "total_stops": snapshot.stops.len(),
                    "stops": snapshot.stops,
                }),
            ),
            BatchOperation::DailySummary => {
                let completed = count_by_status(snapshot, StopStatus::Completed);
                let pending = count_by_status(snapshot, StopStatus::Pending);
                self.write(
                    &format!("daily_summary_{}.json", snapshot.taken_at.format("%Y%m%d")),
                    &serde_json::json!({
                        "date": snapshot.taken_at.format("%Y-%m-%d").to_string(),
                        "total_stops": snapshot.stops.len(),
                        "completed_stops": completed,
                        "pending_stops": pending,
                        "total_load": snapshot.vehicle.current_load,
                        "priority_breakdown": {
                            "urgent": count_by_priority(snapshot, Priority::Urgent),
                            "high": count_by_priority(snapshot, Priority::High),
                            "normal": count_by_priority(snapshot, Priority::Normal),
                            "low": count_by_priority(snapshot, Priority::Low),
                        },
                    }),
                )
            }
        };
        if let Ok(label) = &result {
            tracing::info!(path = %label, operation = %operation, "batch export written");
        }
        async { result }
    }
}

fn count_by_status(snapshot: &RouteSnapshot, status: StopStatus) -> usize {
    snapshot
        .stops
        .iter()
        .filter(|stop| stop.status == status)
        .count()
}

fn count_by_priority(snapshot: &RouteSnapshot, priority: Priority) -> usize {
    snapshot
        .stops
        .iter()
        .filter(|stop| stop.priority == priority)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_domain::stop::Stop;
    use courier_domain::vehicle::Vehicle;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("courier-export-{name}-{}", uuid::Uuid::new_v4()))
    }

    fn snapshot() -> RouteSnapshot {
        let mut vehicle = Vehicle::new("Ford", "Transit", 10.0, 12.5);
        vehicle.current_load = 3.5;
        let mut completed = Stop::builder()
            .address("12 Harbour Road")
            .load(1.5)
            .priority(Priority::Urgent)
            .build()
            .unwrap();
        completed.status = StopStatus::Completed;
        let pending = Stop::builder()
            .address("1 Market Street")
            .load(2.0)
            .build()
            .unwrap();
        RouteSnapshot {
            vehicle,
            stops: vec![completed, pending],
            taken_at: courier_domain::time::now(),
        }
    }

    #[tokio::test]
    async fn should_write_stop_export_file() {
        let dir = scratch_dir("stops");
        let exporter = JsonExportWriter::new(&dir);

        let label = exporter
            .export(BatchOperation::ExportStops, &snapshot())
            .await
            .unwrap();

        let payload: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&label).unwrap()).unwrap();
        assert_eq!(payload["total_stops"], 2);
        assert_eq!(payload["stops"].as_array().unwrap().len(), 2);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn should_write_daily_summary_with_breakdown() {
        let dir = scratch_dir("summary");
        let exporter = JsonExportWriter::new(&dir);

        let label = exporter
            .export(BatchOperation::DailySummary, &snapshot())
            .await
            .unwrap();

        let payload: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&label).unwrap()).unwrap();
        assert_eq!(payload["completed_stops"], 1);
        assert_eq!(payload["pending_stops"], 1);
        assert_eq!(payload["priority_breakdown"]["urgent"], 1);
        assert_eq!(payload["priority_breakdown"]["normal"], 1);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn should_report_unwritable_directory_as_export_error() {
        let dir = scratch_dir("unwritable");
        std::fs::create_dir_all(&dir).unwrap();
        // A file where the export directory should be.
        let blocked = dir.join("not-a-dir");
        std::fs::write(&blocked, b"x").unwrap();

        let exporter = JsonExportWriter::new(&blocked);
        let result = exporter
            .export(BatchOperation::ExportStops, &snapshot())
            .await;
        assert!(matches!(result, Err(DispatchError::Export(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
