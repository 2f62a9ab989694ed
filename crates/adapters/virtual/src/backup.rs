//! File-copy backup store.

use std::future::Future;
use std::path::PathBuf;

use courier_app::ports::BackupStore;
use courier_domain::error::DispatchError;

/// Backup store that copies the database file into a backup directory,
/// stamping the copy with the current time.
pub struct FileBackupStore {
    source: PathBuf,
    directory: PathBuf,
}

impl FileBackupStore {
    /// Create a backup store copying `source` into `directory`.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, directory: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            directory: directory.into(),
        }
    }
}

impl BackupStore for FileBackupStore {
    fn backup(&self) -> impl Future<Output = Result<String, DispatchError>> + Send {
        let stamp = courier_domain::time::now().format("%Y%m%d_%H%M%S");
        let target = self.directory.join(format!("backup_courier_{stamp}.db"));
        let result = std::fs::create_dir_all(&self.directory)
            .and_then(|()| std::fs::copy(&self.source, &target))
            .map(|_| target.display().to_string())
            .map_err(|err| DispatchError::Backup(err.to_string()));
        if let Ok(label) = &result {
            tracing::info!(path = %label, "database backed up");
        }
        async { result }
    }
}
