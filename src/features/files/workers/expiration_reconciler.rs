use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use utoipa::ToSchema;

use crate::core::error::Result;
use crate::features::files::models::ExpiredFile;
use crate::features::files::repositories::FileRepository;
use crate::modules::storage::ObjectStore;

/// Outcome of one expiration sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SweepSummary {
    /// Expired records found
    pub scanned: usize,
    /// Records whose object and row were both removed
    pub reconciled: usize,
    /// Object deletes that failed; rows kept for the next sweep
    pub storage_failures: usize,
    /// Row deletes that failed or matched nothing after the object was removed
    pub metadata_failures: usize,
}

enum RecordOutcome {
    Reconciled,
    StorageFailed,
    MetadataFailed,
}

/// Removes expired files from the object store and then from the database
pub struct ExpirationReconciler {
    files: Arc<dyn FileRepository>,
    storage: Arc<dyn ObjectStore>,
    interval: Duration,
}

impl ExpirationReconciler {
    pub fn new(
        files: Arc<dyn FileRepository>,
        storage: Arc<dyn ObjectStore>,
        interval: Duration,
    ) -> Self {
        Self {
            files,
            storage,
            interval,
        }
    }

    /// Run sweeps in a background loop
    pub async fn run(&self) {
        tracing::info!(
            "Starting expiration reconciler (interval: {}s)",
            self.interval.as_secs()
        );

        let mut interval = interval(self.interval);

        loop {
            interval.tick().await;

            if let Err(e) = self.sweep().await {
                tracing::error!("Error during expiration sweep: {:?}", e);
            }
        }
    }

    /// One pass over every record with `expires_at <= now`.
    ///
    /// Records are handled one at a time: object first, then the row. A failed
    /// object delete leaves the row in place so the next sweep retries it.
    /// Only a failure to list expired records is returned as an error.
    pub async fn sweep(&self) -> Result<SweepSummary> {
        let now = Utc::now();
        let expired = self.files.list_expired(now).await?;

        let mut summary = SweepSummary {
            scanned: expired.len(),
            ..SweepSummary::default()
        };

        if expired.is_empty() {
            tracing::debug!("Expiration sweep found nothing to remove");
            return Ok(summary);
        }

        tracing::info!("Reconciling {} expired files", expired.len());

        for file in &expired {
            match self.reconcile(file, now).await {
                RecordOutcome::Reconciled => summary.reconciled += 1,
                RecordOutcome::StorageFailed => summary.storage_failures += 1,
                RecordOutcome::MetadataFailed => summary.metadata_failures += 1,
            }
        }

        tracing::info!(
            "Expiration sweep finished: scanned={}, reconciled={}, storage_failures={}, metadata_failures={}",
            summary.scanned,
            summary.reconciled,
            summary.storage_failures,
            summary.metadata_failures
        );

        Ok(summary)
    }

    async fn reconcile(&self, file: &ExpiredFile, now: chrono::DateTime<Utc>) -> RecordOutcome {
        if let Err(e) = self.storage.delete(&file.object_key).await {
            tracing::error!(
                "Failed to delete object for expired file {} (key={}): {}",
                file.id,
                file.object_key,
                e
            );
            return RecordOutcome::StorageFailed;
        }

        match self.files.delete_expired(file.id, now).await {
            Ok(true) => {
                tracing::debug!("Expired file {} removed", file.id);
                RecordOutcome::Reconciled
            }
            // Deleted concurrently by its owner; the object is gone either way
            Ok(false) => {
                tracing::warn!("Expired file {} row was already gone", file.id);
                RecordOutcome::MetadataFailed
            }
            Err(e) => {
                tracing::error!(
                    "Failed to delete row for expired file {} after removing its object: {}",
                    file.id,
                    e
                );
                RecordOutcome::MetadataFailed
            }
        }
    }
}
