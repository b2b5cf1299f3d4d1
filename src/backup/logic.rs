// snapshottool/src/backup/logic.rs
use tracing::{error, info};

use crate::cluster::SearchCluster;
use crate::config::MigrationConfig;
use crate::errors::{AppError, Result, TriggerOperation};
use crate::outcome::StepOutcome;
use crate::repository::register_repository;

#[derive(Debug)]
pub struct BackupReport {
    pub snapshot_name: String,
    pub registration: StepOutcome,
    pub snapshot: StepOutcome,
}

impl BackupReport {
    /// True once the cluster has accepted the snapshot job. Says nothing about the job finishing.
    pub fn accepted(&self) -> bool {
        self.registration.is_success() && self.snapshot.is_success()
    }

    pub fn log_summary(&self) {
        if self.accepted() {
            info!(
                snapshot = %self.snapshot_name,
                "🎉 Snapshot accepted by the source cluster; it continues in the background"
            );
        } else {
            error!(
                snapshot = %self.snapshot_name,
                registration = %self.registration,
                trigger = %self.snapshot,
                "❌ Backup did not start"
            );
        }
    }
}

/// Registers the repository on the source cluster, then asks for a snapshot of the configured
/// indices without waiting for it to complete.
///
/// Failures are logged and recorded in the report. A failed trigger leaves nothing to undo:
/// a registered repository holds no open resource.
pub async fn perform_backup_orchestration<C>(cluster: &C, config: &MigrationConfig) -> BackupReport
where
    C: SearchCluster + ?Sized,
{
    info!(
        snapshot = %config.snapshot_name,
        repository = %config.repository.repository_name,
        "🚀 Starting snapshot orchestration"
    );

    if let Err(e) = register_repository(
        cluster,
        &config.repository,
        config.connection.repository_request_timeout,
    )
    .await
    {
        error!(error = %e, "Repository registration failed, snapshot not triggered");
        return BackupReport {
            snapshot_name: config.snapshot_name.clone(),
            registration: StepOutcome::Failed(e),
            snapshot: StepOutcome::Skipped,
        };
    }

    let snapshot = trigger_snapshot(cluster, config).await;
    if let Err(e) = &snapshot {
        error!(error = %e, snapshot = %config.snapshot_name, "Unexpected error while triggering snapshot");
    }

    BackupReport {
        snapshot_name: config.snapshot_name.clone(),
        registration: StepOutcome::Succeeded,
        snapshot: snapshot.into(),
    }
}

async fn trigger_snapshot<C>(cluster: &C, config: &MigrationConfig) -> Result<()>
where
    C: SearchCluster + ?Sized,
{
    let indices = config.joined_index_names();
    info!(indices = %indices, snapshot = %config.snapshot_name, "Snapshotting indices to S3");

    cluster
        .create_snapshot(&config.repository.repository_name, &config.snapshot_name, &indices)
        .await
        .map_err(|e| AppError::Trigger {
            operation: TriggerOperation::Snapshot,
            reason: e.to_string(),
        })?;

    info!(snapshot = %config.snapshot_name, "✅ Snapshot request accepted");
    Ok(())
}
