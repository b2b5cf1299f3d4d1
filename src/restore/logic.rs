// snapshottool/src/restore/logic.rs
use serde_json::Value;
use tracing::{error, info, warn};

use super::scope::ReopenScope;
use crate::cluster::{IndexCloseOutcome, IndexOpenOutcome, SearchCluster};
use crate::config::MigrationConfig;
use crate::errors::{AppError, Result, TriggerOperation};
use crate::outcome::StepOutcome;
use crate::repository::register_repository;

#[derive(Debug)]
pub struct RestoreReport {
    pub snapshot_name: String,
    pub connection: StepOutcome,
    pub registration: StepOutcome,
    pub closed: Vec<(String, IndexCloseOutcome)>,
    pub restore: StepOutcome,
    pub reopened: Vec<(String, IndexOpenOutcome)>,
}

impl RestoreReport {
    /// True once the cluster has accepted the restore job. Says nothing about the job finishing.
    pub fn accepted(&self) -> bool {
        self.restore.is_success()
    }

    pub fn reopen_failures(&self) -> usize {
        self.reopened
            .iter()
            .filter(|(_, outcome)| matches!(outcome, IndexOpenOutcome::Failed(_)))
            .count()
    }

    pub fn close_failures(&self) -> usize {
        self.closed
            .iter()
            .filter(|(_, outcome)| matches!(outcome, IndexCloseOutcome::Failed(_)))
            .count()
    }

    pub fn missing_indices(&self) -> usize {
        self.closed
            .iter()
            .filter(|(_, outcome)| *outcome == IndexCloseOutcome::NotFound)
            .count()
    }

    pub fn log_summary(&self) {
        info!(
            attempted = self.closed.len(),
            failed = self.close_failures(),
            not_found = self.missing_indices(),
            "Index close results"
        );
        if self.close_failures() > 0 {
            warn!(
                failures = self.close_failures(),
                "Some indices could not be closed before the restore was triggered"
            );
        }
        if self.connection.is_failure() {
            warn!("Destination cluster was unreachable; reopen attempts may have failed as well");
        }
        if self.accepted() {
            info!(
                snapshot = %self.snapshot_name,
                "🎉 Restore accepted by the destination cluster; it continues in the background"
            );
        } else {
            error!(
                snapshot = %self.snapshot_name,
                connection = %self.connection,
                registration = %self.registration,
                trigger = %self.restore,
                "❌ Restore did not start"
            );
        }
        if self.reopen_failures() > 0 {
            warn!(
                failures = self.reopen_failures(),
                "Some indices could not be reopened; check them on the destination cluster"
            );
        }
    }
}

/// Everything a restore run does before the unconditional reopen.
struct RestoreSteps {
    connection: StepOutcome,
    registration: StepOutcome,
    closed: Vec<(String, IndexCloseOutcome)>,
    restore: StepOutcome,
}

impl RestoreSteps {
    fn aborted(connection: StepOutcome, registration: StepOutcome) -> Self {
        RestoreSteps {
            connection,
            registration,
            closed: Vec::new(),
            restore: StepOutcome::Skipped,
        }
    }
}

/// Restores the configured indices from the snapshot on the destination cluster.
///
/// Sequence: cluster info, repository registration, close each index, trigger the restore
/// (not waiting for it), then reopen each index. The reopen runs for every configured index
/// no matter which earlier step failed, so a failed migration never leaves indices closed.
pub async fn perform_restore_orchestration<C>(cluster: &C, config: &MigrationConfig) -> RestoreReport
where
    C: SearchCluster + ?Sized,
{
    info!(
        snapshot = %config.snapshot_name,
        repository = %config.repository.repository_name,
        "🔄 Starting restore orchestration"
    );

    let scope = ReopenScope::enter(cluster, &config.index_names);
    let steps = run_restore_steps(cluster, config, &scope).await;
    let reopened = scope.reopen_all().await;

    RestoreReport {
        snapshot_name: config.snapshot_name.clone(),
        connection: steps.connection,
        registration: steps.registration,
        closed: steps.closed,
        restore: steps.restore,
        reopened,
    }
}

async fn run_restore_steps<C>(cluster: &C, config: &MigrationConfig, scope: &ReopenScope<'_, C>) -> RestoreSteps
where
    C: SearchCluster + ?Sized,
{
    match cluster.cluster_info().await {
        Ok(info) => log_cluster_info(&info),
        Err(e) => {
            error!(error = %e, "Could not reach the destination cluster");
            return RestoreSteps::aborted(StepOutcome::Failed(e), StepOutcome::Skipped);
        }
    }

    if let Err(e) = register_repository(
        cluster,
        &config.repository,
        config.connection.repository_request_timeout,
    )
    .await
    {
        error!(error = %e, "Repository registration failed, restore not triggered");
        return RestoreSteps::aborted(StepOutcome::Succeeded, StepOutcome::Failed(e));
    }

    // Indices must be closed before a restore can overwrite them.
    let closed = scope.close_all().await;

    let restore = trigger_restore(cluster, config).await;
    if let Err(e) = &restore {
        error!(error = %e, snapshot = %config.snapshot_name, "Unexpected error while triggering restore");
    }

    RestoreSteps {
        connection: StepOutcome::Succeeded,
        registration: StepOutcome::Succeeded,
        closed,
        restore: restore.into(),
    }
}

async fn trigger_restore<C>(cluster: &C, config: &MigrationConfig) -> Result<()>
where
    C: SearchCluster + ?Sized,
{
    let indices = config.joined_index_names();
    info!(indices = %indices, snapshot = %config.snapshot_name, "Restoring indices from S3 snapshot");

    cluster
        .restore_snapshot(&config.repository.repository_name, &config.snapshot_name, &indices)
        .await
        .map_err(|e| AppError::Trigger {
            operation: TriggerOperation::Restore,
            reason: e.to_string(),
        })?;

    info!(snapshot = %config.snapshot_name, "✅ Restore request accepted");
    Ok(())
}

fn log_cluster_info(info: &Value) {
    let name = info.get("cluster_name").and_then(Value::as_str).unwrap_or("unknown");
    let version = info
        .pointer("/version/number")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    info!(cluster = %name, version = %version, "Connected to destination cluster");
}
