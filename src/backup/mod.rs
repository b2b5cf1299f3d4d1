mod logic;

use crate::cluster::ClusterConnection;
use crate::config::MigrationConfig;
use crate::errors::Result;

pub use logic::{BackupReport, perform_backup_orchestration};

/// Public entry point for the backup process.
///
/// Only endpoint resolution can fail here; everything after the connection is set up
/// is reported through the returned [`BackupReport`].
pub async fn run_backup_flow(config: &MigrationConfig) -> Result<BackupReport> {
    let connection = ClusterConnection::connect(&config.source_seeds, &config.credentials, &config.connection)?;
    Ok(perform_backup_orchestration(&connection, config).await)
}
