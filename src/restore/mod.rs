mod logic;
mod scope;

use crate::cluster::ClusterConnection;
use crate::config::MigrationConfig;
use crate::errors::Result;

pub use logic::{RestoreReport, perform_restore_orchestration};

/// Public entry point for the restore process.
///
/// Only endpoint resolution can fail here; once connected, the run always reaches the
/// reopen step and reports what happened through the returned [`RestoreReport`].
pub async fn run_restore_flow(config: &MigrationConfig) -> Result<RestoreReport> {
    let connection = ClusterConnection::connect(&config.dest_seeds, &config.credentials, &config.connection)?;
    Ok(perform_restore_orchestration(&connection, config).await)
}
