//! Elasticsearch S3 Snapshot Migration Tool
//!
//! Backs up indices from a SOURCE cluster into an S3 snapshot repository, and restores
//! them onto a DESTINATION cluster from the same repository.

// snapshottool/src/main.rs
mod backup;
mod cluster;
mod config;
mod errors;
mod logging;
mod outcome;
mod repository;
mod restore;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use config::MigrationConfig;
use std::path::Path;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "snapshottool",
    about = "Push Elasticsearch indices from SOURCE to DESTINATION through an S3 snapshot repository.",
    after_help = "Configuration is read from es-s3-snapshot.json in the working directory, or from the \
path in SNAPSHOTTOOL_CONFIG. The file is JSON with the same sections and keys as the older \
INI-style es-s3-snapshot.conf, which is no longer read."
)]
struct Cli {
    /// Mode of operation: 'backup' on the SOURCE cluster, 'restore' on the DESTINATION cluster
    #[arg(short, long, value_enum)]
    mode: Mode,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Backup,
    Restore,
}

/// Main entry point. Operational failures are reported in the log and still end in a
/// normal exit; only configuration errors exit non-zero.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    logging::init_logging();
    let cli = Cli::parse();

    let config_path = config::config_path();

    match run_app(cli.mode, &config_path).await {
        Ok(_) => {
            println!("\n\n[All done!]");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app(mode: Mode, config_path: &Path) -> Result<()> {
    let config = MigrationConfig::load_from_json(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    match mode {
        Mode::Backup => {
            println!("🚀 Starting Backup Process...");
            let report = backup::run_backup_flow(&config)
                .await
                .context("Backup could not start")?;
            report.log_summary();
        }
        Mode::Restore => {
            println!("🔄 Starting Restore Process...");
            println!(
                "Restore target: {}, Snapshot: {}",
                config.dest_seeds.join(", "),
                config.snapshot_name
            );
            let report = restore::run_restore_flow(&config)
                .await
                .context("Restore could not start")?;
            report.log_summary();
        }
    }
    Ok(())
}
