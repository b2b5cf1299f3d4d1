pub mod endpoints;
pub(crate) mod http;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::errors::Result;

pub use http::ClusterConnection;

/// The control-plane calls this tool makes against a search cluster.
///
/// Snapshot and restore calls return once the cluster has accepted the job;
/// completion happens later and is not observed here.
#[async_trait]
pub trait SearchCluster: Send + Sync {
    async fn cluster_info(&self) -> Result<Value>;

    /// Create-or-update; re-registering identical settings succeeds.
    async fn create_or_update_repository(
        &self,
        name: &str,
        body: &Value,
        timeout: Option<Duration>,
    ) -> Result<()>;

    async fn create_snapshot(&self, repository: &str, snapshot: &str, indices: &str) -> Result<()>;

    async fn restore_snapshot(&self, repository: &str, snapshot: &str, indices: &str) -> Result<()>;

    /// Closes an index, ignoring it if unavailable.
    async fn close_index(&self, index: &str) -> Result<()>;

    /// Opens an index, ignoring it if unavailable.
    async fn open_index(&self, index: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexCloseOutcome {
    Closed,
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOpenOutcome {
    Opened,
    NotFound,
    Failed(String),
}
