// snapshottool/src/restore/scope.rs
use tracing::{error, info, warn};

use crate::cluster::{IndexCloseOutcome, IndexOpenOutcome, SearchCluster};
use crate::errors::{AppError, IndexOperation};

/// The set of destination indices a restore run may close.
///
/// Every index in the scope gets an open attempt through [`ReopenScope::reopen_all`],
/// whatever happened while the scope was live. The scope is created before any remote
/// call so a failure at any later step still ends in a reopen.
#[must_use = "indices in the scope must be reopened with `reopen_all`"]
pub struct ReopenScope<'a, C: SearchCluster + ?Sized> {
    cluster: &'a C,
    indices: &'a [String],
    reopened: bool,
}

impl<'a, C: SearchCluster + ?Sized> ReopenScope<'a, C> {
    pub fn enter(cluster: &'a C, indices: &'a [String]) -> Self {
        ReopenScope {
            cluster,
            indices,
            reopened: false,
        }
    }

    /// Closes each index in list order. One failure never stops the others.
    pub async fn close_all(&self) -> Vec<(String, IndexCloseOutcome)> {
        let mut outcomes = Vec::with_capacity(self.indices.len());
        for index in self.indices {
            info!(index = %index, "Closing index");
            let outcome = match self.cluster.close_index(index).await {
                Ok(()) => IndexCloseOutcome::Closed,
                Err(e) if e.is_not_found() => {
                    warn!(index = %index, "Index not present on target cluster - could not close it");
                    IndexCloseOutcome::NotFound
                }
                Err(e) => {
                    let e = per_index_error(IndexOperation::Close, index, e);
                    error!(error = %e, "Unexpected error while closing index");
                    IndexCloseOutcome::Failed(e.to_string())
                }
            };
            outcomes.push((index.clone(), outcome));
        }
        outcomes
    }

    /// Opens every index in the scope and consumes it.
    pub async fn reopen_all(mut self) -> Vec<(String, IndexOpenOutcome)> {
        self.reopened = true;
        info!(indices = ?self.indices, "Re-opening indices");

        let mut outcomes = Vec::with_capacity(self.indices.len());
        for index in self.indices {
            info!(index = %index, "Opening index");
            let outcome = match self.cluster.open_index(index).await {
                Ok(()) => IndexOpenOutcome::Opened,
                Err(e) if e.is_not_found() => {
                    warn!(index = %index, "Could not reopen missing index on target cluster");
                    IndexOpenOutcome::NotFound
                }
                Err(e) => {
                    let e = per_index_error(IndexOperation::Open, index, e);
                    error!(error = %e, "Unexpected error while reopening index");
                    IndexOpenOutcome::Failed(e.to_string())
                }
            };
            outcomes.push((index.clone(), outcome));
        }
        outcomes
    }
}

impl<C: SearchCluster + ?Sized> Drop for ReopenScope<'_, C> {
    fn drop(&mut self) {
        if !self.reopened {
            error!(
                indices = ?self.indices,
                "Restore scope ended without reopening indices; they may be left closed"
            );
        }
    }
}

fn per_index_error(operation: IndexOperation, index: &str, cause: AppError) -> AppError {
    AppError::IndexOperation {
        operation,
        index: index.to_string(),
        reason: cause.to_string(),
    }
}
