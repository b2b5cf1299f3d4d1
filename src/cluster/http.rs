// snapshottool/src/cluster/http.rs
use async_trait::async_trait;
use reqwest::{Method, Response};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::SearchCluster;
use super::endpoints::{resolve, seed_to_url};
use crate::config::{ConnectionOptions, Credentials};
use crate::errors::{AppError, Result};

const MAX_REASON_LEN: usize = 512;

/// Authenticated HTTP session against a cluster's resolved node set.
///
/// Each request goes to the first node that answers; a node is skipped only when it
/// cannot be reached. Any HTTP answer, including an error status, is final.
pub struct ClusterConnection {
    client: reqwest::Client,
    nodes: Vec<Url>,
    credentials: Credentials,
}

impl ClusterConnection {
    pub fn connect(seeds: &[String], credentials: &Credentials, options: &ConnectionOptions) -> Result<Self> {
        let resolved = resolve(seeds)?;

        let mut nodes: Vec<Url> = Vec::with_capacity(resolved.len());
        for seed in &resolved {
            let url = seed_to_url(seed)?;
            if !nodes.contains(&url) {
                nodes.push(url);
            }
        }

        let mut builder = reqwest::Client::builder();
        if !options.verify_certificates {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::config(format!("failed to build HTTP client: {}", e)))?;

        debug!(
            nodes = ?nodes.iter().map(Url::as_str).collect::<Vec<_>>(),
            verify_certificates = options.verify_certificates,
            "Resolved cluster nodes"
        );

        Ok(ClusterConnection {
            client,
            nodes,
            credentials: credentials.clone(),
        })
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&Value>,
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let mut last_error = None;

        for node in &self.nodes {
            let url = request_url(node, segments)?;
            debug!(%method, %url, "Sending cluster request");

            let mut request = self
                .client
                .request(method.clone(), url)
                .basic_auth(&self.credentials.username, Some(&self.credentials.password))
                .query(query);
            if let Some(body) = body {
                request = request.json(body);
            }
            if let Some(timeout) = timeout {
                request = request.timeout(timeout);
            }

            match request.send().await {
                Ok(response) => return read_response(response).await,
                Err(e) if e.is_connect() => {
                    warn!(node = %node, error = %e, "Cluster node unreachable, trying next node");
                    last_error = Some(e);
                }
                Err(e) => return Err(AppError::Transport(e)),
            }
        }

        match last_error {
            Some(e) => Err(AppError::Transport(e)),
            None => Err(AppError::config("no cluster nodes to send the request to")),
        }
    }
}

fn request_url(node: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = node.clone();
    if segments.is_empty() {
        return Ok(url);
    }
    url.path_segments_mut()
        .map_err(|_| AppError::config(format!("node URL '{}' cannot carry a path", node)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn read_response(response: Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        return Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)));
    }

    Err(AppError::Cluster {
        status: status.as_u16(),
        reason: error_reason(&text),
    })
}

/// Pulls `error.type: error.reason` out of an engine error body, falling back to the raw text.
fn error_reason(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        match value.get("error") {
            Some(Value::Object(error)) => {
                let kind = error.get("type").and_then(Value::as_str);
                let reason = error.get("reason").and_then(Value::as_str);
                match (kind, reason) {
                    (Some(kind), Some(reason)) => return format!("{}: {}", kind, reason),
                    (None, Some(reason)) => return reason.to_string(),
                    (Some(kind), None) => return kind.to_string(),
                    (None, None) => {}
                }
            }
            Some(Value::String(error)) => return error.clone(),
            _ => {}
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MAX_REASON_LEN).collect()
}

fn index_error(index: &str, err: AppError) -> AppError {
    match err {
        AppError::Cluster { status: 404, .. } => AppError::NotFound { index: index.to_string() },
        other => other,
    }
}

#[async_trait]
impl SearchCluster for ClusterConnection {
    async fn cluster_info(&self) -> Result<Value> {
        self.send(Method::GET, &[], &[], None, None).await
    }

    async fn create_or_update_repository(
        &self,
        name: &str,
        body: &Value,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let response = self
            .send(Method::PUT, &["_snapshot", name], &[], Some(body), timeout)
            .await?;
        if response.get("acknowledged").and_then(Value::as_bool) == Some(false) {
            return Err(AppError::Cluster {
                status: 200,
                reason: "repository registration was not acknowledged".to_string(),
            });
        }
        Ok(())
    }

    async fn create_snapshot(&self, repository: &str, snapshot: &str, indices: &str) -> Result<()> {
        let body = json!({ "indices": indices });
        self.send(
            Method::PUT,
            &["_snapshot", repository, snapshot],
            &[("wait_for_completion", "false")],
            Some(&body),
            None,
        )
        .await
        .map(|_| ())
    }

    async fn restore_snapshot(&self, repository: &str, snapshot: &str, indices: &str) -> Result<()> {
        let body = json!({ "indices": indices });
        self.send(
            Method::POST,
            &["_snapshot", repository, snapshot, "_restore"],
            &[("wait_for_completion", "false")],
            Some(&body),
            None,
        )
        .await
        .map(|_| ())
    }

    async fn close_index(&self, index: &str) -> Result<()> {
        self.send(Method::POST, &[index, "_close"], &[("ignore_unavailable", "true")], None, None)
            .await
            .map(|_| ())
            .map_err(|e| index_error(index, e))
    }

    async fn open_index(&self, index: &str) -> Result<()> {
        self.send(Method::POST, &[index, "_open"], &[("ignore_unavailable", "true")], None, None)
            .await
            .map(|_| ())
            .map_err(|e| index_error(index, e))
    }
}
