// snapshottool/src/repository/mod.rs
use serde_json::{Value, json};
use std::time::Duration;
use tracing::info;

use crate::cluster::SearchCluster;
use crate::config::RepositorySettings;
use crate::errors::{AppError, Result};

pub const REPOSITORY_TYPE: &str = "s3";

/// Body of the create-or-update repository request.
pub fn repository_body(settings: &RepositorySettings) -> Value {
    json!({
        "type": REPOSITORY_TYPE,
        "settings": {
            "region": settings.storage_region,
            "bucket": settings.bucket_name,
            "base_path": settings.base_path,
            "access_key": settings.access_key,
            "secret_key": settings.secret_key,
        }
    })
}

/// Declares the S3 snapshot repository on `cluster`.
///
/// The request is bounded by `timeout` and is not retried. Registering the same settings
/// twice is accepted by the engine as an update, so repeated runs are safe.
pub async fn register_repository<C>(cluster: &C, settings: &RepositorySettings, timeout: Duration) -> Result<()>
where
    C: SearchCluster + ?Sized,
{
    info!(
        repository = %settings.repository_name,
        bucket = %settings.bucket_name,
        base_path = %settings.base_path,
        region = %settings.storage_region,
        "Registering S3 snapshot repository"
    );

    cluster
        .create_or_update_repository(&settings.repository_name, &repository_body(settings), Some(timeout))
        .await
        .map_err(|cause| AppError::RepositoryRegistration {
            repository: settings.repository_name.clone(),
            cause: Box::new(cause),
        })?;

    info!(repository = %settings.repository_name, "✅ Repository registered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterConnection;
    use crate::cluster::testing::{Call, RecordingCluster};
    use crate::config::{ConnectionOptions, Credentials};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn connect_to(server: &MockServer) -> crate::errors::Result<ClusterConnection> {
        let credentials = Credentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        };
        ClusterConnection::connect(&[server.uri()], &credentials, &ConnectionOptions::default())
    }

    fn settings() -> RepositorySettings {
        RepositorySettings {
            repository_name: "s3_migration_repo".to_string(),
            storage_region: "us-east-1".to_string(),
            bucket_name: "search-snapshots".to_string(),
            base_path: "clusters/prod".to_string(),
            access_key: "AKIAEXAMPLE".to_string(),
            secret_key: "secret".to_string(),
        }
    }

    #[test]
    fn test_repository_body_shape() {
        let body = repository_body(&settings());
        assert_eq!(body["type"], "s3");
        assert_eq!(body["settings"]["region"], "us-east-1");
        assert_eq!(body["settings"]["bucket"], "search-snapshots");
        assert_eq!(body["settings"]["base_path"], "clusters/prod");
        assert_eq!(body["settings"]["access_key"], "AKIAEXAMPLE");
        assert_eq!(body["settings"]["secret_key"], "secret");
    }

    #[tokio::test]
    async fn test_registering_twice_succeeds() -> anyhow::Result<()> {
        let cluster = RecordingCluster::new();
        register_repository(&cluster, &settings(), Duration::from_secs(30)).await?;
        register_repository(&cluster, &settings(), Duration::from_secs(30)).await?;
        assert_eq!(
            cluster.calls(),
            vec![
                Call::Register("s3_migration_repo".to_string()),
                Call::Register("s3_migration_repo".to_string()),
            ]
        );
        let stored = cluster.repositories.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored.get("s3_migration_repo"), Some(&repository_body(&settings())));
        Ok(())
    }

    #[tokio::test]
    async fn test_rejection_is_wrapped_as_registration_error() {
        let cluster = RecordingCluster {
            fail_register: true,
            ..RecordingCluster::new()
        };
        let err = register_repository(&cluster, &settings(), Duration::from_secs(30))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::RepositoryRegistration { ref repository, .. } if repository == "s3_migration_repo"
        ));
    }

    #[tokio::test]
    async fn test_slow_cluster_times_out_as_registration_error() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/_snapshot/s3_migration_repo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "acknowledged": true }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let connection = connect_to(&server)?;
        let started = std::time::Instant::now();
        let err = register_repository(&connection, &settings(), Duration::from_millis(300))
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(3));
        match err {
            AppError::RepositoryRegistration { repository, cause } => {
                assert_eq!(repository, "s3_migration_repo");
                assert!(matches!(*cause, AppError::Transport(ref e) if e.is_timeout()));
            }
            other => panic!("expected registration error, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_index_calls_are_not_bounded_by_registration_timeout() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/_snapshot/s3_migration_repo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "acknowledged": true })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/orders/_close"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "acknowledged": true }))
                    .set_delay(Duration::from_millis(800)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let connection = connect_to(&server)?;
        register_repository(&connection, &settings(), Duration::from_millis(300)).await?;
        // Slower than the registration bound, still succeeds.
        connection.close_index("orders").await?;
        Ok(())
    }
}
