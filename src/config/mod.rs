// snapshottool/src/config/mod.rs
use chrono::Local;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{AppError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "es-s3-snapshot.json";
pub const CONFIG_PATH_ENV: &str = "SNAPSHOTTOOL_CONFIG";
pub const DEFAULT_REPOSITORY_TIMEOUT_SECS: u64 = 30;
const SNAPSHOT_NAME_FORMAT: &str = "%Y_%m_%dT%H-%M-%S";

// Structs for deserializing the config file, one per section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonElasticsearchConfig {
    pub es_src_seed1: Option<String>,
    pub es_src_seed2: Option<String>,
    pub es_src_seed3: Option<String>,
    pub es_dest_seed1: Option<String>,
    pub es_dest_seed2: Option<String>,
    pub es_dest_seed3: Option<String>,
    pub es_repository_name: Option<String>,
    pub index_names: Option<String>,
    pub snapshot_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonElasticCloudConfig {
    pub shield_auth_username: Option<String>,
    pub shield_auth_password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonS3Config {
    pub aws_region: Option<String>,
    pub s3_bucket_name: Option<String>,
    pub s3_base_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonApiKeys {
    pub aws_access_key: Option<String>,
    pub aws_secret_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonConnectionOptions {
    pub verify_certificates: Option<bool>,
    pub repository_request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJsonConfig {
    #[serde(default)]
    pub elasticsearch_config: JsonElasticsearchConfig,
    #[serde(default)]
    pub elastic_cloud: JsonElasticCloudConfig,
    #[serde(default)]
    pub aws_s3_config: JsonS3Config,
    #[serde(default)]
    pub aws_api_keys: JsonApiKeys,
    #[serde(default)]
    pub connection: JsonConnectionOptions,
}

// Application's internal configuration structs
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// S3 repository settings handed to the cluster; the tool never talks to object storage itself.
#[derive(Clone, PartialEq, Eq)]
pub struct RepositorySettings {
    pub repository_name: String,
    pub storage_region: String,
    pub bucket_name: String,
    pub base_path: String,
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for RepositorySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositorySettings")
            .field("repository_name", &self.repository_name)
            .field("storage_region", &self.storage_region)
            .field("bucket_name", &self.bucket_name)
            .field("base_path", &self.base_path)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Peer certificate verification. Off by default: the clusters are reached through
    /// endpoints whose certificates are not expected to validate.
    pub verify_certificates: bool,
    pub repository_request_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        ConnectionOptions {
            verify_certificates: false,
            repository_request_timeout: Duration::from_secs(DEFAULT_REPOSITORY_TIMEOUT_SECS),
        }
    }
}

/// Immutable configuration shared by both modes. Built once at startup.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub source_seeds: Vec<String>,
    pub dest_seeds: Vec<String>,
    pub credentials: Credentials,
    pub repository: RepositorySettings,
    pub index_names: Vec<String>,
    pub snapshot_name: String,
    pub connection: ConnectionOptions,
}

impl MigrationConfig {
    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)?;
        let raw_json_config: RawJsonConfig = serde_json::from_str(&config_content)?;
        Self::from_raw(raw_json_config)
    }

    pub fn from_raw(raw: RawJsonConfig) -> Result<Self> {
        let es = &raw.elasticsearch_config;

        let source_seeds = collect_seeds([&es.es_src_seed1, &es.es_src_seed2, &es.es_src_seed3]);
        let dest_seeds = collect_seeds([&es.es_dest_seed1, &es.es_dest_seed2, &es.es_dest_seed3]);

        let credentials = Credentials {
            username: required(&raw.elastic_cloud.shield_auth_username, "elastic_cloud.shield_auth_username")?,
            password: required(&raw.elastic_cloud.shield_auth_password, "elastic_cloud.shield_auth_password")?,
        };

        let repository = RepositorySettings {
            repository_name: required(&es.es_repository_name, "elasticsearch_config.es_repository_name")?,
            storage_region: required(&raw.aws_s3_config.aws_region, "aws_s3_config.aws_region")?,
            bucket_name: required(&raw.aws_s3_config.s3_bucket_name, "aws_s3_config.s3_bucket_name")?,
            // An empty base path is valid: snapshots then live at the bucket root.
            base_path: raw
                .aws_s3_config
                .s3_base_path
                .clone()
                .ok_or_else(|| AppError::config("aws_s3_config.s3_base_path must be set"))?,
            access_key: required(&raw.aws_api_keys.aws_access_key, "aws_api_keys.aws_access_key")?,
            secret_key: required(&raw.aws_api_keys.aws_secret_key, "aws_api_keys.aws_secret_key")?,
        };

        let index_names = parse_index_names(&required(&es.index_names, "elasticsearch_config.index_names")?)?;

        let snapshot_name = es
            .snapshot_name
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(default_snapshot_name);

        let timeout_secs = raw
            .connection
            .repository_request_timeout_secs
            .unwrap_or(DEFAULT_REPOSITORY_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(AppError::config(
                "connection.repository_request_timeout_secs must be greater than zero",
            ));
        }

        let connection = ConnectionOptions {
            verify_certificates: raw.connection.verify_certificates.unwrap_or(false),
            repository_request_timeout: Duration::from_secs(timeout_secs),
        };

        Ok(MigrationConfig {
            source_seeds,
            dest_seeds,
            credentials,
            repository,
            index_names,
            snapshot_name,
            connection,
        })
    }

    /// Index list in the comma-delimited form the snapshot API takes.
    pub fn joined_index_names(&self) -> String {
        self.index_names.join(",")
    }
}

/// Resolves the config file location: `SNAPSHOTTOOL_CONFIG` when set, else the default file name.
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

pub fn default_snapshot_name() -> String {
    format!("snapshot-{}", Local::now().format(SNAPSHOT_NAME_FORMAT))
}

fn required(value: &Option<String>, key: &str) -> Result<String> {
    value
        .as_ref()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::config(format!("{} must be set and non-empty", key)))
}

/// Seeds in slot order, skipping absent or blank slots.
fn collect_seeds(slots: [&Option<String>; 3]) -> Vec<String> {
    slots
        .into_iter()
        .filter_map(|slot| slot.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_index_names(value: &str) -> Result<Vec<String>> {
    let names: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        return Err(AppError::config("elasticsearch_config.index_names lists no indices"));
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use serde_json::json;
    use std::io::Write;

    fn full_config() -> serde_json::Value {
        json!({
            "elasticsearch_config": {
                "es_src_seed1": "src-1.internal:9200",
                "es_src_seed2": "src-2.internal:9200",
                "es_src_seed3": "src-3.internal:9200",
                "es_dest_seed1": "https://dest-1.example.com:9243",
                "es_repository_name": "s3_migration_repo",
                "index_names": "orders, customers ,,invoices",
                "snapshot_name": "nightly-42"
            },
            "elastic_cloud": {
                "shield_auth_username": "admin",
                "shield_auth_password": "hunter2"
            },
            "aws_s3_config": {
                "aws_region": "eu-west-1",
                "s3_bucket_name": "es-snapshots",
                "s3_base_path": "prod/search"
            },
            "aws_api_keys": {
                "aws_access_key": "AKIAEXAMPLE",
                "aws_secret_key": "wJalrXUtnFEMI"
            }
        })
    }

    fn parse(value: serde_json::Value) -> Result<MigrationConfig> {
        MigrationConfig::from_raw(serde_json::from_value(value)?)
    }

    #[test]
    fn test_full_config_is_parsed() -> anyhow::Result<()> {
        let config = parse(full_config())?;

        assert_eq!(config.source_seeds.len(), 3);
        assert_eq!(config.dest_seeds, vec!["https://dest-1.example.com:9243".to_string()]);
        assert_eq!(config.index_names, vec!["orders", "customers", "invoices"]);
        assert_eq!(config.joined_index_names(), "orders,customers,invoices");
        assert_eq!(config.snapshot_name, "nightly-42");
        assert_eq!(config.repository.bucket_name, "es-snapshots");
        assert_eq!(config.connection, ConnectionOptions::default());
        Ok(())
    }

    #[test]
    fn test_missing_snapshot_name_is_generated() -> anyhow::Result<()> {
        let mut value = full_config();
        value["elasticsearch_config"]
            .as_object_mut()
            .unwrap()
            .remove("snapshot_name");
        let config = parse(value)?;

        let stamp = config
            .snapshot_name
            .strip_prefix("snapshot-")
            .expect("generated name starts with snapshot-");
        assert!(NaiveDateTime::parse_from_str(stamp, SNAPSHOT_NAME_FORMAT).is_ok());
        assert_eq!(stamp.len(), "2024_01_31T23-59-59".len());

        // Generated once; every later read sees the same name.
        let cloned = config.clone();
        assert_eq!(cloned.snapshot_name, config.snapshot_name);
        Ok(())
    }

    #[test]
    fn test_missing_required_field_is_configuration_error() {
        let mut value = full_config();
        value["aws_api_keys"].as_object_mut().unwrap().remove("aws_secret_key");
        let err = parse(value).unwrap_err();
        assert!(matches!(err, AppError::Configuration(ref m) if m.contains("aws_secret_key")));
    }

    #[test]
    fn test_blank_index_list_is_rejected() {
        let mut value = full_config();
        value["elasticsearch_config"]["index_names"] = json!(" , ,");
        assert!(matches!(parse(value), Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_seed_slots_skip_blanks() -> anyhow::Result<()> {
        let mut value = full_config();
        value["elasticsearch_config"]["es_src_seed2"] = json!("  ");
        let config = parse(value)?;
        assert_eq!(
            config.source_seeds,
            vec!["src-1.internal:9200".to_string(), "src-3.internal:9200".to_string()]
        );
        Ok(())
    }

    #[test]
    fn test_connection_options_override() -> anyhow::Result<()> {
        let mut value = full_config();
        value["connection"] = json!({
            "verify_certificates": true,
            "repository_request_timeout_secs": 90
        });
        let config = parse(value)?;
        assert!(config.connection.verify_certificates);
        assert_eq!(config.connection.repository_request_timeout, Duration::from_secs(90));
        Ok(())
    }

    #[test]
    fn test_zero_repository_timeout_is_rejected() {
        let mut value = full_config();
        value["connection"] = json!({ "repository_request_timeout_secs": 0 });
        let err = parse(value).unwrap_err();
        assert!(matches!(err, AppError::Configuration(ref m) if m.contains("repository_request_timeout_secs")));
    }

    #[test]
    fn test_debug_output_redacts_secrets() -> anyhow::Result<()> {
        let config = parse(full_config())?;
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("wJalrXUtnFEMI"));
        assert!(rendered.contains("<redacted>"));
        Ok(())
    }

    #[test]
    fn test_load_from_json_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "{}", full_config())?;
        let config = MigrationConfig::load_from_json(file.path())?;
        assert_eq!(config.repository.repository_name, "s3_migration_repo");
        Ok(())
    }

    #[test]
    fn test_load_from_invalid_json_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "[elasticsearch_config]\nes_src_seed1 = localhost")?;
        let err = MigrationConfig::load_from_json(file.path()).unwrap_err();
        assert!(matches!(err, AppError::SerdeJson(_)));
        Ok(())
    }
}
