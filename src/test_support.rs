use crate::config::{ConnectionOptions, Credentials, MigrationConfig, RepositorySettings};

pub fn sample_config() -> MigrationConfig {
    MigrationConfig {
        source_seeds: vec!["src-1:9200".to_string()],
        dest_seeds: vec!["dest-1:9200".to_string(), "dest-2:9200".to_string()],
        credentials: Credentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        },
        repository: RepositorySettings {
            repository_name: "s3_migration_repo".to_string(),
            storage_region: "us-east-1".to_string(),
            bucket_name: "search-snapshots".to_string(),
            base_path: "clusters/prod".to_string(),
            access_key: "AKIAEXAMPLE".to_string(),
            secret_key: "secret".to_string(),
        },
        index_names: vec!["orders".to_string(), "customers".to_string(), "invoices".to_string()],
        snapshot_name: "snapshot-2024_05_01T02-00-00".to_string(),
        connection: ConnectionOptions::default(),
    }
}
