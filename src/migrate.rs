//! Index migrations for the `products` collection / 索引迁移
//!
//! `up` creates the index with its fixed mapping (if missing) and bulk-loads
//! every `*.json` file of the migrations directory in file-name order. Each
//! file holds a JSON array of product documents. `down` either drops the
//! index or only empties it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;

use crate::engine::{EngineClient, EngineConfig, EngineError};

pub const PRODUCTS_INDEX: &str = "products";

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("following envs must be set: DIRECTION, MIGRATIONS, MIGRATE_DOWN_WITH_INDEX (optional), ADDRESS, USERNAME, PASSWORD ({0})")]
    Env(String),

    #[error("failed to read migrations from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("migration file {path:?} must hold a JSON array of documents: {reason}")]
    InvalidFile { path: PathBuf, reason: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl std::str::FromStr for Direction {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(MigrateError::Env(format!("DIRECTION must be 'up' or 'down', got '{}'", other))),
        }
    }
}

/// Migrator settings read from the process environment.
#[derive(Debug, Clone, PartialEq)]
pub struct MigratorConfig {
    pub direction: Direction,
    pub migrations: Option<PathBuf>,
    pub drop_index_on_down: bool,
    pub address: String,
    pub username: String,
    pub password: String,
}

impl MigratorConfig {
    pub fn from_env() -> Result<Self, MigrateError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, MigrateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| MigrateError::Env(format!("{} is not set", key)))
        };

        let direction: Direction = required("DIRECTION")?.parse()?;
        let migrations = match direction {
            Direction::Up => Some(PathBuf::from(required("MIGRATIONS")?)),
            Direction::Down => lookup("MIGRATIONS").filter(|v| !v.is_empty()).map(PathBuf::from),
        };
        let drop_index_on_down = match lookup("MIGRATE_DOWN_WITH_INDEX").as_deref() {
            None | Some("") | Some("false") => false,
            Some("true") => true,
            Some(other) => {
                return Err(MigrateError::Env(format!(
                    "MIGRATE_DOWN_WITH_INDEX must be 'true' or 'false', got '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            direction,
            migrations,
            drop_index_on_down,
            address: required("ADDRESS")?,
            username: required("USERNAME")?,
            password: required("PASSWORD")?,
        })
    }

    /// Engine settings for the migrator: short timeout, self-signed certs allowed.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            address: self.address.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            index: PRODUCTS_INDEX.to_string(),
            request_timeout: Duration::from_secs(10),
            tls_insecure: true,
            verify_on_startup: false,
            ..EngineConfig::default()
        }
    }
}

/// Fixed mapping of the products index / 商品索引映射
pub fn products_index_definition() -> Value {
    json!({
        "mappings": {
            "properties": {
                "category": { "type": "keyword" },
                "created_at": { "type": "date" },
                "description": { "type": "text" },
                "id": { "type": "long" },
                "name": { "type": "text" },
                "price": { "type": "float" },
                "stock": { "type": "integer" }
            }
        }
    })
}

/// Summary of an `up` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpReport {
    pub index_created: bool,
    pub files: usize,
    pub documents: usize,
}

pub struct Migrator {
    client: EngineClient,
}

impl Migrator {
    pub fn new(config: &EngineConfig) -> Result<Self, MigrateError> {
        Ok(Self {
            client: EngineClient::new(config)?,
        })
    }

    /// Create the index if needed, then load every migration file.
    pub async fn up(&self, dir: &Path) -> Result<UpReport, MigrateError> {
        // Parse everything first so a bad file leaves the engine untouched.
        let batches = migration_files(dir)?
            .into_iter()
            .map(|path| read_documents(&path).map(|docs| (path, docs)))
            .collect::<Result<Vec<_>, _>>()?;
        let mut report = UpReport::default();

        if self.client.index_exists().await? {
            tracing::info!("Index {} already exists, keeping its mapping", self.client.index());
        } else {
            self.client.create_index(&products_index_definition()).await?;
            report.index_created = true;
            tracing::info!("Created index {}", self.client.index());
        }

        for (path, documents) in batches {
            let count = self.client.bulk_index(&documents).await?;
            tracing::info!("Applied {:?}: {} documents", path, count);
            report.files += 1;
            report.documents += count;
        }

        Ok(report)
    }

    /// Drop the index, or with `drop_index == false` only delete its documents.
    pub async fn down(&self, drop_index: bool) -> Result<(), MigrateError> {
        if drop_index {
            self.client.delete_index().await?;
            tracing::info!("Dropped index {}", self.client.index());
        } else {
            let deleted = self.client.delete_all_documents().await?;
            tracing::info!("Deleted {} documents from {}", deleted, self.client.index());
        }
        Ok(())
    }
}

/// `*.json` files of `dir`, sorted by file name.
pub fn migration_files(dir: &Path) -> Result<Vec<PathBuf>, MigrateError> {
    let io_err = |source| MigrateError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_documents(path: &Path) -> Result<Vec<Value>, MigrateError> {
    let content = std::fs::read_to_string(path).map_err(|source| MigrateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let invalid = |reason: String| MigrateError::InvalidFile {
        path: path.to_path_buf(),
        reason,
    };

    let value: Value = serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
    let documents = match value {
        Value::Array(items) => items,
        _ => return Err(invalid("top level is not an array".to_string())),
    };
    if let Some(pos) = documents.iter().position(|d| !d.is_object()) {
        return Err(invalid(format!("item {} is not an object", pos)));
    }
    Ok(documents)
}
