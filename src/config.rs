//! Runtime settings from environment variables.

use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;

/// Which RecordStore implementation backs the API.
#[derive(Clone, Debug)]
pub enum StorageBackend {
    File { data_dir: PathBuf },
    Postgres { database_url: String },
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub backend: StorageBackend,
}

impl Settings {
    /// Read settings once at startup. `CAMPUS_STORAGE` selects the backend
    /// (`file`, the default, or `postgres`); the postgres backend requires
    /// `DATABASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("CAMPUS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = match env::var("CAMPUS_PORT") {
            Err(_) => 3000,
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidVar {
                key: "CAMPUS_PORT",
                value: raw,
            })?,
        };

        let storage = env::var("CAMPUS_STORAGE").unwrap_or_else(|_| "file".into());
        let backend = match storage.as_str() {
            "file" => StorageBackend::File {
                data_dir: env::var("CAMPUS_DATA_DIR")
                    .unwrap_or_else(|_| "data".into())
                    .into(),
            },
            "postgres" => StorageBackend::Postgres {
                database_url: env::var("DATABASE_URL")
                    .map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
            },
            _ => {
                return Err(ConfigError::InvalidVar {
                    key: "CAMPUS_STORAGE",
                    value: storage,
                })
            }
        };

        Ok(Settings { host, port, backend })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
