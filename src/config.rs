use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::store::{JsonFileStore, WriteMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub write_mode: WriteMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_path: PathBuf::from("data/products.json"),
            write_mode: WriteMode::Overwrite,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let host = lookup("APP_HOST").unwrap_or(defaults.host);

        let port = match lookup("APP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .context("APP_PORT must be a valid u16")?,
            None => defaults.port,
        };

        let data_path = lookup("CATALOG_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        let write_mode = match lookup("CATALOG_WRITE_MODE") {
            Some(raw) => raw
                .parse::<WriteMode>()
                .map_err(anyhow::Error::msg)
                .context("CATALOG_WRITE_MODE is invalid")?,
            None => defaults.write_mode,
        };

        Ok(Self {
            host,
            port,
            data_path,
            write_mode,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn file_store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.data_path).with_write_mode(self.write_mode)
    }
}
