//! Command-line flags. Each flag, when given, overrides the matching
//! environment setting from `AppConfig::from_env`.

use clap::Parser;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::store::WriteMode;

/// Product catalog HTTP server backed by a JSON data file
#[derive(Parser, Debug)]
#[command(name = "product_catalog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// Path to the products JSON file
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Replace the data file through a temporary file and rename
    #[arg(long)]
    pub atomic_writes: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    pub fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(data_file) = self.data_file {
            config.data_path = data_file;
        }
        if self.atomic_writes {
            config.write_mode = WriteMode::Atomic;
        }
        config
    }
}
