/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed CLI configuration with defaults applied
[POS]:    Configuration layer - endpoints, network and local paths
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use scholarpay_core::{ClientConfig, DEFAULT_TIMEOUT_SECONDS, Network};

const DATA_DIR_NAME: &str = "scholarpay";
const SESSION_FILE: &str = "session.json";
const KEY_FILE: &str = "wallet.key";

/// Top-level configuration for the donation CLI
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    /// Base URL of the platform auth API
    #[serde(default = "default_base_url")]
    pub api_base_url: String,
    /// Base URL of the ledger API
    #[serde(default = "default_base_url")]
    pub ledger_base_url: String,
    /// Ledger network: "TESTNET" or "PUBLIC"
    #[serde(default)]
    pub network: Network,
    /// Upper bound for auth calls, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Submission window for donations, in seconds
    #[serde(default = "default_transaction_timeout_secs")]
    pub transaction_timeout_secs: u64,
    /// Where the session and wallet key live; platform data dir when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_base_url(),
            ledger_base_url: default_base_url(),
            network: Network::default(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            transaction_timeout_secs: default_transaction_timeout_secs(),
            data_dir: None,
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_transaction_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl CliConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content).context("parse config yaml")?;
        Ok(config)
    }

    /// Config file when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join(DATA_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(".").join(format!(".{DATA_DIR_NAME}")))
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir().join(SESSION_FILE)
    }

    pub fn key_path(&self) -> PathBuf {
        self.data_dir().join(KEY_FILE)
    }
}
