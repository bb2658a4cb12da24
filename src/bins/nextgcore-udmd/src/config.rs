//! UDM Configuration
//!
//! YAML configuration file of the daemon. Command line options override
//! the values read here.
//!
//! ```yaml
//! db_uri: mongodb://localhost/nextgcore
//! logger:
//!   level: info
//! sbi:
//!   addr: 127.0.0.12
//!   port: 7777
//! subscribers:
//!   - supi: imsi-001010000000001
//!     permanentKey: 465B5CE8B199B49FAA5F0A2EE238A6BC
//!     operatorKey: CDC202D5123E20F62B6D676AC72CB318
//!     operatorKeyType: OP
//!     sequenceNumber: "000000000020"
//!     authenticationManagementField: "8000"
//! ```

use std::path::Path;

use ogs_dbi::AuthenticationSubscription;
use serde::Deserialize;
use thiserror::Error;

/// Default SBI bind address
pub const UDM_DEFAULT_SBI_ADDR: &str = "127.0.0.12";
/// Default SBI port
pub const UDM_DEFAULT_SBI_PORT: u16 = 7777;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Duplicate subscriber [{0}]")]
    DuplicateSubscriber(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SbiConfig {
    #[serde(default = "default_sbi_addr")]
    pub addr: String,
    #[serde(default = "default_sbi_port")]
    pub port: u16,
}

impl Default for SbiConfig {
    fn default() -> Self {
        Self {
            addr: default_sbi_addr(),
            port: default_sbi_port(),
        }
    }
}

fn default_sbi_addr() -> String {
    UDM_DEFAULT_SBI_ADDR.to_string()
}

fn default_sbi_port() -> u16 {
    UDM_DEFAULT_SBI_PORT
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggerConfig {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UdmConfig {
    /// MongoDB URI; when absent the configured subscribers are served from memory
    #[serde(default)]
    pub db_uri: Option<String>,
    #[serde(default)]
    pub logger: LoggerConfig,
    #[serde(default)]
    pub sbi: SbiConfig,
    #[serde(default)]
    pub subscribers: Vec<AuthenticationSubscription>,
}

impl UdmConfig {
    /// Parse configuration from YAML text
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: UdmConfig = serde_yaml::from_str(text)?;

        let mut seen = std::collections::HashSet::new();
        for sub in &config.subscribers {
            if !seen.insert(sub.supi.as_str()) {
                return Err(ConfigError::DuplicateSubscriber(sub.supi.clone()));
            }
        }

        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text)
    }
}
