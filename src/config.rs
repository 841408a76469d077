//! Connection settings for the import runner.
//!
//! Defaults match the development container the tool was written for. A YAML
//! file can override any subset of them:
//!
//! ```yaml
//! container_name: prod-sqlserver
//! db_name: Eidos
//! trust_cert: false
//! ```

use crate::error::{MigrateError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Where and how the converted script is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Container running SQL Server
    pub container_name: String,
    /// Server address as seen from inside the container
    pub db_host: String,
    pub db_user: String,
    pub db_password: String,
    /// Target database
    pub db_name: String,
    /// Pass `-C` so sqlcmd trusts the server certificate
    pub trust_cert: bool,
    /// sqlcmd binary inside the container
    pub sqlcmd_path: String,
    /// Container runtime CLI on the host
    pub runtime: String,
    /// Directory inside the container the script is copied to
    pub remote_dir: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            container_name: "eidos-sqlserver".to_string(),
            db_host: "localhost".to_string(),
            db_user: "sa".to_string(),
            db_password: "YourStrong!Passw0rd".to_string(),
            db_name: "EidosDb".to_string(),
            trust_cert: true,
            sqlcmd_path: "/opt/mssql-tools18/bin/sqlcmd".to_string(),
            runtime: "docker".to_string(),
            remote_dir: "/tmp".to_string(),
        }
    }
}

impl ImportConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| MigrateError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|message| MigrateError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, String> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(yaml).map_err(|e| e.to_string())
    }
}
