//! Accessor configuration: connection, listing decoding and job defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entry::ParseOptions;
use crate::error::ZftpError;
use crate::spool::JESMSGLG;
use crate::Result;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZftpConfig {
    /// FTP connection settings, for the transport implementation.
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Listing decoding options.
    #[serde(default)]
    pub parse: ParseOptions,
    /// JES defaults.
    #[serde(default)]
    pub jobs: JobsConfig,
}

/// FTP connection settings.
///
/// The accessor only reads `user`, as the default job owner. The other
/// fields are for the [`crate::FtpTransport`] implementation that opens the
/// session: the crate itself never connects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Host name of the z/OS FTP server.
    #[serde(default = "default_host")]
    pub host: String,
    /// Control connection port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Logon user ID.
    #[serde(default)]
    pub user: Option<String>,
    /// Use explicit FTPS.
    #[serde(default)]
    pub secure: bool,
    /// Control connection timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub conn_timeout_ms: u64,
    /// Passive data connection timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub pasv_timeout_ms: u64,
    /// Keep-alive NOOP interval in milliseconds.
    #[serde(default = "default_keepalive_ms")]
    pub keepalive_ms: u64,
}

/// Defaults for JES queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Job owner filter when a query names none; the logon user if unset.
    #[serde(default)]
    pub default_owner: Option<String>,
    /// Job status filter for job listings.
    #[serde(default = "default_status")]
    pub default_status: String,
    /// DD name of the spool file that holds the job message log.
    #[serde(default = "default_message_log")]
    pub message_log_dd: String,
}

impl ZftpConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ZftpError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ZftpError::Config(e.to_string()))
    }

    /// Owner filter for JES queries: the configured default, then the logon
    /// user, then any owner.
    pub fn default_owner(&self) -> String {
        self.jobs
            .default_owner
            .clone()
            .or_else(|| self.connection.user.clone())
            .unwrap_or_else(|| "*".to_string())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: None,
            secure: false,
            conn_timeout_ms: default_timeout_ms(),
            pasv_timeout_ms: default_timeout_ms(),
            keepalive_ms: default_keepalive_ms(),
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            default_owner: None,
            default_status: default_status(),
            message_log_dd: default_message_log(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    21
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_keepalive_ms() -> u64 {
    10_000
}

fn default_status() -> String {
    "ALL".to_string()
}

fn default_message_log() -> String {
    JESMSGLG.to_string()
}
