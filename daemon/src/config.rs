//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use payproof_ledger::{LedgerError, RpcLedgerClient};
use payproof_types::{AccountId, Cluster, Lamports};
use payproof_utils::LogFormat;
use payproof_verification::{VerifierConfig, DEFAULT_RECIPIENT};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(String),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration for the verifier service.
///
/// Can be loaded from a TOML file via [`ServiceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Which ledger cluster to read from.
    #[serde(default = "default_cluster")]
    pub cluster: Cluster,

    /// Explicit RPC endpoint; overrides the cluster's public endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,

    /// Account that payments must reach.
    #[serde(default = "default_recipient")]
    pub recipient: String,

    /// Inclusive amount slack, in lamports.
    #[serde(default = "default_tolerance_lamports")]
    pub tolerance_lamports: u64,

    /// Upper bound on one ledger lookup.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Directory holding the consumption registry.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// HTTP API port.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Defaults ───────────────────────────────────────────────────────────

fn default_cluster() -> Cluster {
    Cluster::Mainnet
}

fn default_recipient() -> String {
    DEFAULT_RECIPIENT.to_string()
}

fn default_tolerance_lamports() -> u64 {
    1_000_000
}

fn default_fetch_timeout_secs() -> u64 {
    15
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./payproof_data")
}

fn default_map_size_mb() -> usize {
    64
}

fn default_listen_port() -> u16 {
    3000
}

fn default_log_format() -> LogFormat {
    LogFormat::Human
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The endpoint the ledger client should talk to.
    pub fn effective_rpc_url(&self) -> &str {
        self.rpc_url
            .as_deref()
            .unwrap_or_else(|| self.cluster.default_rpc_url())
    }

    /// Bound on one ledger lookup; also the HTTP timeout of the ledger client.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Ledger client for [`effective_rpc_url`](Self::effective_rpc_url),
    /// giving up after [`fetch_timeout`](Self::fetch_timeout).
    pub fn ledger_client(&self) -> Result<RpcLedgerClient, LedgerError> {
        RpcLedgerClient::with_timeout(self.effective_rpc_url(), self.fetch_timeout())
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }

    /// Engine settings derived from this configuration.
    pub fn verifier_config(&self) -> Result<VerifierConfig, ConfigError> {
        let recipient: AccountId = self.recipient.parse().map_err(|e| ConfigError::Invalid {
            field: "recipient",
            reason: format!("{e}"),
        })?;
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_secs",
                reason: "must be at least 1".into(),
            });
        }
        Ok(VerifierConfig::new(recipient)
            .with_tolerance(Lamports::new(self.tolerance_lamports))
            .with_fetch_timeout(self.fetch_timeout()))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cluster: default_cluster(),
            rpc_url: None,
            recipient: default_recipient(),
            tolerance_lamports: default_tolerance_lamports(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            listen_port: default_listen_port(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ServiceConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = ServiceConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.listen_port, config.listen_port);
        assert_eq!(parsed.recipient, config.recipient);
        assert_eq!(parsed.cluster, Cluster::Mainnet);
        assert!(parsed.rpc_url.is_none());
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ServiceConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.listen_port, 3000);
        assert_eq!(config.tolerance_lamports, 1_000_000);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.effective_rpc_url(), "https://api.mainnet-beta.solana.com");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            cluster = "devnet"
            listen_port = 8080
            log_format = "json"
        "#;
        let config = ServiceConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.effective_rpc_url(), "https://api.devnet.solana.com");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn explicit_rpc_url_wins_over_cluster() {
        let config = ServiceConfig::from_toml_str(
            r#"
            cluster = "devnet"
            rpc_url = "http://127.0.0.1:8899"
            "#,
        )
        .unwrap();
        assert_eq!(config.effective_rpc_url(), "http://127.0.0.1:8899");
    }

    #[test]
    fn unknown_cluster_is_rejected() {
        let result = ServiceConfig::from_toml_str(r#"cluster = "moonnet""#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn verifier_config_carries_settings() {
        let config = ServiceConfig {
            tolerance_lamports: 42,
            fetch_timeout_secs: 3,
            ..ServiceConfig::default()
        };
        let verifier = config.verifier_config().unwrap();
        assert_eq!(verifier.tolerance, Lamports::new(42));
        assert_eq!(verifier.fetch_timeout, Duration::from_secs(3));
        assert_eq!(verifier.recipient.as_str(), DEFAULT_RECIPIENT);
    }

    #[test]
    fn long_fetch_timeout_reaches_ledger_client() {
        let config = ServiceConfig {
            fetch_timeout_secs: 40,
            rpc_url: Some("http://127.0.0.1:8899".into()),
            ..ServiceConfig::default()
        };
        assert_eq!(config.fetch_timeout(), Duration::from_secs(40));
        assert_eq!(
            config.verifier_config().unwrap().fetch_timeout,
            config.fetch_timeout()
        );
        let client = config.ledger_client().unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:8899");
    }

    #[test]
    fn blank_recipient_is_invalid() {
        let config = ServiceConfig {
            recipient: "  ".into(),
            ..ServiceConfig::default()
        };
        assert!(matches!(
            config.verifier_config(),
            Err(ConfigError::Invalid { field: "recipient", .. })
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listen_port = 4100").unwrap();
        let config = ServiceConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.listen_port, 4100);
    }

    #[test]
    fn missing_file_returns_read_error() {
        let result = ServiceConfig::from_toml_file(Path::new("/nonexistent/payproof.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
