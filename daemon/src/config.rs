//! Daemon configuration with TOML file support.

use anyhow::Context;
use ballot_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Where the tie-break randomness comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RandomSourceKind {
    /// Operating-system entropy.
    #[default]
    Os,
    /// Commit-reveal among the scenario's listed participants.
    CommitReveal,
}

impl FromStr for RandomSourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "os" => Ok(Self::Os),
            "commit-reveal" | "commit_reveal" => Ok(Self::CommitReveal),
            other => anyhow::bail!("unknown random source {other:?}, expected \"os\" or \"commit-reveal\""),
        }
    }
}

impl fmt::Display for RandomSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Os => f.write_str("os"),
            Self::CommitReveal => f.write_str("commit-reveal"),
        }
    }
}

/// Configuration for the `ballot` daemon.
///
/// Can be loaded from a TOML file via [`DaemonConfig::from_toml_file`];
/// command-line flags and `BALLOT_*` environment variables override it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Tie-break randomness.
    #[serde(default)]
    pub random_source: RandomSourceKind,

    /// Label for elections created without one.
    #[serde(default = "default_election_label")]
    pub election_label: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_election_label() -> String {
    "election".to_string()
}

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            random_source: RandomSourceKind::default(),
            election_label: default_election_label(),
        }
    }
}
