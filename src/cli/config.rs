use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::VerifyError;
use crate::outputs::{EXPECTED_MESSAGE_OUTPUT, LOG_GROUP_OUTPUT};
use crate::verify::{PollPolicy, INVOCATION_MARKER};

pub const CONFIG_FILENAME: &str = ".invocation-verifier.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub marker: Option<String>,
    #[serde(default)]
    pub lookback_mins: Option<u64>,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub outputs: OutputsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputsConfig {
    #[serde(default)]
    pub terraform_dir: Option<PathBuf>,
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default)]
    pub log_group_name: Option<String>,
    #[serde(default)]
    pub expected_message: Option<String>,
}

impl Config {
    /// Load `.invocation-verifier.toml` from the working directory, if present
    pub fn load() -> Result<Option<Self>, VerifyError> {
        if !Path::new(CONFIG_FILENAME).exists() {
            return Ok(None);
        }
        // File exists, so errors are real problems (malformed TOML, permission denied, etc.)
        load_config_from_path(CONFIG_FILENAME).map(Some)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        let defaults = PollPolicy::default();
        PollPolicy::new(
            self.poll.max_attempts.unwrap_or(defaults.max_attempts),
            self.poll
                .interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.interval),
        )
    }

    pub fn marker(&self) -> &str {
        self.marker.as_deref().unwrap_or(INVOCATION_MARKER)
    }

    pub fn lookback(&self) -> Option<Duration> {
        self.lookback_mins.map(lookback_from_mins)
    }

    /// Name of the output holding the log group
    pub fn log_group_output(&self) -> &str {
        self.outputs
            .log_group_name
            .as_deref()
            .unwrap_or(LOG_GROUP_OUTPUT)
    }

    /// Name of the output holding the expected message
    pub fn expected_message_output(&self) -> &str {
        self.outputs
            .expected_message
            .as_deref()
            .unwrap_or(EXPECTED_MESSAGE_OUTPUT)
    }
}

/// Minutes to a lookback window, saturating on huge values
pub fn lookback_from_mins(mins: u64) -> Duration {
    Duration::from_secs(mins.saturating_mul(60))
}

pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<Config, VerifyError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| VerifyError::setup(format!("Failed to read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| VerifyError::setup(format!("Invalid {}: {}", path.display(), e)))
}
