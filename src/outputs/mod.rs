//! Provisioning output readers.
//!
//! A completed deployment exposes named outputs (`log_group_name`,
//! `expected_message`); these readers resolve them by name.

mod stack;
mod terraform;

pub use stack::StackOutputs;
pub use terraform::TerraformOutputs;

use std::collections::HashMap;
use std::process::Command;

use serde::de::DeserializeOwned;

use crate::error::VerifyError;

/// Output holding the log group the scheduled function writes to
pub const LOG_GROUP_OUTPUT: &str = "log_group_name";

/// Output holding the message the schedule passes to the function
pub const EXPECTED_MESSAGE_OUTPUT: &str = "expected_message";

pub trait OutputReader {
    /// Resolve `name`, failing if the deployment has no such output.
    fn output(&self, name: &str) -> Result<String, VerifyError>;
}

/// Fixed outputs, e.g. values passed on the command line
#[derive(Debug, Clone, Default)]
pub struct StaticOutputs {
    values: HashMap<String, String>,
}

impl StaticOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl OutputReader for StaticOutputs {
    fn output(&self, name: &str) -> Result<String, VerifyError> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| missing_output(name, "static outputs"))
    }
}

impl<T: OutputReader + ?Sized> OutputReader for Box<T> {
    fn output(&self, name: &str) -> Result<String, VerifyError> {
        (**self).output(name)
    }
}

pub(crate) fn missing_output(name: &str, source: &str) -> VerifyError {
    VerifyError::setup(format!("output '{}' not found in {}", name, source))
}

/// Run command and parse JSON output
pub(crate) fn run_json<T: DeserializeOwned>(cmd: &mut Command) -> Result<T, VerifyError> {
    let program = cmd.get_program().to_string_lossy().to_string();
    let output = cmd
        .output()
        .map_err(|e| VerifyError::setup(format!("failed to run {}: {}", program, e)))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VerifyError::setup(format!(
            "{} failed: {}",
            program,
            stderr.trim()
        )));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .map_err(|e| VerifyError::setup(format!("unexpected {} output: {}", program, e)))
}
