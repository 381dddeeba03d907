use super::{missing_output, run_json, OutputReader};
use crate::error::VerifyError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

#[derive(Debug, Deserialize)]
struct TerraformOutput {
    value: Value,
    #[serde(default)]
    sensitive: bool,
}

/// Reads `terraform output -json` from a working directory, once.
pub struct TerraformOutputs {
    dir: PathBuf,
    binary: String,
    cache: OnceLock<HashMap<String, String>>,
}

impl TerraformOutputs {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            binary: "terraform".to_string(),
            cache: OnceLock::new(),
        }
    }

    /// Use a different binary, e.g. `tofu`
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load(&self) -> Result<&HashMap<String, String>, VerifyError> {
        if let Some(outputs) = self.cache.get() {
            return Ok(outputs);
        }
        let mut cmd = Command::new(&self.binary);
        cmd.arg(format!("-chdir={}", self.dir.display()))
            .args(["output", "-json"]);
        let raw: HashMap<String, TerraformOutput> = run_json(&mut cmd)?;
        tracing::debug!(dir = %self.dir.display(), count = raw.len(), "read terraform outputs");
        Ok(self.cache.get_or_init(|| flatten(raw)))
    }
}

impl OutputReader for TerraformOutputs {
    fn output(&self, name: &str) -> Result<String, VerifyError> {
        self.load()?
            .get(name)
            .cloned()
            .ok_or_else(|| missing_output(name, &format!("terraform state at {}", self.dir.display())))
    }
}

/// Strings are taken verbatim; anything else as compact JSON.
fn flatten(raw: HashMap<String, TerraformOutput>) -> HashMap<String, String> {
    raw.into_iter()
        .map(|(name, output)| {
            if output.sensitive {
                tracing::debug!(output = %name, "using sensitive terraform output");
            }
            let value = match output.value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (name, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_outputs(json: &str) -> Result<HashMap<String, String>, serde_json::Error> {
        let raw: HashMap<String, TerraformOutput> = serde_json::from_str(json)?;
        Ok(flatten(raw))
    }

    const OUTPUT_JSON: &str = r#"{
  "expected_message": {
    "sensitive": false,
    "type": "string",
    "value": "{\"detail\":\"scheduled-event\"}"
  },
  "log_group_name": {
    "sensitive": false,
    "type": "string",
    "value": "/aws/lambda/scheduled-fn"
  },
  "retention_days": {
    "sensitive": false,
    "type": "number",
    "value": 14
  },
  "tags": {
    "sensitive": true,
    "type": ["object", {"env": "string"}],
    "value": {"env": "test"}
  }
}"#;

    #[test]
    fn test_parse_string_outputs_verbatim() {
        let outputs = parse_outputs(OUTPUT_JSON).unwrap();
        assert_eq!(outputs["log_group_name"], "/aws/lambda/scheduled-fn");
        assert_eq!(outputs["expected_message"], r#"{"detail":"scheduled-event"}"#);
    }

    #[test]
    fn test_parse_non_string_outputs_as_json() {
        let outputs = parse_outputs(OUTPUT_JSON).unwrap();
        assert_eq!(outputs["retention_days"], "14");
        assert_eq!(outputs["tags"], r#"{"env":"test"}"#);
    }

    #[test]
    fn test_parse_empty_state() {
        assert!(parse_outputs("{}").unwrap().is_empty());
    }

    #[test]
    fn test_missing_binary_is_setup_error() {
        let outputs = TerraformOutputs::new("/nonexistent").with_binary("no-such-terraform-5e2a");
        let err = outputs.output("log_group_name").unwrap_err();
        assert!(matches!(err, VerifyError::Setup(_)));
    }
}
