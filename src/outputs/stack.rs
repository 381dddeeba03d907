use super::{missing_output, run_json, OutputReader};
use crate::error::VerifyError;
use serde::Deserialize;
use std::collections::HashMap;
use std::process::Command;
use std::sync::OnceLock;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeStacksResponse {
    stacks: Vec<StackDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StackDescription {
    stack_status: String,
    outputs: Option<Vec<StackOutput>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StackOutput {
    output_key: String,
    output_value: String,
}

/// CloudFormation stack outputs, read through the AWS CLI
pub struct StackOutputs {
    stack_name: String,
    region: Option<String>,
    profile: Option<String>,
    cache: OnceLock<HashMap<String, String>>,
}

impl StackOutputs {
    pub fn new(stack_name: impl Into<String>, region: Option<String>) -> Self {
        Self {
            stack_name: stack_name.into(),
            region,
            profile: None,
            cache: OnceLock::new(),
        }
    }

    /// Read the stack with a named AWS CLI profile
    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    fn describe_command(&self) -> Command {
        let mut cmd = Command::new("aws");
        cmd.args([
            "cloudformation",
            "describe-stacks",
            "--stack-name",
            self.stack_name.as_str(),
            "--output",
            "json",
        ]);
        if let Some(region) = &self.region {
            cmd.args(["--region", region.as_str()]);
        }
        if let Some(profile) = &self.profile {
            cmd.args(["--profile", profile.as_str()]);
        }
        cmd
    }

    fn load(&self) -> Result<&HashMap<String, String>, VerifyError> {
        if let Some(outputs) = self.cache.get() {
            return Ok(outputs);
        }
        let response: DescribeStacksResponse = run_json(&mut self.describe_command())?;
        let outputs = stack_outputs(&self.stack_name, response)?;
        Ok(self.cache.get_or_init(|| outputs))
    }
}

impl OutputReader for StackOutputs {
    fn output(&self, name: &str) -> Result<String, VerifyError> {
        self.load()?
            .get(name)
            .cloned()
            .ok_or_else(|| missing_output(name, &format!("stack {}", self.stack_name)))
    }
}

fn stack_outputs(
    stack_name: &str,
    response: DescribeStacksResponse,
) -> Result<HashMap<String, String>, VerifyError> {
    let stack = response
        .stacks
        .into_iter()
        .next()
        .ok_or_else(|| VerifyError::setup(format!("stack {} does not exist", stack_name)))?;

    if stack.stack_status.ends_with("_IN_PROGRESS") || stack.stack_status.contains("FAILED") {
        tracing::warn!(
            stack = stack_name,
            status = %stack.stack_status,
            "stack is not in a settled state"
        );
    }

    Ok(stack
        .outputs
        .unwrap_or_default()
        .into_iter()
        .map(|out| (out.output_key, out.output_value))
        .collect())
}
