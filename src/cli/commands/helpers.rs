use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::cli::config::{load_config_from_path, Config};
use crate::cli::SourceArgs;
use crate::outputs::{OutputReader, StackOutputs, TerraformOutputs};

const SOURCE_REQUIRED_ERROR: &str = "No output source specified. Either:\n  \
    1. Pass --terraform-dir <dir> or --stack <name>\n  \
    2. Set [outputs] terraform_dir or stack in the config file\n  \
    3. Pass --log-group and --expected explicitly";

/// Load the config file, falling back to defaults when none exists
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Some(load_config_from_path(path)?),
        None => Config::load()?,
    };
    Ok(config.unwrap_or_default())
}

/// Resolve region from args or config; `None` leaves it to the AWS environment
pub fn resolve_region(region_arg: Option<&str>, config: &Config) -> Option<String> {
    region_arg
        .map(str::to_string)
        .or_else(|| config.region.clone())
}

/// Resolve profile from args or config; `None` leaves it to the AWS environment
pub fn resolve_profile(profile_arg: Option<&str>, config: &Config) -> Option<String> {
    profile_arg
        .map(str::to_string)
        .or_else(|| config.profile.clone())
}

/// Log group and expected message for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    pub log_group_name: String,
    pub expected_message: String,
}

/// Pick the output reader from args, then config
pub fn output_reader(
    source: &SourceArgs,
    config: &Config,
    region: Option<&str>,
    profile: Option<&str>,
) -> Result<Box<dyn OutputReader>> {
    let stack_outputs = |stack: &str| {
        StackOutputs::new(stack, region.map(str::to_string))
            .with_profile(profile.map(str::to_string))
    };
    if let Some(dir) = &source.terraform_dir {
        return Ok(Box::new(TerraformOutputs::new(dir)));
    }
    if let Some(stack) = &source.stack {
        return Ok(Box::new(stack_outputs(stack)));
    }
    if let Some(dir) = &config.outputs.terraform_dir {
        return Ok(Box::new(TerraformOutputs::new(dir)));
    }
    if let Some(stack) = &config.outputs.stack {
        return Ok(Box::new(stack_outputs(stack)));
    }
    bail!(SOURCE_REQUIRED_ERROR)
}

/// Explicit values win; anything missing is read from deployment outputs.
pub fn resolve_targets(
    source: &SourceArgs,
    config: &Config,
    region: Option<&str>,
    profile: Option<&str>,
) -> Result<Targets> {
    if let (Some(log_group), Some(expected)) = (&source.log_group, &source.expected) {
        return Ok(Targets {
            log_group_name: log_group.clone(),
            expected_message: expected.clone(),
        });
    }

    let reader = output_reader(source, config, region, profile)?;
    let log_group_name = match &source.log_group {
        Some(value) => value.clone(),
        None => reader
            .output(config.log_group_output())
            .context("Failed to resolve log group name")?,
    };
    let expected_message = match &source.expected {
        Some(value) => value.clone(),
        None => reader
            .output(config.expected_message_output())
            .context("Failed to resolve expected message")?,
    };

    Ok(Targets {
        log_group_name,
        expected_message,
    })
}
