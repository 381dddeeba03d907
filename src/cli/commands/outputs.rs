use anyhow::Result;
use std::path::Path;

use super::helpers::{load_config, resolve_profile, resolve_region, resolve_targets};
use crate::cli::OutputsArgs;

pub fn execute_outputs(config_path: Option<&Path>, args: OutputsArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let region = resolve_region(args.source.region.as_deref(), &config);
    let profile = resolve_profile(args.source.profile.as_deref(), &config);
    let targets = resolve_targets(&args.source, &config, region.as_deref(), profile.as_deref())?;

    println!("{} = {}", config.log_group_output(), targets.log_group_name);
    println!(
        "{} = {}",
        config.expected_message_output(),
        targets.expected_message
    );
    Ok(())
}
