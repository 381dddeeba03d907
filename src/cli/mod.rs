pub mod commands;
pub mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "verify-invocation")]
#[command(about = "Check that a scheduled Lambda function ran by searching its CloudWatch logs")]
#[command(version)]
pub struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (defaults to .invocation-verifier.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the function's log group until the invocation shows up
    Verify(VerifyArgs),
    /// Print the resolved log group and expected message
    Outputs(OutputsArgs),
}

/// Where the log group and expected message come from
#[derive(clap::Args, Debug, Default)]
pub struct SourceArgs {
    /// Terraform working directory to read outputs from
    #[arg(long, conflicts_with = "stack")]
    pub terraform_dir: Option<PathBuf>,

    /// CloudFormation stack to read outputs from
    #[arg(long)]
    pub stack: Option<String>,

    /// Log group name (skips the log_group_name output)
    #[arg(long)]
    pub log_group: Option<String>,

    /// Expected message fragment (skips the expected_message output)
    #[arg(long)]
    pub expected: Option<String>,

    /// AWS region
    #[arg(long)]
    pub region: Option<String>,

    /// AWS shared config profile
    #[arg(long)]
    pub profile: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Maximum number of log searches
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Seconds to wait between searches
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Marker message used as the filter pattern
    #[arg(long)]
    pub marker: Option<String>,

    /// Only search events from the last N minutes
    #[arg(long)]
    pub lookback_mins: Option<u64>,
}

#[derive(clap::Args, Debug)]
pub struct OutputsArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}
