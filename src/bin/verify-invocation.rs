//! Verifies that a scheduled Lambda function ran, from its CloudWatch logs.
//!
//! Exits non-zero when the invocation could not be verified.

use clap::Parser;
use invocation_verifier::cli::{commands, Cli, Commands};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Verify(args) => commands::execute_verify(config_path, args).await?,
        Commands::Outputs(args) => commands::execute_outputs(config_path, args)?,
    }

    Ok(())
}
