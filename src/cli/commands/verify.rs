use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

use super::helpers::{load_config, resolve_profile, resolve_region, resolve_targets};
use crate::cli::config::lookback_from_mins;
use crate::cli::VerifyArgs;
use crate::context::AwsContext;
use crate::logs::CloudWatchLogSearch;
use crate::verify::{InvocationVerifier, Outcome, PollPolicy, VerificationReport};

pub async fn execute_verify(config_path: Option<&Path>, args: VerifyArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let region = resolve_region(args.source.region.as_deref(), &config);
    let profile = resolve_profile(args.source.profile.as_deref(), &config);

    let targets = resolve_targets(&args.source, &config, region.as_deref(), profile.as_deref())?;

    let defaults = config.poll_policy();
    let policy = PollPolicy::new(
        args.max_attempts.unwrap_or(defaults.max_attempts),
        args.interval_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.interval),
    );
    let marker = args
        .marker
        .unwrap_or_else(|| config.marker().to_string());
    let lookback = args
        .lookback_mins
        .map(lookback_from_mins)
        .or_else(|| config.lookback());

    let context = AwsContext::load(region.as_deref(), profile.as_deref())
        .await
        .context("Failed to load AWS configuration")?;

    eprintln!("==> Verifying scheduled invocation");
    eprintln!("    Log group: {}", targets.log_group_name);
    eprintln!("    Expected:  {}", targets.expected_message);
    eprintln!("    Region:    {}", context.region().unwrap_or("unknown"));
    eprintln!(
        "    Timeout:   {} attempts x {}s",
        policy.effective_attempts(),
        policy.interval.as_secs()
    );
    eprintln!();

    let verifier = InvocationVerifier::new(CloudWatchLogSearch::new(&context))
        .with_marker(marker)
        .with_policy(policy)
        .with_lookback(lookback);

    let report = verifier
        .run(&targets.log_group_name, &targets.expected_message)
        .await?;
    print_report(&report);

    let message = report
        .into_result()
        .with_context(|| format!("Invocation not verified in {}", targets.log_group_name))?;
    println!("{}", message);
    Ok(())
}

fn print_report(report: &VerificationReport) {
    let verdict = match &report.outcome {
        Outcome::Found { .. } if report.passed() => "found",
        Outcome::Found { .. } => "found, with failed searches",
        Outcome::FragmentMismatch { .. } => "found, message mismatch",
        Outcome::Exhausted => "not found",
    };
    eprintln!("==> Result: {}", verdict);
    eprintln!("    Attempts: {}", report.attempts);
    for failure in &report.query_failures {
        eprintln!("    Search failed on attempt {}: {}", failure.attempt, failure.error);
    }
}
