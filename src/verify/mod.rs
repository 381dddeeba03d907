//! Invocation verifier: polls a log group until the marker message shows up.

pub mod policy;

use std::ops::ControlFlow;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{QueryFailure, VerifyError};
use crate::logs::{LogQuery, LogRecord, LogSearch};
pub use policy::{PollOutcome, PollPolicy};

/// Message the scheduled function logs when it runs
pub const INVOCATION_MARKER: &str = "Lambda function invoked";

/// Terminal state of a verification run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Marker record found and it carries the expected fragment
    Found { message: String },
    /// Marker record found without the expected fragment
    FragmentMismatch { message: String },
    /// No marker record in any response
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub log_group_name: String,
    pub expected_fragment: String,
    pub marker: String,
    pub attempts: u32,
    pub timeout: Duration,
    pub outcome: Outcome,
    pub query_failures: Vec<QueryFailure>,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Found { .. }) && self.query_failures.is_empty()
    }

    /// Collapse into the matched message or the most severe failure.
    pub fn into_result(self) -> Result<String, VerifyError> {
        match self.outcome {
            Outcome::FragmentMismatch { message } => Err(VerifyError::FragmentMismatch {
                attempt: self.attempts,
                expected: self.expected_fragment,
                message,
            }),
            Outcome::Exhausted => Err(VerifyError::Timeout {
                attempts: self.attempts,
                timeout: self.timeout,
                marker: self.marker,
                query_failures: self.query_failures.len(),
            }),
            Outcome::Found { .. } if !self.query_failures.is_empty() => Err(VerifyError::Query {
                failures: self.query_failures,
            }),
            Outcome::Found { message } => Ok(message),
        }
    }
}

/// First record whose message contains `marker`; later records are not looked at.
pub fn first_marker_record<'a>(records: &'a [LogRecord], marker: &str) -> Option<&'a LogRecord> {
    records.iter().find(|record| record.message.contains(marker))
}

/// Epoch millis `lookback` before `now`, clamped to the epoch when out of range.
pub fn lookback_start_millis(now: chrono::DateTime<chrono::Utc>, lookback: Duration) -> i64 {
    chrono::Duration::from_std(lookback)
        .ok()
        .and_then(|lookback| now.checked_sub_signed(lookback))
        .map(|start| start.timestamp_millis().max(0))
        .unwrap_or(0)
}

pub struct InvocationVerifier<S> {
    search: S,
    marker: String,
    policy: PollPolicy,
    lookback: Option<Duration>,
}

impl<S: LogSearch> InvocationVerifier<S> {
    pub fn new(search: S) -> Self {
        Self {
            search,
            marker: INVOCATION_MARKER.to_string(),
            policy: PollPolicy::default(),
            lookback: None,
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Restrict searches to events newer than `lookback` before the run started
    pub fn with_lookback(mut self, lookback: Option<Duration>) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Poll `log_group_name` and report how the run ended.
    ///
    /// Only an invalid request is an `Err` here; failed searches and missing
    /// records are part of the report.
    pub async fn run(
        &self,
        log_group_name: &str,
        expected_fragment: &str,
    ) -> Result<VerificationReport, VerifyError> {
        if log_group_name.trim().is_empty() {
            return Err(VerifyError::setup("log group name is empty"));
        }
        if self.marker.is_empty() {
            return Err(VerifyError::setup("marker pattern is empty"));
        }

        let start_time = self
            .lookback
            .map(|lookback| lookback_start_millis(chrono::Utc::now(), lookback));
        let query = LogQuery {
            log_group_name,
            filter_pattern: &self.marker,
            start_time,
        };
        let search = &self.search;
        let marker = self.marker.as_str();
        let max = self.policy.effective_attempts();
        let mut query_failures = Vec::new();

        info!(
            log_group = log_group_name,
            marker,
            max_attempts = max,
            interval_secs = self.policy.interval.as_secs(),
            "waiting for invocation log entry"
        );

        let outcome = self
            .policy
            .run(
                move |attempt| async move {
                    match search.filter_log_events(&query).await {
                        Ok(records) => {
                            debug!(attempt, max, records = records.len(), "log search returned");
                            match first_marker_record(&records, marker) {
                                Some(record) => ControlFlow::Break(record.message.clone()),
                                None => ControlFlow::Continue(None),
                            }
                        }
                        Err(error) => {
                            warn!(attempt, max, error = %error, "log search failed");
                            ControlFlow::Continue(Some(QueryFailure { attempt, error }))
                        }
                    }
                },
                |failure: Option<QueryFailure>| query_failures.extend(failure),
            )
            .await;

        let attempts = outcome.attempts();
        let outcome = match outcome {
            PollOutcome::Stopped { value: message, .. } if message.contains(expected_fragment) => {
                info!(attempts, record = %message, "invocation log entry found");
                Outcome::Found { message }
            }
            PollOutcome::Stopped { value: message, .. } => {
                warn!(
                    attempts,
                    expected = expected_fragment,
                    record = %message,
                    "invocation log entry is missing the expected message"
                );
                Outcome::FragmentMismatch { message }
            }
            PollOutcome::Exhausted { .. } => {
                warn!(attempts, "no invocation log entry within timeout");
                Outcome::Exhausted
            }
        };

        Ok(VerificationReport {
            log_group_name: log_group_name.to_string(),
            expected_fragment: expected_fragment.to_string(),
            marker: self.marker.clone(),
            attempts,
            timeout: self.policy.timeout(),
            outcome,
            query_failures,
        })
    }

    /// `run`, collapsed into the matched message or an error.
    pub async fn verify(
        &self,
        log_group_name: &str,
        expected_fragment: &str,
    ) -> Result<String, VerifyError> {
        self.run(log_group_name, expected_fragment)
            .await?
            .into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: Outcome, failures: usize) -> VerificationReport {
        VerificationReport {
            log_group_name: "/aws/lambda/scheduled".to_string(),
            expected_fragment: "order-123".to_string(),
            marker: INVOCATION_MARKER.to_string(),
            attempts: 3,
            timeout: Duration::from_secs(600),
            outcome,
            query_failures: (1..=failures as u32)
                .map(|attempt| QueryFailure {
                    attempt,
                    error: crate::logs::LogSearchError::Transport("reset".to_string()),
                })
                .collect(),
        }
    }

    #[test]
    fn test_first_marker_record_stops_at_first_match() {
        let records = vec![
            LogRecord::new("START RequestId: abc"),
            LogRecord::new("Lambda function invoked: order-999"),
            LogRecord::new("Lambda function invoked: order-123"),
        ];
        let hit = first_marker_record(&records, INVOCATION_MARKER).unwrap();
        assert_eq!(hit.message, "Lambda function invoked: order-999");
    }

    #[test]
    fn test_first_marker_record_none() {
        let records = vec![LogRecord::new("END RequestId: abc")];
        assert!(first_marker_record(&records, INVOCATION_MARKER).is_none());
        assert!(first_marker_record(&[], INVOCATION_MARKER).is_none());
    }

    #[test]
    fn test_lookback_start_millis() {
        let now = chrono::DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        assert_eq!(
            lookback_start_millis(now, Duration::from_secs(15 * 60)),
            1_700_000_000_000 - 900_000
        );
        assert_eq!(lookback_start_millis(now, Duration::ZERO), 1_700_000_000_000);
    }

    #[test]
    fn test_lookback_start_millis_out_of_range_searches_everything() {
        let now = chrono::DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        assert_eq!(lookback_start_millis(now, Duration::from_secs(u64::MAX)), 0);
        // Representable, but before the earliest supported date
        let ages = Duration::from_secs(400_000 * 365 * 24 * 3600);
        assert_eq!(lookback_start_millis(now, ages), 0);
        // Before the epoch
        let century = Duration::from_secs(100 * 365 * 24 * 3600);
        assert_eq!(lookback_start_millis(now, century), 0);
    }

    #[test]
    fn test_found_passes() {
        let report = report(
            Outcome::Found {
                message: "Lambda function invoked: order-123".to_string(),
            },
            0,
        );
        assert!(report.passed());
        assert_eq!(
            report.into_result().unwrap(),
            "Lambda function invoked: order-123"
        );
    }

    #[test]
    fn test_found_with_query_failures_fails() {
        let report = report(
            Outcome::Found {
                message: "Lambda function invoked: order-123".to_string(),
            },
            1,
        );
        assert!(!report.passed());
        assert!(matches!(
            report.into_result(),
            Err(VerifyError::Query { failures }) if failures.len() == 1
        ));
    }

    #[test]
    fn test_mismatch_takes_precedence_over_query_failures() {
        let report = report(
            Outcome::FragmentMismatch {
                message: "Lambda function invoked: order-999".to_string(),
            },
            2,
        );
        assert!(matches!(
            report.into_result(),
            Err(VerifyError::FragmentMismatch { attempt: 3, .. })
        ));
    }

    #[test]
    fn test_exhausted_is_timeout() {
        let report = report(Outcome::Exhausted, 2);
        match report.into_result() {
            Err(VerifyError::Timeout {
                attempts,
                query_failures,
                ..
            }) => {
                assert_eq!(attempts, 3);
                assert_eq!(query_failures, 2);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
