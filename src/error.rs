use std::time::Duration;

use crate::logs::LogSearchError;

/// A log search call that failed on a given attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFailure {
    pub attempt: u32,
    pub error: LogSearchError,
}

#[derive(Debug)]
pub enum VerifyError {
    /// Credentials, outputs or inputs could not be resolved; nothing was polled
    Setup(String),
    /// One or more log searches failed during the run
    Query { failures: Vec<QueryFailure> },
    /// The marker record did not carry the expected fragment
    FragmentMismatch {
        attempt: u32,
        expected: String,
        message: String,
    },
    /// No marker record within the polling budget
    Timeout {
        attempts: u32,
        timeout: Duration,
        marker: String,
        query_failures: usize,
    },
}

impl VerifyError {
    pub fn setup(msg: impl Into<String>) -> Self {
        VerifyError::Setup(msg.into())
    }
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyError::Setup(e) => write!(f, "setup failed: {}", e),
            VerifyError::Query { failures } => {
                write!(f, "{} log search(es) failed", failures.len())?;
                for failure in failures {
                    write!(f, "\n  attempt {}: {}", failure.attempt, failure.error)?;
                }
                Ok(())
            }
            VerifyError::FragmentMismatch {
                attempt,
                expected,
                message,
            } => write!(
                f,
                "log entry on attempt {} does not contain {:?}: {:?}",
                attempt, expected, message
            ),
            VerifyError::Timeout {
                attempts,
                timeout,
                marker,
                query_failures,
            } => {
                write!(
                    f,
                    "expected log entry not found within timeout: no {:?} after {} attempts ({}s)",
                    marker,
                    attempts,
                    timeout.as_secs()
                )?;
                if *query_failures > 0 {
                    write!(f, ", {} search(es) failed", query_failures)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for VerifyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = VerifyError::Timeout {
            attempts: 60,
            timeout: Duration::from_secs(600),
            marker: "Lambda function invoked".to_string(),
            query_failures: 0,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("expected log entry not found within timeout"));
        assert!(msg.contains("60 attempts"));
        assert!(!msg.contains("failed"));
    }

    #[test]
    fn test_query_message_lists_attempts() {
        let err = VerifyError::Query {
            failures: vec![
                QueryFailure {
                    attempt: 1,
                    error: LogSearchError::Throttled("slow down".to_string()),
                },
                QueryFailure {
                    attempt: 4,
                    error: LogSearchError::AccessDenied("nope".to_string()),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 log search(es) failed"));
        assert!(msg.contains("attempt 1: throttled: slow down"));
        assert!(msg.contains("attempt 4: access denied: nope"));
    }
}
