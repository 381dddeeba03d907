//! CloudWatch Logs client implementing LogSearch.

use super::{LogQuery, LogRecord, LogSearch, LogSearchError};
use crate::context::AwsContext;
use aws_sdk_cloudwatchlogs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudwatchlogs::operation::filter_log_events::FilterLogEventsError;

/// CloudWatch Logs `FilterLogEvents` wrapper, reused across attempts.
#[derive(Clone)]
pub struct CloudWatchLogSearch {
    client: aws_sdk_cloudwatchlogs::Client,
}

impl CloudWatchLogSearch {
    pub fn new(context: &AwsContext) -> Self {
        Self {
            client: aws_sdk_cloudwatchlogs::Client::new(context.sdk_config()),
        }
    }
}

#[async_trait::async_trait]
impl LogSearch for CloudWatchLogSearch {
    async fn filter_log_events(
        &self,
        query: &LogQuery<'_>,
    ) -> Result<Vec<LogRecord>, LogSearchError> {
        let response = self
            .client
            .filter_log_events()
            .log_group_name(query.log_group_name)
            .filter_pattern(query.filter_pattern)
            .set_start_time(query.start_time)
            .send()
            .await
            .map_err(classify)?;

        Ok(response
            .events()
            .iter()
            .map(|event| LogRecord {
                message: event.message().unwrap_or_default().to_string(),
                timestamp: event.timestamp(),
                log_stream_name: event.log_stream_name().map(str::to_string),
            })
            .collect())
    }
}

fn classify<R: std::fmt::Debug>(err: SdkError<FilterLogEventsError, R>) -> LogSearchError {
    let detail = DisplayErrorContext(&err).to_string();

    if matches!(
        err,
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_)
    ) {
        return LogSearchError::Transport(detail);
    }

    match err.code() {
        Some("ResourceNotFoundException") => LogSearchError::NotFound(detail),
        Some(code) if is_access_denied(code) => LogSearchError::AccessDenied(detail),
        Some(code) if is_throttling(code) => LogSearchError::Throttled(detail),
        _ => LogSearchError::Service(detail),
    }
}

fn is_access_denied(code: &str) -> bool {
    matches!(
        code,
        "AccessDeniedException"
            | "AccessDenied"
            | "UnrecognizedClientException"
            | "ExpiredTokenException"
            | "InvalidSignatureException"
    )
}

fn is_throttling(code: &str) -> bool {
    matches!(
        code,
        "ThrottlingException" | "Throttling" | "TooManyRequestsException"
    )
}
