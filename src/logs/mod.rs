//! Log search seam: the records the verifier reads and the service it asks.

#[cfg(feature = "aws")]
mod cloudwatch;

#[cfg(feature = "aws")]
pub use cloudwatch::CloudWatchLogSearch;

use std::sync::Arc;

/// A single log event returned by a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub message: String,
    pub timestamp: Option<i64>,
    pub log_stream_name: Option<String>,
}

impl LogRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: None,
            log_stream_name: None,
        }
    }
}

/// Parameters for one filter call
#[derive(Debug, Clone, Copy)]
pub struct LogQuery<'a> {
    pub log_group_name: &'a str,
    pub filter_pattern: &'a str,
    /// Epoch millis; `None` leaves the window to the service
    pub start_time: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSearchError {
    AccessDenied(String),
    NotFound(String),
    Throttled(String),
    Transport(String),
    Service(String),
}

impl std::fmt::Display for LogSearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogSearchError::AccessDenied(e) => write!(f, "access denied: {}", e),
            LogSearchError::NotFound(e) => write!(f, "log group not found: {}", e),
            LogSearchError::Throttled(e) => write!(f, "throttled: {}", e),
            LogSearchError::Transport(e) => write!(f, "transport error: {}", e),
            LogSearchError::Service(e) => write!(f, "service error: {}", e),
        }
    }
}

impl std::error::Error for LogSearchError {}

/// Something that can filter a log group for matching events.
///
/// Only the first page of results is returned.
#[async_trait::async_trait]
pub trait LogSearch: Send + Sync {
    async fn filter_log_events(
        &self,
        query: &LogQuery<'_>,
    ) -> Result<Vec<LogRecord>, LogSearchError>;
}

#[async_trait::async_trait]
impl<T: LogSearch + ?Sized> LogSearch for &T {
    async fn filter_log_events(
        &self,
        query: &LogQuery<'_>,
    ) -> Result<Vec<LogRecord>, LogSearchError> {
        (**self).filter_log_events(query).await
    }
}

#[async_trait::async_trait]
impl<T: LogSearch + ?Sized> LogSearch for Arc<T> {
    async fn filter_log_events(
        &self,
        query: &LogQuery<'_>,
    ) -> Result<Vec<LogRecord>, LogSearchError> {
        (**self).filter_log_events(query).await
    }
}
