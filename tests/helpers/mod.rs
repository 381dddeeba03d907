#![allow(dead_code)] // Test helpers appear unused when compiled independently

use invocation_verifier::{LogQuery, LogRecord, LogSearch, LogSearchError};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub const LOG_GROUP: &str = "/aws/lambda/scheduled-fn";

pub type Response = Result<Vec<LogRecord>, LogSearchError>;

/// What the fake saw for one filter call
#[derive(Debug, Clone)]
pub struct SeenQuery {
    pub log_group_name: String,
    pub filter_pattern: String,
    pub start_time: Option<i64>,
    pub at: Duration,
}

/// LogSearch that replays scripted responses, then answers with empty pages.
pub struct ScriptedLogSearch {
    responses: Mutex<VecDeque<Response>>,
    seen: Mutex<Vec<SeenQuery>>,
    started: Instant,
}

impl ScriptedLogSearch {
    pub fn new(responses: Vec<Response>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            seen: Mutex::new(Vec::new()),
            started: Instant::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn seen(&self) -> Vec<SeenQuery> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LogSearch for ScriptedLogSearch {
    async fn filter_log_events(&self, query: &LogQuery<'_>) -> Result<Vec<LogRecord>, LogSearchError> {
        self.seen.lock().unwrap().push(SeenQuery {
            log_group_name: query.log_group_name.to_string(),
            filter_pattern: query.filter_pattern.to_string(),
            start_time: query.start_time,
            at: self.started.elapsed(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub fn records(messages: &[&str]) -> Response {
    Ok(messages.iter().map(|m| LogRecord::new(*m)).collect())
}

pub fn empty() -> Response {
    Ok(Vec::new())
}
