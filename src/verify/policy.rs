use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

/// Default number of polling attempts
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Default pause between polling attempts
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Bounded, fixed-interval polling policy.
///
/// `max_attempts * interval` is the total budget for a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// How a poll run ended
#[derive(Debug, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// An attempt asked to stop
    Stopped { value: T, attempts: u32 },
    /// Every attempt asked to continue
    Exhausted { attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Stopped { attempts, .. } | PollOutcome::Exhausted { attempts } => {
                *attempts
            }
        }
    }
}

impl PollPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Attempts actually made by `run`; zero is clamped to one.
    pub fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Total time budget (`max_attempts * interval`)
    pub fn timeout(&self) -> Duration {
        self.interval.saturating_mul(self.effective_attempts())
    }

    /// Poll `attempt` until it breaks or the attempts run out.
    ///
    /// `attempt` receives the 1-based attempt number. `Continue` values are
    /// handed to `observe` before the policy sleeps. There is no sleep after
    /// the final attempt, so an exhausted run sleeps `max_attempts - 1` times.
    pub async fn run<F, Fut, B, C, O>(&self, mut attempt: F, mut observe: O) -> PollOutcome<B>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = ControlFlow<B, C>>,
        O: FnMut(C),
    {
        let attempts = self.effective_attempts();

        for n in 1..=attempts {
            match attempt(n).await {
                ControlFlow::Break(value) => {
                    return PollOutcome::Stopped { value, attempts: n };
                }
                ControlFlow::Continue(carry) => observe(carry),
            }

            if n < attempts {
                tracing::debug!(
                    attempt = n,
                    max = attempts,
                    delay_ms = self.interval.as_millis() as u64,
                    "nothing yet, polling again"
                );
                tokio::time::sleep(self.interval).await;
            }
        }

        PollOutcome::Exhausted { attempts }
    }
}
