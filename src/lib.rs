// src/lib.rs
mod error;
pub mod logs;
pub mod outputs;
pub mod verify;

#[cfg(feature = "aws")]
pub mod cli;
#[cfg(feature = "aws")]
pub mod context;

pub use error::{QueryFailure, VerifyError};
pub use logs::{LogQuery, LogRecord, LogSearch, LogSearchError};
pub use outputs::{OutputReader, StackOutputs, StaticOutputs, TerraformOutputs};
pub use verify::{
    InvocationVerifier, Outcome, PollOutcome, PollPolicy, VerificationReport, INVOCATION_MARKER,
};

// Re-export tracing for use in other modules
pub use tracing;
