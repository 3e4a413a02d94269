//! Go Text Protocol (GTP) front end.
//!
//! Reads one command per line, replies with one `=`/`?` block per command,
//! and ponders in the background while the client is quiet.

use std::fmt;

pub mod command;
mod engine;
mod handlers;
pub mod options;
pub mod ponder;
pub mod queue;
pub mod reader;
pub mod registry;
pub mod response;

pub use command::{parse_line, Command};
pub use engine::{GtpEngine, ENGINE_NAME, IDLE_POLL_INTERVAL};
pub use options::EngineOptions;
pub use ponder::{DeadlineOverflow, PonderMode, PonderPoll, PonderScheduler};
pub use queue::{LineQueue, PopTimeoutError};
pub use registry::{check_exact, check_range, dispatch, CommandRegistry, Handler};
pub use response::Response;

/// Error type for GTP command handling.
///
/// The `Display` text is what the client sees after `?`, so it must stay
/// stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GtpError {
    /// No handler registered under the command name
    UnknownCommand,
    /// Wrong number of arguments; `min == max` for exact arity
    ArgCount {
        min: usize,
        max: usize,
        got: usize,
        args: String,
    },
    /// An argument failed to parse or is out of range
    InvalidArgument(String),
    /// The command isn't allowed in the current game state
    IllegalState(String),
    /// A collaborator (file, player) failed
    Collaborator(String),
}

impl GtpError {
    pub fn invalid(message: impl Into<String>) -> Self {
        GtpError::InvalidArgument(message.into())
    }

    pub fn illegal(message: impl Into<String>) -> Self {
        GtpError::IllegalState(message.into())
    }
}

impl fmt::Display for GtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GtpError::UnknownCommand => write!(f, "unknown command"),
            GtpError::ArgCount {
                min,
                max,
                got,
                args,
            } => {
                if min == max {
                    write!(f, "expected {min} args, got {got} args: {args}")
                } else {
                    write!(f, "expected between {min} and {max} args, got {got} args: {args}")
                }
            }
            GtpError::InvalidArgument(message)
            | GtpError::IllegalState(message)
            | GtpError::Collaborator(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for GtpError {}
