use std::time::Duration;

use record_clerk_model::{ErrorKind, ModelProviderError};

/// The error type returned by the agent.
///
/// Failures of individual tools are not errors of the agent. They are
/// reported to the model as tool messages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The model could not produce a reply.
    #[error("model request failed ({kind}): {message}")]
    Model {
        /// The category of the failure.
        kind: ErrorKind,
        /// The description of the failure from the provider.
        message: String,
    },
    /// The last assistant message has tool calls without results.
    #[error("{count} tool call(s) are still waiting for results")]
    PendingToolCalls {
        /// The number of unanswered tool calls.
        count: usize,
    },
    /// The model kept asking for tools beyond the turn limit.
    #[error("no final answer after {limit} model turns")]
    TurnLimitExceeded {
        /// The maximum number of model turns in one run.
        limit: usize,
    },
}

impl Error {
    pub(crate) fn model_timed_out(limit: Duration) -> Self {
        Error::Model {
            kind: ErrorKind::TimedOut,
            message: format!("no response within {limit:?}"),
        }
    }

    /// Returns the model error kind, if this is a model error.
    #[inline]
    pub fn model_error_kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Model { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<Box<dyn ModelProviderError>> for Error {
    fn from(err: Box<dyn ModelProviderError>) -> Self {
        Error::Model {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
