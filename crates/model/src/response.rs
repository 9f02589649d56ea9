use std::pin::Pin;
use std::task::{self, Poll};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::provider::ModelProviderError;

/// A tool call the model asks for.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Identifies the call within its assistant message. The result of
    /// the call refers back to it.
    pub id: String,
    /// The name of the tool.
    pub name: String,
    /// The named arguments, normally a JSON object.
    ///
    /// Providers that receive arguments they can't parse keep the raw text
    /// as a JSON string, so the tool rejects it and the model sees why.
    pub arguments: Value,
}

impl ToolCallRequest {
    /// Creates a tool call request.
    #[inline]
    pub fn new<I, N>(id: I, name: N, arguments: Value) -> Self
    where
        I: Into<String>,
        N: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Why the model stopped producing a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// It is waiting for the results of the tool calls it emitted.
    ToolCalls,
    /// The reply is complete.
    Stop,
}

/// One piece of a streamed model response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelResponseEvent {
    /// More text of the reply.
    MessageDelta(String),
    /// A complete tool call request.
    ToolCall(ToolCallRequest),
    /// The model is done, no event follows except the end of the stream.
    Completed(ModelFinishReason),
}

/// A model response being received.
///
/// Consumers pull events until the stream ends, and fold them into one
/// assistant message: deltas are concatenated, tool calls kept in the
/// order they arrive.
pub trait ModelResponse: Sized + Send + 'static {
    /// The error type of the provider.
    type Error: ModelProviderError;

    /// Polls for the next event.
    ///
    /// Returns `Poll::Pending` while waiting (the waker in `cx` is
    /// notified when polling again may make progress), `Ok(Some(event))`
    /// for each event, `Ok(None)` once the stream has ended, and `Err` if
    /// receiving failed. After the end every call returns `Ok(None)`.
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_tool_call_request() {
        let req = ToolCallRequest::new(
            "call_1",
            "get_albums_by_artist",
            json!({ "artist": "AC/DC" }),
        );
        assert_eq!(req.id, "call_1");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "id": "call_1",
                "name": "get_albums_by_artist",
                "arguments": { "artist": "AC/DC" }
            })
        );
    }
}
