use std::future::poll_fn;
use std::pin::{Pin, pin};
use std::sync::Arc;

use record_clerk_model::{
    AssistantMessage, ModelFinishReason, ModelProvider, ModelProviderError,
    ModelRequest, ModelResponse, ModelResponseEvent,
};
use tracing::Instrument;

type SendRequestResult =
    Result<ModelClientResponse, Box<dyn ModelProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// A wrapper around a model provider that provides a type-erased
/// interface for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    let resp_or_err = fut.await;
                    handle_response::<P>(resp_or_err).await
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a request and returns the completely received response.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. The response stops streaming further
    /// events when this operation is cancelled.
    #[inline]
    pub async fn send_request(&self, req: ModelRequest) -> SendRequestResult {
        (self.handler_fn)(req).await
    }
}

/// A completely received response from the model client.
#[derive(Clone, Debug)]
pub struct ModelClientResponse {
    /// Message deltas and tool calls folded into one message.
    pub message: AssistantMessage,
    /// The reason the model finished generating.
    pub finish_reason: Option<ModelFinishReason>,
}

async fn handle_response<P: ModelProvider + 'static>(
    resp_or_err: Result<P::Response, P::Error>,
) -> SendRequestResult {
    let resp = match resp_or_err {
        Ok(resp) => resp,
        Err(err) => {
            error!("got an error: {err:?}");
            return Err(Box::new(err));
        }
    };

    let mut message = AssistantMessage::default();
    let mut finish_reason = None;

    trace!("start receiving events");

    let mut pinned_resp = pin!(resp);
    loop {
        let event_or_err =
            poll_fn(|cx| pinned_resp.as_mut().poll_next_event(cx)).await;
        let event = match event_or_err {
            Ok(event) => event,
            Err(err) => {
                error!("got an error: {err:?}");
                return Err(Box::new(err));
            }
        };

        let Some(event) = event else {
            break;
        };
        trace!("got an event: {event:?}");

        match event {
            ModelResponseEvent::MessageDelta(delta) => {
                message.content.push_str(&delta);
            }
            ModelResponseEvent::ToolCall(req) => {
                message.tool_calls.push(req);
            }
            ModelResponseEvent::Completed(reason) => {
                finish_reason = Some(reason);
            }
        }
    }

    trace!("finished a request");

    Ok(ModelClientResponse {
        message,
        finish_reason,
    })
}

#[cfg(test)]
mod tests {
    use record_clerk_model::{ErrorKind, ModelMessage, ToolCallRequest};
    use record_clerk_test_model::{
        PresetEvent, PresetResponse, TestModelProvider,
    };
    use serde_json::json;

    use super::*;

    fn request() -> ModelRequest {
        ModelRequest {
            messages: vec![ModelMessage::user("Do you have any Queen?")],
            tools: vec![],
        }
    }

    #[tokio::test]
    async fn test_send_request() {
        let tool_call = ToolCallRequest {
            id: "call_1".to_owned(),
            name: "get_tracks_by_artist".to_owned(),
            arguments: json!({ "artist": "Queen" }),
        };
        let mut model_provider = TestModelProvider::default();
        model_provider.add_assistant_turn(PresetResponse::with_events([
            PresetEvent::MessageDelta("Let me ".to_owned()),
            PresetEvent::MessageDelta("check.".to_owned()),
            PresetEvent::ToolCall(tool_call.clone()),
        ]));

        let model_client = ModelClient::new(model_provider);

        for _ in 0..3 {
            let resp = model_client.send_request(request()).await.unwrap();
            assert_eq!(resp.message.content, "Let me check.");
            assert_eq!(resp.message.tool_calls, vec![tool_call.clone()]);
            assert_eq!(resp.finish_reason, Some(ModelFinishReason::ToolCalls));
        }
    }

    #[tokio::test]
    async fn test_error_handling() {
        let model_provider = TestModelProvider::default();
        let model_client = ModelClient::new(model_provider);
        let err = model_client.send_request(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
