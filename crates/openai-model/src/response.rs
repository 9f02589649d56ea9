use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use record_clerk_model::{
    ErrorKind, ModelFinishReason, ModelResponse, ModelResponseEvent,
    ToolCallRequest,
};
use serde_json::Value;

use crate::Error;
use crate::io::Sse;
use crate::proto::{ChatCompletionChunk, ToolCall};

struct PartialState {
    sse: Sse,
    id: Option<String>,
    tool_calls: Vec<ToolCall>,
    // Tool calls are only complete when the model moves on, so they are
    // emitted once the finish reason arrives, in the order they started.
    pending_tool_call_idx: VecDeque<usize>,
    // This field will be cleared after the response returns the complete event.
    pending_finish_reason: Option<ModelFinishReason>,
    finished: bool,
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextEvent = Result<(Option<ModelResponseEvent>, PartialState), Error>;

pin_project! {
    pub struct OpenAIResponse {
        next_event_fut: Option<PinnedFuture<NextEvent>>,
    }
}

impl OpenAIResponse {
    #[inline]
    pub fn from_sse(sse: Sse) -> Self {
        let partial_state = PartialState {
            sse,
            id: None,
            tool_calls: Default::default(),
            pending_tool_call_idx: Default::default(),
            pending_finish_reason: Default::default(),
            finished: false,
        };
        let next_event_fut = async move { next_event(partial_state).await };
        Self {
            next_event_fut: Some(Box::pin(next_event_fut)),
        }
    }
}

impl ModelResponse for OpenAIResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.project();
        let Some(next_event_fut) = this.next_event_fut else {
            return Poll::Ready(Ok(None));
        };
        let (event, partial_state) =
            match ready!(next_event_fut.as_mut().poll(cx)) {
                Ok((Some(event), partial_state)) => (event, partial_state),
                Ok((None, _)) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Ok(None));
                }
                Err(err) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Err(err));
                }
            };

        // The stream may still have more data to pull, create a new future for
        // the next event.
        let next_event_fut = async move { next_event(partial_state).await };
        *this.next_event_fut = Some(Box::pin(next_event_fut));

        Poll::Ready(Ok(Some(event)))
    }
}

async fn next_event(
    mut partial_state: PartialState,
) -> Result<(Option<ModelResponseEvent>, PartialState), Error> {
    let mut message_delta = None;

    while !partial_state.finished {
        let sse_event = match partial_state.sse.next_event().await {
            Ok(Some(event)) => event,
            Ok(None) => {
                partial_state.finished = true;
                break;
            }
            Err(err) => {
                return Err(Error::new(format!("{err:?}"), ErrorKind::Other));
            }
        };
        trace!("got sse event: {sse_event}");
        if sse_event == "[DONE]" {
            partial_state.finished = true;
            break;
        }

        let mut chunk = serde_json::from_str::<ChatCompletionChunk>(&sse_event)
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
        if partial_state.id.get_or_insert_with(|| chunk.id.clone()) != &chunk.id
        {
            return Err(Error::new("chunk id mismatch", ErrorKind::Other));
        };

        let Some(choice) = chunk.choices.pop() else {
            // Usage chunks have no choices.
            continue;
        };

        if let Some(content) = choice.delta.content {
            if !content.is_empty() {
                message_delta = Some(content);
            }
        }
        if let Some(tool_calls) = choice.delta.tool_calls {
            merge_tool_calls(&mut partial_state, tool_calls);
        }
        if let Some(finish_reason) = choice.finish_reason {
            let finish_reason = if finish_reason == "tool_calls" {
                ModelFinishReason::ToolCalls
            } else {
                ModelFinishReason::Stop
            };
            partial_state.pending_finish_reason = Some(finish_reason);
            partial_state.finished = true;
        }

        if message_delta.is_some() {
            break;
        }
    }

    // The order of events are important. Always emit message delta first, then
    // emit pending tool calls, and finally emit pending finish reason if any.

    if let Some(message_delta) = message_delta {
        return Ok((
            Some(ModelResponseEvent::MessageDelta(message_delta)),
            partial_state,
        ));
    }

    if let Some(idx) = partial_state.pending_tool_call_idx.pop_front() {
        let event = ModelResponseEvent::ToolCall(finish_tool_call(
            &partial_state.tool_calls[idx],
        ));
        return Ok((Some(event), partial_state));
    }

    if let Some(finish_reason) = partial_state.pending_finish_reason.take() {
        return Ok((
            Some(ModelResponseEvent::Completed(finish_reason)),
            partial_state,
        ));
    }

    Ok((None, partial_state))
}

fn merge_tool_calls(partial_state: &mut PartialState, tool_calls: Vec<ToolCall>) {
    for tool_call in tool_calls {
        let Some(partial_tool_call) = partial_state
            .tool_calls
            .iter_mut()
            .find(|t| t.index == tool_call.index)
        else {
            partial_state
                .pending_tool_call_idx
                .push_back(partial_state.tool_calls.len());
            partial_state.tool_calls.push(tool_call);
            continue;
        };
        // Patch the partial tool call.
        if let Some(id) = tool_call.id {
            partial_tool_call.id.get_or_insert_default().push_str(&id);
        }
        if let Some(function) = tool_call.function {
            match partial_tool_call.function {
                Some(ref mut partial_func) => {
                    if let Some(name) = function.name {
                        partial_func
                            .name
                            .get_or_insert_default()
                            .push_str(&name);
                    }
                    if let Some(arguments) = function.arguments {
                        partial_func
                            .arguments
                            .get_or_insert_default()
                            .push_str(&arguments);
                    }
                }
                None => partial_tool_call.function = Some(function),
            }
        }
    }
}

fn finish_tool_call(tool_call: &ToolCall) -> ToolCallRequest {
    let id = tool_call.id.clone().unwrap_or_default();
    let name = tool_call
        .function
        .as_ref()
        .and_then(|f| f.name.clone())
        .unwrap_or_default();
    // Malformed arguments are passed through as a string, so that the tool
    // reports them as invalid input instead of the whole turn failing.
    let arguments = tool_call
        .function
        .as_ref()
        .and_then(|f| f.arguments.as_deref())
        .map(|args| {
            if args.trim().is_empty() {
                return Value::Object(Default::default());
            }
            serde_json::from_str::<Value>(args)
                .unwrap_or_else(|_| Value::String(args.to_owned()))
        })
        .unwrap_or_else(|| Value::Object(Default::default()));
    ToolCallRequest {
        id,
        name,
        arguments,
    }
}
