//! A local fake model for testing purpose.

mod preset;

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use record_clerk_model::{
    ErrorKind, ModelFinishReason, ModelMessage, ModelProvider,
    ModelProviderError, ModelRequest, ModelResponse, ModelResponseEvent,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub struct TestModelResponse {
    events: Vec<PresetEvent>,
    event_idx: usize,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ModelResponse for TestModelResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };

        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;

            if this.event_idx < this.events.len() {
                let event = match &this.events[this.event_idx] {
                    PresetEvent::MessageDelta(msg) => {
                        ModelResponseEvent::MessageDelta(msg.clone())
                    }
                    PresetEvent::ToolCall(req) => {
                        ModelResponseEvent::ToolCall(req.clone())
                    }
                };
                this.event_idx += 1;
                return Poll::Ready(Ok(Some(event)));
            } else if this.event_idx == this.events.len() {
                this.event_idx += 1;
                let has_tool_call = this
                    .events
                    .iter()
                    .any(|event| matches!(event, PresetEvent::ToolCall(_)));
                return Poll::Ready(Ok(Some(ModelResponseEvent::Completed(
                    if has_tool_call {
                        ModelFinishReason::ToolCalls
                    } else {
                        ModelFinishReason::Stop
                    },
                ))));
            } else {
                // In case this method is called after completion.
                return Poll::Ready(Ok(None));
            }
        }
        this.sleep = Some(Box::pin(sleep(this.delay)));
        Pin::new(this).poll_next_event(cx)
    }
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the conversation script, which
/// is how the model should respond to a request. A turn is selected by the
/// number of assistant messages already present in the request, so the first
/// request gets the first turn, the request after the first tool round gets
/// the second turn, and so on. If there are no enough turns in the script, an
/// error will be returned.
///
/// Every request is recorded and can be inspected with
/// [`TestModelProvider::requests`]. Clones share the recorded requests and
/// the failure counters.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    conversation_script: Vec<PresetResponse>,
    delay: Option<Duration>,
    attempts: Arc<Mutex<Vec<u64>>>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl TestModelProvider {
    #[inline]
    pub fn add_assistant_turn(&mut self, preset: PresetResponse) {
        self.conversation_script.push(preset);
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns all requests received so far.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_response(
        &self,
        req: &ModelRequest,
    ) -> Result<TestModelResponse, Error> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(req.clone());

        let turn_idx = req
            .messages
            .iter()
            .filter(|msg| matches!(msg, ModelMessage::Assistant(_)))
            .count();
        let Some(preset) = self.conversation_script.get(turn_idx) else {
            return Err(Error {
                message: "no enough turns",
                kind: ErrorKind::Other,
            });
        };

        if let Some(failures) = preset.failures {
            let mut attempts =
                self.attempts.lock().unwrap_or_else(PoisonError::into_inner);
            if attempts.len() <= turn_idx {
                attempts.resize(turn_idx + 1, 0);
            }
            attempts[turn_idx] += 1;
            if failures == 0 || attempts[turn_idx] <= failures {
                return Err(Error {
                    message: "preset failure",
                    kind: ErrorKind::RateLimitExceeded,
                });
            }
        }

        Ok(TestModelResponse {
            events: preset.events.clone(),
            event_idx: 0,
            delay: self.delay.unwrap_or(Duration::from_millis(1)),
            sleep: None,
        })
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;
    type Response = TestModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        ready(self.next_response(req))
    }
}
