use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::task::{self, Poll, ready};
use std::time::Duration;

use record_clerk_model::{
    ErrorKind, ModelFinishReason, ModelMessage, ModelProvider,
    ModelProviderError, ModelRequest, ModelResponse, ModelResponseEvent,
    ToolCallRequest,
};
use serde_json::json;
use tokio::time::{Sleep, sleep};

#[derive(Debug)]
struct FakeModelProviderError(ErrorKind);

impl Display for FakeModelProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeModelProviderError {}

impl ModelProviderError for FakeModelProviderError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Echoes the first user message word by word. If the user asks for
/// "songs", a tool call is emitted after the text.
#[derive(Debug)]
struct FakeModelResponse {
    fake_items: VecDeque<ModelResponseEvent>,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl FakeModelResponse {
    fn new(input: &str) -> Self {
        let words = format!("You said {input}");
        let mut words = words.split(' ').peekable();
        let mut fake_items = VecDeque::new();
        while let Some(word) = words.next() {
            let mut word = word.to_owned();
            if words.peek().is_some() {
                word.push(' ');
            }
            fake_items.push_back(ModelResponseEvent::MessageDelta(word));
        }
        let finish_reason = if input.contains("songs") {
            fake_items.push_back(ModelResponseEvent::ToolCall(
                ToolCallRequest {
                    id: "call_0".to_owned(),
                    name: "check_for_songs".to_owned(),
                    arguments: json!({ "song_title": input }),
                },
            ));
            ModelFinishReason::ToolCalls
        } else {
            ModelFinishReason::Stop
        };
        fake_items.push_back(ModelResponseEvent::Completed(finish_reason));
        Self {
            fake_items,
            sleep: None,
        }
    }
}

impl ModelResponse for FakeModelResponse {
    type Error = FakeModelProviderError;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };
        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;
            return Poll::Ready(Ok(this.fake_items.pop_front()));
        }
        this.sleep = Some(Box::pin(sleep(Duration::from_millis(1))));
        Pin::new(this).poll_next_event(cx)
    }
}

struct FakeModelProvider;

impl ModelProvider for FakeModelProvider {
    type Error = FakeModelProviderError;
    type Response = FakeModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let content = req
            .messages
            .iter()
            .find(|msg| matches!(msg, ModelMessage::User { .. }))
            .map(|msg| msg.content().to_owned());
        let result = match content {
            Some(content) => Ok(FakeModelResponse::new(&content)),
            None => Err(FakeModelProviderError(ErrorKind::Other)),
        };
        ready(result)
    }
}

mod tests {
    use std::future::poll_fn;

    use super::*;

    async fn collect(
        mut resp: FakeModelResponse,
    ) -> (String, Vec<ToolCallRequest>, Option<ModelFinishReason>) {
        let mut text = String::new();
        let mut tool_calls = vec![];
        let mut finish_reason = None;
        loop {
            let resp_fut =
                poll_fn(|cx| Pin::new(&mut resp).poll_next_event(cx));
            match resp_fut.await {
                Ok(Some(event)) => match event {
                    ModelResponseEvent::MessageDelta(delta) => {
                        text.push_str(&delta);
                    }
                    ModelResponseEvent::ToolCall(req) => tool_calls.push(req),
                    ModelResponseEvent::Completed(reason) => {
                        finish_reason = Some(reason);
                    }
                },
                Ok(None) => break,
                Err(err) => unreachable!("unexpected error: {err:?}"),
            }
        }
        (text, tool_calls, finish_reason)
    }

    #[tokio::test]
    async fn test_completion() {
        let provider = FakeModelProvider;
        let req = ModelRequest {
            messages: vec![
                ModelMessage::system("Be nice."),
                ModelMessage::user("Good morning"),
            ],
            tools: vec![],
        };
        let resp = provider.send_request(&req).await.unwrap();
        let (text, tool_calls, finish_reason) = collect(resp).await;

        assert_eq!(text, "You said Good morning");
        assert!(tool_calls.is_empty());
        assert_eq!(finish_reason, Some(ModelFinishReason::Stop));
    }

    #[tokio::test]
    async fn test_tool_call() {
        let provider = FakeModelProvider;
        let req = ModelRequest {
            messages: vec![ModelMessage::user("any songs?")],
            tools: vec![],
        };
        let resp = provider.send_request(&req).await.unwrap();
        let (_, tool_calls, finish_reason) = collect(resp).await;

        assert_eq!(tool_calls.len(), 1);
        assert_eq!(tool_calls[0].name, "check_for_songs");
        assert_eq!(finish_reason, Some(ModelFinishReason::ToolCalls));
    }

    #[tokio::test]
    async fn test_error() {
        let provider = FakeModelProvider;
        let req = ModelRequest {
            messages: vec![],
            tools: vec![],
        };
        let result = provider.send_request(&req).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
