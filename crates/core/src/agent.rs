mod builder;
mod error;
mod router;
mod state;

use std::sync::Arc;
use std::time::Duration;

use record_clerk_model::{
    AssistantMessage, ModelMessage, ModelRequest, ToolCallRequest,
};
use tokio::time::timeout;
use tracing::Instrument;

pub use builder::AgentBuilder;
pub use error::Error;
pub use router::{Route, route};
pub use state::Stage;

use crate::conversation::Conversation;
use crate::model_client::ModelClient;
use crate::tool::Executor as ToolExecutor;

/// An agent, which alternates between calling the model and running the
/// tools it asks for, until the model answers without tool calls.
///
/// The agent holds no conversation state of its own. The same agent (or
/// its clones, which are cheap) can serve any number of independent
/// conversations.
#[derive(Clone)]
pub struct Agent {
    model_client: ModelClient,
    tool_executor: ToolExecutor,
    system_prompt: Option<Arc<str>>,
    model_timeout: Option<Duration>,
    max_turns: usize,
}

impl Agent {
    /// Runs a single model turn.
    ///
    /// The model sees the system prompt, the whole conversation and the
    /// definitions of all registered tools. Its reply is appended to the
    /// conversation and returned.
    ///
    /// The turn is refused if the last assistant message still has tool
    /// calls without results. On any error the conversation is left
    /// untouched.
    pub async fn run_turn(
        &self,
        conversation: &mut Conversation,
    ) -> Result<AssistantMessage, Error> {
        let pending = conversation.pending_tool_calls().len();
        if pending > 0 {
            return Err(Error::PendingToolCalls { count: pending });
        }

        let req = self.build_model_request(conversation);
        let fut = self.model_client.send_request(req);
        let resp = match self.model_timeout {
            Some(limit) => timeout(limit, fut)
                .await
                .map_err(|_| Error::model_timed_out(limit))?,
            None => fut.await,
        }
        .map_err(|err| {
            error!("model turn failed: {err}");
            Error::from(err)
        })?;

        debug!(
            "model finished ({:?}) with {} tool call(s)",
            resp.finish_reason,
            resp.message.tool_calls.len()
        );
        conversation.append([ModelMessage::Assistant(resp.message.clone())]);
        Ok(resp.message)
    }

    /// Runs all pending tool calls of the conversation and appends their
    /// results, in request order, in one go.
    ///
    /// Returns the number of tool messages appended. Tool failures are
    /// reported to the model as tool messages, never as errors.
    pub async fn dispatch_tools(
        &self,
        conversation: &mut Conversation,
    ) -> usize {
        let requests: Vec<ToolCallRequest> = conversation
            .pending_tool_calls()
            .into_iter()
            .cloned()
            .collect();
        if requests.is_empty() {
            return 0;
        }

        let results = self.tool_executor.execute_all(&requests).await;
        let count = results.len();
        conversation.append(results.into_iter().map(ModelMessage::Tool));
        count
    }

    /// Drives the conversation until the model gives a final answer, and
    /// returns that answer.
    ///
    /// If the conversation ends with unanswered tool calls, they are run
    /// first. Everything produced before a failure stays in the
    /// conversation.
    pub async fn run(
        &self,
        conversation: &mut Conversation,
    ) -> Result<String, Error> {
        let span = debug_span!("agent run", messages = conversation.len());
        async move {
            let mut stage = Stage::of(conversation);
            let mut turns = 0;
            loop {
                trace!("stage: {stage:?}");
                match stage {
                    Stage::AwaitingTools => {
                        let count = self.dispatch_tools(conversation).await;
                        debug!("appended {count} tool result(s)");
                        stage = Stage::AwaitingModel;
                    }
                    Stage::AwaitingModel => {
                        if turns >= self.max_turns {
                            warn!("stopped after {turns} model turns");
                            return Err(Error::TurnLimitExceeded {
                                limit: self.max_turns,
                            });
                        }
                        turns += 1;

                        let message = self.run_turn(conversation).await?;
                        match route(&message) {
                            Route::Terminate => return Ok(message.content),
                            Route::DispatchTools => {
                                stage = Stage::AwaitingTools;
                            }
                        }
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Runs the conversation to its final answer and returns it with
    /// everything appended along the way.
    pub async fn invoke(
        &self,
        mut conversation: Conversation,
    ) -> Result<Conversation, Error> {
        self.run(&mut conversation).await?;
        Ok(conversation)
    }

    fn build_model_request(
        &self,
        conversation: &Conversation,
    ) -> ModelRequest {
        let system = self.system_prompt.as_deref().map(ModelMessage::system);
        ModelRequest {
            messages: system
                .into_iter()
                .chain(conversation.messages().iter().cloned())
                .collect(),
            tools: self.tool_executor.registry().definitions(),
        }
    }
}
