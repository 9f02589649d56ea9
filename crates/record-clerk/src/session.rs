use std::time::Duration;

use record_clerk_core::{Agent, AgentBuilder, Conversation, Error};
use record_clerk_model::ModelProvider;

use crate::catalog::Catalog;
use crate::tools::register_builtin_tools;

/// The music store clerk's instructions.
pub const DEFAULT_SYSTEM_PROMPT: &str = include_str!("./system_prompt.md");

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
    catalog: Option<Catalog>,
    system_prompt: Option<String>,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        let agent_builder = AgentBuilder::with_model_provider(provider);
        Self {
            agent_builder,
            catalog: None,
            system_prompt: None,
        }
    }

    /// Sets the catalog the built-in tools look up.
    #[inline]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Replaces the default system prompt.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets how long a model turn may take.
    #[inline]
    pub fn with_model_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.agent_builder = self.agent_builder.with_model_timeout(timeout);
        self
    }

    /// Sets how long a tool call may take.
    #[inline]
    pub fn with_tool_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.agent_builder = self.agent_builder.with_tool_timeout(timeout);
        self
    }

    /// Sets the maximum number of model turns per message.
    #[inline]
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.agent_builder = self.agent_builder.with_max_turns(max_turns);
        self
    }

    /// Builds a new session.
    pub fn build(self) -> Session {
        let system_prompt = self
            .system_prompt
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.trim().to_owned());
        let mut agent_builder =
            self.agent_builder.with_system_prompt(system_prompt);
        match &self.catalog {
            Some(catalog) => {
                agent_builder = register_builtin_tools(agent_builder, catalog);
            }
            None => warn!("no catalog is set, the session has no tools"),
        }

        Session {
            agent: agent_builder.build(),
            conversation: Conversation::new(),
        }
    }
}

/// A chat session with the music store clerk.
///
/// The session owns one conversation. Each message runs the agent until it
/// answers, and everything said along the way is kept for the next one.
pub struct Session {
    agent: Agent,
    conversation: Conversation,
}

impl Session {
    /// Sends a message and returns the clerk's answer.
    ///
    /// Tool calls left unanswered by an interrupted message are answered
    /// before the new message is added. On error the message and anything
    /// produced before the failure stay in the conversation.
    pub async fn send_message(
        &mut self,
        message: &str,
    ) -> Result<String, Error> {
        self.agent.dispatch_tools(&mut self.conversation).await;
        self.conversation.push_user(message)?;
        self.agent.run(&mut self.conversation).await
    }

    /// Returns the conversation so far.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}
