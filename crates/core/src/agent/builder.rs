use std::sync::Arc;
use std::time::Duration;

use record_clerk_model::ModelProvider;

use super::Agent;
use crate::model_client::ModelClient;
use crate::tool::{Executor as ToolExecutor, Registry, RegistryBuilder, Tool};

const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_TURNS: usize = 25;

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    system_prompt: Option<Arc<str>>,
    tools: RegistryBuilder,
    registry: Option<Arc<Registry>>,
    model_timeout: Option<Duration>,
    tool_timeout: Option<Duration>,
    max_turns: usize,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            system_prompt: None,
            tools: Registry::builder(),
            registry: None,
            model_timeout: Some(DEFAULT_MODEL_TIMEOUT),
            tool_timeout: Some(DEFAULT_TOOL_TIMEOUT),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    /// Sets the system prompt sent ahead of the conversation on every
    /// model turn.
    #[inline]
    pub fn with_system_prompt<S: Into<Arc<str>>>(
        mut self,
        prompt: S,
    ) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Registers a tool.
    ///
    /// Ignored if a shared registry is set with
    /// [`with_registry`](Self::with_registry).
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.tools = self.tools.with_tool(tool);
        self
    }

    /// Uses a registry that is shared with other agents.
    #[inline]
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets how long a model turn may take. `None` waits forever.
    #[inline]
    pub fn with_model_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.model_timeout = timeout;
        self
    }

    /// Sets how long a single tool call may take. `None` waits forever.
    #[inline]
    pub fn with_tool_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Sets the maximum number of model turns in one run.
    #[inline]
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Builds the agent.
    pub fn build(self) -> Agent {
        let registry = match self.registry {
            Some(registry) => {
                if !self.tools.is_empty() {
                    warn!("tools added with `with_tool` are ignored");
                }
                registry
            }
            None => Arc::new(self.tools.build()),
        };

        let mut tool_executor = ToolExecutor::new(registry);
        if let Some(timeout) = self.tool_timeout {
            tool_executor = tool_executor.with_timeout(timeout);
        }

        Agent {
            model_client: self.model_client,
            tool_executor,
            system_prompt: self.system_prompt,
            model_timeout: self.model_timeout,
            max_turns: self.max_turns,
        }
    }
}
