use std::collections::HashMap;
use std::future::ready;
use std::sync::Arc;

use record_clerk_model::ModelTool;
use serde_json::Value;

use super::object::{ToolFuture, ToolObject, ToolObjectImpl};
use super::{Error, Tool, ToolResult};

/// Builder for [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    tools: Vec<Arc<dyn ToolObject>>,
}

impl RegistryBuilder {
    /// Registers a tool.
    ///
    /// A tool registered under an existing name replaces the previous one,
    /// keeping its position.
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        let tool: Arc<dyn ToolObject> = Arc::new(ToolObjectImpl(tool));
        match self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            Some(existing) => {
                warn!("tool `{}` is registered twice", tool.name());
                *existing = tool;
            }
            None => self.tools.push(tool),
        }
        self
    }

    /// Returns `true` if no tool has been registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Builds the registry.
    pub fn build(self) -> Registry {
        let index = self
            .tools
            .iter()
            .enumerate()
            .map(|(idx, tool)| (tool.name().to_owned(), idx))
            .collect();
        Registry {
            tools: self.tools,
            index,
        }
    }
}

/// A fixed set of tools, looked up by name.
///
/// The registry can't be changed once built. Share it with [`Arc`] between
/// agents that serve independent conversations.
#[derive(Default)]
pub struct Registry {
    tools: Vec<Arc<dyn ToolObject>>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Creates a builder.
    #[inline]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Returns `true` if a tool with this name is registered.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the names of all tools in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|tool| tool.name())
    }

    /// Returns the definitions of all tools in registration order.
    pub fn definitions(&self) -> Vec<ModelTool> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Arc<dyn ToolObject>> {
        self.index.get(name).map(|idx| &self.tools[*idx])
    }

    /// Calls the tool named `name` with raw JSON arguments.
    ///
    /// Unknown names and arguments that don't fit the tool's input are
    /// reported as errors of the returned future.
    pub fn call(&self, name: &str, arguments: Value) -> ToolFuture {
        match self.get(name) {
            Some(tool) => tool.execute(arguments),
            None => Box::pin(ready(ToolResult::Err(self.not_found(name)))),
        }
    }

    fn not_found(&self, name: &str) -> Error {
        let available = self.names().collect::<Vec<_>>().join(", ");
        Error::not_found().with_reason(format!(
            "there is no tool named `{name}`, available tools are: {available}"
        ))
    }
}
