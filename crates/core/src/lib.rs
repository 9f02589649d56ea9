//! Core logic of the agent: the transcript, tool dispatch and the loop
//! that interleaves model turns with tool calls.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod conversation;
mod model_client;
pub mod tool;

pub use agent::{Agent, AgentBuilder, Error, Route, Stage, route};
pub use conversation::Conversation;

/// Re-exports of [`record_clerk_model`] types that appear in this crate's
/// public API.
pub mod model {
    pub use record_clerk_model::{
        AssistantMessage, ErrorKind, ModelMessage, ModelProvider,
        ModelRequest, ModelTool, Role, ToolCallRequest, ToolCallResult,
    };
}
