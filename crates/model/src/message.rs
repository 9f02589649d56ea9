use serde::{Deserialize, Serialize};

use crate::ToolCallRequest;

/// The author of a message in the transcript.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model.
    System,
    /// The human on the other side.
    User,
    /// The model itself.
    Assistant,
    /// The output of a tool call.
    Tool,
}

/// A complete message in the transcript.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ModelMessage {
    /// The system instructions.
    System {
        /// The instruction text.
        content: String,
    },
    /// A user input text.
    User {
        /// The input text.
        content: String,
    },
    /// A message produced by the model.
    Assistant(AssistantMessage),
    /// A tool call result.
    Tool(ToolCallResult),
}

impl ModelMessage {
    /// Creates a system message.
    #[inline]
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Returns the role of this message.
    #[inline]
    pub fn role(&self) -> Role {
        match self {
            ModelMessage::System { .. } => Role::System,
            ModelMessage::User { .. } => Role::User,
            ModelMessage::Assistant(_) => Role::Assistant,
            ModelMessage::Tool(_) => Role::Tool,
        }
    }

    /// Returns the text content of this message.
    ///
    /// Assistant messages that only carry tool calls have an empty
    /// content.
    #[inline]
    pub fn content(&self) -> &str {
        match self {
            ModelMessage::System { content } => content,
            ModelMessage::User { content } => content,
            ModelMessage::Assistant(msg) => &msg.content,
            ModelMessage::Tool(result) => &result.content,
        }
    }
}

/// A message produced by the model, which may carry tool call requests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// The text the model wrote, possibly empty.
    pub content: String,
    /// Tool calls requested by the model, in the order it emitted them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
}

impl AssistantMessage {
    /// Creates an assistant message with text only.
    #[inline]
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            tool_calls: vec![],
        }
    }

    /// Creates an assistant message that only requests tool calls.
    #[inline]
    pub fn tool_calls(tool_calls: impl Into<Vec<ToolCallRequest>>) -> Self {
        Self {
            content: String::new(),
            tool_calls: tool_calls.into(),
        }
    }
}

impl From<AssistantMessage> for ModelMessage {
    #[inline]
    fn from(msg: AssistantMessage) -> Self {
        ModelMessage::Assistant(msg)
    }
}

/// The result of calling a tool.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// The identifier of the tool call request this result answers.
    #[serde(rename = "tool_call_id")]
    pub id: String,
    /// The result of the tool call.
    pub content: String,
}

impl From<ToolCallResult> for ModelMessage {
    #[inline]
    fn from(result: ToolCallResult) -> Self {
        ModelMessage::Tool(result)
    }
}
