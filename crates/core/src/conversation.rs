//! Conversation-related types.
//!
//! A conversation is an append-only transcript. Messages are only ever
//! added at the end through [`append`], never edited or removed.

use std::collections::HashSet;
use std::mem;

use record_clerk_model::{AssistantMessage, ModelMessage, ToolCallRequest};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Merges `incoming` messages into `existing` ones.
///
/// The result is `existing` followed by `incoming`, in their original
/// order. Nothing is deduplicated or dropped.
#[inline]
pub fn append(
    mut existing: Vec<ModelMessage>,
    incoming: impl IntoIterator<Item = ModelMessage>,
) -> Vec<ModelMessage> {
    existing.extend(incoming);
    existing
}

/// Represents a conversation.
///
/// The system directive of the agent is not part of the conversation, it
/// is added to each request when the model is called.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ModelMessage>,
}

impl Conversation {
    /// Creates an empty conversation.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a conversation with a first user message.
    #[inline]
    pub fn with_user_message<S: Into<String>>(text: S) -> Self {
        let mut conversation = Self::new();
        conversation.append([ModelMessage::user(text)]);
        conversation
    }

    /// Appends a user message.
    ///
    /// Refused while the last assistant message has tool calls without
    /// results, since their results must directly follow it. Answer them
    /// first with [`Agent::dispatch_tools`](crate::Agent::dispatch_tools).
    pub fn push_user<S: Into<String>>(
        &mut self,
        text: S,
    ) -> Result<(), Error> {
        let pending = self.pending_tool_calls().len();
        if pending > 0 {
            return Err(Error::PendingToolCalls { count: pending });
        }
        self.append([ModelMessage::user(text)]);
        Ok(())
    }

    pub(crate) fn append(
        &mut self,
        incoming: impl IntoIterator<Item = ModelMessage>,
    ) {
        let existing = mem::take(&mut self.messages);
        self.messages = append(existing, incoming);
    }

    /// Returns all messages in order.
    #[inline]
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    /// Returns the number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no messages.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Consumes the conversation and returns its messages.
    #[inline]
    pub fn into_messages(self) -> Vec<ModelMessage> {
        self.messages
    }

    /// Returns the most recent assistant message, if any.
    pub fn last_assistant(&self) -> Option<&AssistantMessage> {
        self.messages.iter().rev().find_map(|msg| match msg {
            ModelMessage::Assistant(msg) => Some(msg),
            _ => None,
        })
    }

    /// Returns the final answer, which is the content of the last message
    /// when that message is an assistant message without tool calls.
    pub fn final_answer(&self) -> Option<&str> {
        match self.messages.last()? {
            ModelMessage::Assistant(msg) if msg.tool_calls.is_empty() => {
                Some(&msg.content)
            }
            _ => None,
        }
    }

    /// Returns the tool call requests of the most recent assistant message
    /// that have not been answered by a tool message yet, in request order.
    pub fn pending_tool_calls(&self) -> Vec<&ToolCallRequest> {
        let Some(assistant_idx) = self
            .messages
            .iter()
            .rposition(|msg| matches!(msg, ModelMessage::Assistant(_)))
        else {
            return vec![];
        };
        let ModelMessage::Assistant(assistant) = &self.messages[assistant_idx]
        else {
            unreachable!("position points to an assistant message");
        };

        let answered: HashSet<&str> = self.messages[assistant_idx + 1..]
            .iter()
            .filter_map(|msg| match msg {
                ModelMessage::Tool(result) => Some(result.id.as_str()),
                _ => None,
            })
            .collect();
        assistant
            .tool_calls
            .iter()
            .filter(|req| !answered.contains(req.id.as_str()))
            .collect()
    }
}

impl From<Vec<ModelMessage>> for Conversation {
    #[inline]
    fn from(messages: Vec<ModelMessage>) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use record_clerk_model::ToolCallResult;
    use serde_json::json;

    use super::*;

    fn tool_call(id: &str) -> ToolCallRequest {
        ToolCallRequest {
            id: id.to_owned(),
            name: "check_for_songs".to_owned(),
            arguments: json!({ "song_title": "Fast As a Shark" }),
        }
    }

    fn tool_result(id: &str) -> ModelMessage {
        ToolCallResult {
            id: id.to_owned(),
            content: "Name: Fast As a Shark".to_owned(),
        }
        .into()
    }

    #[test]
    fn test_append_preserves_order() {
        let existing = vec![ModelMessage::user("a"), ModelMessage::user("b")];
        let merged = append(existing.clone(), vec![ModelMessage::user("b")]);
        assert_eq!(
            merged,
            vec![
                ModelMessage::user("a"),
                ModelMessage::user("b"),
                ModelMessage::user("b"),
            ]
        );

        assert_eq!(
            append(existing.clone(), Vec::<ModelMessage>::new()),
            existing
        );
    }

    #[test]
    fn test_append_is_associative() {
        let s = vec![ModelMessage::user("hello")];
        let a: Vec<ModelMessage> =
            vec![AssistantMessage::tool_calls([tool_call("1")]).into()];
        let b: Vec<ModelMessage> =
            vec![tool_result("1"), AssistantMessage::text("done").into()];

        let left = append(append(s.clone(), a.clone()), b.clone());
        let right = append(s, append(a, b));
        assert_eq!(left, right);
    }

    #[test]
    fn test_pending_tool_calls() {
        let mut conversation = Conversation::with_user_message("Any sharks?");
        assert!(conversation.pending_tool_calls().is_empty());

        conversation.append([ModelMessage::Assistant(
            AssistantMessage::tool_calls([tool_call("1"), tool_call("2")]),
        )]);
        let pending: Vec<_> = conversation
            .pending_tool_calls()
            .into_iter()
            .map(|req| req.id.clone())
            .collect();
        assert_eq!(pending, ["1", "2"]);
        assert_eq!(conversation.final_answer(), None);

        conversation.append([tool_result("2")]);
        let pending: Vec<_> = conversation
            .pending_tool_calls()
            .into_iter()
            .map(|req| req.id.clone())
            .collect();
        assert_eq!(pending, ["1"]);

        conversation.append([tool_result("1")]);
        assert!(conversation.pending_tool_calls().is_empty());

        conversation.append([ModelMessage::Assistant(
            AssistantMessage::text("We have it."),
        )]);
        assert_eq!(conversation.final_answer(), Some("We have it."));
        assert_eq!(conversation.len(), 5);
    }

    #[test]
    fn test_push_user_waits_for_tool_results() {
        let mut conversation = Conversation::with_user_message("Any sharks?");
        conversation.append([ModelMessage::Assistant(
            AssistantMessage::tool_calls([tool_call("1")]),
        )]);

        let err = conversation.push_user("Never mind").unwrap_err();
        assert!(matches!(err, Error::PendingToolCalls { count: 1 }));
        assert_eq!(conversation.len(), 2);

        conversation.append([tool_result("1")]);
        conversation.push_user("Never mind").unwrap();
        let last = conversation.messages().last();
        assert_eq!(last, Some(&ModelMessage::user("Never mind")));
    }

    #[test]
    fn test_serialize_transcript() {
        let conversation = Conversation::with_user_message("Hi");
        assert_eq!(
            serde_json::to_value(&conversation).unwrap(),
            json!([{ "role": "user", "content": "Hi" }])
        );
    }
}
