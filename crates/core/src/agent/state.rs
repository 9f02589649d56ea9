use crate::conversation::Conversation;

/// The stage of the agent loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The next step is a model turn.
    AwaitingModel,
    /// The last model turn asked for tools that have not run yet.
    AwaitingTools,
}

impl Stage {
    /// Returns the stage a conversation is in.
    pub fn of(conversation: &Conversation) -> Self {
        if conversation.pending_tool_calls().is_empty() {
            Stage::AwaitingModel
        } else {
            Stage::AwaitingTools
        }
    }
}
