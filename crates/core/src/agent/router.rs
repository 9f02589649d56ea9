use record_clerk_model::AssistantMessage;

/// Where the loop goes after a model turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// The message is the final answer.
    Terminate,
    /// The message asks for tools, which must run before the next turn.
    DispatchTools,
}

/// Decides the route after a model turn.
///
/// Only the presence of tool calls matters. The text of the message and
/// the finish reason reported by the model are not looked at.
#[inline]
pub fn route(message: &AssistantMessage) -> Route {
    if message.tool_calls.is_empty() {
        Route::Terminate
    } else {
        Route::DispatchTools
    }
}

#[cfg(test)]
mod tests {
    use record_clerk_model::ToolCallRequest;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_route() {
        assert_eq!(route(&AssistantMessage::text("Hi!")), Route::Terminate);
        assert_eq!(route(&AssistantMessage::default()), Route::Terminate);

        let mut message = AssistantMessage::text("Let me check.");
        message.tool_calls.push(ToolCallRequest {
            id: "call_1".to_owned(),
            name: "get_albums_by_artist".to_owned(),
            arguments: json!({ "artist": "AC/DC" }),
        });
        assert_eq!(route(&message), Route::DispatchTools);
    }
}
