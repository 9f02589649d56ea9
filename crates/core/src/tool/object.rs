use std::future::ready;
use std::pin::Pin;

use record_clerk_model::ModelTool;
use serde_json::Value;
use tracing::Instrument;

use super::{Error, Tool, ToolResult};

/// A boxed future resolving to a [`ToolResult`].
pub type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;

/// Type-erased [`Tool`], taking raw JSON arguments.
pub(crate) trait ToolObject: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameter_schema(&self) -> &Value;

    fn definition(&self) -> ModelTool {
        ModelTool {
            name: self.name().to_owned(),
            description: self.description().trim().to_owned(),
            parameters: self.parameter_schema().clone(),
        }
    }

    fn execute(&self, arguments: Value) -> ToolFuture;
}

pub(crate) struct ToolObjectImpl<T: Tool>(pub T);

impl<T: Tool> ToolObject for ToolObjectImpl<T> {
    #[inline]
    fn name(&self) -> &str {
        self.0.name()
    }

    #[inline]
    fn description(&self) -> &str {
        self.0.description()
    }

    #[inline]
    fn parameter_schema(&self) -> &Value {
        self.0.parameter_schema()
    }

    fn execute(&self, arguments: Value) -> ToolFuture {
        let input: T::Input = match serde_json::from_value(arguments) {
            Ok(input) => input,
            Err(err) => {
                let reason = format!("{err}");
                return Box::pin(ready(ToolResult::Err(
                    Error::invalid_input().with_reason(reason),
                )));
            }
        };

        let span = debug_span!("tool execute", name = self.0.name());
        Box::pin(self.0.execute(input).instrument(span))
    }
}
