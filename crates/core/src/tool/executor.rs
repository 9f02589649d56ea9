use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use record_clerk_model::{ToolCallRequest, ToolCallResult};
use tokio::time::timeout;
use tracing::Instrument;

use super::{Error, Registry, ToolResult};

/// An executor that answers tool call requests from the model.
///
/// Every request gets exactly one [`ToolCallResult`], even if the tool is
/// unknown, the arguments are invalid, the tool fails or times out. In
/// those cases the result content describes the failure, so the model can
/// react to it.
#[derive(Clone)]
pub struct Executor {
    registry: Arc<Registry>,
    timeout: Option<Duration>,
}

impl Executor {
    /// Creates an executor over the given registry.
    #[inline]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            timeout: None,
        }
    }

    /// Bounds the running time of each tool call.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the registry this executor dispatches to.
    #[inline]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Runs all requests concurrently and returns their results in request
    /// order, regardless of the order they complete in.
    pub async fn execute_all(
        &self,
        requests: &[ToolCallRequest],
    ) -> Vec<ToolCallResult> {
        let span = debug_span!("tool executor", count = requests.len());
        let calls = requests.iter().map(|req| {
            let id = req.id.clone();
            let name = req.name.clone();
            trace!("spawning a tool ({id}) with args: {:?}", req.arguments);
            let fut = self.registry.call(&req.name, req.arguments.clone());
            let limit = self.timeout;
            async move {
                let result = match limit {
                    Some(limit) => timeout(limit, fut)
                        .await
                        .unwrap_or_else(|_| Err(timed_out(limit))),
                    None => fut.await,
                };
                if let Err(err) = &result {
                    warn!("tool `{name}` ({id}) failed: {err}");
                }
                ToolCallResult {
                    id,
                    content: render_result(result),
                }
            }
        });
        join_all(calls).instrument(span).await
    }
}

fn timed_out(limit: Duration) -> Error {
    Error::timed_out()
        .with_reason(format!("the tool did not finish within {limit:?}"))
}

/// Renders a tool result as the content of a `tool` message.
pub(crate) fn render_result(result: ToolResult) -> String {
    match result {
        Ok(content) => content,
        Err(err) => format!("Error: {}", err.reason()),
    }
}
