//! A model provider for OpenAI-compatible APIs.

#[macro_use]
extern crate tracing;

mod config;
mod io;
mod proto;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::future::retry_notify;
use mime::Mime;
use record_clerk_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest,
};
use reqwest::{Client, Response, StatusCode, header};

pub use config::{OpenAIConfig, OpenAIConfigBuilder};
use io::Sse;
use response::OpenAIResponse;

/// Error type for [`OpenAIProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// OpenAI-compatible model provider.
///
/// Establishing a request is retried with exponential backoff when the
/// server is unreachable, rate limited or failing with a 5xx status. Once
/// the event stream has started, failures are reported as they are.
#[derive(Clone, Debug)]
pub struct OpenAIProvider {
    client: Client,
    config: Arc<OpenAIConfig>,
}

impl OpenAIProvider {
    /// Creates a new `OpenAIProvider` with the given configuration.
    #[inline]
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl ModelProvider for OpenAIProvider {
    type Error = Error;
    type Response = OpenAIResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let openai_req = proto::create_request(req, &self.config);
        let client = self.client.clone();
        let config = Arc::clone(&self.config);

        async move {
            let url = format!("{}/chat/completions", config.base_url);
            let backoff = ExponentialBackoff {
                max_elapsed_time: Some(config.max_retry_elapsed),
                ..Default::default()
            };
            let resp = retry_notify(
                backoff,
                || {
                    let resp_fut = client
                        .post(&url)
                        .header(
                            header::AUTHORIZATION,
                            format!("Bearer {}", config.api_key),
                        )
                        .header(header::CONTENT_TYPE, "application/json")
                        .header(header::ACCEPT, "text/event-stream")
                        .json(&openai_req)
                        .send();
                    async move { classify_response(resp_fut.await) }
                },
                |err: Error, wait: Duration| {
                    warn!("request failed ({err}), retrying in {wait:?}");
                },
            )
            .await?;

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_valid_content_type = content_type
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| m.essence_str() == "text/event-stream")
                .unwrap_or(false);
            if !is_valid_content_type {
                return Err(Error::new(
                    format!("Unexpected content type: {content_type:?}"),
                    ErrorKind::Other,
                ));
            }

            // Here we got a successful response.
            let sse = Sse::from_response(resp);
            Ok(OpenAIResponse::from_sse(sse))
        }
    }
}

fn classify_response(
    resp_or_err: Result<Response, reqwest::Error>,
) -> Result<Response, backoff::Error<Error>> {
    let resp = match resp_or_err {
        Ok(resp) => resp,
        Err(err) if err.is_connect() || err.is_timeout() => {
            return Err(backoff::Error::transient(Error::new(
                format!("{err}"),
                ErrorKind::Other,
            )));
        }
        Err(err) => {
            return Err(backoff::Error::permanent(Error::new(
                format!("{err}"),
                ErrorKind::Other,
            )));
        }
    };

    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    Err(classify_status(status))
}

fn classify_status(status: StatusCode) -> backoff::Error<Error> {
    let message = format!("server responded with {status}");
    if status == StatusCode::TOO_MANY_REQUESTS {
        backoff::Error::transient(Error::new(
            message,
            ErrorKind::RateLimitExceeded,
        ))
    } else if status.is_server_error() {
        backoff::Error::transient(Error::new(message, ErrorKind::Other))
    } else {
        backoff::Error::permanent(Error::new(message, ErrorKind::Other))
    }
}
