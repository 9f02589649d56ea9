#[cfg(test)]
use std::collections::VecDeque;
use std::fmt::{self, Display};

use bytes::Bytes;
use reqwest::Response;

/// The response body broke off, usually because the connection dropped.
#[derive(Debug, PartialEq, Eq)]
pub struct Error(pub String);

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to read the response body: {}", self.0)
    }
}

impl From<reqwest::Error> for Error {
    #[inline]
    fn from(err: reqwest::Error) -> Self {
        Error(err.to_string())
    }
}

enum Source {
    Body(Response),
    #[cfg(test)]
    Scripted(VecDeque<Bytes>),
}

/// The body of a streaming response, pulled one non-empty chunk at a
/// time.
pub struct Chunks {
    source: Source,
    received: usize,
}

impl Chunks {
    pub fn from_response(response: Response) -> Self {
        Self::new(Source::Body(response))
    }

    /// Replays the given chunks as if they came from the network.
    #[cfg(test)]
    pub fn from_scripted(chunks: VecDeque<Bytes>) -> Self {
        Self::new(Source::Scripted(chunks))
    }

    fn new(source: Source) -> Self {
        Self {
            source,
            received: 0,
        }
    }

    /// Returns the next chunk, or `None` once the body is exhausted.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, Error> {
        loop {
            let chunk = match &mut self.source {
                Source::Body(response) => response.chunk().await?,
                #[cfg(test)]
                Source::Scripted(chunks) => chunks.pop_front(),
            };
            let Some(chunk) = chunk else {
                trace!("body finished after {} bytes", self.received);
                return Ok(None);
            };
            if !chunk.is_empty() {
                self.received += chunk.len();
                return Ok(Some(chunk));
            }
        }
    }
}
