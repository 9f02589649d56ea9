use reqwest::Response;

use super::{Chunks, ChunksError};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    ChunksError(ChunksError),
    InvalidPayload,
}

/// A type for reading server-sent events from a chunk stream.
///
/// Only the `data` field is meaningful to chat completion streams.
/// Comments (keep-alive lines starting with `:`) and other fields are
/// skipped, events without data are dropped.
pub struct Sse {
    buf: String,
    pending: Vec<u8>,
    chunks: Chunks,
}

impl Sse {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            buf: String::new(),
            pending: Vec::new(),
            chunks,
        }
    }

    #[inline]
    pub fn from_response(response: Response) -> Self {
        Self::new(Chunks::from_response(response))
    }

    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            // There may be complete events left in the buffer.
            if let Some(event) = self.try_parse_event()? {
                return Ok(Some(event));
            }

            let Some(bytes) =
                self.chunks.next_chunk().await.map_err(Error::ChunksError)?
            else {
                // Incomplete trailing data is discarded.
                return Ok(None);
            };
            self.push_bytes(&bytes)?;
        }
    }

    fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        // A multi-byte character may be split across two chunks, keep the
        // incomplete tail until the next chunk arrives.
        self.pending.extend_from_slice(bytes);
        let valid_len = match str::from_utf8(&self.pending) {
            Ok(s) => s.len(),
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(_) => return Err(Error::InvalidPayload),
        };
        let rest = self.pending.split_off(valid_len);
        let valid = std::mem::replace(&mut self.pending, rest);
        // SAFETY: `valid` was checked to be UTF-8 above.
        self.buf
            .push_str(unsafe { str::from_utf8_unchecked(&valid) });
        if self.buf.contains('\r') {
            self.buf = self.buf.replace("\r\n", "\n");
        }
        Ok(())
    }

    fn try_parse_event(&mut self) -> Result<Option<String>, Error> {
        // event         = *( comment / field ) end-of-line
        // comment       = colon *any-char end-of-line
        // field         = 1*name-char [ colon [ space ] *any-char ] end-of-line
        while let Some(eol_idx) = self.buf.find("\n\n") {
            let mut data: Option<String> = None;
            for line in self.buf[0..eol_idx].split('\n') {
                if line.starts_with(':') {
                    continue;
                }
                let Some((name, value)) = line.split_once(':') else {
                    return Err(Error::InvalidPayload);
                };
                if name != "data" {
                    continue;
                }
                let value = value.strip_prefix(' ').unwrap_or(value);
                match &mut data {
                    Some(data) => {
                        data.push('\n');
                        data.push_str(value);
                    }
                    None => data = Some(value.to_owned()),
                }
            }

            // Consume the bytes from the buffer.
            self.buf.drain(0..eol_idx + 2);

            if data.is_some() {
                return Ok(data);
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[tokio::test]
    async fn test_normal_events() {
        let chunks = Chunks::from_scripted(
            vec![
                Bytes::from_static(b"data: hello\n\n"),
                Bytes::from_static(b"data: bye\n\n"),
            ]
            .into(),
        );
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "hello");
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "bye");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quirk_streaming() {
        let chunks = Chunks::from_scripted(
            vec![
                Bytes::from_static(b"data:"),
                Bytes::from_static(b" hello\n"),
                Bytes::from_static(b"\n"),
            ]
            .into(),
        );
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "hello");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_comments_and_crlf() {
        let chunks = Chunks::from_scripted(
            vec![
                Bytes::from_static(b": keep-alive\r\n\r\n"),
                Bytes::from_static(b"event: chunk\r\ndata: hello\r\n\r\n"),
            ]
            .into(),
        );
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "hello");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_split_utf8() {
        let text = "data: Motörhead\n\n".as_bytes();
        let split = text.iter().position(|b| *b == 0xc3).unwrap() + 1;
        let chunks = Chunks::from_scripted(
            vec![
                Bytes::copy_from_slice(&text[..split]),
                Bytes::copy_from_slice(&text[split..]),
            ]
            .into(),
        );
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "Motörhead");
    }

    #[tokio::test]
    async fn test_invalid_data() {
        let chunks = Chunks::from_scripted(
            vec![Bytes::from_static(b"xxxxxx\n\n")].into(),
        );
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap_err(), Error::InvalidPayload);

        let chunks = Chunks::from_scripted(
            vec![Bytes::from_static(b"xxxxxx\n")].into(),
        );
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap(), None);

        let chunks = Chunks::from_scripted(
            vec![
                Bytes::from_static(b"data: hello\n"),
                Bytes::from_static(b"data: bye\n"),
            ]
            .into(),
        );
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap(), None);
    }
}
