//! Incremental parser for a proxy's answer to CONNECT
//!
//! A response to CONNECT has no body framing: once the head is complete,
//! every following byte belongs to the tunnel. Only the head is parsed here
//! and anything buffered after it is handed back untouched.

use bytes::{Buf, Bytes, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Version};

use crate::config::TunnelConfig;

/// Why the proxy's bytes could not be understood.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed response head: {0}")]
    Syntax(#[from] httparse::Error),

    #[error("response head exceeds {limit} bytes")]
    HeadTooLarge { limit: usize },

    #[error("invalid status code {0}")]
    InvalidStatus(u16),

    #[error("invalid header {0:?}")]
    InvalidHeader(String),
}

/// Status line and headers of a complete response head.
#[derive(Debug, Clone)]
pub struct ParsedResponse {
    pub version: Version,
    pub status: StatusCode,
    pub reason: String,
    pub headers: HeaderMap,
    /// Length of the status line plus headers plus the blank line.
    pub head_len: usize,
}

#[derive(Debug)]
pub struct ResponseParser {
    buffer: BytesMut,
    max_head: usize,
    max_headers: usize,
}

impl ResponseParser {
    /// A parser for the response to a CONNECT request.
    #[must_use]
    pub fn for_connect(config: &TunnelConfig) -> Self {
        Self {
            buffer: BytesMut::new(),
            max_head: config.max_response_head,
            max_headers: config.max_headers,
        }
    }

    /// Appends freshly read bytes.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes buffered and not yet consumed by a parsed head.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Tries to parse a complete response head out of the buffered bytes.
    ///
    /// `Ok(None)` means more bytes are needed. On success the head is
    /// consumed and [`into_remaining`](Self::into_remaining) yields what
    /// followed it.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` when the bytes cannot be an HTTP response or
    /// the head grows past the configured limit.
    pub fn try_parse(&mut self) -> Result<Option<ParsedResponse>, ParseError> {
        let mut slots = vec![httparse::EMPTY_HEADER; self.max_headers];
        let mut response = httparse::Response::new(&mut slots);

        let head_len = match response.parse(&self.buffer)? {
            httparse::Status::Complete(len) => len,
            httparse::Status::Partial => {
                if self.buffer.len() > self.max_head {
                    return Err(ParseError::HeadTooLarge {
                        limit: self.max_head,
                    });
                }
                return Ok(None);
            }
        };

        if head_len > self.max_head {
            return Err(ParseError::HeadTooLarge {
                limit: self.max_head,
            });
        }

        let code = response.code.unwrap_or_default();
        let status = StatusCode::from_u16(code).map_err(|_| ParseError::InvalidStatus(code))?;
        let version = match response.version {
            Some(0) => Version::HTTP_10,
            _ => Version::HTTP_11,
        };
        let reason = response.reason.unwrap_or_default().to_owned();

        let mut headers = HeaderMap::with_capacity(response.headers.len());
        for header in response.headers.iter() {
            let name = HeaderName::from_bytes(header.name.as_bytes())
                .map_err(|_| ParseError::InvalidHeader(header.name.to_owned()))?;
            let value = HeaderValue::from_bytes(header.value)
                .map_err(|_| ParseError::InvalidHeader(header.name.to_owned()))?;
            headers.append(name, value);
        }

        self.buffer.advance(head_len);

        Ok(Some(ParsedResponse {
            version,
            status,
            reason,
            headers,
            head_len,
        }))
    }

    /// Bytes that arrived after the parsed head.
    #[must_use]
    pub fn into_remaining(self) -> Bytes {
        self.buffer.freeze()
    }
}
