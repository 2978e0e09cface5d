use std::error::Error as StdError;
use std::fmt;

use http::StatusCode;

/// A Result alias where the Err case is `tunnelkit_client::Error`.
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Represents the ways a CONNECT tunnel attempt can fail.
pub struct Error {
    pub(crate) inner: Box<Inner>,
}

pub(crate) struct Inner {
    pub(crate) kind: Kind,
    pub(crate) source: Option<BoxError>,
    pub(crate) authority: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// The socket went away while the CONNECT request was still being sent.
    TransportDiedWriting,
    /// The socket went away before a complete response head arrived.
    TransportDiedReading,
    /// The proxy answered with a well-formed response that is not `200`.
    UnexpectedStatus(StatusCode),
    /// The proxy's bytes could not be parsed as an HTTP response.
    MalformedResponse,
    /// An external collaborator (usually a timer) stopped the attempt.
    Aborted,
    /// The session was dropped by its reactor before it settled.
    Abandoned,
}

impl Error {
    pub(crate) fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(Inner {
                kind,
                source: None,
                authority: None,
            }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub(crate) fn with<E: Into<BoxError>>(mut self, source: E) -> Error {
        self.inner.source = Some(source.into());
        self
    }

    #[must_use]
    pub(crate) fn with_authority(mut self, authority: impl Into<String>) -> Error {
        self.inner.authority = Some(authority.into());
        self
    }

    /// The failure category.
    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.inner.kind
    }

    /// The `host:port` the tunnel was requested for, if known.
    #[must_use]
    pub fn authority(&self) -> Option<&str> {
        self.inner.authority.as_deref()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("tunnelkit::Error");

        f.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        if let Some(ref authority) = self.inner.authority {
            f.field("authority", authority);
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.kind {
            Kind::TransportDiedWriting => f.write_str(
                "proxy CONNECT failed: socket went away while writing tunneling request",
            ),
            Kind::TransportDiedReading => f.write_str(
                "proxy CONNECT failed: socket went away while awaiting tunneling response",
            ),
            Kind::UnexpectedStatus(code) => write!(
                f,
                "unexpected response status received from proxy: {}",
                code.as_u16()
            ),
            Kind::MalformedResponse => {
                f.write_str("invalid HTTP response received from proxy while establishing tunnel")
            }
            Kind::Aborted => f.write_str("proxy CONNECT aborted before the tunnel was established"),
            Kind::Abandoned => {
                f.write_str("proxy CONNECT session was dropped before it completed")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
