use http::StatusCode;

use super::types::{Error, Kind};

impl Error {
    /// Returns true if the socket went away during either phase.
    #[must_use]
    pub fn is_socket(&self) -> bool {
        matches!(
            self.inner.kind,
            Kind::TransportDiedWriting | Kind::TransportDiedReading
        )
    }

    /// Returns true if the proxy answered, but not with a usable tunnel.
    #[must_use]
    pub fn is_client(&self) -> bool {
        matches!(
            self.inner.kind,
            Kind::UnexpectedStatus(_) | Kind::MalformedResponse
        )
    }

    /// Returns true if the socket died while the request was being written.
    #[must_use]
    pub fn is_write_phase(&self) -> bool {
        matches!(self.inner.kind, Kind::TransportDiedWriting)
    }

    /// Returns true if the socket died while the response was awaited.
    #[must_use]
    pub fn is_read_phase(&self) -> bool {
        matches!(self.inner.kind, Kind::TransportDiedReading)
    }

    /// Returns true if the response head could not be parsed.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self.inner.kind, Kind::MalformedResponse)
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self.inner.kind, Kind::Aborted)
    }

    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        matches!(self.inner.kind, Kind::Abandoned)
    }

    /// Returns the proxy's status code, if this error came from one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self.inner.kind {
            Kind::UnexpectedStatus(code) => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use super::*;
    use crate::connect::parser::ParseError;
    use crate::error::{died_reading, died_writing, malformed_response, unexpected_status};

    #[test]
    fn test_socket_errors_classify_as_socket() {
        let writing = died_writing(None);
        let reading = died_reading(Some(io::Error::from(io::ErrorKind::ConnectionReset)));

        assert!(writing.is_socket() && writing.is_write_phase());
        assert!(reading.is_socket() && reading.is_read_phase());
        assert!(!writing.is_client());
        assert!(writing.source().is_none());
        assert!(reading.source().is_some());
    }

    #[test]
    fn test_status_error_reports_code() {
        let error = unexpected_status(StatusCode::FORBIDDEN);

        assert!(error.is_client());
        assert_eq!(error.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(
            error.to_string(),
            "unexpected response status received from proxy: 403"
        );
    }

    #[test]
    fn test_malformed_error_chains_parse_cause() {
        let error = malformed_response(ParseError::HeadTooLarge { limit: 16 });

        assert!(error.is_malformed());
        let cause = error.source().expect("malformed errors carry their cause");
        assert!(cause.is::<ParseError>());
    }

    #[test]
    fn test_authority_is_attached() {
        let error = died_writing(None).with_authority("example.com:443");
        assert_eq!(error.authority(), Some("example.com:443"));
        assert!(format!("{error:?}").contains("example.com:443"));
    }
}
