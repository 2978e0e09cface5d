use std::io;

use http::StatusCode;

use super::types::{Error, Kind};
use crate::connect::parser::ParseError;

/// Creates an `Error` for a socket that died while the request was in flight.
pub fn died_writing(cause: Option<io::Error>) -> Error {
    with_optional_cause(Error::new(Kind::TransportDiedWriting), cause)
}

/// Creates an `Error` for a socket that died before the response was complete.
pub fn died_reading(cause: Option<io::Error>) -> Error {
    with_optional_cause(Error::new(Kind::TransportDiedReading), cause)
}

/// Creates an `Error` for a proxy answering with anything but `200`.
pub fn unexpected_status(status: StatusCode) -> Error {
    Error::new(Kind::UnexpectedStatus(status))
}

/// Creates an `Error` for bytes that do not form an HTTP response.
pub fn malformed_response(cause: ParseError) -> Error {
    Error::new(Kind::MalformedResponse).with(cause)
}

/// Creates an `Error` for an attempt stopped from outside the state machine.
pub fn aborted() -> Error {
    Error::new(Kind::Aborted)
}

/// Creates an `Error` for a session dropped before it settled.
pub fn abandoned() -> Error {
    Error::new(Kind::Abandoned)
}

fn with_optional_cause(error: Error, cause: Option<io::Error>) -> Error {
    match cause {
        Some(cause) => error.with(cause),
        None => error,
    }
}
