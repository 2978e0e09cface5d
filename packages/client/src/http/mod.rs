//! HTTP request and response types for the middleware surface

pub mod request;
pub mod response;

pub use request::{HttpRequest, PushHandler};
pub use response::HttpResponse;
