//! HTTP middleware for request/response processing

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};

/// HTTP middleware trait
pub trait Middleware: Send + Sync {
    /// Process request before sending - returns Result directly
    fn process_request(&self, request: HttpRequest) -> Result<HttpRequest> {
        Ok(request)
    }

    /// Process response after receiving - returns Result directly
    fn process_response(&self, response: HttpResponse) -> Result<HttpResponse> {
        Ok(response)
    }

    /// Handle errors - returns Result directly
    fn handle_error(&self, error: Error) -> Result<Error> {
        Ok(error)
    }
}

/// Middleware chain for sequential processing
///
/// Requests pass through the middlewares in insertion order, responses and
/// errors in reverse order, so the first middleware added sees the request
/// first and the response last.
#[derive(Default, Clone)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// # Errors
    ///
    /// Stops at the first middleware that rejects the request.
    pub fn process_request(&self, request: HttpRequest) -> Result<HttpRequest> {
        self.middlewares
            .iter()
            .try_fold(request, |request, middleware| {
                middleware.process_request(request)
            })
    }

    /// # Errors
    ///
    /// Stops at the first middleware that rejects the response.
    pub fn process_response(&self, response: HttpResponse) -> Result<HttpResponse> {
        self.middlewares
            .iter()
            .rev()
            .try_fold(response, |response, middleware| {
                middleware.process_response(response)
            })
    }

    /// # Errors
    ///
    /// Stops at the first middleware whose error handler fails.
    pub fn handle_error(&self, error: Error) -> Result<Error> {
        self.middlewares
            .iter()
            .rev()
            .try_fold(error, |error, middleware| middleware.handle_error(error))
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("len", &self.middlewares.len())
            .finish()
    }
}

/// Response mapping middleware module
pub mod map_response;
pub use map_response::MapResponse;

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    fn remap(from: StatusCode, to: StatusCode) -> MapResponse {
        MapResponse::new(move |response| {
            (response.status() == from).then(|| response.clone().with_status(to))
        })
    }

    #[test]
    fn test_responses_unwind_in_reverse_order() {
        let chain = MiddlewareChain::new()
            .add(remap(StatusCode::INTERNAL_SERVER_ERROR, StatusCode::BAD_GATEWAY))
            .add(remap(StatusCode::OK, StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(chain.len(), 2);

        let response = chain
            .process_response(HttpResponse::new(StatusCode::OK))
            .expect("chain accepts the response");
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_empty_chain_passes_through() {
        let chain = MiddlewareChain::new();
        assert!(chain.is_empty());

        let response = chain
            .process_response(HttpResponse::new(StatusCode::CREATED))
            .expect("empty chain accepts everything");
        assert_eq!(response.status(), StatusCode::CREATED);

        let error = chain
            .handle_error(crate::error::aborted())
            .expect("default handler passes errors on");
        assert!(error.is_aborted());
    }
}
