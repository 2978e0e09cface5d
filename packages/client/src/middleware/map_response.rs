//! Response mapping middleware
//!
//! Runs a user-supplied function over every completed response, and over
//! every server-pushed response before it reaches the request's push
//! handler. A mapper returning `None` leaves the response as it was.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::Middleware;
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse, PushHandler};

type Mapper = Arc<dyn Fn(&HttpResponse) -> Option<HttpResponse> + Send + Sync>;

#[derive(Clone)]
pub struct MapResponse {
    mapper: Mapper,
}

impl MapResponse {
    pub fn new<F>(mapper: F) -> Self
    where
        F: Fn(&HttpResponse) -> Option<HttpResponse> + Send + Sync + 'static,
    {
        Self {
            mapper: Arc::new(mapper),
        }
    }

    /// Applies the mapper, falling back to the original response.
    #[must_use]
    pub fn apply(&self, response: HttpResponse) -> HttpResponse {
        apply(&self.mapper, response)
    }
}

fn apply(mapper: &Mapper, response: HttpResponse) -> HttpResponse {
    match mapper(&response) {
        Some(mapped) => {
            trace!(from = %response.status(), to = %mapped.status(), "response mapped");
            mapped
        }
        None => response,
    }
}

impl Middleware for MapResponse {
    fn process_request(&self, mut request: HttpRequest) -> Result<HttpRequest> {
        if let Some(on_push) = request.push_handler().cloned() {
            let mapper = Arc::clone(&self.mapper);
            let wrapped: PushHandler = Arc::new(move |pushed| on_push(apply(&mapper, pushed)));
            request.set_push_handler(wrapped);
        }
        Ok(request)
    }

    fn process_response(&self, response: HttpResponse) -> Result<HttpResponse> {
        Ok(self.apply(response))
    }
}

impl fmt::Debug for MapResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapResponse").finish_non_exhaustive()
    }
}
