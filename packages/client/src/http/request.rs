//! Request type seen by middleware

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri, Version};

use super::response::HttpResponse;

/// Receives responses the server pushes alongside a request.
pub type PushHandler = Arc<dyn Fn(HttpResponse) + Send + Sync>;

/// HTTP request as it travels through a middleware chain.
#[derive(Clone)]
pub struct HttpRequest {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
    push_handler: Option<PushHandler>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            push_handler: None,
        }
    }

    #[must_use]
    pub fn get(uri: Uri) -> Self {
        Self::new(Method::GET, uri)
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn body_bytes<B: Into<Bytes>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    /// Installs the handler that receives server-pushed responses.
    #[must_use]
    pub fn on_push<F>(mut self, handler: F) -> Self
    where
        F: Fn(HttpResponse) + Send + Sync + 'static,
    {
        self.push_handler = Some(Arc::new(handler));
        self
    }

    #[must_use]
    pub fn push_handler(&self) -> Option<&PushHandler> {
        self.push_handler.as_ref()
    }

    pub(crate) fn set_push_handler(&mut self, handler: PushHandler) {
        self.push_handler = Some(handler);
    }

    /// Hands a pushed response to the installed handler.
    ///
    /// Returns false if no handler is installed.
    pub fn deliver_push(&self, response: HttpResponse) -> bool {
        match &self.push_handler {
            Some(handler) => {
                handler(response);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("version", &self.version)
            .field("headers", &self.headers)
            .field("body", &format!("{} bytes", self.body.len()))
            .field("push_handler", &self.push_handler.is_some())
            .finish()
    }
}
