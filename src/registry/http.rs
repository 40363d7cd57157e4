//! Registry request/response types (design spec §3, §6).
//!
//! Content negotiation is entirely via media-type headers; there is no
//! bespoke wire format beyond the `http` crate's method/status/header
//! vocabulary, which also gives case-insensitive header lookup for free.

use http::{HeaderMap, Method, StatusCode};
use url::Url;

/// An outbound registry request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl Request {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
        }
    }
}

/// An inbound registry response: status, case-insensitive headers, and a
/// byte body.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

/// Executes an HTTP request. Implementations may perform work on their own
/// threads; callers must not assume synchronous completion (design spec
/// §5).
#[async_trait::async_trait]
pub trait HttpHandler: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response, crate::error::CoreError>;
}
