//! The registry client (design spec §4.G) and its request/response types.

mod cache;
mod client;
mod http;

pub use self::http::{HttpHandler, Request, Response};
pub use cache::cached_client;
pub use client::{RegistryClient, RegistryConfig};
