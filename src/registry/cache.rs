//! Process-wide [`RegistryClient`] memoization keyed by base URL (design
//! spec §5: "a small process-wide cache keyed by base URL may memoize
//! registry-client instances; the cache must be safe for concurrent
//! insertion and lookup").

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use super::client::{RegistryClient, RegistryConfig};
use crate::registry::http::HttpHandler;
use std::sync::Arc;

fn cache() -> &'static Mutex<HashMap<String, RegistryClient>> {
    static CACHE: OnceLock<Mutex<HashMap<String, RegistryClient>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Return the cached [`RegistryClient`] for `config.base_url`, constructing
/// and inserting one with `config`/`handler` if none exists yet.
///
/// If a client for this base URL is already cached, the passed-in `config`
/// and `handler` are discarded in favor of the cached instance (first
/// writer wins, matching a typical get-or-insert concurrent map).
pub fn cached_client(config: RegistryConfig, handler: Arc<dyn HttpHandler>) -> RegistryClient {
    let key = config.base_url.to_string();
    let mut guard = cache().lock().unwrap();
    guard
        .entry(key)
        .or_insert_with(|| RegistryClient::new(config, handler))
        .clone()
}
