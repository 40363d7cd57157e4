//! Registry client (design spec §4.G): list releases, fetch a manifest,
//! download and verify a source archive.

use std::path::Path;
use std::sync::Arc;

use http::{HeaderMap, HeaderValue, StatusCode};
use serde_json::Value;
use url::Url;

use crate::checksum::sha256_hex;
use crate::collaborators::{Archiver, FileSystem, Manifest, ManifestLoader, PackageKind};
use crate::error::CoreError;
use crate::namespace::NamespaceScopedIdentity;
use crate::registry::http::{HttpHandler, Request};
use crate::tools_version::ToolsVersion;

const DEFAULT_BASE_URL: &str = "https://packages.swift.org/";

const ACCEPT_LIST: &str = "application/vnd.swift.registry.v1+json";
const ACCEPT_MANIFEST: &str = "application/vnd.swift.registry.v1+swift";
const ACCEPT_ARCHIVE: &str = "application/vnd.swift.registry.v1+zip";

const CONTENT_VERSION_HEADER: &str = "Content-Version";
const EXPECTED_CONTENT_VERSION: &str = "1";

/// Configuration for a [`RegistryClient`]: which registry to talk to, and
/// what to identify ourselves as.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub base_url: Url,
    pub user_agent: String,
    /// Reserved for a future authenticated-registry story; no endpoint in
    /// this protocol version sends it.
    pub auth_token: Option<String>,
}

impl RegistryConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            user_agent: default_user_agent(),
            auth_token: None,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new(Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"))
    }
}

fn default_user_agent() -> String {
    format!("package-registry-core/{}", env!("CARGO_PKG_VERSION"))
}

/// Speaks the versioned-media-type registry protocol (design spec §4.G).
///
/// Holds only configuration and an HTTP handler; safe to share and call
/// concurrently (design spec §5).
#[derive(Clone)]
pub struct RegistryClient {
    config: RegistryConfig,
    handler: Arc<dyn HttpHandler>,
}

impl RegistryClient {
    pub fn new(config: RegistryConfig, handler: Arc<dyn HttpHandler>) -> Self {
        Self { config, handler }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn scope_path(identity: &NamespaceScopedIdentity) -> String {
        identity.namespace().trim_start_matches('@').to_string()
    }

    fn base_headers(&self, accept: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::ACCEPT, HeaderValue::from_str(accept).unwrap());
        headers.insert(
            http::header::USER_AGENT,
            HeaderValue::from_str(&self.config.user_agent).unwrap(),
        );
        headers
    }

    fn endpoint_url(&self, segments: &[&str]) -> Result<Url, CoreError> {
        let mut url = self.config.base_url.clone();
        {
            let mut path_segments = url
                .path_segments_mut()
                .map_err(|_| CoreError::InvalidUrl(format!("base URL {} cannot be a base", self.config.base_url)))?;
            for segment in segments {
                path_segments.push(segment);
            }
        }
        Ok(url)
    }

    async fn execute(&self, request: Request) -> Result<crate::registry::http::Response, CoreError> {
        tracing::debug!(url = %request.url, method = %request.method, "registry request");
        let response = self.handler.execute(request).await?;
        tracing::debug!(status = %response.status, "registry response");
        Ok(response)
    }

    fn check_common(response: &crate::registry::http::Response, expected_content_type_prefix: &str) -> Result<(), CoreError> {
        if response.status != StatusCode::OK {
            return Err(CoreError::InvalidResponse(format!(
                "unexpected status {}",
                response.status
            )));
        }
        match response.header_str(CONTENT_VERSION_HEADER) {
            Some(EXPECTED_CONTENT_VERSION) => {}
            other => {
                return Err(CoreError::InvalidResponse(format!(
                    "missing or unexpected Content-Version header: {other:?}"
                )))
            }
        }
        let content_type = response.header_str(http::header::CONTENT_TYPE.as_str()).unwrap_or("");
        if !content_type.starts_with(expected_content_type_prefix) {
            return Err(CoreError::InvalidResponse(format!(
                "unexpected content type {content_type:?}, expected prefix {expected_content_type_prefix:?}"
            )));
        }
        if response.body.is_empty() {
            return Err(CoreError::InvalidResponse("missing response body".to_string()));
        }
        Ok(())
    }

    /// `GET /{namespace}/{name}` — list non-problem release versions, sorted
    /// descending.
    pub async fn list_releases(
        &self,
        identity: &NamespaceScopedIdentity,
    ) -> Result<Vec<semver::Version>, CoreError> {
        let url = self.endpoint_url(&[&Self::scope_path(identity), identity.name()])?;
        let request = Request {
            headers: self.base_headers(ACCEPT_LIST),
            ..Request::get(url)
        };
        let response = self.execute(request).await?;
        Self::check_common(&response, "application/json")?;

        let body: Value = serde_json::from_slice(&response.body)
            .map_err(|e| CoreError::InvalidResponse(format!("invalid JSON body: {e}")))?;
        let releases = body
            .get("releases")
            .and_then(Value::as_object)
            .ok_or_else(|| CoreError::InvalidResponse("missing \"releases\" object".to_string()))?;

        let mut versions: Vec<semver::Version> = releases
            .iter()
            .filter(|(_, value)| value.get("problem").is_none())
            .filter_map(|(key, _)| semver::Version::parse(key).ok())
            .collect();
        versions.sort_by(|a, b| b.cmp(a));
        Ok(versions)
    }

    /// `GET /{namespace}/{name}/{version}/Package.swift[?swift-version=V]` —
    /// fetch a manifest, write it into `fs` under `package_root`, and hand
    /// it to `loader`.
    #[allow(clippy::too_many_arguments)]
    pub async fn fetch_manifest(
        &self,
        identity: &NamespaceScopedIdentity,
        version: &semver::Version,
        swift_version: Option<&semver::Version>,
        package_root: &Path,
        fs: &dyn FileSystem,
        loader: &dyn ManifestLoader,
        kind: PackageKind,
        tools_version: ToolsVersion,
    ) -> Result<Manifest, CoreError> {
        let mut url = self.endpoint_url(&[
            &Self::scope_path(identity),
            identity.name(),
            &version.to_string(),
            "Package.swift",
        ])?;
        if let Some(v) = swift_version {
            url.query_pairs_mut().append_pair("swift-version", &v.to_string());
        }
        let request = Request {
            headers: self.base_headers(ACCEPT_MANIFEST),
            ..Request::get(url)
        };
        let response = self.execute(request).await?;
        Self::check_common(&response, "text/x-swift")?;

        let filename = match swift_version {
            Some(v) => format!("Package@swift-{v}.swift"),
            None => "Package.swift".to_string(),
        };
        let manifest_path = package_root.join(&filename);
        fs.write(&manifest_path, &response.body)?;

        loader
            .load(package_root, self.config.base_url.as_str(), tools_version, kind, fs)
            .await
    }

    /// `GET /{namespace}/{name}/{version}.zip` — download, checksum-verify,
    /// and extract a source archive into `destination`.
    #[allow(clippy::too_many_arguments)]
    pub async fn download_archive(
        &self,
        identity: &NamespaceScopedIdentity,
        version: &semver::Version,
        destination: &Path,
        expected_checksum: Option<&str>,
        fs: &dyn FileSystem,
        archiver: &dyn Archiver,
    ) -> Result<(), CoreError> {
        let url = self.endpoint_url(&[
            &Self::scope_path(identity),
            identity.name(),
            &format!("{version}.zip"),
        ])?;
        let request = Request {
            headers: self.base_headers(ACCEPT_ARCHIVE),
            ..Request::get(url)
        };
        let response = self.execute(request).await?;
        Self::check_common(&response, "application/zip")?;

        let computed = sha256_hex(&response.body);
        let mut verified = false;

        if let Some(expected) = expected_checksum {
            if expected != computed {
                tracing::debug!(expected, computed = %computed, "caller-supplied checksum mismatch");
                return Err(CoreError::InvalidChecksum {
                    expected: expected.to_string(),
                    actual: computed,
                });
            }
            verified = true;
        }

        let digest_header = response.header_str("Digest");
        match digest_header.and_then(|d| d.strip_prefix("sha-256=")) {
            Some(advertised) => {
                if advertised != computed {
                    tracing::debug!(advertised, computed = %computed, "advertised Digest mismatch");
                    return Err(CoreError::InvalidChecksum {
                        expected: advertised.to_string(),
                        actual: computed,
                    });
                }
                verified = true;
            }
            None => {
                tracing::warn!(digest = ?digest_header, "registry did not advertise a sha-256 Digest header");
            }
        }

        if !verified {
            return Err(CoreError::InvalidChecksum {
                expected: "no caller-supplied checksum or sha-256 Digest header".to_string(),
                actual: computed,
            });
        }

        let mut temp_archive_name = destination
            .file_name()
            .ok_or_else(|| CoreError::InvalidOperation("archive destination has no file name".to_string()))?
            .to_os_string();
        temp_archive_name.push(".zip");
        let temp_archive = destination.with_file_name(temp_archive_name);
        fs.write(&temp_archive, &response.body)?;
        fs.create_dir_all(destination)?;

        let extraction = archiver.extract(&temp_archive, destination).await;
        fs.remove_tree(&temp_archive)?;
        match extraction {
            Ok(()) => Ok(()),
            Err(e) => {
                fs.remove_tree(destination)?;
                Err(e)
            }
        }
    }
}
