use std::path::PathBuf;

use crate::tools_version::ToolsVersion;

/// Errors surfaced by this crate.
///
/// Errors originating in collaborator traits (the HTTP handler, the file
/// system, the manifest loader, the archiver) are propagated verbatim by
/// their callers and are not wrapped here; every variant below is one this
/// crate itself raises.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A caller asked for an operation an identity does not support, e.g.
    /// a registry call against an identity with no namespace.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A base URL could not be combined with path components into a valid
    /// request URL.
    #[error("invalid registry URL: {0}")]
    InvalidUrl(String),

    /// The registry responded in a way that does not satisfy the protocol:
    /// wrong status, wrong content type, missing `Content-Version: 1`, or a
    /// missing/unparsable body.
    #[error("invalid registry response: {0}")]
    InvalidResponse(String),

    /// A downloaded archive's computed digest did not match the caller's
    /// expectation or the server's advertisement.
    #[error("checksum mismatch: expected {expected}, computed {actual}")]
    InvalidChecksum { expected: String, actual: String },

    /// A manifest's `swift-tools-version` comment was present but
    /// unparsable, or the first line misspelled the directive keyword.
    #[error("malformed tools-version specifier {specifier:?} (current tools version {current})")]
    MalformedToolsVersion {
        specifier: String,
        current: ToolsVersion,
    },

    /// The package directory could not be accessed while selecting a
    /// version-specific manifest.
    #[error("inaccessible package at {path:?}: {reason}")]
    InaccessiblePackage { path: PathBuf, reason: String },

    /// The manifest file itself could not be accessed while extracting its
    /// tools version.
    #[error("inaccessible manifest at {path:?}: {reason}")]
    InaccessibleManifest { path: PathBuf, reason: String },

    /// Canonicalization produced a host containing characters outside
    /// ASCII letters/digits/`-`/`.`. IDNA transcoding is not implemented;
    /// see the design notes for why this is a defined failure rather than
    /// a best-effort Punycode conversion.
    #[error("non-ASCII host in source location: {0}")]
    NonAsciiHost(String),
}
