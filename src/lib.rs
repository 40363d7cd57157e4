//! Package identity and registry-access core.
//!
//! This crate gives every external package dependency a single, stable
//! identifier independent of the many syntactic forms its source location
//! can take, and mediates the network protocol by which manifests, version
//! lists, and source archives are retrieved from a package registry.
//!
//! It deliberately does not resolve dependency graphs, generate module
//! maps, or extract archives itself; those concerns are pushed out to the
//! collaborator traits in [`collaborators`].

mod checksum;
mod collaborators_impl;
mod error;
pub mod identity;
mod namespace;
pub mod registry;
mod string_surgery;
pub mod tools_version;

pub mod collaborators {
    //! External collaborator contracts (§6 of the design spec).
    //!
    //! This core treats manifest loading, archive extraction, and file
    //! system access as pluggable; it only defines the traits, not the
    //! implementations, aside from the in-memory file system used on the
    //! manifest-fetch path and for tests.
    pub use crate::collaborators_impl::{
        Archiver, FileSystem, InMemoryFileSystem, Manifest, ManifestLoader, PackageKind,
    };
}

pub use checksum::sha256_hex;
pub use error::CoreError;
pub use identity::{IdentityProvider, PackageIdentity};
pub use namespace::NamespaceScopedIdentity;
pub use registry::{cached_client, HttpHandler, Request, Response, RegistryClient, RegistryConfig};
pub use tools_version::ToolsVersion;
