//! The public identity facade (design spec §4.D) and its two backing
//! algorithms.

mod canonical;
mod legacy;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering as AtomicOrdering};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Selects which identity-construction algorithm a [`PackageIdentity`]
/// constructor uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityProvider {
    /// Full URL normalization (design spec §4.B). The default.
    Canonical,
    /// Last-path-component only, kept for backward compatibility
    /// (design spec §4.C).
    Legacy,
}

const CANONICAL: u8 = 0;
const LEGACY: u8 = 1;

static DEFAULT_PROVIDER: AtomicU8 = AtomicU8::new(CANONICAL);

/// Set the process-wide default [`IdentityProvider`].
///
/// Only identities constructed *after* this call observe the change;
/// identities already constructed are immutable. Intended to be called
/// once during process initialization (design spec §3, §5).
pub fn set_default_provider(provider: IdentityProvider) {
    let value = match provider {
        IdentityProvider::Canonical => CANONICAL,
        IdentityProvider::Legacy => LEGACY,
    };
    DEFAULT_PROVIDER.store(value, AtomicOrdering::SeqCst);
}

/// Read the process-wide default [`IdentityProvider`].
pub fn default_provider() -> IdentityProvider {
    match DEFAULT_PROVIDER.load(AtomicOrdering::SeqCst) {
        LEGACY => IdentityProvider::Legacy,
        _ => IdentityProvider::Canonical,
    }
}

/// A package's stable identity, independent of the syntax of its source
/// location.
///
/// Equality, ordering, and hashing are defined solely over the canonical
/// textual form; two identities are equal iff their text is equal.
/// Identities are immutable once constructed.
#[derive(Debug, Clone)]
pub struct PackageIdentity {
    text: String,
}

impl PackageIdentity {
    /// Construct an identity from a source location (URL, scp-style
    /// address, or path-like string), using the process-wide default
    /// provider.
    pub fn from_location(location: &str) -> Result<Self, CoreError> {
        Self::from_location_with_provider(location, default_provider())
    }

    /// Construct an identity from a source location using an explicit
    /// provider, bypassing the process-wide default.
    pub fn from_location_with_provider(
        location: &str,
        provider: IdentityProvider,
    ) -> Result<Self, CoreError> {
        let text = match provider {
            IdentityProvider::Canonical => canonical::canonicalize(location)?,
            IdentityProvider::Legacy => legacy::legacy_identity(location),
        };
        Ok(Self { text })
    }

    /// Construct an identity from an absolute file path, using the
    /// process-wide default provider.
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        Self::from_path_with_provider(path, default_provider())
    }

    /// Construct an identity from an absolute file path using an explicit
    /// provider, bypassing the process-wide default.
    pub fn from_path_with_provider(
        path: &Path,
        provider: IdentityProvider,
    ) -> Result<Self, CoreError> {
        Self::from_location_with_provider(&path.to_string_lossy(), provider)
    }

    /// The canonical (or legacy) textual form this identity was
    /// constructed with.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq for PackageIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for PackageIdentity {}

impl PartialOrd for PackageIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}

impl Hash for PackageIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl Serialize for PackageIdentity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for PackageIdentity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Ok(Self { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_identities_hash_equal() {
        use std::collections::hash_map::DefaultHasher;

        let a = PackageIdentity::from_location_with_provider(
            "https://example.com/mona/LinkedList",
            IdentityProvider::Canonical,
        )
        .unwrap();
        let b = PackageIdentity::from_location_with_provider(
            "https://Example.com/Mona/LinkedList.git",
            IdentityProvider::Canonical,
        )
        .unwrap();
        assert_eq!(a, b);

        let mut ha = DefaultHasher::new();
        a.hash(&mut ha);
        let mut hb = DefaultHasher::new();
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn round_trips_through_serde_json() {
        let id = PackageIdentity::from_location_with_provider(
            "https://example.com/mona/LinkedList",
            IdentityProvider::Canonical,
        )
        .unwrap();
        let json = serde_json::to_string(&id).unwrap();
        let back: PackageIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn explicit_provider_bypasses_global_default() {
        let canonical =
            PackageIdentity::from_location_with_provider(
                "https://example.com/mona/LinkedList.git",
                IdentityProvider::Canonical,
            )
            .unwrap();
        let legacy = PackageIdentity::from_location_with_provider(
            "https://example.com/mona/LinkedList.git",
            IdentityProvider::Legacy,
        )
        .unwrap();
        assert_eq!(canonical.as_str(), "example.com/mona/linkedlist");
        assert_eq!(legacy.as_str(), "linkedlist");
    }

    #[test]
    fn changing_default_affects_only_future_constructions() {
        set_default_provider(IdentityProvider::Canonical);
        let before = PackageIdentity::from_location("https://example.com/mona/LinkedList").unwrap();

        set_default_provider(IdentityProvider::Legacy);
        let after = PackageIdentity::from_location("https://example.com/mona/LinkedList").unwrap();

        // `before` is frozen; it does not retroactively become legacy-form.
        assert_eq!(before.as_str(), "example.com/mona/linkedlist");
        assert_eq!(after.as_str(), "linkedlist");

        // restore for other tests running in the same process
        set_default_provider(IdentityProvider::Canonical);
    }
}
