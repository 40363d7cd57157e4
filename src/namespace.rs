//! Namespace-scoped identity (design spec §4.E): `@namespace/name`
//! identifiers used by the registry protocol, with Unicode-aware parsing
//! and comparison.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const MAX_NAMESPACE_LEN: usize = 40;
const MAX_NAME_LEN: usize = 128;

/// A registry identifier of the form `@namespace/name`.
///
/// Parsing is strict; construction never panics and returns `None` on any
/// rule violation rather than raising, so callers can decide how to report
/// a bad identifier (design spec §4.E, §7).
///
/// Equality, ordering, and hashing fold both components under NFKC plus
/// case- and diacritic-insensitive comparison, so e.g. `@MONA/LINKEDLIST`
/// and `@mona/linkedlist` are equivalent.
#[derive(Debug, Clone)]
pub struct NamespaceScopedIdentity {
    namespace: String,
    name: String,
}

impl NamespaceScopedIdentity {
    /// Parse `input` as a namespace-scoped identity. Returns `None` if any
    /// rule in design spec §4.E is violated.
    pub fn parse(input: &str) -> Option<Self> {
        let (namespace, name) = input.split_once('/')?;
        if namespace.is_empty() || name.is_empty() {
            return None;
        }
        if !validate_namespace(namespace) {
            return None;
        }
        if !validate_name(name) {
            return None;
        }
        Some(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    /// The namespace, including its leading `@`, in the case it was parsed
    /// with.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The name, in the case it was parsed with.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn fold_key(&self) -> String {
        let mut key = fold(&self.namespace);
        key.push('/');
        key.push_str(&fold(&self.name));
        key
    }
}

impl fmt::Display for NamespaceScopedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl PartialEq for NamespaceScopedIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.fold_key() == other.fold_key()
    }
}

impl Eq for NamespaceScopedIdentity {}

impl PartialOrd for NamespaceScopedIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NamespaceScopedIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fold_key().cmp(&other.fold_key())
    }
}

impl Hash for NamespaceScopedIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fold_key().hash(state);
    }
}

/// NFKC-normalize, then case-fold and diacritic-fold `s` for comparison.
///
/// The NFKD pass does double duty: it is both the compatibility
/// decomposition needed for width-insensitivity (fullwidth Latin forms
/// decompose to ASCII) and the canonical decomposition needed to pull
/// diacritics and ligature components apart so they can be stripped or
/// compared letter-by-letter.
fn fold(s: &str) -> String {
    s.nfkd()
        .flat_map(|c| c.to_lowercase())
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

fn validate_namespace(namespace: &str) -> bool {
    let mut chars = namespace.chars();
    if chars.next() != Some('@') {
        return false;
    }
    let rest: Vec<char> = chars.collect();
    if rest.is_empty() || rest.len() > MAX_NAMESPACE_LEN {
        return false;
    }
    if !rest[0].is_ascii_alphanumeric() {
        return false;
    }
    for i in 1..rest.len() {
        let c = rest[i];
        if c == '-' {
            match rest.get(i + 1) {
                Some(next) if next.is_ascii_alphanumeric() => {}
                _ => return false,
            }
        } else if !c.is_ascii_alphanumeric() {
            return false;
        }
    }
    true
}

fn validate_name(name: &str) -> bool {
    if name.chars().count() > MAX_NAME_LEN {
        return false;
    }
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !unicode_ident::is_xid_start(first) {
        return false;
    }
    chars.all(unicode_ident::is_xid_continue)
}
