//! Tools-version parser (design spec §4.F): extracts a semantic version
//! from a manifest's first-line comment, and selects among
//! version-specific manifest files in a package directory.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::collaborators::FileSystem;
use crate::error::CoreError;

/// Tools-version filenames hard-coded ahead of any specifier-based
/// selection, one per major version the ecosystem shipped before
/// version-range selection existed.
const FIXED_VERSION_FILENAMES: &[(u64, &str)] = &[
    (3, "Package@swift-3.swift"),
    (4, "Package@swift-4.swift"),
    (5, "Package@swift-5.swift"),
];

/// The default tools version assumed for a manifest with no
/// `swift-tools-version` comment at all (the pre-specifier era).
const DEFAULT_TOOLS_VERSION: ToolsVersion = ToolsVersion {
    major: 3,
    minor: 0,
    patch: 0,
};

const REGULAR_MANIFEST_FILENAME: &str = "Package.swift";

/// Misspellings of the tools-version directive keyword that, if present on
/// an otherwise-unmatched first line, turn a missing match into a hard
/// failure instead of falling back to the default version.
const KNOWN_MISSPELLINGS: &[&str] = &["swift-tool", "tool-version"];

/// A semantic tools version: `(major, minor, patch)` with a total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToolsVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl ToolsVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for ToolsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl From<semver::Version> for ToolsVersion {
    fn from(v: semver::Version) -> Self {
        Self {
            major: v.major,
            minor: v.minor,
            patch: v.patch,
        }
    }
}

/// Extract the tools version declared on the first line of `contents`.
///
/// `contents` is the raw bytes of a manifest file; only the first line (up
/// to the first newline) is consulted.
pub fn parse_tools_version(contents: &[u8]) -> Result<ToolsVersion, CoreError> {
    let first_line = first_line(contents);
    parse_first_line(&first_line)
}

fn first_line(contents: &[u8]) -> String {
    let end = contents.iter().position(|&b| b == b'\n').unwrap_or(contents.len());
    String::from_utf8_lossy(&contents[..end]).into_owned()
}

fn parse_first_line(first_line: &str) -> Result<ToolsVersion, CoreError> {
    match capture_specifier(first_line) {
        Some(specifier) => parse_specifier(&specifier, first_line),
        None => {
            let lower = first_line.to_lowercase();
            if KNOWN_MISSPELLINGS.iter().any(|m| lower.contains(m)) {
                Err(CoreError::MalformedToolsVersion {
                    specifier: first_line.to_string(),
                    current: DEFAULT_TOOLS_VERSION,
                })
            } else {
                Ok(DEFAULT_TOOLS_VERSION)
            }
        }
    }
}

/// Case-insensitively match `^// swift-tools-version:(.*?)(?:;.*|$)` and
/// return the captured specifier, if the line matches at all.
fn capture_specifier(line: &str) -> Option<String> {
    const PREFIX: &str = "// swift-tools-version:";
    let lower = line.to_lowercase();
    if !lower.starts_with(PREFIX) {
        return None;
    }
    let rest = &line[PREFIX.len()..];
    let specifier = match rest.find(';') {
        Some(idx) => &rest[..idx],
        None => rest,
    };
    Some(specifier.to_string())
}

fn parse_specifier(specifier: &str, first_line: &str) -> Result<ToolsVersion, CoreError> {
    let trimmed = specifier.trim();
    let normalized = normalize_for_semver(trimmed);
    semver::Version::parse(&normalized)
        .map(ToolsVersion::from)
        .map_err(|_| CoreError::MalformedToolsVersion {
            specifier: first_line.to_string(),
            current: DEFAULT_TOOLS_VERSION,
        })
}

/// `semver::Version::parse` requires all three components; manifests may
/// write `5` or `5.3`, so pad them out before parsing.
fn normalize_for_semver(specifier: &str) -> String {
    let parts: Vec<&str> = specifier.split('.').collect();
    match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => specifier.to_string(),
    }
}

/// Select which manifest file in `package_dir` should be loaded, given the
/// consumer's `current_tools_version`.
///
/// Implements design spec §4.F's selection algorithm:
/// 1. A hard-coded fixed-version filename is returned directly if present.
/// 2. Otherwise, among `Package@swift-<version>.swift` files whose version
///    is `<= current_tools_version`, the greatest is chosen, but only if
///    its *declared* tools version exceeds the regular manifest's declared
///    tools version.
/// 3. Otherwise the regular `Package.swift` is returned.
pub fn select_manifest(
    fs: &dyn FileSystem,
    package_dir: &Path,
    current_tools_version: ToolsVersion,
) -> Result<PathBuf, CoreError> {
    for (major, filename) in FIXED_VERSION_FILENAMES.iter().rev() {
        if *major <= current_tools_version.major {
            let candidate = package_dir.join(filename);
            if fs.is_file(&candidate) {
                return Ok(candidate);
            }
        }
    }

    let regular = package_dir.join(REGULAR_MANIFEST_FILENAME);
    let regular_version = read_tools_version(fs, &regular)?;

    let mut best: Option<(ToolsVersion, PathBuf)> = None;
    for entry in list_versioned_manifests(fs, package_dir)? {
        let (version, path) = entry;
        if version > current_tools_version {
            continue;
        }
        if best.as_ref().map_or(true, |(best_version, _)| version > *best_version) {
            best = Some((version, path));
        }
    }

    if let Some((_, candidate_path)) = best {
        let declared = read_tools_version(fs, &candidate_path)?;
        if declared > regular_version {
            return Ok(candidate_path);
        }
    }

    Ok(regular)
}

fn read_tools_version(fs: &dyn FileSystem, path: &Path) -> Result<ToolsVersion, CoreError> {
    let contents = fs.read(path).map_err(|_| CoreError::InaccessibleManifest {
        path: path.to_path_buf(),
        reason: "could not read manifest".to_string(),
    })?;
    parse_tools_version(&contents)
}

/// `Package@swift-<version>.swift` filenames in `package_dir`, parsed into
/// `(version, path)` pairs. Files whose name doesn't parse as a version
/// are ignored.
fn list_versioned_manifests(
    fs: &dyn FileSystem,
    package_dir: &Path,
) -> Result<Vec<(ToolsVersion, PathBuf)>, CoreError> {
    if !fs.is_directory(package_dir) {
        return Err(CoreError::InaccessiblePackage {
            path: package_dir.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    let entries = fs.read_dir(package_dir).map_err(|_| CoreError::InaccessiblePackage {
        path: package_dir.to_path_buf(),
        reason: "could not list directory".to_string(),
    })?;

    let mut out = Vec::new();
    for entry in entries {
        let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(version) = parse_versioned_filename(name) {
            out.push((version, entry));
        }
    }
    Ok(out)
}

/// Parse `Package@swift-<M>[.<m>[.<p>]].swift` into a [`ToolsVersion`].
fn parse_versioned_filename(name: &str) -> Option<ToolsVersion> {
    let rest = name.strip_prefix("Package@swift-")?;
    let rest = rest.strip_suffix(".swift")?;
    let normalized = normalize_for_semver(rest);
    semver::Version::parse(&normalized).ok().map(ToolsVersion::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::InMemoryFileSystem;

    #[test]
    fn standard_directive() {
        let v = parse_tools_version(b"// swift-tools-version:5.3\nlet x = 1\n").unwrap();
        assert_eq!(v, ToolsVersion::new(5, 3, 0));
    }

    #[test]
    fn case_insensitive_with_trailing_comment() {
        let v = parse_tools_version(b"// SWIFT-TOOLS-VERSION:4.2;extra\nlet x = 1\n").unwrap();
        assert_eq!(v, ToolsVersion::new(4, 2, 0));
    }

    #[test]
    fn misspelled_directive_is_malformed() {
        let err = parse_tools_version(b"// swift-tool-version:5\nlet x = 1\n").unwrap_err();
        assert!(matches!(err, CoreError::MalformedToolsVersion { .. }));
    }

    #[test]
    fn missing_directive_defaults_to_version_3() {
        let v = parse_tools_version(b"let x = 1\n").unwrap();
        assert_eq!(v, ToolsVersion::new(3, 0, 0));
    }

    #[test]
    fn empty_first_line_defaults_to_version_3() {
        let v = parse_tools_version(b"\nlet x = 1\n").unwrap();
        assert_eq!(v, ToolsVersion::new(3, 0, 0));
    }

    #[test]
    fn unparsable_specifier_is_malformed() {
        let err = parse_tools_version(b"// swift-tools-version:abc\nlet x = 1\n").unwrap_err();
        assert!(matches!(err, CoreError::MalformedToolsVersion { .. }));
    }

    #[test]
    fn major_only_specifier_parses() {
        let v = parse_tools_version(b"// swift-tools-version:5\n").unwrap();
        assert_eq!(v, ToolsVersion::new(5, 0, 0));
    }

    #[test]
    fn selects_regular_manifest_when_no_versioned_files_exist() {
        let fs = InMemoryFileSystem::new();
        fs.write_str(
            &PathBuf::from("/pkg/Package.swift"),
            "// swift-tools-version:5.0\n",
        );
        let chosen = select_manifest(&fs, &PathBuf::from("/pkg"), ToolsVersion::new(5, 5, 0)).unwrap();
        assert_eq!(chosen, PathBuf::from("/pkg/Package.swift"));
    }

    #[test]
    fn selects_greatest_eligible_versioned_manifest_with_higher_declared_version() {
        let fs = InMemoryFileSystem::new();
        fs.write_str(&PathBuf::from("/pkg/Package.swift"), "// swift-tools-version:4.0\n");
        fs.write_str(
            &PathBuf::from("/pkg/Package@swift-5.1.swift"),
            "// swift-tools-version:5.1\n",
        );
        fs.write_str(
            &PathBuf::from("/pkg/Package@swift-5.5.swift"),
            "// swift-tools-version:5.5\n",
        );
        let chosen = select_manifest(&fs, &PathBuf::from("/pkg"), ToolsVersion::new(5, 5, 0)).unwrap();
        assert_eq!(chosen, PathBuf::from("/pkg/Package@swift-5.5.swift"));
    }

    #[test]
    fn ignores_versioned_manifest_not_declaring_higher_version() {
        let fs = InMemoryFileSystem::new();
        fs.write_str(&PathBuf::from("/pkg/Package.swift"), "// swift-tools-version:5.5\n");
        fs.write_str(
            &PathBuf::from("/pkg/Package@swift-5.1.swift"),
            "// swift-tools-version:5.1\n",
        );
        let chosen = select_manifest(&fs, &PathBuf::from("/pkg"), ToolsVersion::new(5, 5, 0)).unwrap();
        assert_eq!(chosen, PathBuf::from("/pkg/Package.swift"));
    }

    #[test]
    fn ignores_versioned_manifest_above_current_tools_version() {
        let fs = InMemoryFileSystem::new();
        fs.write_str(&PathBuf::from("/pkg/Package.swift"), "// swift-tools-version:4.0\n");
        fs.write_str(
            &PathBuf::from("/pkg/Package@swift-6.swift"),
            "// swift-tools-version:6.0\n",
        );
        let chosen = select_manifest(&fs, &PathBuf::from("/pkg"), ToolsVersion::new(5, 5, 0)).unwrap();
        assert_eq!(chosen, PathBuf::from("/pkg/Package.swift"));
    }
}
