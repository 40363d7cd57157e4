//! External collaborators (design spec §6): file system access, manifest
//! loading, and archive extraction are pluggable so this core never
//! depends on a concrete decompressor, semantic manifest loader, or real
//! file system.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::tools_version::ToolsVersion;

/// What kind of package a manifest belongs to, threaded through to
/// [`ManifestLoader::load`] so loaders can apply kind-specific rules (e.g.
/// a root package permits different manifest APIs than a registry
/// dependency). This core does not interpret the distinction itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Root,
    Local,
    Registry,
    Remote,
}

/// An opaque loaded manifest. This core does not interpret manifest
/// semantics beyond the tools-version line (design spec §1); a
/// [`ManifestLoader`] implementation elsewhere in the package manager is
/// responsible for turning this into a real dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    bytes: Vec<u8>,
}

impl Manifest {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Capability set for reading and writing files, required by the
/// manifest-fetch path (design spec §6) and by tools-version manifest
/// selection (§4.F).
pub trait FileSystem: Send + Sync {
    fn read(&self, path: &Path) -> Result<Vec<u8>, CoreError>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), CoreError>;
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_directory(&self, path: &Path) -> bool;
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, CoreError>;
    fn create_dir_all(&self, path: &Path) -> Result<(), CoreError>;
    fn remove_tree(&self, path: &Path) -> Result<(), CoreError>;
}

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
}

/// An in-memory [`FileSystem`], used for the registry client's
/// manifest-fetch path and for tests that would otherwise need a real
/// temp directory.
#[derive(Default)]
pub struct InMemoryFileSystem {
    nodes: Mutex<HashMap<PathBuf, Node>>,
}

impl InMemoryFileSystem {
    pub fn new() -> Self {
        Self {
            nodes: Mutex::new(HashMap::new()),
        }
    }

    /// Convenience for tests: write a UTF-8 string, creating parent
    /// directories as needed.
    pub fn write_str(&self, path: &Path, contents: &str) {
        self.write(path, contents.as_bytes()).expect("in-memory write cannot fail");
    }

    fn ensure_parents(&self, path: &Path, nodes: &mut HashMap<PathBuf, Node>) {
        let mut ancestor = path.parent();
        while let Some(dir) = ancestor {
            if dir.as_os_str().is_empty() {
                break;
            }
            nodes.entry(dir.to_path_buf()).or_insert(Node::Dir);
            ancestor = dir.parent();
        }
    }
}

impl FileSystem for InMemoryFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>, CoreError> {
        let nodes = self.nodes.lock().unwrap();
        match nodes.get(path) {
            Some(Node::File(bytes)) => Ok(bytes.clone()),
            _ => Err(CoreError::InaccessibleManifest {
                path: path.to_path_buf(),
                reason: "no such file".to_string(),
            }),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), CoreError> {
        let mut nodes = self.nodes.lock().unwrap();
        self.ensure_parents(path, &mut nodes);
        nodes.insert(path.to_path_buf(), Node::File(contents.to_vec()));
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.nodes.lock().unwrap().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.nodes.lock().unwrap().get(path), Some(Node::File(_)))
    }

    fn is_directory(&self, path: &Path) -> bool {
        matches!(self.nodes.lock().unwrap().get(path), Some(Node::Dir))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, CoreError> {
        let nodes = self.nodes.lock().unwrap();
        if !matches!(nodes.get(path), Some(Node::Dir)) {
            return Err(CoreError::InaccessiblePackage {
                path: path.to_path_buf(),
                reason: "no such directory".to_string(),
            });
        }
        let children = nodes
            .keys()
            .filter(|candidate| candidate.parent() == Some(path))
            .cloned()
            .collect();
        Ok(children)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), CoreError> {
        let mut nodes = self.nodes.lock().unwrap();
        self.ensure_parents(path, &mut nodes);
        nodes.entry(path.to_path_buf()).or_insert(Node::Dir);
        Ok(())
    }

    fn remove_tree(&self, path: &Path) -> Result<(), CoreError> {
        let mut nodes = self.nodes.lock().unwrap();
        nodes.retain(|candidate, _| candidate != path && !candidate.starts_with(path));
        Ok(())
    }
}

/// Turns manifest bytes on disk into a [`Manifest`]. This core does not
/// implement semantic manifest loading (design spec §1); it only defines
/// the contract the registry client's fetch-manifest operation calls into.
#[async_trait]
pub trait ManifestLoader: Send + Sync {
    async fn load(
        &self,
        package_path: &Path,
        base_url: &str,
        tools_version: ToolsVersion,
        kind: PackageKind,
        fs: &dyn FileSystem,
    ) -> Result<Manifest, CoreError>;
}

/// Extracts a downloaded, checksum-verified archive into a destination
/// directory. Pluggable so this core never depends on a concrete
/// decompression backend.
#[async_trait]
pub trait Archiver: Send + Sync {
    async fn extract(&self, archive_path: &Path, destination: &Path) -> Result<(), CoreError>;
}
