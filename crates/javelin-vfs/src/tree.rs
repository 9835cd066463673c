use std::fmt;
use std::io;

use crate::path::TreePath;

/// Canonical identity of a tree root.
///
/// Two handles onto the same underlying tree report equal identities, which
/// is what the project registry keys on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreeIdentity(String);

impl TreeIdentity {
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TreeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage abstraction for one project's file tree.
///
/// The trait is intentionally small so it can be implemented for different
/// backends. Writes are assumed durable once they return `Ok`.
pub trait SiteTree: Send + Sync {
    /// Stable identity of the tree root.
    fn identity(&self) -> TreeIdentity;

    /// Absolute location prefix of the tree root, always `/`-suffixed.
    ///
    /// Classpath entries are formed by joining tree-relative paths onto this
    /// prefix.
    fn location(&self) -> &str;

    fn read_to_string(&self, path: &TreePath) -> io::Result<String>;

    /// Writes `text` at `path`, creating missing parent directories.
    fn write(&self, path: &TreePath, text: &str) -> io::Result<()>;

    fn exists(&self, path: &TreePath) -> bool;

    fn is_dir(&self, path: &TreePath) -> bool;

    fn create_dir_all(&self, path: &TreePath) -> io::Result<()>;

    /// Lists the immediate children of a directory.
    fn read_dir(&self, path: &TreePath) -> io::Result<Vec<TreePath>>;

    /// Whether the tree has no entries at all.
    fn is_empty(&self) -> bool {
        self.read_dir(&TreePath::root())
            .map(|children| children.is_empty())
            .unwrap_or(true)
    }
}

/// Recursively collects files under `dir` that have `extension`.
///
/// Missing directories are treated as empty. The result is sorted so scans
/// are deterministic across backends.
pub fn collect_files_with_extension(
    tree: &dyn SiteTree,
    dir: &TreePath,
    extension: &str,
) -> io::Result<Vec<TreePath>> {
    if !tree.is_dir(dir) {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.clone()];

    while let Some(current) = pending.pop() {
        for child in tree.read_dir(&current)? {
            if tree.is_dir(&child) {
                pending.push(child);
            } else if javelin_core::paths::has_extension(child.as_str(), extension) {
                files.push(child);
            }
        }
    }

    files.sort();
    Ok(files)
}
