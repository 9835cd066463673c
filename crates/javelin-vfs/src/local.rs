use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::path::TreePath;
use crate::tree::{SiteTree, TreeIdentity};

/// A [`SiteTree`] rooted at a local OS directory.
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: PathBuf,
    location: String,
}

impl LocalTree {
    /// Opens `root` as a tree. The path is canonicalized when it exists so
    /// that different spellings of the same directory share one identity.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = canonicalize_if_possible(&root.into())?;
        let location = javelin_core::paths::with_dir_suffix(
            &javelin_core::paths::normalize_separators(&root.to_string_lossy()),
        );
        Ok(Self { root, location })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &TreePath) -> PathBuf {
        if path.is_root() {
            return self.root.clone();
        }
        self.root.join(path.as_str())
    }
}

fn canonicalize_if_possible(path: &Path) -> io::Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(canonical) => Ok(canonical),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(err) => Err(err),
    }
}

impl SiteTree for LocalTree {
    fn identity(&self) -> TreeIdentity {
        TreeIdentity::new(&self.location)
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn read_to_string(&self, path: &TreePath) -> io::Result<String> {
        fs::read_to_string(self.resolve(path))
    }

    fn write(&self, path: &TreePath, text: &str) -> io::Result<()> {
        let target = self.resolve(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, text)
    }

    fn exists(&self, path: &TreePath) -> bool {
        self.resolve(path).exists()
    }

    fn is_dir(&self, path: &TreePath) -> bool {
        self.resolve(path).is_dir()
    }

    fn create_dir_all(&self, path: &TreePath) -> io::Result<()> {
        fs::create_dir_all(self.resolve(path))
    }

    fn read_dir(&self, path: &TreePath) -> io::Result<Vec<TreePath>> {
        let mut children = Vec::new();
        for entry in fs::read_dir(self.resolve(path))? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                tracing::warn!(
                    dir = %path,
                    "skipping directory entry with non-UTF-8 name"
                );
                continue;
            };
            children.push(path.join(name));
        }
        children.sort();
        Ok(children)
    }
}
