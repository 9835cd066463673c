use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::path::TreePath;
use crate::tree::{SiteTree, TreeIdentity};

static NEXT_TREE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
enum Node {
    File(String),
    Dir,
}

/// An in-memory [`SiteTree`], used by tests and embedders that manage
/// sources without a disk directory.
///
/// Clones share the same underlying entries.
#[derive(Debug, Clone)]
pub struct MemoryTree {
    location: String,
    entries: Arc<Mutex<BTreeMap<TreePath, Node>>>,
}

impl MemoryTree {
    /// Creates an empty tree with a unique synthetic location.
    pub fn new() -> Self {
        let n = NEXT_TREE.fetch_add(1, Ordering::Relaxed);
        Self::with_location(format!("/memory/{n}"))
    }

    /// Creates an empty tree rooted at a caller-chosen location.
    pub fn with_location(location: impl AsRef<str>) -> Self {
        let location = javelin_core::paths::with_dir_suffix(
            &javelin_core::paths::normalize_separators(location.as_ref()),
        );
        Self {
            location,
            entries: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, BTreeMap<TreePath, Node>> {
        self.entries.lock().expect("memory tree mutex poisoned")
    }

    fn insert_parents(entries: &mut BTreeMap<TreePath, Node>, path: &TreePath) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir.is_root() {
                break;
            }
            entries.entry(dir.clone()).or_insert(Node::Dir);
            current = dir.parent();
        }
    }
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteTree for MemoryTree {
    fn identity(&self) -> TreeIdentity {
        TreeIdentity::new(&self.location)
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn read_to_string(&self, path: &TreePath) -> io::Result<String> {
        match self.lock_entries().get(path) {
            Some(Node::File(text)) => Ok(text.clone()),
            Some(Node::Dir) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("is a directory: {path}"),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {path}"),
            )),
        }
    }

    fn write(&self, path: &TreePath, text: &str) -> io::Result<()> {
        if path.is_root() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot write to the tree root",
            ));
        }
        let mut entries = self.lock_entries();
        if matches!(entries.get(path), Some(Node::Dir)) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("is a directory: {path}"),
            ));
        }
        Self::insert_parents(&mut entries, path);
        entries.insert(path.clone(), Node::File(text.to_string()));
        Ok(())
    }

    fn exists(&self, path: &TreePath) -> bool {
        path.is_root() || self.lock_entries().contains_key(path)
    }

    fn is_dir(&self, path: &TreePath) -> bool {
        path.is_root() || matches!(self.lock_entries().get(path), Some(Node::Dir))
    }

    fn create_dir_all(&self, path: &TreePath) -> io::Result<()> {
        if path.is_root() {
            return Ok(());
        }
        let mut entries = self.lock_entries();
        if matches!(entries.get(path), Some(Node::File(_))) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("a file exists at {path}"),
            ));
        }
        Self::insert_parents(&mut entries, path);
        entries.insert(path.clone(), Node::Dir);
        Ok(())
    }

    fn read_dir(&self, path: &TreePath) -> io::Result<Vec<TreePath>> {
        let entries = self.lock_entries();
        if !path.is_root() && !matches!(entries.get(path), Some(Node::Dir)) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {path}"),
            ));
        }
        // BTreeMap iteration keeps listings sorted.
        Ok(entries
            .keys()
            .filter(|entry| entry.parent().as_ref() == Some(path))
            .cloned()
            .collect())
    }
}
