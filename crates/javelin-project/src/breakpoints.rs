use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;

use javelin_vfs::{SiteTree, TreePath};

/// The kind token persisted with each breakpoint.
///
/// Only line breakpoints exist today; unknown tokens are dropped on load so
/// the format stays open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BreakpointKind {
    Line,
}

impl fmt::Display for BreakpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakpointKind::Line => f.write_str("line"),
        }
    }
}

impl FromStr for BreakpointKind {
    type Err = ();

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "line" => Ok(BreakpointKind::Line),
            _ => Err(()),
        }
    }
}

/// A user-set execution-pause marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub file: TreePath,
    pub line: u32,
    pub kind: BreakpointKind,
}

/// Ordered breakpoint registry, persisted write-through.
///
/// The sequence is kept sorted by (file, line) via sorted insertion; there
/// is never a duplicate (file, line) pair. Every successful mutation is
/// persisted synchronously before it returns, one record per line:
/// `<kind> <relative-path> <line>`.
pub struct Breakpoints {
    tree: Arc<dyn SiteTree>,
    settings_file: TreePath,
    items: Vec<Breakpoint>,
}

impl Breakpoints {
    /// Loads the registry from `settings_file`.
    ///
    /// A missing file is an empty set. Records whose path no longer
    /// resolves in the tree, and malformed records, are silently dropped.
    pub fn load(tree: Arc<dyn SiteTree>, settings_file: TreePath) -> Self {
        let mut registry = Self {
            tree,
            settings_file,
            items: Vec::new(),
        };

        let text = match registry.tree.read_to_string(&registry.settings_file) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return registry,
            Err(err) => {
                tracing::warn!(
                    path = %registry.settings_file,
                    error = %err,
                    "failed to read breakpoints file"
                );
                return registry;
            }
        };

        for record in text.lines() {
            let mut fields = record.split_whitespace();
            let (Some(kind), Some(path), Some(line), None) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                continue;
            };
            let Ok(kind) = kind.parse::<BreakpointKind>() else {
                continue;
            };
            let Ok(line) = line.parse::<u32>() else {
                continue;
            };
            let file = TreePath::new(path);
            if !registry.tree.exists(&file) {
                tracing::debug!(file = %file, line, "dropping breakpoint for missing file");
                continue;
            }
            registry.insert_sorted(Breakpoint { file, line, kind });
        }

        registry
    }

    /// Sets a line breakpoint. Returns `Ok(false)` when one already exists
    /// at (file, line). Persistence failures are surfaced and leave the
    /// registry unchanged.
    pub fn add(&mut self, file: TreePath, line: u32) -> io::Result<bool> {
        let index = self.partition_index(&file, line);
        if self.is_set_at(index, &file, line) {
            return Ok(false);
        }
        self.items.insert(
            index,
            Breakpoint {
                file,
                line,
                kind: BreakpointKind::Line,
            },
        );
        if let Err(err) = self.persist() {
            self.items.remove(index);
            return Err(err);
        }
        Ok(true)
    }

    /// Removes the breakpoint at (file, line), if set.
    pub fn remove(&mut self, file: &TreePath, line: u32) -> io::Result<bool> {
        let index = self.partition_index(file, line);
        if !self.is_set_at(index, file, line) {
            return Ok(false);
        }
        let removed = self.items.remove(index);
        if let Err(err) = self.persist() {
            self.items.insert(index, removed);
            return Err(err);
        }
        Ok(true)
    }

    pub fn is_set(&self, file: &TreePath, line: u32) -> bool {
        self.is_set_at(self.partition_index(file, line), file, line)
    }

    /// All breakpoints, sorted by (file, line).
    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        self.items.iter()
    }

    pub fn for_file<'a>(&'a self, file: &'a TreePath) -> impl Iterator<Item = &'a Breakpoint> {
        self.items.iter().filter(move |bp| &bp.file == file)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn partition_index(&self, file: &TreePath, line: u32) -> usize {
        self.items
            .partition_point(|bp| (&bp.file, bp.line) < (file, line))
    }

    fn is_set_at(&self, index: usize, file: &TreePath, line: u32) -> bool {
        self.items
            .get(index)
            .is_some_and(|bp| &bp.file == file && bp.line == line)
    }

    fn insert_sorted(&mut self, breakpoint: Breakpoint) {
        let index = self.partition_index(&breakpoint.file, breakpoint.line);
        if !self.is_set_at(index, &breakpoint.file, breakpoint.line) {
            self.items.insert(index, breakpoint);
        }
    }

    fn persist(&self) -> io::Result<()> {
        let mut out = String::new();
        for bp in &self.items {
            out.push_str(&format!("{} {} {}\n", bp.kind, bp.file, bp.line));
        }
        self.tree.write(&self.settings_file, &out)
    }
}

impl fmt::Debug for Breakpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Breakpoints")
            .field("settings_file", &self.settings_file)
            .field("items", &self.items)
            .finish()
    }
}
