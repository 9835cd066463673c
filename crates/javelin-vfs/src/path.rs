use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalized path relative to a tree root.
///
/// Always `/`-separated, never starts with `/`, and contains no `.` or `..`
/// segments (both are resolved at construction, with `..` clamped at the
/// root). The empty path is the tree root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TreePath(String);

impl TreePath {
    pub fn new(path: impl AsRef<str>) -> Self {
        let mut segments: Vec<&str> = Vec::new();
        let normalized = path.as_ref().replace('\\', "/");
        for segment in normalized.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
        Self(segments.join("/"))
    }

    /// The tree root.
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn join(&self, tail: impl AsRef<str>) -> Self {
        if self.is_root() {
            return Self::new(tail);
        }
        Self::new(format!("{}/{}", self.0, tail.as_ref()))
    }

    /// The parent path; `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rsplit_once('/') {
            Some((parent, _)) => Some(Self(parent.to_string())),
            None => Some(Self::root()),
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        Some(self.0.rsplit('/').next().unwrap_or(&self.0))
    }

    pub fn extension(&self) -> Option<&str> {
        javelin_core::paths::extension(&self.0)
    }

    /// Whether `self` is `dir` or lives underneath it.
    pub fn starts_with(&self, dir: &TreePath) -> bool {
        if dir.is_root() {
            return true;
        }
        self == dir || self.0.starts_with(&format!("{}/", dir.0))
    }

    /// The path of `self` relative to `dir`, when `self` is under it.
    pub fn strip_prefix(&self, dir: &TreePath) -> Option<TreePath> {
        if dir.is_root() {
            return Some(self.clone());
        }
        if self == dir {
            return Some(TreePath::root());
        }
        self.0
            .strip_prefix(&format!("{}/", dir.0))
            .map(|rest| TreePath(rest.to_string()))
    }
}

impl From<String> for TreePath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<TreePath> for String {
    fn from(value: TreePath) -> Self {
        value.0
    }
}

impl From<&str> for TreePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_normalizes() {
        assert_eq!(TreePath::new("/source/Main.java").as_str(), "source/Main.java");
        assert_eq!(TreePath::new("source//Main.java").as_str(), "source/Main.java");
        assert_eq!(TreePath::new("./source/./Main.java").as_str(), "source/Main.java");
        assert_eq!(TreePath::new("source\\pkg\\Main.java").as_str(), "source/pkg/Main.java");
        assert_eq!(TreePath::new("a/b/../c").as_str(), "a/c");
        assert_eq!(TreePath::new("../a").as_str(), "a");
        assert_eq!(TreePath::new(""), TreePath::root());
    }

    #[test]
    fn parent_and_file_name() {
        let path = TreePath::new("source/pkg/Main.java");
        assert_eq!(path.file_name(), Some("Main.java"));
        assert_eq!(path.parent(), Some(TreePath::new("source/pkg")));
        assert_eq!(TreePath::new("source").parent(), Some(TreePath::root()));
        assert_eq!(TreePath::root().parent(), None);
    }

    #[test]
    fn starts_with_respects_segment_boundaries() {
        let dir = TreePath::new("source");
        assert!(TreePath::new("source/Main.java").starts_with(&dir));
        assert!(TreePath::new("source").starts_with(&dir));
        assert!(!TreePath::new("source-old/Main.java").starts_with(&dir));
        assert!(TreePath::new("anything").starts_with(&TreePath::root()));
    }

    #[test]
    fn strip_prefix_returns_the_remainder() {
        let dir = TreePath::new("source");
        let file = TreePath::new("source/pkg/Main.java");
        assert_eq!(file.strip_prefix(&dir), Some(TreePath::new("pkg/Main.java")));
        assert_eq!(TreePath::new("classes/A.class").strip_prefix(&dir), None);
    }
}
