use serde::{Deserialize, Serialize};

use javelin_core::paths;
use javelin_vfs::{SiteTree, TreePath};

use crate::project::SETTINGS_DIR;
use crate::DEFAULT_SOURCE_DIR;

/// One declared classpath contributor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildDependency {
    /// An archive file (`.jar`, `.zip`), by absolute location.
    Archive(String),
    /// A sibling project, by the absolute location of its root.
    ProjectRef(String),
    /// An external package reference, `group:artifact[:version]`.
    Package(String),
}

impl BuildDependency {
    /// Classifies an entry by its path shape alone: archive extension or
    /// coordinate shape. Directories need a tree to inspect; see
    /// [`BuildDependency::classify`].
    pub fn classify_path(root: &str, entry: &str) -> Option<BuildDependency> {
        let entry = paths::normalize_separators(entry);
        if paths::is_archive(&entry) {
            return Some(BuildDependency::Archive(paths::absolute_from(root, &entry)));
        }
        if looks_like_coordinates(&entry) {
            return Some(BuildDependency::Package(entry));
        }
        None
    }

    /// Classifies a raw dependency entry as declared in configuration.
    ///
    /// Rule order: archive extension, then coordinate shape, then a
    /// directory carrying a project marker. Anything else is unresolved.
    pub fn classify(tree: &dyn SiteTree, entry: &str) -> Option<BuildDependency> {
        let entry = paths::normalize_separators(entry);
        if let Some(dependency) = Self::classify_path(tree.location(), &entry) {
            return Some(dependency);
        }

        let dir = match paths::relative_to(tree.location(), &entry) {
            Some(relative) => TreePath::new(relative),
            None if paths::is_absolute(&entry) => return None,
            None => TreePath::new(&entry),
        };
        if is_project_root(tree, &dir) {
            let absolute = paths::absolute_from(tree.location(), dir.as_str());
            return Some(BuildDependency::ProjectRef(paths::with_dir_suffix(&absolute)));
        }
        None
    }

    /// The file-system location this dependency resolves to, if it has one.
    pub fn location(&self) -> Option<&str> {
        match self {
            BuildDependency::Archive(location) | BuildDependency::ProjectRef(location) => {
                Some(location)
            }
            BuildDependency::Package(_) => None,
        }
    }

    /// Whether the dependency currently resolves to an entry in `tree`.
    ///
    /// External locations and package references cannot be inspected
    /// through the tree and report `false`.
    pub fn resolves_to_file(&self, tree: &dyn SiteTree) -> bool {
        match self {
            BuildDependency::Archive(location) | BuildDependency::ProjectRef(location) => {
                match paths::relative_to(tree.location(), location) {
                    Some(relative) => tree.exists(&TreePath::new(relative)),
                    None => false,
                }
            }
            BuildDependency::Package(_) => false,
        }
    }
}

/// Whether a directory looks like a project root: it carries the settings
/// dir, or at least the conventional source subtree.
pub(crate) fn is_project_root(tree: &dyn SiteTree, dir: &TreePath) -> bool {
    tree.is_dir(&dir.join(SETTINGS_DIR)) || tree.is_dir(&dir.join(DEFAULT_SOURCE_DIR))
}

fn looks_like_coordinates(entry: &str) -> bool {
    if entry.contains('/') {
        return false;
    }
    let mut segments = entry.split(':');
    let group = segments.next().unwrap_or("");
    let artifact = segments.next().unwrap_or("");
    !group.is_empty() && !artifact.is_empty() && segments.all(|segment| !segment.is_empty())
}
