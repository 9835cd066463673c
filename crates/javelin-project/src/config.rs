use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};

use javelin_core::paths;
use javelin_vfs::{SiteTree, TreePath};

use crate::dependency::BuildDependency;

/// Conventional source subtree for a freshly created project.
pub const DEFAULT_SOURCE_DIR: &str = "source";
/// Conventional output subtree for a freshly created project.
pub const DEFAULT_BUILD_DIR: &str = "classes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildPathKind {
    Source,
    Output,
}

/// A configuration change, discriminated by what it affects.
///
/// Only [`ConfigChange::DependencyPaths`] changes the identity of the
/// workspace's dependency resolution; build-path changes never do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigChange {
    BuildPath {
        kind: BuildPathKind,
        old: TreePath,
        new: TreePath,
    },
    DependencyPaths,
}

/// Per-project mutable configuration.
///
/// Paths under the project root are stored relative to it, `/`-separated.
/// Setters never fail: an external path that cannot be normalized is stored
/// as given and only logged, since configuration may legitimately reference
/// paths that do not exist yet.
pub struct ProjectConfig {
    tree: Arc<dyn SiteTree>,
    /// Absolute project root, `/`-suffixed.
    location: String,
    source_path: TreePath,
    build_path: TreePath,
    /// Ordered unique library paths, relative when under the root.
    lib_paths: Vec<String>,
    /// Ordered unique sibling-project locations, absolute and `/`-suffixed.
    project_paths: Vec<String>,
    subscribers: Vec<Sender<ConfigChange>>,
}

impl ProjectConfig {
    pub fn new(tree: Arc<dyn SiteTree>) -> Self {
        let location = tree.location().to_string();
        Self {
            tree,
            location,
            source_path: TreePath::new(DEFAULT_SOURCE_DIR),
            build_path: TreePath::new(DEFAULT_BUILD_DIR),
            lib_paths: Vec::new(),
            project_paths: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Absolute project root, `/`-suffixed.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn source_path(&self) -> &TreePath {
        &self.source_path
    }

    pub fn build_path(&self) -> &TreePath {
        &self.build_path
    }

    /// Library paths in stored (relative-when-possible) form.
    pub fn lib_paths(&self) -> &[String] {
        &self.lib_paths
    }

    /// Declared sibling-project locations, in declaration order.
    pub fn project_paths(&self) -> &[String] {
        &self.project_paths
    }

    /// Registers a subscriber for subsequent configuration changes.
    pub fn subscribe(&mut self) -> Receiver<ConfigChange> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn set_source_path(&mut self, path: impl AsRef<str>) {
        let new = self.normalize_tree_path(path.as_ref());
        if new == self.source_path {
            return;
        }
        let old = std::mem::replace(&mut self.source_path, new.clone());
        self.notify(ConfigChange::BuildPath {
            kind: BuildPathKind::Source,
            old,
            new,
        });
    }

    pub fn set_build_path(&mut self, path: impl AsRef<str>) {
        let new = self.normalize_tree_path(path.as_ref());
        if new == self.build_path {
            return;
        }
        let old = std::mem::replace(&mut self.build_path, new.clone());
        self.notify(ConfigChange::BuildPath {
            kind: BuildPathKind::Output,
            old,
            new,
        });
    }

    /// Adds a library path. Adding a path already present is a no-op.
    pub fn add_lib_path(&mut self, path: impl AsRef<str>) {
        let entry = self.normalize_lib_entry(path.as_ref());
        if self.lib_paths.contains(&entry) {
            return;
        }
        self.lib_paths.push(entry);
        self.notify(ConfigChange::DependencyPaths);
    }

    pub fn remove_lib_path(&mut self, path: impl AsRef<str>) {
        let entry = self.normalize_lib_entry(path.as_ref());
        let before = self.lib_paths.len();
        self.lib_paths.retain(|existing| existing != &entry);
        if self.lib_paths.len() != before {
            self.notify(ConfigChange::DependencyPaths);
        }
    }

    /// Declares a sibling project by its root location.
    pub fn add_project_path(&mut self, location: impl AsRef<str>) {
        let entry = self.normalize_project_location(location.as_ref());
        if self.project_paths.contains(&entry) {
            return;
        }
        self.project_paths.push(entry);
        self.notify(ConfigChange::DependencyPaths);
    }

    pub fn remove_project_path(&mut self, location: impl AsRef<str>) {
        let entry = self.normalize_project_location(location.as_ref());
        let before = self.project_paths.len();
        self.project_paths.retain(|existing| existing != &entry);
        if self.project_paths.len() != before {
            self.notify(ConfigChange::DependencyPaths);
        }
    }

    /// The declared classpath contributors, classified.
    ///
    /// Library entries resolve by rule (archive, coordinates, nested
    /// project marker); declared sibling locations are project references
    /// by construction. Plain directory entries produce no dependency
    /// value; they contribute through [`ProjectConfig::class_paths`] only.
    pub fn build_dependencies(&self) -> Vec<BuildDependency> {
        let mut out = Vec::new();
        for entry in &self.lib_paths {
            if let Some(dependency) = BuildDependency::classify(self.tree.as_ref(), entry) {
                out.push(dependency);
            }
        }
        for location in &self.project_paths {
            out.push(BuildDependency::ProjectRef(location.clone()));
        }
        out
    }

    /// The classpath this project contributes: the absolute output directory
    /// first, so the project's own classes shadow library duplicates, then
    /// the library entries in declaration order. Entries are shaped by
    /// their [`BuildDependency`] classification: archives stay as-is, plain
    /// directories carry a trailing `/`, nested projects and package
    /// references contribute no path of their own.
    pub fn class_paths(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(1 + self.lib_paths.len());
        out.push(paths::with_dir_suffix(&paths::absolute_from(
            &self.location,
            self.build_path.as_str(),
        )));
        for entry in &self.lib_paths {
            match BuildDependency::classify(self.tree.as_ref(), entry) {
                Some(dependency @ BuildDependency::Archive(_)) => {
                    // Relative entries live in this tree; note the ones
                    // that have not been written yet.
                    if !paths::is_absolute(entry) && !dependency.resolves_to_file(self.tree.as_ref())
                    {
                        tracing::debug!(archive = %entry, "declared archive is not present yet");
                    }
                    if let Some(location) = dependency.location() {
                        out.push(location.to_string());
                    }
                }
                // A nested project joins the set as a project; its classes
                // arrive through its own output path.
                Some(BuildDependency::ProjectRef(_)) => {}
                // Coordinates are not paths.
                Some(BuildDependency::Package(_)) => {}
                None => out.push(paths::with_dir_suffix(&paths::absolute_from(
                    &self.location,
                    entry,
                ))),
            }
        }
        out
    }

    /// Library paths in absolute form, shape preserved (no dir suffixing).
    pub fn lib_paths_absolute(&self) -> Vec<String> {
        self.lib_paths
            .iter()
            .map(|lib| paths::absolute_from(&self.location, lib))
            .collect()
    }

    fn normalize_tree_path(&self, path: &str) -> TreePath {
        let normalized = paths::normalize_separators(path);
        if paths::is_absolute(&normalized) {
            match paths::relative_to(&self.location, &normalized) {
                Some(relative) => TreePath::new(relative),
                None => {
                    tracing::warn!(
                        path = %normalized,
                        root = %self.location,
                        "path is outside the project root; storing best-effort relative form"
                    );
                    TreePath::new(normalized)
                }
            }
        } else {
            TreePath::new(normalized)
        }
    }

    fn normalize_lib_entry(&self, path: &str) -> String {
        let normalized = paths::normalize_separators(path);
        if paths::is_absolute(&normalized) {
            match paths::relative_to(&self.location, &normalized) {
                Some(relative) => TreePath::new(relative).as_str().to_string(),
                None => {
                    tracing::warn!(
                        path = %normalized,
                        root = %self.location,
                        "library path is outside the project root; storing as-is"
                    );
                    normalized
                }
            }
        } else {
            TreePath::new(normalized).as_str().to_string()
        }
    }

    fn normalize_project_location(&self, location: &str) -> String {
        let normalized = paths::normalize_separators(location);
        paths::with_dir_suffix(&paths::absolute_from(&self.location, &normalized))
    }

    fn notify(&mut self, change: ConfigChange) {
        self.subscribers
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
    }
}

impl std::fmt::Debug for ProjectConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectConfig")
            .field("location", &self.location)
            .field("source_path", &self.source_path)
            .field("build_path", &self.build_path)
            .field("lib_paths", &self.lib_paths)
            .field("project_paths", &self.project_paths)
            .finish_non_exhaustive()
    }
}
