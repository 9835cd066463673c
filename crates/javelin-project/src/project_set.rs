use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use javelin_core::paths;
use javelin_vfs::{TreeIdentity, TreePath};

use crate::dependency::BuildDependency;
use crate::project::Project;
use crate::registry::ProjectRegistry;

/// The transitive dependency view over a root project.
///
/// Declared sibling projects are resolved against the registry by location.
/// Traversal is depth-first from the root in declaration order with a
/// visited set, so cyclic declarations terminate and every project
/// contributes exactly once, first seen wins.
///
/// The flattened path arrays are computed once and cached; call
/// [`ProjectSet::reset`] after the dependency graph changes. There is no
/// automatic invalidation hook.
pub struct ProjectSet {
    root: Arc<Project>,
    registry: Arc<ProjectRegistry>,
    flattened: Mutex<Option<Flattened>>,
}

#[derive(Debug, Clone, Default)]
struct Flattened {
    class_paths: Vec<String>,
    lib_paths: Vec<String>,
}

impl ProjectSet {
    pub fn new(root: Arc<Project>, registry: Arc<ProjectRegistry>) -> Self {
        Self {
            root,
            registry,
            flattened: Mutex::new(None),
        }
    }

    pub fn root(&self) -> &Arc<Project> {
        &self.root
    }

    /// Every project in the set, depth-first from the root, declaration
    /// order, each exactly once.
    pub fn projects(&self) -> Vec<Arc<Project>> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        self.visit(self.root.clone(), &mut visited, &mut out);
        out
    }

    /// The aggregated classpath: the root project's entries first, then
    /// each dependency's, duplicates dropped on first-seen basis. Entries
    /// are shaped by their [`BuildDependency`] classification: each
    /// project's output directory leads its contribution, archives stay
    /// as-is, plain directories carry a trailing `/`, and project/package
    /// references contribute no path of their own.
    pub fn class_paths(&self) -> Vec<String> {
        self.ensure_flattened().class_paths
    }

    /// The aggregated absolute library paths (archives and plain
    /// directories), deduplicated the same way.
    pub fn lib_paths_absolute(&self) -> Vec<String> {
        self.ensure_flattened().lib_paths
    }

    /// Drops the cached path arrays.
    pub fn reset(&self) {
        *self.flattened.lock().expect("project set mutex poisoned") = None;
    }

    /// Finds `path` in the set; root project first, then siblings in
    /// declaration order, first match wins.
    pub fn source_file(&self, path: &TreePath) -> Option<(Arc<Project>, TreePath)> {
        self.projects()
            .into_iter()
            .find(|project| project.tree().exists(path))
            .map(|project| (project, path.clone()))
    }

    /// Finds the source file for a binary class name, same search order as
    /// [`ProjectSet::source_file`].
    pub fn java_file_for_class_name(&self, class_name: &str) -> Option<(Arc<Project>, TreePath)> {
        self.projects().into_iter().find_map(|project| {
            let file = project.java_file_for_class_name(class_name)?;
            Some((project, file))
        })
    }

    fn visit(
        &self,
        project: Arc<Project>,
        visited: &mut HashSet<TreeIdentity>,
        out: &mut Vec<Arc<Project>>,
    ) {
        if !visited.insert(project.identity()) {
            return;
        }
        // Owned values only past this point; no config lock is held across
        // recursion.
        let dependencies = project.build_dependencies();
        out.push(project);

        for dependency in dependencies {
            match dependency {
                BuildDependency::ProjectRef(location) => {
                    match self.registry.project_at_location(&location) {
                        Some(sibling) => self.visit(sibling, visited, out),
                        None => {
                            tracing::warn!(
                                location = %location,
                                "declared sibling project is not registered; skipping"
                            );
                        }
                    }
                }
                // Archives and packages contribute paths, not projects.
                BuildDependency::Archive(_) | BuildDependency::Package(_) => {}
            }
        }
    }

    fn ensure_flattened(&self) -> Flattened {
        let mut cache = self.flattened.lock().expect("project set mutex poisoned");
        if let Some(flattened) = cache.as_ref() {
            return flattened.clone();
        }

        let mut flattened = Flattened::default();
        let mut seen_class = HashSet::new();
        let mut seen_lib = HashSet::new();
        for project in self.projects() {
            let tree = project.tree().clone();
            let config = project.config();
            let location = config.location().to_string();
            let output = paths::with_dir_suffix(&paths::absolute_from(
                &location,
                config.build_path().as_str(),
            ));
            let lib_entries: Vec<String> = config.lib_paths().to_vec();
            drop(config);

            // The project's own classes lead its contribution.
            if seen_class.insert(output.clone()) {
                flattened.class_paths.push(output);
            }

            for entry in lib_entries {
                match BuildDependency::classify(tree.as_ref(), &entry) {
                    Some(BuildDependency::Archive(archive)) => {
                        if seen_class.insert(archive.clone()) {
                            flattened.class_paths.push(archive.clone());
                        }
                        if seen_lib.insert(archive.clone()) {
                            flattened.lib_paths.push(archive);
                        }
                    }
                    // Walked by the traversal; its classes arrive through
                    // its own output path.
                    Some(BuildDependency::ProjectRef(_)) => {}
                    Some(BuildDependency::Package(coordinates)) => {
                        tracing::debug!(
                            package = %coordinates,
                            "package reference contributes no classpath entry"
                        );
                    }
                    // Plain directory entry.
                    None => {
                        let absolute = paths::absolute_from(&location, &entry);
                        let dir = paths::with_dir_suffix(&absolute);
                        if seen_class.insert(dir.clone()) {
                            flattened.class_paths.push(dir);
                        }
                        if seen_lib.insert(absolute.clone()) {
                            flattened.lib_paths.push(absolute);
                        }
                    }
                }
            }
        }

        *cache = Some(flattened.clone());
        flattened
    }
}

impl std::fmt::Debug for ProjectSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectSet")
            .field("root", &self.root.tree().location())
            .finish_non_exhaustive()
    }
}
