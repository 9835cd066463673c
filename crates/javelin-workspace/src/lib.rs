//! The top-level workspace container for Javelin.
//!
//! A [`Workspace`] holds one or more projects in declaration order (the
//! first is the root, the one actively edited and built) and owns the
//! shared dependency-resolution cache. The cache is built lazily from the
//! root project's aggregated classpath and is torn down completely whenever
//! any project's configuration reports a dependency-path change;
//! build-path-only changes never touch it.

mod resolution;

pub use resolution::ResolutionCache;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use crossbeam_channel::{Receiver, TryRecvError};

use javelin_project::{ConfigChange, Project, ProjectError, ProjectRegistry, ProjectSet};
use javelin_vfs::{LocalTree, SiteTree, TreePath};

pub struct Workspace {
    registry: Arc<ProjectRegistry>,
    projects: Mutex<Vec<Arc<Project>>>,
    config_events: Mutex<Vec<Receiver<ConfigChange>>>,
    /// Lazily built; `None` means torn down. Construction and invalidation
    /// both run under this lock, so they cannot race.
    resolver: Mutex<Option<Arc<ResolutionCache>>>,
    sites: Mutex<Option<Vec<Arc<dyn SiteTree>>>>,
    root_set: Mutex<Option<Arc<ProjectSet>>>,
}

impl Workspace {
    /// Creates an empty workspace with its own project registry.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ProjectRegistry::new()),
            projects: Mutex::new(Vec::new()),
            config_events: Mutex::new(Vec::new()),
            resolver: Mutex::new(None),
            sites: Mutex::new(None),
            root_set: Mutex::new(None),
        }
    }

    /// Opens a local directory as a workspace with one root project.
    ///
    /// If `path` is a file, its parent directory is used.
    pub fn open_local(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path)
            .with_context(|| format!("failed to read metadata for {}", path.display()))?;
        let root = if meta.is_dir() {
            path
        } else {
            path.parent().context("file path has no parent directory")?
        };

        let tree = LocalTree::new(root)
            .with_context(|| format!("failed to open {}", root.display()))?;
        let workspace = Self::new();
        workspace
            .add_project(Arc::new(tree))
            .with_context(|| format!("failed to open project at {}", root.display()))?;
        Ok(workspace)
    }

    pub fn registry(&self) -> &Arc<ProjectRegistry> {
        &self.registry
    }

    /// Registers (or resolves) the project for `tree` and appends it to the
    /// project list. The first project added is the root.
    ///
    /// Adding a project invalidates the cached site list but not the
    /// resolver: a project's files do not change dependency identity until
    /// it is wired into the graph through configuration.
    pub fn add_project(&self, tree: Arc<dyn SiteTree>) -> Result<Arc<Project>, ProjectError> {
        let project = self.registry.get_or_create(tree)?;

        // Subscribe before listing the project so no change can slip
        // between the two; an unused receiver just gets pruned later.
        let events = project.config_mut().subscribe();

        let mut projects = self.lock_projects();
        let already_listed = projects.iter().any(|existing| Arc::ptr_eq(existing, &project));
        if !already_listed {
            projects.push(project.clone());
        }
        drop(projects);

        if !already_listed {
            self.config_events
                .lock()
                .expect("config events mutex poisoned")
                .push(events);
            self.invalidate_project_list_caches();
            tracing::debug!(project = %project.tree().location(), "project added to workspace");
        }
        Ok(project)
    }

    /// Removes a project from the list. Like [`Workspace::add_project`],
    /// this leaves the resolver cache alone.
    pub fn remove_project(&self, project: &Arc<Project>) -> bool {
        let mut projects = self.lock_projects();
        let before = projects.len();
        projects.retain(|existing| !Arc::ptr_eq(existing, project));
        let removed = projects.len() != before;
        drop(projects);

        if removed {
            self.invalidate_project_list_caches();
            tracing::debug!(project = %project.tree().location(), "project removed from workspace");
        }
        removed
    }

    /// The root project: the first one added.
    pub fn root_project(&self) -> Option<Arc<Project>> {
        self.lock_projects().first().cloned()
    }

    pub fn projects(&self) -> Vec<Arc<Project>> {
        self.lock_projects().clone()
    }

    /// The file trees of all projects, in project order.
    pub fn sites(&self) -> Vec<Arc<dyn SiteTree>> {
        let mut sites = self.sites.lock().expect("sites mutex poisoned");
        if sites.is_none() {
            *sites = Some(
                self.lock_projects()
                    .iter()
                    .map(|project| project.tree().clone())
                    .collect(),
            );
        }
        sites.clone().unwrap_or_default()
    }

    /// The transitive dependency view over the root project.
    pub fn root_set(&self) -> Option<Arc<ProjectSet>> {
        let mut root_set = self.root_set.lock().expect("root set mutex poisoned");
        if root_set.is_none() {
            let root = self.root_project()?;
            *root_set = Some(Arc::new(ProjectSet::new(root, self.registry.clone())));
        }
        root_set.clone()
    }

    /// The dependency-resolution cache, building it if necessary.
    ///
    /// Pending configuration events are drained first, so a dependency-path
    /// change made since the last call is observed before the cache is
    /// consulted. Returns `None` for a workspace without projects.
    pub fn resolver(&self) -> Option<Arc<ResolutionCache>> {
        self.poll_config_changes();

        let mut resolver = self.resolver.lock().expect("resolver mutex poisoned");
        if resolver.is_none() {
            let root_set = self.root_set()?;
            let cache = Arc::new(ResolutionCache::new(root_set.class_paths(), self.sites()));
            tracing::debug!(entries = cache.entries().len(), "built resolution cache");
            *resolver = Some(cache);
        }
        resolver.clone()
    }

    /// The aggregated classpath of the root project and its dependencies.
    pub fn class_paths(&self) -> Vec<String> {
        self.resolver()
            .map(|resolver| resolver.entries().to_vec())
            .unwrap_or_default()
    }

    /// Drains pending configuration events and applies their effect.
    ///
    /// Only dependency-path changes tear the resolver down; build-path
    /// changes are deliberately ignored, since output directories do not
    /// affect dependency resolution identity.
    pub fn poll_config_changes(&self) {
        let mut invalidate = false;
        self.config_events
            .lock()
            .expect("config events mutex poisoned")
            .retain(|events| loop {
                match events.try_recv() {
                    Ok(ConfigChange::DependencyPaths) => invalidate = true,
                    Ok(ConfigChange::BuildPath { .. }) => {}
                    Err(TryRecvError::Empty) => break true,
                    Err(TryRecvError::Disconnected) => break false,
                }
            });

        if invalidate {
            self.invalidate_resolver();
        }
    }

    /// Tears the resolver down completely; it is rebuilt on next access.
    ///
    /// Runs under the resolver lock, so teardown is mutually exclusive
    /// with construction. Lock order is resolver, then root set, matching
    /// [`Workspace::resolver`].
    pub fn invalidate_resolver(&self) {
        let mut resolver = self.resolver.lock().expect("resolver mutex poisoned");
        if let Some(root_set) = self
            .root_set
            .lock()
            .expect("root set mutex poisoned")
            .as_ref()
        {
            root_set.reset();
        }
        if resolver.take().is_some() {
            tracing::debug!("resolution cache torn down");
        }
    }

    /// Finds `path` across the root project and its dependencies.
    pub fn find_source_file(&self, path: &TreePath) -> Option<(Arc<Project>, TreePath)> {
        self.root_set()?.source_file(path)
    }

    /// Finds the source file for a binary class name across the set.
    pub fn java_file_for_class_name(&self, class_name: &str) -> Option<(Arc<Project>, TreePath)> {
        self.root_set()?.java_file_for_class_name(class_name)
    }

    fn lock_projects(&self) -> MutexGuard<'_, Vec<Arc<Project>>> {
        self.projects.lock().expect("projects mutex poisoned")
    }

    fn invalidate_project_list_caches(&self) {
        *self.sites.lock().expect("sites mutex poisoned") = None;
        *self.root_set.lock().expect("root set mutex poisoned") = None;
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("projects", &self.lock_projects().len())
            .finish_non_exhaustive()
    }
}
