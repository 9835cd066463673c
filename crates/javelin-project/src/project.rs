use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use javelin_vfs::{collect_files_with_extension, SiteTree, TreeIdentity, TreePath};

use crate::breakpoints::Breakpoints;
use crate::config::{ProjectConfig, DEFAULT_BUILD_DIR, DEFAULT_SOURCE_DIR};
use crate::dependency::BuildDependency;
use crate::issues::BuildIssues;

/// Per-project settings directory; also the nested-project marker.
pub const SETTINGS_DIR: &str = ".javelin";
/// Flat breakpoints file, one record per line.
pub const BREAKPOINTS_FILE: &str = ".javelin/breakpoints";
/// JSON snapshot of the issue registry.
pub const ISSUES_FILE: &str = ".javelin/issues.json";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// One source tree plus its configuration and build state.
///
/// Prefer [`crate::ProjectRegistry::get_or_create`] over constructing
/// directly; the registry is what guarantees one `Project` per tree root.
pub struct Project {
    tree: Arc<dyn SiteTree>,
    config: RwLock<ProjectConfig>,
    issues: OnceLock<Mutex<BuildIssues>>,
    breakpoints: OnceLock<Mutex<Breakpoints>>,
    source_index: Mutex<Option<SourceIndex>>,
}

#[derive(Debug, Clone, Default)]
struct SourceIndex {
    by_class: BTreeMap<String, TreePath>,
}

impl Project {
    /// Opens `tree` as a project. An empty tree gets the conventional
    /// subtrees seeded; the settings dir is ensured either way so the root
    /// is recognizable as a project.
    pub fn new(tree: Arc<dyn SiteTree>) -> Result<Self, ProjectError> {
        if tree.is_empty() {
            tree.create_dir_all(&TreePath::new(DEFAULT_SOURCE_DIR))?;
            tree.create_dir_all(&TreePath::new(DEFAULT_BUILD_DIR))?;
        }
        tree.create_dir_all(&TreePath::new(SETTINGS_DIR))?;

        let config = ProjectConfig::new(tree.clone());
        Ok(Self {
            tree,
            config: RwLock::new(config),
            issues: OnceLock::new(),
            breakpoints: OnceLock::new(),
            source_index: Mutex::new(None),
        })
    }

    pub fn tree(&self) -> &Arc<dyn SiteTree> {
        &self.tree
    }

    pub fn identity(&self) -> TreeIdentity {
        self.tree.identity()
    }

    /// Absolute project root, `/`-suffixed.
    pub fn location(&self) -> String {
        self.tree.location().to_string()
    }

    pub fn config(&self) -> RwLockReadGuard<'_, ProjectConfig> {
        self.config.read().expect("config lock poisoned")
    }

    pub fn config_mut(&self) -> RwLockWriteGuard<'_, ProjectConfig> {
        self.config.write().expect("config lock poisoned")
    }

    /// The classpath contributed by this project alone.
    pub fn class_paths(&self) -> Vec<String> {
        self.config().class_paths()
    }

    /// The project's declared dependencies, classified.
    pub fn build_dependencies(&self) -> Vec<BuildDependency> {
        self.config().build_dependencies()
    }

    /// The issue registry, loaded from its snapshot on first access.
    pub fn issues(&self) -> MutexGuard<'_, BuildIssues> {
        self.issues
            .get_or_init(|| {
                Mutex::new(BuildIssues::load(
                    self.tree.as_ref(),
                    &TreePath::new(ISSUES_FILE),
                ))
            })
            .lock()
            .expect("issues mutex poisoned")
    }

    /// Persists the issue registry snapshot.
    pub fn save_issues(&self) -> io::Result<()> {
        self.issues()
            .save(self.tree.as_ref(), &TreePath::new(ISSUES_FILE))
    }

    /// The breakpoint registry, loaded from its flat file on first access.
    pub fn breakpoints(&self) -> MutexGuard<'_, Breakpoints> {
        self.breakpoints
            .get_or_init(|| {
                Mutex::new(Breakpoints::load(
                    self.tree.clone(),
                    TreePath::new(BREAKPOINTS_FILE),
                ))
            })
            .lock()
            .expect("breakpoints mutex poisoned")
    }

    /// All Java sources under the configured source root, sorted.
    pub fn source_files(&self) -> io::Result<Vec<TreePath>> {
        let source_root = self.config().source_path().clone();
        collect_files_with_extension(self.tree.as_ref(), &source_root, "java")
    }

    /// The binary class name a source file maps to, when the file lives
    /// under the source root.
    pub fn class_name_for_source(&self, path: &TreePath) -> Option<String> {
        let source_root = self.config().source_path().clone();
        let relative = path.strip_prefix(&source_root)?;
        let name = relative.as_str().strip_suffix(".java")?;
        if name.is_empty() {
            return None;
        }
        Some(name.replace('/', "."))
    }

    /// Looks up the source file for a binary class name via the source
    /// index.
    pub fn java_file_for_class_name(&self, class_name: &str) -> Option<TreePath> {
        let mut index = self.source_index.lock().expect("source index mutex poisoned");
        if index.is_none() {
            *index = Some(self.build_source_index());
        }
        index
            .as_ref()
            .and_then(|index| index.by_class.get(class_name).cloned())
    }

    /// Drops the cached source index; the next lookup rescans the tree.
    pub fn invalidate_source_index(&self) {
        *self.source_index.lock().expect("source index mutex poisoned") = None;
    }

    fn build_source_index(&self) -> SourceIndex {
        let mut index = SourceIndex::default();
        let files = match self.source_files() {
            Ok(files) => files,
            Err(err) => {
                tracing::warn!(
                    project = %self.tree.location(),
                    error = %err,
                    "failed to scan source tree for the class index"
                );
                return index;
            }
        };
        for file in files {
            if let Some(class_name) = self.class_name_for_source(&file) {
                index.by_class.entry(class_name).or_insert(file);
            }
        }
        index
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("location", &self.tree.location())
            .finish_non_exhaustive()
    }
}
