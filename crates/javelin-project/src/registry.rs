use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use javelin_core::paths;
use javelin_vfs::{SiteTree, TreeIdentity};

use crate::project::{Project, ProjectError};

/// Maps tree roots to their canonical [`Project`].
///
/// The registry holds weak back-references: it resolves identity but does
/// not keep projects alive. Creation happens under the registry lock, so at
/// most one `Project` ever exists per tree root, including under concurrent
/// lookup-or-create calls.
#[derive(Debug, Default)]
pub struct ProjectRegistry {
    inner: Mutex<HashMap<TreeIdentity, Weak<Project>>>,
}

impl ProjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the project for `tree`, creating and registering it if the
    /// root is not yet known.
    pub fn get_or_create(&self, tree: Arc<dyn SiteTree>) -> Result<Arc<Project>, ProjectError> {
        let mut inner = self.inner.lock().expect("registry mutex poisoned");
        inner.retain(|_, project| project.strong_count() > 0);

        let identity = tree.identity();
        if let Some(existing) = inner.get(&identity).and_then(Weak::upgrade) {
            return Ok(existing);
        }

        let project = Arc::new(Project::new(tree)?);
        inner.insert(identity, Arc::downgrade(&project));
        Ok(project)
    }

    /// Pure lookup; `None` if the root was never registered or its project
    /// has been dropped.
    pub fn get(&self, identity: &TreeIdentity) -> Option<Arc<Project>> {
        self.inner
            .lock()
            .expect("registry mutex poisoned")
            .get(identity)
            .and_then(Weak::upgrade)
    }

    /// Looks a project up by the absolute location of its tree root.
    pub fn project_at_location(&self, location: &str) -> Option<Arc<Project>> {
        let location = paths::with_dir_suffix(&paths::normalize_separators(location));
        self.inner
            .lock()
            .expect("registry mutex poisoned")
            .values()
            .filter_map(Weak::upgrade)
            .find(|project| project.tree().location() == location)
    }
}
