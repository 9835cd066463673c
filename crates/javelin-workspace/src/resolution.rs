use std::sync::Arc;

use javelin_core::paths;
use javelin_project::BuildDependency;
use javelin_vfs::{SiteTree, TreePath};

/// The classpath-derived resolution cache.
///
/// Holds the aggregated classpath in resolution order plus the workspace's
/// trees, which is enough to answer classloader-style "which entry provides
/// this class" questions for directory entries. Entries are told apart by
/// their [`BuildDependency`] classification; archive contents are opaque
/// here, only path identity matters for them.
pub struct ResolutionCache {
    entries: Vec<String>,
    sites: Vec<Arc<dyn SiteTree>>,
}

impl ResolutionCache {
    pub(crate) fn new(entries: Vec<String>, sites: Vec<Arc<dyn SiteTree>>) -> Self {
        Self { entries, sites }
    }

    /// Classpath entries in resolution order, duplicates already dropped.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, entry: &str) -> bool {
        let normalized = paths::normalize_separators(entry);
        // Queries arrive in declaration shape; classification decides how
        // the aggregation spelled them. Entries are absolute, so the root
        // passed to the path rules is irrelevant.
        let shaped = match BuildDependency::classify_path("/", &normalized) {
            // Archives keep their shape on the classpath.
            Some(BuildDependency::Archive(_)) => normalized,
            // Coordinates and project references never appear as entries.
            Some(BuildDependency::Package(_) | BuildDependency::ProjectRef(_)) => normalized,
            // Directory entries carry a trailing `/`.
            None => paths::with_dir_suffix(&normalized),
        };
        self.entries.contains(&shaped)
    }

    /// The first directory entry that provides a compiled class for
    /// `class_name`, in resolution order.
    pub fn find_entry_for_class(&self, class_name: &str) -> Option<&str> {
        let class_file = format!("{}.class", class_name.replace('.', "/"));
        self.entries
            .iter()
            .find(|entry| match BuildDependency::classify_path("/", entry) {
                // Archives cannot be inspected through the site trees.
                Some(BuildDependency::Archive(_)) => false,
                Some(BuildDependency::Package(_) | BuildDependency::ProjectRef(_)) => false,
                // Directory entries can be probed through the trees.
                None => self.sites.iter().any(|site| {
                    match paths::relative_to(site.location(), entry) {
                        Some(dir) => site.exists(&TreePath::new(dir).join(&class_file)),
                        None => false,
                    }
                }),
            })
            .map(String::as_str)
    }
}

impl std::fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_vfs::MemoryTree;

    #[test]
    fn contains_normalizes_its_query() {
        let cache = ResolutionCache::new(
            vec!["/p/classes/".to_string(), "/p/lib/dep.jar".to_string()],
            Vec::new(),
        );
        assert!(cache.contains("/p/classes"));
        assert!(cache.contains("/p/classes/"));
        assert!(cache.contains("/p/lib/dep.jar"));
        assert!(!cache.contains("/q/classes"));
    }

    #[test]
    fn class_lookup_walks_directory_entries_in_order() {
        let tree = MemoryTree::with_location("/p");
        tree.write(&TreePath::new("classes/pkg/Main.class"), "").unwrap();

        let cache = ResolutionCache::new(
            vec!["/other/classes/".to_string(), "/p/classes/".to_string()],
            vec![Arc::new(tree)],
        );
        assert_eq!(cache.find_entry_for_class("pkg.Main"), Some("/p/classes/"));
        assert_eq!(cache.find_entry_for_class("pkg.Absent"), None);
    }

    #[test]
    fn archives_are_opaque_to_class_lookup() {
        let tree = MemoryTree::with_location("/p");
        tree.write(&TreePath::new("lib/dep.jar"), "").unwrap();

        let cache = ResolutionCache::new(
            vec!["/p/lib/dep.jar".to_string()],
            vec![Arc::new(tree)],
        );
        assert_eq!(cache.find_entry_for_class("pkg.Main"), None);
    }
}
