use std::collections::BTreeMap;
use std::io;

use serde::{Deserialize, Serialize};

use javelin_core::{ColumnRange, Severity};
use javelin_vfs::{SiteTree, TreePath};

/// One error or warning attached to a source file location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildIssue {
    pub file: TreePath,
    pub severity: Severity,
    pub line: u32,
    pub columns: ColumnRange,
    pub message: String,
}

/// Aggregate issue counts, for UI badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub errors: usize,
    pub warnings: usize,
}

/// Per-project issue registry, keyed by source file.
///
/// Reconciliation is total replacement per file: a build pass swaps a
/// file's whole issue set in one step, so a file whose error set shrinks to
/// empty cannot leak stale entries.
#[derive(Debug, Default)]
pub struct BuildIssues {
    by_file: BTreeMap<TreePath, Vec<BuildIssue>>,
    summary: IssueSummary,
    revision: u64,
}

impl BuildIssues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every issue recorded for `file` with `issues`.
    ///
    /// The removal and insertion count as one observable change: the
    /// revision advances exactly once per call.
    pub fn replace_for_file(&mut self, file: &TreePath, issues: Vec<BuildIssue>) {
        if let Some(old) = self.by_file.remove(file) {
            for issue in &old {
                self.discount(issue.severity);
            }
        }
        if !issues.is_empty() {
            for issue in &issues {
                self.count(issue.severity);
            }
            self.by_file.insert(file.clone(), issues);
        }
        self.revision += 1;
    }

    /// The issues currently recorded for `file`, in reconciliation order.
    pub fn for_file(&self, file: &TreePath) -> &[BuildIssue] {
        self.by_file.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Files that currently have issues.
    pub fn files(&self) -> impl Iterator<Item = &TreePath> {
        self.by_file.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildIssue> {
        self.by_file.values().flatten()
    }

    pub fn summary(&self) -> IssueSummary {
        self.summary
    }

    pub fn total(&self) -> usize {
        self.summary.errors + self.summary.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.by_file.is_empty()
    }

    /// Monotonic change counter; one increment per reconciliation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn clear(&mut self) {
        if self.by_file.is_empty() {
            return;
        }
        self.by_file.clear();
        self.summary = IssueSummary::default();
        self.revision += 1;
    }

    /// Writes the registry as a JSON snapshot at `path`.
    pub fn save(&self, tree: &dyn SiteTree, path: &TreePath) -> io::Result<()> {
        let issues: Vec<&BuildIssue> = self.iter().collect();
        let json = serde_json::to_string_pretty(&issues)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        tree.write(path, &json)
    }

    /// Loads a snapshot previously written by [`BuildIssues::save`].
    ///
    /// Issues are derivable state, so loading is tolerant: a missing or
    /// malformed snapshot yields an empty registry, and entries whose file
    /// no longer resolves in the tree are dropped.
    pub fn load(tree: &dyn SiteTree, path: &TreePath) -> Self {
        let mut registry = Self::new();
        let text = match tree.read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return registry,
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "failed to read issue snapshot");
                return registry;
            }
        };
        let issues: Vec<BuildIssue> = match serde_json::from_str(&text) {
            Ok(issues) => issues,
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "discarding malformed issue snapshot");
                return registry;
            }
        };

        let mut by_file: BTreeMap<TreePath, Vec<BuildIssue>> = BTreeMap::new();
        for issue in issues {
            if !tree.exists(&issue.file) {
                continue;
            }
            by_file.entry(issue.file.clone()).or_default().push(issue);
        }
        for (file, file_issues) in by_file {
            registry.replace_for_file(&file, file_issues);
        }
        registry
    }

    fn count(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.summary.errors += 1,
            Severity::Warning => self.summary.warnings += 1,
        }
    }

    fn discount(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.summary.errors -= 1,
            Severity::Warning => self.summary.warnings -= 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_vfs::MemoryTree;

    fn issue(file: &TreePath, line: u32, severity: Severity, message: &str) -> BuildIssue {
        BuildIssue {
            file: file.clone(),
            severity,
            line,
            columns: ColumnRange::at(1),
            message: message.to_string(),
        }
    }

    #[test]
    fn replacement_is_total() {
        let file = TreePath::new("source/Main.java");
        let mut issues = BuildIssues::new();
        issues.replace_for_file(
            &file,
            vec![
                issue(&file, 1, Severity::Error, "missing brace"),
                issue(&file, 3, Severity::Warning, "unused"),
            ],
        );
        assert_eq!(issues.summary(), IssueSummary { errors: 1, warnings: 1 });

        issues.replace_for_file(&file, vec![issue(&file, 9, Severity::Error, "other")]);
        assert_eq!(issues.for_file(&file).len(), 1);
        assert_eq!(issues.for_file(&file)[0].line, 9);

        issues.replace_for_file(&file, Vec::new());
        assert!(issues.for_file(&file).is_empty());
        assert!(issues.is_empty());
        assert_eq!(issues.summary(), IssueSummary::default());
    }

    #[test]
    fn each_reconciliation_is_one_revision() {
        let file = TreePath::new("source/Main.java");
        let mut issues = BuildIssues::new();
        let before = issues.revision();

        issues.replace_for_file(
            &file,
            vec![
                issue(&file, 1, Severity::Error, "a"),
                issue(&file, 2, Severity::Error, "b"),
            ],
        );
        assert_eq!(issues.revision(), before + 1);
    }

    #[test]
    fn snapshot_round_trip_drops_deleted_files() {
        let tree = MemoryTree::new();
        let kept = TreePath::new("source/Kept.java");
        let gone = TreePath::new("source/Gone.java");
        tree.write(&kept, "class Kept {}").unwrap();

        let mut issues = BuildIssues::new();
        issues.replace_for_file(&kept, vec![issue(&kept, 1, Severity::Error, "bad")]);
        issues.replace_for_file(&gone, vec![issue(&gone, 2, Severity::Warning, "old")]);

        let snapshot = TreePath::new(".javelin/issues.json");
        issues.save(&tree, &snapshot).unwrap();

        let loaded = BuildIssues::load(&tree, &snapshot);
        assert_eq!(loaded.for_file(&kept), issues.for_file(&kept));
        assert!(loaded.for_file(&gone).is_empty());
        assert_eq!(loaded.summary(), IssueSummary { errors: 1, warnings: 0 });
    }

    #[test]
    fn missing_snapshot_loads_empty() {
        let tree = MemoryTree::new();
        let loaded = BuildIssues::load(&tree, &TreePath::new(".javelin/issues.json"));
        assert!(loaded.is_empty());
    }
}
