use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use javelin_core::{ColumnRange, Severity};
use javelin_project::{BuildIssue, Project};
use javelin_vfs::{SiteTree, TreePath};

use crate::parser::UnitParser;

/// Overall result of one build pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Every file in the snapshot contributed zero errors.
    Success,
    /// At least one file contributed errors; all files were still
    /// processed.
    PartialFailure,
}

/// Summary of one build pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub outcome: BuildOutcome,
    pub files_processed: usize,
    pub files_with_errors: usize,
}

/// Progress notification emitted once per file, before it is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildProgress {
    pub current: usize,
    pub total: usize,
    pub file: TreePath,
}

/// Derives one source file's current issue list.
pub struct JavaFileBuilder {
    parser: Arc<dyn UnitParser>,
}

impl JavaFileBuilder {
    pub fn new(parser: Arc<dyn UnitParser>) -> Self {
        Self { parser }
    }

    /// Reads and parses `file`, returning its issues.
    ///
    /// An unreadable file does not fail the pass: it yields a single
    /// synthetic error issue on that file. The parser itself never fails
    /// for invalid input; syntax problems arrive as ordinary errors.
    pub fn issues_for_file(&self, tree: &dyn SiteTree, file: &TreePath) -> Vec<BuildIssue> {
        let text = match tree.read_to_string(file) {
            Ok(text) => text,
            Err(err) => {
                return vec![BuildIssue {
                    file: file.clone(),
                    severity: Severity::Error,
                    line: 1,
                    columns: ColumnRange::at(1),
                    message: format!("cannot read source file: {err}"),
                }];
            }
        };

        let unit = self.parser.parse(file, &text);
        unit.errors()
            .iter()
            .map(|error| BuildIssue {
                file: file.clone(),
                severity: error.severity,
                line: error.line,
                columns: error.columns,
                message: error.message.clone(),
            })
            .collect()
    }
}

/// Drives the incremental pass for one project.
///
/// Edits mark files dirty; [`ProjectBuilder::build_files`] snapshots the
/// queue and reconciles each file's current error list into the project's
/// issue registry. Passes for one project never overlap: the whole pass
/// runs under a pass lock, and the snapshot step takes the queue lock, so a
/// concurrent [`ProjectBuilder::mark_dirty`] lands in the next pass instead
/// of mutating the one in flight.
pub struct ProjectBuilder {
    project: Arc<Project>,
    file_builder: JavaFileBuilder,
    dirty: Mutex<Vec<TreePath>>,
    pass_lock: Mutex<()>,
    cancel: AtomicBool,
}

impl ProjectBuilder {
    pub fn new(project: Arc<Project>, parser: Arc<dyn UnitParser>) -> Self {
        Self {
            project,
            file_builder: JavaFileBuilder::new(parser),
            dirty: Mutex::new(Vec::new()),
            pass_lock: Mutex::new(()),
            cancel: AtomicBool::new(false),
        }
    }

    pub fn project(&self) -> &Arc<Project> {
        &self.project
    }

    /// Enqueues a changed file for the next pass.
    pub fn mark_dirty(&self, file: TreePath) {
        let mut dirty = self.dirty.lock().expect("dirty queue mutex poisoned");
        if !dirty.contains(&file) {
            dirty.push(file);
        }
        drop(dirty);
        self.project.invalidate_source_index();
    }

    /// Enqueues every source file of the project, for an initial full pass.
    pub fn mark_all_sources_dirty(&self) -> std::io::Result<usize> {
        let files = self.project.source_files()?;
        let count = files.len();
        for file in files {
            self.mark_dirty(file);
        }
        Ok(count)
    }

    pub fn has_dirty_files(&self) -> bool {
        !self.dirty.lock().expect("dirty queue mutex poisoned").is_empty()
    }

    /// Asks an in-flight pass to stop after the current file. The
    /// unprocessed remainder is re-enqueued for the next pass.
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Runs one pass over the dirty snapshot.
    ///
    /// Every file is processed even when earlier ones have errors; one
    /// broken file must not block issue updates for the others.
    pub fn build_files(&self, mut progress: impl FnMut(BuildProgress)) -> BuildReport {
        let _pass = self.pass_lock.lock().expect("build pass lock poisoned");
        self.cancel.store(false, Ordering::Relaxed);

        let snapshot =
            std::mem::take(&mut *self.dirty.lock().expect("dirty queue mutex poisoned"));
        let total = snapshot.len();
        tracing::debug!(
            project = %self.project.tree().location(),
            files = total,
            "starting build pass"
        );

        let mut files_processed = 0usize;
        let mut files_with_errors = 0usize;

        for (index, file) in snapshot.iter().enumerate() {
            if self.cancel.load(Ordering::Relaxed) {
                self.requeue(&snapshot[index..]);
                tracing::debug!(remaining = total - index, "build pass canceled");
                break;
            }

            progress(BuildProgress {
                current: index + 1,
                total,
                file: file.clone(),
            });

            let issues = self
                .file_builder
                .issues_for_file(self.project.tree().as_ref(), file);
            let had_errors = issues
                .iter()
                .any(|issue| issue.severity == Severity::Error);
            self.project.issues().replace_for_file(file, issues);

            files_processed += 1;
            if had_errors {
                files_with_errors += 1;
            }
        }

        // The snapshot is derivable state; failing to persist it only warns.
        if let Err(err) = self.project.save_issues() {
            tracing::warn!(
                project = %self.project.tree().location(),
                error = %err,
                "failed to persist issue snapshot"
            );
        }

        let outcome = if files_with_errors == 0 {
            BuildOutcome::Success
        } else {
            BuildOutcome::PartialFailure
        };
        tracing::debug!(
            files_processed,
            files_with_errors,
            ?outcome,
            "build pass finished"
        );

        BuildReport {
            outcome,
            files_processed,
            files_with_errors,
        }
    }

    fn requeue(&self, remainder: &[TreePath]) {
        let mut dirty = self.dirty.lock().expect("dirty queue mutex poisoned");
        for file in remainder {
            if !dirty.contains(file) {
                dirty.push(file.clone());
            }
        }
    }
}
