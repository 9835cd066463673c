use std::sync::Arc;

use javelin_build::{BuildOutcome, DelimiterParser, ProjectBuilder};
use javelin_vfs::{MemoryTree, SiteTree, TreePath};
use javelin_workspace::Workspace;

fn workspace_with_sources(files: &[(&str, &str)]) -> (Workspace, Arc<MemoryTree>) {
    let tree = Arc::new(MemoryTree::new());
    for (path, text) in files {
        tree.write(&TreePath::new(path), text).unwrap();
    }
    let workspace = Workspace::new();
    workspace.add_project(tree.clone()).unwrap();
    (workspace, tree)
}

#[test]
fn edit_build_fix_cycle_updates_the_issue_registry() {
    let (workspace, tree) = workspace_with_sources(&[
        ("source/Good.java", "class Good {}"),
        ("source/Bad.java", "class Bad {"),
    ]);
    let root = workspace.root_project().unwrap();
    let builder = ProjectBuilder::new(root.clone(), Arc::new(DelimiterParser));

    builder.mark_all_sources_dirty().unwrap();
    let report = builder.build_files(|_| {});
    assert_eq!(report.outcome, BuildOutcome::PartialFailure);
    assert_eq!(root.issues().summary().errors, 1);

    // The pass persisted a snapshot alongside the sources.
    assert!(tree.exists(&TreePath::new(".javelin/issues.json")));

    tree.write(&TreePath::new("source/Bad.java"), "class Bad {}").unwrap();
    builder.mark_dirty(TreePath::new("source/Bad.java"));
    let report = builder.build_files(|_| {});

    assert_eq!(report.outcome, BuildOutcome::Success);
    assert!(root.issues().is_empty());
}

#[test]
fn issue_snapshots_survive_a_workspace_reload() {
    let (workspace, tree) = workspace_with_sources(&[("source/Bad.java", "class Bad {")]);
    let root = workspace.root_project().unwrap();
    let builder = ProjectBuilder::new(root, Arc::new(DelimiterParser));
    builder.mark_all_sources_dirty().unwrap();
    builder.build_files(|_| {});

    // A fresh workspace over the same tree sees the previous pass's issues
    // before any build has run.
    let reopened = Workspace::new();
    let root = reopened.add_project(tree).unwrap();
    assert_eq!(root.issues().summary().errors, 1);
    assert_eq!(
        root.issues().for_file(&TreePath::new("source/Bad.java")).len(),
        1
    );
}

#[test]
fn breakpoints_reload_minus_unresolvable_files() {
    let (workspace, tree) = workspace_with_sources(&[("source/Main.java", "class Main {}")]);
    let root = workspace.root_project().unwrap();

    // One record for a file that never existed, alongside two live ones.
    tree.write(
        &TreePath::new(".javelin/breakpoints"),
        "line source/Main.java 8\nline source/Gone.java 3\nline source/Main.java 2\n",
    )
    .unwrap();

    let breakpoints = root.breakpoints();
    let loaded: Vec<_> = breakpoints
        .iter()
        .map(|bp| (bp.file.as_str().to_string(), bp.line))
        .collect();
    assert_eq!(
        loaded,
        [
            ("source/Main.java".to_string(), 2),
            ("source/Main.java".to_string(), 8),
        ]
    );
}

#[test]
fn breakpoint_mutations_write_through() {
    let (workspace, tree) = workspace_with_sources(&[("source/Main.java", "class Main {}")]);
    let root = workspace.root_project().unwrap();

    root.breakpoints()
        .add(TreePath::new("source/Main.java"), 5)
        .unwrap();
    root.breakpoints()
        .add(TreePath::new("source/Main.java"), 1)
        .unwrap();
    root.breakpoints()
        .remove(&TreePath::new("source/Main.java"), 5)
        .unwrap();

    assert_eq!(
        tree.read_to_string(&TreePath::new(".javelin/breakpoints")).unwrap(),
        "line source/Main.java 1\n"
    );
}
