use std::sync::Arc;

use javelin_project::{
    BuildDependency, ConfigChange, ProjectRegistry, ProjectSet, SETTINGS_DIR,
};
use javelin_vfs::{LocalTree, MemoryTree, SiteTree, TreePath};

#[test]
fn library_paths_normalize_against_the_project_root() {
    let registry = ProjectRegistry::new();
    let tree = MemoryTree::with_location("/Users/x/proj");
    let project = registry.get_or_create(Arc::new(tree)).unwrap();

    project.config_mut().add_lib_path("/Users/x/proj/lib/foo.jar");

    let config = project.config();
    assert_eq!(config.lib_paths(), ["lib/foo.jar"]);
    assert_eq!(config.lib_paths_absolute(), ["/Users/x/proj/lib/foo.jar"]);
    assert_eq!(
        config.class_paths(),
        ["/Users/x/proj/classes/", "/Users/x/proj/lib/foo.jar"]
    );
}

#[test]
fn config_changes_reach_subscribers_registered_before_them() {
    let registry = ProjectRegistry::new();
    let project = registry
        .get_or_create(Arc::new(MemoryTree::with_location("/p")))
        .unwrap();

    let events = project.config_mut().subscribe();
    project.config_mut().add_lib_path("lib/a.jar");
    project.config_mut().set_build_path("out");

    let received: Vec<_> = events.try_iter().collect();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0], ConfigChange::DependencyPaths);
    assert!(matches!(received[1], ConfigChange::BuildPath { .. }));
}

#[test]
fn nested_projects_classify_as_project_refs() {
    let registry = ProjectRegistry::new();
    let outer = MemoryTree::with_location("/work/outer");
    outer
        .create_dir_all(&TreePath::new(format!("vendor/inner/{SETTINGS_DIR}")))
        .unwrap();
    let project = registry.get_or_create(Arc::new(outer)).unwrap();

    let dependency = BuildDependency::classify(project.tree().as_ref(), "vendor/inner");
    assert_eq!(
        dependency,
        Some(BuildDependency::ProjectRef("/work/outer/vendor/inner/".into()))
    );
    assert_eq!(
        dependency.as_ref().and_then(BuildDependency::location),
        Some("/work/outer/vendor/inner/")
    );
}

#[test]
fn a_set_over_registered_siblings_aggregates_their_paths() {
    let registry = Arc::new(ProjectRegistry::new());
    let app = registry
        .get_or_create(Arc::new(MemoryTree::with_location("/work/app")))
        .unwrap();
    let util = registry
        .get_or_create(Arc::new(MemoryTree::with_location("/work/util")))
        .unwrap();

    util.config_mut().add_lib_path("/jars/text.jar");
    app.config_mut().add_project_path("/work/util");

    let set = ProjectSet::new(app, registry);
    assert_eq!(
        set.class_paths(),
        ["/work/app/classes/", "/work/util/classes/", "/jars/text.jar"]
    );
}

#[test]
fn breakpoints_persist_across_disk_reloads() {
    let tmp = tempfile::tempdir().unwrap();
    let file = TreePath::new("source/Main.java");

    {
        let registry = ProjectRegistry::new();
        let tree = Arc::new(LocalTree::new(tmp.path()).unwrap());
        let project = registry.get_or_create(tree).unwrap();
        project.tree().write(&file, "class Main {}").unwrap();
        project.breakpoints().add(file.clone(), 4).unwrap();
        project.breakpoints().add(file.clone(), 2).unwrap();
    }

    let registry = ProjectRegistry::new();
    let reopened = registry
        .get_or_create(Arc::new(LocalTree::new(tmp.path()).unwrap()))
        .unwrap();
    let breakpoints = reopened.breakpoints();
    let lines: Vec<_> = breakpoints.for_file(&file).map(|bp| bp.line).collect();
    assert_eq!(lines, [2, 4]);
}

#[test]
fn issue_registries_stay_per_project() {
    let registry = ProjectRegistry::new();
    let a = registry
        .get_or_create(Arc::new(MemoryTree::with_location("/a")))
        .unwrap();
    let b = registry
        .get_or_create(Arc::new(MemoryTree::with_location("/b")))
        .unwrap();

    let file = TreePath::new("source/Main.java");
    a.tree().write(&file, "class Main {}").unwrap();

    a.issues().replace_for_file(
        &file,
        vec![javelin_project::BuildIssue {
            file: file.clone(),
            severity: javelin_core::Severity::Error,
            line: 1,
            columns: javelin_core::ColumnRange::at(1),
            message: "broken".into(),
        }],
    );

    assert_eq!(a.issues().total(), 1);
    assert_eq!(b.issues().total(), 0);
}
