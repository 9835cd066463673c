use std::sync::Arc;

use javelin_project::Project;
use javelin_vfs::{MemoryTree, SiteTree, TreePath};
use javelin_workspace::Workspace;

fn added(workspace: &Workspace, location: &str) -> Arc<Project> {
    workspace
        .add_project(Arc::new(MemoryTree::with_location(location)))
        .unwrap()
}

#[test]
fn classpath_is_deduplicated_with_the_root_output_first() {
    let workspace = Workspace::new();
    let root = added(&workspace, "/root");
    let dep = added(&workspace, "/dep");

    root.config_mut().add_lib_path("/shared/common.jar");
    dep.config_mut().add_lib_path("/shared/common.jar");
    root.config_mut().add_project_path("/dep");

    let class_paths = workspace.class_paths();
    assert_eq!(
        class_paths,
        ["/root/classes/", "/shared/common.jar", "/dep/classes/"]
    );

    let unique: std::collections::HashSet<_> = class_paths.iter().collect();
    assert_eq!(unique.len(), class_paths.len());
}

#[test]
fn cyclic_sibling_declarations_terminate() {
    let workspace = Workspace::new();
    let a = added(&workspace, "/a");
    let b = added(&workspace, "/b");

    a.config_mut().add_project_path("/b");
    b.config_mut().add_project_path("/a");

    assert_eq!(workspace.class_paths(), ["/a/classes/", "/b/classes/"]);
}

#[test]
fn build_path_changes_never_tear_the_resolver_down() {
    let workspace = Workspace::new();
    let root = added(&workspace, "/root");

    let before = workspace.resolver().unwrap();
    root.config_mut().set_build_path("out");
    root.config_mut().set_source_path("src");
    let after = workspace.resolver().unwrap();

    assert!(Arc::ptr_eq(&before, &after));
}

#[test]
fn dependency_path_changes_rebuild_the_resolver() {
    let workspace = Workspace::new();
    let root = added(&workspace, "/root");

    let before = workspace.resolver().unwrap();
    root.config_mut().add_lib_path("lib/extra.jar");
    let after = workspace.resolver().unwrap();

    assert!(!Arc::ptr_eq(&before, &after));
    assert!(after.entries().contains(&"/root/lib/extra.jar".to_string()));
    assert!(after.contains("/root/lib/extra.jar"));
}

#[test]
fn redundant_config_mutations_fire_no_invalidation() {
    let workspace = Workspace::new();
    let root = added(&workspace, "/root");
    root.config_mut().add_lib_path("lib/dep.jar");

    let before = workspace.resolver().unwrap();
    root.config_mut().add_lib_path("lib/dep.jar");
    root.config_mut().remove_lib_path("lib/absent.jar");
    let after = workspace.resolver().unwrap();

    assert!(Arc::ptr_eq(&before, &after));
}

#[test]
fn adding_a_project_refreshes_sites_but_not_the_resolver() {
    let workspace = Workspace::new();
    added(&workspace, "/root");

    let before = workspace.resolver().unwrap();
    assert_eq!(workspace.sites().len(), 1);

    added(&workspace, "/later");
    let after = workspace.resolver().unwrap();

    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(workspace.sites().len(), 2);
}

#[test]
fn removing_a_project_shrinks_the_site_list() {
    let workspace = Workspace::new();
    let root = added(&workspace, "/root");
    let other = added(&workspace, "/other");

    assert_eq!(workspace.sites().len(), 2);
    assert!(workspace.remove_project(&other));
    assert!(!workspace.remove_project(&other));
    assert_eq!(workspace.sites().len(), 1);
    assert!(Arc::ptr_eq(&workspace.root_project().unwrap(), &root));
}

#[test]
fn lookups_search_the_root_project_first() {
    let workspace = Workspace::new();
    let root = added(&workspace, "/root");
    let dep = added(&workspace, "/dep");
    root.config_mut().add_project_path("/dep");

    dep.tree()
        .write(&TreePath::new("source/pkg/Util.java"), "class Util {}")
        .unwrap();

    let (owner, file) = workspace.java_file_for_class_name("pkg.Util").unwrap();
    assert!(Arc::ptr_eq(&owner, &dep));
    assert_eq!(file, TreePath::new("source/pkg/Util.java"));

    let (owner, _) = workspace
        .find_source_file(&TreePath::new("source/pkg/Util.java"))
        .unwrap();
    assert!(Arc::ptr_eq(&owner, &dep));

    assert!(workspace.java_file_for_class_name("pkg.Absent").is_none());
}

#[test]
fn resolver_answers_classloader_style_lookups() {
    let workspace = Workspace::new();
    let root = added(&workspace, "/root");
    root.tree()
        .write(&TreePath::new("classes/pkg/Main.class"), "")
        .unwrap();

    let resolver = workspace.resolver().unwrap();
    assert_eq!(
        resolver.find_entry_for_class("pkg.Main"),
        Some("/root/classes/")
    );
    assert_eq!(resolver.find_entry_for_class("pkg.Absent"), None);
}
