use desktop_menu_win::keys::{self, SHELL_ROOT};
use desktop_menu_win::tree::Op;
use desktop_menu_win::{
    Catalog, CatalogError, Direction, EntryValues, KeyScheme, KeyTree, MemoryTree,
    OrderingPolicy, RenameOutcome, ShellTree, ValidationError,
};

fn positional() -> Catalog<MemoryTree> {
    Catalog::new(MemoryTree::new(), KeyScheme::new(None), OrderingPolicy::Positional)
}

fn keys_of(catalog: &Catalog<MemoryTree>) -> Vec<String> {
    catalog.entries().iter().map(|e| e.key.clone()).collect()
}

#[test]
fn delete_subtree_twice_succeeds_twice() {
    let mut catalog = positional();
    catalog.add(r"C:\Tools\app.exe").unwrap();
    let tree = catalog.tree();
    assert!(tree.delete_subtree("CustomApp_app_1").is_ok());
    assert!(tree.delete_subtree("CustomApp_app_1").is_ok());
    assert!(!tree.key_exists("CustomApp_app_1"));
}

#[test]
fn reload_is_deterministic() {
    let mut catalog = positional();
    let hive = catalog.tree().backend();
    hive.seed_verb(SHELL_ROOT, "Foreign", "Foreign tool", r#""C:\f.exe" %V"#);
    hive.seed_verb(SHELL_ROOT, "02_CustomApp_b", "b", r#""C:\b.exe""#);
    hive.seed_verb(SHELL_ROOT, "01_CustomApp_a", "a", r#""C:\a.exe""#);
    catalog.set_show_all(true);

    catalog.reload();
    let first = catalog.all_entries().to_vec();
    catalog.reload();
    assert_eq!(catalog.all_entries(), first.as_slice());
    assert_eq!(first.len(), 3);
}

#[test]
fn command_arguments_are_stripped_on_read() {
    let tree = ShellTree::new(MemoryTree::new());
    tree.write_entry(
        "CustomApp_app_1",
        &EntryValues {
            display_name: "My App".to_string(),
            command_path: r#""C:\Tools\app.exe" --flag"#.to_string(),
            icon_path: Some(r#""C:\Tools\app.exe""#.to_string()),
        },
    )
    .unwrap();

    let read = tree.read_entry("CustomApp_app_1");
    assert_eq!(read.command_path, r"C:\Tools\app.exe");
    assert_eq!(read.display_name, "My App");
    assert_eq!(read.icon_path.as_deref(), Some(r#""C:\Tools\app.exe""#));
}

#[test]
fn system_verbs_never_enter_the_catalog() {
    let mut catalog = positional();
    let hive = catalog.tree().backend();
    for name in ["Paste", "Properties", "New", "paste"] {
        hive.seed_verb(SHELL_ROOT, name, name, r"C:\Windows\explorer.exe");
    }
    hive.seed_verb(SHELL_ROOT, "Tool", "Tool", r"C:\tool.exe");
    catalog.set_show_all(true);
    catalog.reload();
    assert_eq!(keys_of(&catalog), vec!["Tool"]);
    assert!(keys::is_system_item("ScanWithMicrosoftDefender"));
}

#[test]
fn sort_converges_to_ranked_keys() {
    let mut catalog = positional();
    for path in [r"C:\z\Zebra.exe", r"C:\a\Apple.exe", r"C:\m\Mango.exe"] {
        catalog.add(path).unwrap();
    }
    assert_eq!(catalog.reorder().unwrap(), 3);
    assert_eq!(
        keys_of(&catalog),
        vec!["01_CustomApp_Apple", "02_CustomApp_Mango", "03_CustomApp_Zebra"]
    );
    let names: Vec<_> = catalog
        .entries()
        .iter()
        .map(|e| e.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["Apple", "Mango", "Zebra"]);

    assert_eq!(catalog.reorder().unwrap(), 0);
}

#[test]
fn unmanaged_entries_are_protected() {
    let mut catalog = positional();
    let hive = catalog.tree().backend();
    hive.seed_verb(SHELL_ROOT, "Foreign", "Foreign", r"C:\f.exe");
    catalog.add(r"C:\a.exe").unwrap();
    catalog.set_show_all(true);
    let index = catalog.position_of("Foreign").unwrap();
    let writes = catalog.tree().backend().writes();

    assert!(matches!(
        catalog.rename(index, "Mine now"),
        Err(CatalogError::Invalid(ValidationError::NotManaged(_)))
    ));
    assert!(matches!(
        catalog.move_entry(index, Direction::Down),
        Err(CatalogError::Invalid(ValidationError::NotManaged(_)))
    ));
    assert!(matches!(
        catalog.remove(index, false),
        Err(CatalogError::Invalid(ValidationError::UnconfirmedUnmanaged(_)))
    ));
    assert_eq!(catalog.tree().backend().writes(), writes);
}

#[test]
fn case_only_rename_is_a_no_op() {
    let mut catalog = positional();
    catalog.add(r"C:\Tools\App.exe").unwrap();
    let writes = catalog.tree().backend().writes();
    assert_eq!(catalog.rename(0, "APP").unwrap(), RenameOutcome::Unchanged);
    assert_eq!(catalog.tree().backend().writes(), writes);
}

#[test]
fn boundary_moves_are_rejected() {
    let mut catalog = positional();
    catalog.add(r"C:\a.exe").unwrap();
    catalog.add(r"C:\b.exe").unwrap();
    let writes = catalog.tree().backend().writes();
    assert!(matches!(
        catalog.move_entry(0, Direction::Up),
        Err(CatalogError::Invalid(ValidationError::Boundary(Direction::Up)))
    ));
    assert!(matches!(
        catalog.move_entry(1, Direction::Down),
        Err(CatalogError::Invalid(ValidationError::Boundary(Direction::Down)))
    ));
    assert_eq!(catalog.tree().backend().writes(), writes);
}

#[test]
fn failed_stage_keeps_the_old_key() {
    let mut catalog = positional();
    catalog.add(r"C:\Tools\app.exe").unwrap();
    catalog.add(r"C:\Tools\bar.exe").unwrap();
    let hive = catalog.tree().backend();
    hive.deny(&keys::command_key_path("01_CustomApp_app"), Op::Create, 5);

    let err = catalog.reorder().unwrap_err();
    match err {
        CatalogError::Registry(err) => {
            assert_eq!(err.code(), Some(5));
            assert_eq!(err.key, "01_CustomApp_app");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(keys_of(&catalog), vec!["CustomApp_app_1", "CustomApp_bar_1"]);
    assert_eq!(catalog.entries()[0].command_path, r"C:\Tools\app.exe");
    assert!(!catalog.tree().key_exists("01_CustomApp_app"));
}

#[test]
fn alphabetical_and_positional_keys_do_not_mix() {
    let hive = MemoryTree::new();
    hive.seed_verb(SHELL_ROOT, "01_CustomApp_Apple_zh", "Apple", r"C:\a.exe");
    hive.seed_verb(SHELL_ROOT, "CustomApp_b_1", "b", r"C:\b.exe");
    let mut catalog = Catalog::new(
        hive,
        KeyScheme::new(Some("en")),
        OrderingPolicy::Alphabetical,
    );
    catalog.reload();
    assert!(catalog.entries().is_empty());

    catalog.add(r"C:\c.exe").unwrap();
    assert_eq!(keys_of(&catalog), vec!["01_CustomApp_c_en"]);
    assert!(catalog.tree().backend().key_exists(&keys::shell_key_path("CustomApp_b_1")));
}
