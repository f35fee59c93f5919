//! Entry catalog: the in-memory view of the shell root and the place where
//! user intents become registry operations. Every mutation ends with a full
//! reload; nothing is patched incrementally except a single-entry refresh.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::{CatalogError, Direction, RegistryError, ValidationError};
use crate::keys::{self, KeyScheme};
use crate::log::log_cli;
use crate::settings::{OrderingPolicy, Settings};
use crate::tree::{EntryValues, KeyTree, ShellTree};

/// One context-menu item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppEntry {
    pub key: String,
    pub display_name: String,
    pub command_path: String,
    pub icon_path: Option<String>,
    pub is_managed: bool,
}

impl AppEntry {
    fn new(key: String, values: EntryValues, scheme: &KeyScheme) -> Self {
        let is_managed = scheme.is_managed(&key);
        AppEntry {
            key,
            display_name: values.display_name,
            command_path: values.command_path,
            icon_path: values.icon_path,
            is_managed,
        }
    }

    pub fn values(&self) -> EntryValues {
        EntryValues {
            display_name: self.display_name.clone(),
            command_path: self.command_path.clone(),
            icon_path: self.icon_path.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenameOutcome {
    Unchanged,
    Renamed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub managed: usize,
}

pub struct Catalog<T> {
    tree: ShellTree<T>,
    scheme: KeyScheme,
    policy: OrderingPolicy,
    show_all: bool,
    all: Vec<AppEntry>,
    visible: Vec<AppEntry>,
    /// Keys renamed by the last rename or renumbering, in the order applied.
    renamed: Vec<(String, String)>,
}

impl<T: KeyTree> Catalog<T> {
    /// Creates an empty catalog; call [`Catalog::reload`] to populate it.
    pub fn new(tree: T, scheme: KeyScheme, policy: OrderingPolicy) -> Self {
        Catalog {
            tree: ShellTree::new(tree),
            scheme,
            policy,
            show_all: false,
            all: Vec::new(),
            visible: Vec::new(),
            renamed: Vec::new(),
        }
    }

    pub fn from_settings(tree: T, settings: &Settings) -> Self {
        let mut catalog = Self::new(tree, settings.key_scheme(), settings.policy);
        catalog.show_all = settings.show_all;
        catalog
    }

    pub fn tree(&self) -> &ShellTree<T> {
        &self.tree
    }

    pub fn policy(&self) -> OrderingPolicy {
        self.policy
    }

    pub fn scheme(&self) -> &KeyScheme {
        &self.scheme
    }

    /// The display list.
    pub fn entries(&self) -> &[AppEntry] {
        &self.visible
    }

    /// Every non-system entry, display filter ignored.
    pub fn all_entries(&self) -> &[AppEntry] {
        &self.all
    }

    pub fn entry(&self, index: usize) -> Option<&AppEntry> {
        self.visible.get(index)
    }

    pub fn position_of(&self, key: &str) -> Option<usize> {
        self.visible
            .iter()
            .position(|entry| entry.key.eq_ignore_ascii_case(key))
    }

    /// Where `key` lives after the last rename or renumbering. Keys that
    /// were not touched map to themselves.
    pub fn current_key(&self, key: &str) -> String {
        self.renamed
            .iter()
            .fold(key.to_string(), |current, (from, to)| {
                if current.eq_ignore_ascii_case(from) {
                    to.clone()
                } else {
                    current
                }
            })
    }

    pub fn show_all(&self) -> bool {
        self.show_all
    }

    /// Switches the filter. No registry access.
    pub fn set_show_all(&mut self, show_all: bool) {
        self.show_all = show_all;
        self.rebuild_visible();
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total: self.all.len(),
            managed: self.all.iter().filter(|entry| entry.is_managed).count(),
        }
    }

    /// Rebuilds the catalog from the registry.
    pub fn reload(&mut self) {
        let mut all: Vec<AppEntry> = self
            .tree
            .enumerate()
            .filter(|key| !keys::is_system_item(key))
            .map(|key| {
                let values = self.tree.read_entry(&key);
                AppEntry::new(key, values, &self.scheme)
            })
            .collect();
        sort_entries(&mut all, self.policy);
        self.all = all;
        self.rebuild_visible();
        let summary = self.summary();
        log_cli(format!(
            "Reload: {} entries, {} managed",
            summary.total, summary.managed
        ));
    }

    fn rebuild_visible(&mut self) {
        self.visible = self
            .all
            .iter()
            .filter(|entry| self.show_all || entry.is_managed)
            .cloned()
            .collect();
    }

    /// Adds an executable to the menu. The display name is its file stem.
    pub fn add(&mut self, executable_path: &str) -> Result<(), CatalogError> {
        let display_name = display_name_from_path(executable_path)
            .ok_or_else(|| ValidationError::NoFileName(executable_path.to_string()))?;
        let key = self.key_for_new(&display_name);
        let values = EntryValues {
            display_name,
            command_path: executable_path.trim().to_string(),
            icon_path: Some(format!("\"{}\"", executable_path.trim())),
        };

        log_cli(format!("Add: {} as {}", executable_path, key));
        self.tree.write_entry(&key, &values)?;
        self.tree.notify_shell_changed("add");
        self.reload();
        if self.policy == OrderingPolicy::Alphabetical {
            self.reorder()?;
        }
        Ok(())
    }

    fn key_for_new(&self, display_name: &str) -> String {
        let taken: HashSet<String> = self
            .all
            .iter()
            .map(|entry| entry.key.to_lowercase())
            .collect();
        let is_free =
            |key: &str| !taken.contains(&key.to_lowercase()) && !self.tree.key_exists(key);

        if self.policy == OrderingPolicy::Alphabetical {
            // Insertion rank; equal names go after the existing ones.
            let lowered = display_name.to_lowercase();
            let managed: Vec<&AppEntry> =
                self.all.iter().filter(|entry| entry.is_managed).collect();
            let rank = 1 + managed
                .iter()
                .filter(|entry| entry.display_name.to_lowercase() <= lowered)
                .count();
            let key = self
                .scheme
                .positional_key(rank, managed.len() + 1, display_name);
            if is_free(&key) {
                return key;
            }
        }

        let mut counter = 1;
        loop {
            let key = self.scheme.unnumbered_key(display_name, counter);
            if is_free(&key) {
                return key;
            }
            counter += 1;
        }
    }

    /// Changes the display name of a managed entry. The key is left alone
    /// unless the alphabetical policy re-ranks it afterwards.
    pub fn rename(&mut self, index: usize, new_name: &str) -> Result<RenameOutcome, CatalogError> {
        self.renamed.clear();
        let entry = self.visible.get(index).ok_or(ValidationError::NoSelection)?;
        if !entry.is_managed {
            return Err(ValidationError::NotManaged(entry.display_name.clone()).into());
        }
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if new_name.contains('\\') {
            return Err(ValidationError::InvalidName(new_name.to_string()).into());
        }
        if entry.display_name.to_lowercase() == new_name.to_lowercase() {
            return Ok(RenameOutcome::Unchanged);
        }

        let key = entry.key.clone();
        log_cli(format!(
            "Rename: {} '{}' -> '{}'",
            key, entry.display_name, new_name
        ));
        self.tree.set_display_name(&key, new_name)?;
        self.tree.notify_shell_changed("rename");
        self.refresh_key(&key);
        if self.policy == OrderingPolicy::Alphabetical {
            self.reorder()?;
        }
        Ok(RenameOutcome::Renamed)
    }

    /// Deletes an entry and its subtree. Entries not created by this program
    /// need `confirmed_unmanaged`.
    pub fn remove(&mut self, index: usize, confirmed_unmanaged: bool) -> Result<(), CatalogError> {
        let entry = self.visible.get(index).ok_or(ValidationError::NoSelection)?;
        if !entry.is_managed && !confirmed_unmanaged {
            return Err(ValidationError::UnconfirmedUnmanaged(entry.display_name.clone()).into());
        }
        let key = entry.key.clone();
        log_cli(format!("Remove: {} ({})", key, entry.display_name));
        self.tree.delete_subtree(&key)?;
        self.tree.notify_shell_changed("remove");
        self.reload();
        Ok(())
    }

    /// Renumbers managed entries by display name. Returns how many keys moved.
    pub fn reorder(&mut self) -> Result<usize, CatalogError> {
        let mut managed: Vec<AppEntry> = self
            .all
            .iter()
            .filter(|entry| entry.is_managed)
            .cloned()
            .collect();
        managed.sort_by(by_display_name);
        let plan = self.plan_renumbering(&managed);
        self.apply_plan(plan, "reorder")
    }

    /// Swaps a managed entry with the nearest managed entry above or below it
    /// and renumbers all managed keys to the new order. Returns the moved
    /// entry's new key.
    pub fn move_entry(&mut self, index: usize, direction: Direction) -> Result<String, CatalogError> {
        if self.policy != OrderingPolicy::Positional {
            return Err(ValidationError::WrongPolicy {
                operation: "Moving entries",
                policy: self.policy.name(),
            }
            .into());
        }
        let entry = self.visible.get(index).ok_or(ValidationError::NoSelection)?;
        if !entry.is_managed {
            return Err(ValidationError::NotManaged(entry.display_name.clone()).into());
        }
        let neighbour = match direction {
            Direction::Up => (0..index).rev().find(|&i| self.visible[i].is_managed),
            Direction::Down => (index + 1..self.visible.len()).find(|&i| self.visible[i].is_managed),
        }
        .ok_or(ValidationError::Boundary(direction))?;

        // Work on a copy; it is dropped if any rename fails and the catalog
        // is reloaded from whatever the registry holds.
        let moved = entry.key.clone();
        let mut order = self.visible.clone();
        order.swap(index, neighbour);
        let managed: Vec<AppEntry> = order.into_iter().filter(|entry| entry.is_managed).collect();
        let new_key = managed
            .iter()
            .position(|entry| entry.key == moved)
            .map(|rank| {
                self.scheme
                    .positional_key(rank + 1, managed.len(), &managed[rank].display_name)
            })
            .unwrap_or(moved);
        let plan = self.plan_renumbering(&managed);
        self.apply_plan(plan, "move")?;
        Ok(new_key)
    }

    /// Re-reads one entry from the registry.
    pub fn refresh_entry(&mut self, index: usize) -> Result<(), CatalogError> {
        let key = self
            .visible
            .get(index)
            .ok_or(ValidationError::NoSelection)?
            .key
            .clone();
        if self.tree.key_exists(&key) {
            self.refresh_key(&key);
        } else {
            log_cli(format!("Refresh: {} vanished, reloading", key));
            self.reload();
        }
        Ok(())
    }

    fn refresh_key(&mut self, key: &str) {
        let values = self.tree.read_entry(key);
        if let Some(entry) = self.all.iter_mut().find(|entry| entry.key == key) {
            entry.display_name = values.display_name;
            entry.command_path = values.command_path;
            entry.icon_path = values.icon_path;
        }
        sort_entries(&mut self.all, self.policy);
        self.rebuild_visible();
    }

    fn plan_renumbering(&self, ordered: &[AppEntry]) -> Vec<(AppEntry, String)> {
        ordered
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let target = self
                    .scheme
                    .positional_key(i + 1, ordered.len(), &entry.display_name);
                (entry, target)
            })
            .filter(|(entry, target)| entry.key.to_lowercase() != target.to_lowercase())
            .map(|(entry, target)| (entry.clone(), target))
            .collect()
    }

    fn apply_plan(&mut self, plan: Vec<(AppEntry, String)>, reason: &str) -> Result<usize, CatalogError> {
        self.renamed.clear();
        if plan.is_empty() {
            return Ok(0);
        }
        let mut journal = Vec::with_capacity(plan.len());
        let result = self.rename_all(&plan, &mut journal);
        self.renamed = journal;
        self.tree.notify_shell_changed(reason);
        self.reload();
        match result {
            Ok(()) => Ok(plan.len()),
            Err(err) => {
                log_cli(format!("{}: stopped after error: {}", reason, err));
                Err(err.into())
            }
        }
    }

    /// Renames in plan order. A target still held by another entry of the
    /// batch goes through a staging key first, so no live entry is overwritten.
    /// Each completed rename is appended to `journal`.
    fn rename_all(
        &self,
        plan: &[(AppEntry, String)],
        journal: &mut Vec<(String, String)>,
    ) -> Result<(), RegistryError> {
        let mut occupied: HashSet<String> = self
            .all
            .iter()
            .map(|entry| entry.key.to_lowercase())
            .collect();
        let mut deferred = Vec::new();

        for (entry, target) in plan {
            let values = entry.values();
            occupied.remove(&entry.key.to_lowercase());
            if occupied.contains(&target.to_lowercase()) {
                let staged = self.scheme.staging_key(target);
                self.tree.rename_key(&entry.key, &staged, &values)?;
                journal.push((entry.key.clone(), staged.clone()));
                occupied.insert(staged.to_lowercase());
                deferred.push((staged, target, values));
            } else {
                self.tree.rename_key(&entry.key, target, &values)?;
                journal.push((entry.key.clone(), target.clone()));
                occupied.insert(target.to_lowercase());
            }
        }

        for (staged, target, values) in deferred {
            self.tree.rename_key(&staged, target, &values)?;
            journal.push((staged, target.clone()));
        }
        Ok(())
    }
}

fn by_display_name(a: &AppEntry, b: &AppEntry) -> Ordering {
    a.display_name
        .to_lowercase()
        .cmp(&b.display_name.to_lowercase())
        .then_with(|| a.key.to_lowercase().cmp(&b.key.to_lowercase()))
}

fn sort_entries(entries: &mut [AppEntry], policy: OrderingPolicy) {
    match policy {
        OrderingPolicy::Alphabetical => entries.sort_by(by_display_name),
        OrderingPolicy::Positional => entries.sort_by_key(|entry| entry.key.to_lowercase()),
    }
}

/// File stem of a Windows or POSIX path: `C:\Tools\app.exe` gives `app`.
pub fn display_name_from_path(path: &str) -> Option<String> {
    let file = path.trim().rsplit(['\\', '/']).next()?.trim();
    let stem = match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    };
    Some(stem.trim().to_string()).filter(|stem| !stem.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::SHELL_ROOT;
    use crate::tree::{MemoryTree, Op};

    fn catalog(policy: OrderingPolicy, suffix: Option<&str>) -> Catalog<MemoryTree> {
        Catalog::new(MemoryTree::new(), KeyScheme::new(suffix), policy)
    }

    fn keys_of(catalog: &Catalog<MemoryTree>) -> Vec<String> {
        catalog.entries().iter().map(|e| e.key.clone()).collect()
    }

    #[test]
    fn derives_display_names() {
        assert_eq!(display_name_from_path(r"C:\Tools\app.exe").as_deref(), Some("app"));
        assert_eq!(display_name_from_path("/opt/my.tool.bin").as_deref(), Some("my.tool"));
        assert_eq!(display_name_from_path(r"C:\Tools\.hidden").as_deref(), Some(".hidden"));
        assert_eq!(display_name_from_path(r"C:\Tools\"), None);
        assert_eq!(display_name_from_path(""), None);
    }

    #[test]
    fn positional_add_uses_free_counter() {
        let mut catalog = catalog(OrderingPolicy::Positional, None);
        catalog.add(r"C:\Tools\app.exe").unwrap();
        catalog.add(r"D:\Other\app.exe").unwrap();
        assert_eq!(keys_of(&catalog), vec!["CustomApp_app_1", "CustomApp_app_2"]);

        let first = &catalog.entries()[0];
        assert_eq!(first.display_name, "app");
        assert_eq!(first.command_path, r"C:\Tools\app.exe");
        assert_eq!(first.icon_path.as_deref(), Some(r#""C:\Tools\app.exe""#));
        assert!(catalog.tree().backend().notifications() >= 2);
    }

    #[test]
    fn alphabetical_add_ranks_and_renumbers() {
        let mut catalog = catalog(OrderingPolicy::Alphabetical, Some("en"));
        catalog.add(r"C:\z\Zebra.exe").unwrap();
        catalog.add(r"C:\a\Apple.exe").unwrap();
        catalog.add(r"C:\m\Mango.exe").unwrap();
        assert_eq!(
            keys_of(&catalog),
            vec![
                "01_CustomApp_Apple_en",
                "02_CustomApp_Mango_en",
                "03_CustomApp_Zebra_en"
            ]
        );
    }

    #[test]
    fn add_reports_failing_stage() {
        let mut catalog = catalog(OrderingPolicy::Positional, None);
        catalog
            .tree()
            .backend()
            .deny(&keys::shell_key_path("CustomApp_app_1"), Op::Write, 5);
        match catalog.add(r"C:\app.exe") {
            Err(CatalogError::Registry(err)) => {
                assert_eq!(err.op, crate::error::RegistryOp::SetDisplayName);
                assert_eq!(err.code(), Some(5));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!catalog.tree().key_exists("CustomApp_app_1"));
        assert!(catalog.entries().is_empty());
    }

    #[test]
    fn add_rejects_path_without_file_name() {
        let mut catalog = catalog(OrderingPolicy::Positional, None);
        let err = catalog.add(r"C:\Tools\").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(catalog.tree().backend().writes(), 0);
    }

    #[test]
    fn rename_updates_display_name_only() {
        let mut catalog = catalog(OrderingPolicy::Positional, None);
        catalog.add(r"C:\Tools\app.exe").unwrap();
        assert_eq!(catalog.rename(0, "  My App ").unwrap(), RenameOutcome::Renamed);
        assert_eq!(catalog.entries()[0].display_name, "My App");
        assert_eq!(catalog.entries()[0].key, "CustomApp_app_1");
        assert_eq!(
            catalog.tree().read_entry("CustomApp_app_1").display_name,
            "My App"
        );
    }

    #[test]
    fn rename_validates_before_writing() {
        let mut catalog = catalog(OrderingPolicy::Positional, None);
        catalog.add(r"C:\Tools\app.exe").unwrap();
        let before = catalog.tree().backend().writes();
        assert!(matches!(
            catalog.rename(0, "   "),
            Err(CatalogError::Invalid(ValidationError::EmptyName))
        ));
        assert!(matches!(
            catalog.rename(0, r"a\b"),
            Err(CatalogError::Invalid(ValidationError::InvalidName(_)))
        ));
        assert!(matches!(
            catalog.rename(5, "x"),
            Err(CatalogError::Invalid(ValidationError::NoSelection))
        ));
        assert_eq!(catalog.tree().backend().writes(), before);
    }

    #[test]
    fn alphabetical_rename_rekeys() {
        let mut catalog = catalog(OrderingPolicy::Alphabetical, Some("en"));
        catalog.add(r"C:\a\Apple.exe").unwrap();
        catalog.add(r"C:\b\Banana.exe").unwrap();
        catalog.rename(0, "Zucchini").unwrap();
        assert_eq!(
            keys_of(&catalog),
            vec!["01_CustomApp_Banana_en", "02_CustomApp_Zucchini_en"]
        );
        assert_eq!(catalog.entries()[1].command_path, r"C:\a\Apple.exe");
    }

    #[test]
    fn remove_requires_confirmation_for_foreign_entries() {
        let mut catalog = catalog(OrderingPolicy::Positional, None);
        catalog
            .tree()
            .backend()
            .seed_verb(SHELL_ROOT, "git_shell", "Open Git Bash", r#""C:\git\git-bash.exe""#);
        catalog.set_show_all(true);
        catalog.reload();
        let before = catalog.tree().backend().writes();
        assert!(matches!(
            catalog.remove(0, false),
            Err(CatalogError::Invalid(ValidationError::UnconfirmedUnmanaged(_)))
        ));
        assert_eq!(catalog.tree().backend().writes(), before);

        catalog.remove(0, true).unwrap();
        assert!(catalog.entries().is_empty());
        assert!(!catalog.tree().key_exists("git_shell"));
    }

    #[test]
    fn remove_failure_surfaces_code_and_keeps_entry() {
        let mut catalog = catalog(OrderingPolicy::Positional, None);
        catalog.add(r"C:\app.exe").unwrap();
        catalog
            .tree()
            .backend()
            .deny(&keys::shell_key_path("CustomApp_app_1"), Op::Delete, 5);
        let err = catalog.remove(0, false).unwrap_err();
        match err {
            CatalogError::Registry(err) => assert_eq!(err.code(), Some(5)),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(catalog.entries().len(), 1);
    }

    #[test]
    fn move_swaps_and_renumbers_everything() {
        let mut catalog = catalog(OrderingPolicy::Positional, None);
        for path in [r"C:\a.exe", r"C:\b.exe", r"C:\c.exe"] {
            catalog.add(path).unwrap();
        }
        assert_eq!(catalog.move_entry(2, Direction::Up).unwrap(), "02_CustomApp_c");
        assert_eq!(
            keys_of(&catalog),
            vec!["01_CustomApp_a", "02_CustomApp_c", "03_CustomApp_b"]
        );

        assert_eq!(catalog.move_entry(0, Direction::Down).unwrap(), "01_CustomApp_c");
        assert_eq!(
            keys_of(&catalog),
            vec!["01_CustomApp_c", "02_CustomApp_a", "03_CustomApp_b"]
        );
    }

    #[test]
    fn move_skips_foreign_neighbours() {
        let mut catalog = catalog(OrderingPolicy::Positional, None);
        catalog.add(r"C:\a.exe").unwrap();
        catalog.add(r"C:\b.exe").unwrap();
        catalog.move_entry(1, Direction::Up).unwrap();
        catalog
            .tree()
            .backend()
            .seed_verb(SHELL_ROOT, "01_zz_foreign", "Foreign", "x.exe");
        catalog.set_show_all(true);
        catalog.reload();
        assert_eq!(
            keys_of(&catalog),
            vec!["01_CustomApp_b", "01_zz_foreign", "02_CustomApp_a"]
        );

        catalog.move_entry(2, Direction::Up).unwrap();
        assert_eq!(
            keys_of(&catalog),
            vec!["01_CustomApp_a", "01_zz_foreign", "02_CustomApp_b"]
        );
    }

    #[test]
    fn move_is_positional_only() {
        let mut catalog = catalog(OrderingPolicy::Alphabetical, Some("en"));
        catalog.add(r"C:\a.exe").unwrap();
        catalog.add(r"C:\b.exe").unwrap();
        assert!(matches!(
            catalog.move_entry(1, Direction::Up),
            Err(CatalogError::Invalid(ValidationError::WrongPolicy { .. }))
        ));
    }

    #[test]
    fn failed_move_reloads_a_valid_catalog() {
        let mut catalog = catalog(OrderingPolicy::Positional, None);
        catalog.add(r"C:\a.exe").unwrap();
        catalog.add(r"C:\b.exe").unwrap();
        catalog
            .tree()
            .backend()
            .deny(&keys::shell_key_path("02_CustomApp_a"), Op::Create, 5);

        let err = catalog.move_entry(1, Direction::Up).unwrap_err();
        assert!(!err.is_validation());
        // "b" was renumbered before the failure; "a" keeps its old key.
        assert_eq!(keys_of(&catalog), vec!["01_CustomApp_b", "CustomApp_a_1"]);
        for entry in catalog.entries() {
            assert!(!entry.command_path.is_empty());
        }
    }

    #[test]
    fn renumbering_duplicates_goes_through_staging() {
        let mut catalog = catalog(OrderingPolicy::Positional, None);
        let tree = catalog.tree().backend();
        tree.seed_verb(SHELL_ROOT, "01_CustomApp_X", "X", r#""C:\first.exe""#);
        tree.seed_verb(SHELL_ROOT, "02_CustomApp_X", "X", r#""C:\second.exe""#);
        catalog.reload();

        catalog.move_entry(0, Direction::Down).unwrap();
        let paths: Vec<_> = catalog
            .entries()
            .iter()
            .map(|e| (e.key.as_str(), e.command_path.as_str()))
            .collect();
        assert_eq!(
            paths,
            vec![
                ("01_CustomApp_X", r"C:\second.exe"),
                ("02_CustomApp_X", r"C:\first.exe")
            ]
        );
    }

    #[test]
    fn current_key_follows_staged_renames() {
        let mut catalog = catalog(OrderingPolicy::Positional, None);
        let tree = catalog.tree().backend();
        tree.seed_verb(SHELL_ROOT, "01_CustomApp_X", "X", r#""C:\first.exe""#);
        tree.seed_verb(SHELL_ROOT, "02_CustomApp_X", "X", r#""C:\second.exe""#);
        tree.seed_verb(SHELL_ROOT, "03_CustomApp_Y", "Y", r#""C:\y.exe""#);
        catalog.reload();

        catalog.move_entry(0, Direction::Down).unwrap();
        let first = catalog.current_key("01_CustomApp_X");
        let second = catalog.current_key("02_CustomApp_X");
        assert_eq!(first, "02_CustomApp_X");
        assert_eq!(second, "01_CustomApp_X");
        assert_eq!(catalog.current_key("03_CustomApp_Y"), "03_CustomApp_Y");
        let position = catalog.position_of(&first).unwrap();
        assert_eq!(catalog.entries()[position].command_path, r"C:\first.exe");
    }

    #[test]
    fn alphabetical_rename_journals_every_shifted_key() {
        let mut catalog = catalog(OrderingPolicy::Alphabetical, Some("en"));
        for path in [r"C:\a\Apple.exe", r"C:\b\Banana.exe", r"C:\c\Cherry.exe"] {
            catalog.add(path).unwrap();
        }
        catalog.rename(0, "Zucchini").unwrap();
        assert_eq!(
            catalog.current_key("01_CustomApp_Apple_en"),
            "03_CustomApp_Zucchini_en"
        );
        assert_eq!(
            catalog.current_key("02_CustomApp_Banana_en"),
            "01_CustomApp_Banana_en"
        );

        catalog.rename(0, "Blueberry").unwrap();
        assert_eq!(
            catalog.current_key("01_CustomApp_Banana_en"),
            "01_CustomApp_Blueberry_en"
        );
        assert_eq!(
            catalog.current_key("02_CustomApp_Banana_en"),
            "02_CustomApp_Banana_en",
            "journal is reset by each rename"
        );
    }

    #[test]
    fn renumbering_widens_ranks_past_99_entries() {
        let mut catalog = catalog(OrderingPolicy::Positional, None);
        for i in (0..101).rev() {
            catalog.add(&format!(r"C:\t\app{i:03}.exe")).unwrap();
        }
        assert_eq!(catalog.reorder().unwrap(), 101);

        let keys = keys_of(&catalog);
        assert_eq!(keys[0], "001_CustomApp_app000");
        assert_eq!(keys[10], "011_CustomApp_app010");
        assert_eq!(keys[100], "101_CustomApp_app100");
        let names: Vec<_> = catalog
            .entries()
            .iter()
            .map(|e| e.display_name.clone())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(catalog.reorder().unwrap(), 0);
    }

    #[test]
    fn refresh_entry_picks_up_external_edits() {
        let mut catalog = catalog(OrderingPolicy::Positional, None);
        catalog.add(r"C:\a.exe").unwrap();
        catalog
            .tree()
            .backend()
            .write_string(&keys::shell_key_path("CustomApp_a_1"), "", "Edited")
            .unwrap();
        catalog.refresh_entry(0).unwrap();
        assert_eq!(catalog.entries()[0].display_name, "Edited");

        catalog.tree().delete_subtree("CustomApp_a_1").unwrap();
        catalog.refresh_entry(0).unwrap();
        assert!(catalog.entries().is_empty());
    }

    #[test]
    fn filter_toggle_does_not_touch_registry() {
        let mut catalog = catalog(OrderingPolicy::Positional, None);
        catalog
            .tree()
            .backend()
            .seed_verb(SHELL_ROOT, "Foreign", "Foreign", "f.exe");
        catalog.add(r"C:\a.exe").unwrap();
        let writes = catalog.tree().backend().writes();
        assert_eq!(catalog.entries().len(), 1);
        catalog.set_show_all(true);
        assert_eq!(catalog.entries().len(), 2);
        assert_eq!(catalog.summary(), Summary { total: 2, managed: 1 });
        assert_eq!(catalog.tree().backend().writes(), writes);
    }
}
