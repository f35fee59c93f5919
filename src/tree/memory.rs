//! In-memory hive with registry semantics: case-insensitive names,
//! alphabetical enumeration, leaf-only deletes. Failures can be injected per
//! key and operation, and every mutation attempt is counted.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::io;

use super::KeyTree;

const ERROR_FILE_NOT_FOUND: i32 = 2;
const ERROR_KEY_HAS_CHILDREN: i32 = 1020;

/// Mutation kinds that [`MemoryTree::deny`] can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Create,
    Write,
    Delete,
}

#[derive(Debug, Default)]
struct Node {
    name: String,
    values: BTreeMap<String, (String, String)>,
}

#[derive(Debug, Default)]
pub struct MemoryTree {
    // Lowercased full path -> node.
    nodes: RefCell<BTreeMap<String, Node>>,
    denied: RefCell<HashMap<(String, Op), i32>>,
    writes: Cell<usize>,
    notifications: Cell<usize>,
}

fn fold(path: &str) -> String {
    path.trim_matches('\\').to_lowercase()
}

fn not_found() -> io::Error {
    io::Error::from_raw_os_error(ERROR_FILE_NOT_FOUND)
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `op` on exactly `path` fail with the OS error `code`.
    pub fn deny(&self, path: &str, op: Op, code: i32) {
        self.denied.borrow_mut().insert((fold(path), op), code);
    }

    pub fn allow(&self, path: &str, op: Op) {
        self.denied.borrow_mut().remove(&(fold(path), op));
    }

    /// Number of create/write/delete attempts so far.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn notifications(&self) -> usize {
        self.notifications.get()
    }

    /// Seeds a verb the way Explorer or another installer would.
    pub fn seed_verb(&self, root: &str, key: &str, display_name: &str, command: &str) {
        let path = format!(r"{}\{}", root, key);
        self.insert(&path);
        self.insert(&format!(r"{}\command", path));
        let mut nodes = self.nodes.borrow_mut();
        if let Some(node) = nodes.get_mut(&fold(&path)) {
            node.values
                .insert(String::new(), (String::new(), display_name.to_string()));
        }
        if let Some(node) = nodes.get_mut(&fold(&format!(r"{}\command", path))) {
            node.values
                .insert(String::new(), (String::new(), command.to_string()));
        }
    }

    fn attempt(&self, path: &str, op: Op) -> io::Result<()> {
        self.writes.set(self.writes.get() + 1);
        match self.denied.borrow().get(&(fold(path), op)) {
            Some(code) => Err(io::Error::from_raw_os_error(*code)),
            None => Ok(()),
        }
    }

    fn insert(&self, path: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let mut folded = String::new();
        for part in path.trim_matches('\\').split('\\') {
            if !folded.is_empty() {
                folded.push('\\');
            }
            folded.push_str(&part.to_lowercase());
            nodes.entry(folded.clone()).or_insert_with(|| Node {
                name: part.to_string(),
                values: BTreeMap::new(),
            });
        }
    }

    fn children(&self, folded: &str) -> Vec<String> {
        let prefix = format!("{}\\", folded);
        self.nodes
            .borrow()
            .iter()
            .filter(|(path, _)| {
                path.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('\\'))
            })
            .map(|(_, node)| node.name.clone())
            .collect()
    }
}

impl KeyTree for MemoryTree {
    fn subkey_at(&self, path: &str, index: usize) -> io::Result<Option<String>> {
        let folded = fold(path);
        if !self.nodes.borrow().contains_key(&folded) {
            return Err(not_found());
        }
        Ok(self.children(&folded).into_iter().nth(index))
    }

    fn key_exists(&self, path: &str) -> bool {
        self.nodes.borrow().contains_key(&fold(path))
    }

    fn read_string(&self, path: &str, name: &str) -> io::Result<String> {
        self.nodes
            .borrow()
            .get(&fold(path))
            .and_then(|node| node.values.get(&name.to_lowercase()))
            .map(|(_, value)| value.clone())
            .ok_or_else(not_found)
    }

    fn create_key(&self, path: &str) -> io::Result<()> {
        self.attempt(path, Op::Create)?;
        self.insert(path);
        Ok(())
    }

    fn write_string(&self, path: &str, name: &str, value: &str) -> io::Result<()> {
        self.attempt(path, Op::Write)?;
        let mut nodes = self.nodes.borrow_mut();
        let node = nodes.get_mut(&fold(path)).ok_or_else(not_found)?;
        node.values
            .insert(name.to_lowercase(), (name.to_string(), value.to_string()));
        Ok(())
    }

    fn delete_key(&self, path: &str) -> io::Result<()> {
        self.attempt(path, Op::Delete)?;
        let folded = fold(path);
        if !self.nodes.borrow().contains_key(&folded) {
            return Err(not_found());
        }
        if !self.children(&folded).is_empty() {
            return Err(io::Error::from_raw_os_error(ERROR_KEY_HAS_CHILDREN));
        }
        self.nodes.borrow_mut().remove(&folded);
        Ok(())
    }

    fn notify_shell_changed(&self, _reason: &str) {
        self.notifications.set(self.notifications.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive_but_preserved() {
        let tree = MemoryTree::new();
        tree.create_key(r"Root\MyKey").unwrap();
        assert!(tree.key_exists(r"root\mykey"));
        assert_eq!(tree.subkey_at("ROOT", 0).unwrap().as_deref(), Some("MyKey"));
        assert_eq!(tree.subkey_at("ROOT", 1).unwrap(), None);
    }

    #[test]
    fn enumeration_is_alphabetical() {
        let tree = MemoryTree::new();
        for key in ["zeta", "Alpha", "02_x", "beta"] {
            tree.create_key(&format!(r"Root\{}", key)).unwrap();
        }
        tree.create_key(r"Root\beta\deep").unwrap();
        let names: Vec<_> = (0..)
            .map_while(|i| tree.subkey_at("Root", i).unwrap())
            .collect();
        assert_eq!(names, vec!["02_x", "Alpha", "beta", "zeta"]);
    }

    #[test]
    fn delete_requires_leaf_and_reports_missing() {
        let tree = MemoryTree::new();
        tree.create_key(r"Root\a\b").unwrap();
        assert_eq!(
            tree.delete_key(r"Root\a").unwrap_err().raw_os_error(),
            Some(ERROR_KEY_HAS_CHILDREN)
        );
        tree.delete_key(r"Root\a\b").unwrap();
        tree.delete_key(r"Root\a").unwrap();
        assert_eq!(
            tree.delete_key(r"Root\a").unwrap_err().raw_os_error(),
            Some(ERROR_FILE_NOT_FOUND)
        );
    }

    #[test]
    fn denied_operations_fail_and_are_counted() {
        let tree = MemoryTree::new();
        tree.deny(r"Root\locked", Op::Create, 5);
        assert_eq!(
            tree.create_key(r"Root\Locked").unwrap_err().raw_os_error(),
            Some(5)
        );
        assert_eq!(tree.writes(), 1);
        tree.allow(r"Root\locked", Op::Create);
        tree.create_key(r"Root\Locked").unwrap();
        assert_eq!(tree.writes(), 2);
    }

    #[test]
    fn values_round_trip() {
        let tree = MemoryTree::new();
        tree.create_key("Root").unwrap();
        tree.write_string("Root", "Icon", "x.ico").unwrap();
        assert_eq!(tree.read_string("root", "icon").unwrap(), "x.ico");
        assert!(tree.read_string("Root", "").is_err());
        assert!(tree.write_string("Missing", "", "v").is_err());
    }
}
