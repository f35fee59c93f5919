//! Registry tree adapter for the desktop-background shell root.
//!
//! Everything above this module talks to [`ShellTree`]. The raw hive access is
//! behind [`KeyTree`] so the same enumerate/write/rename/delete logic runs on
//! `HKEY_CLASSES_ROOT` and on the in-memory hive used by tests.

pub mod memory;
#[cfg(windows)]
pub mod registry;

use std::io;

use crate::error::{RegistryError, RegistryOp, is_not_found};
use crate::keys::{COMMAND_SUBKEY, ICON_VALUE, SHELL_ROOT};
use crate::log::log_cli;

pub use memory::{MemoryTree, Op};
#[cfg(windows)]
pub use registry::ClassesRootTree;

/// Raw hive primitives. Paths are backslash separated and relative to the hive
/// root; value name `""` is the default value.
pub trait KeyTree {
    /// Name of the `index`-th immediate child of `path`, `Ok(None)` past the end.
    fn subkey_at(&self, path: &str, index: usize) -> io::Result<Option<String>>;
    fn key_exists(&self, path: &str) -> bool;
    fn read_string(&self, path: &str, name: &str) -> io::Result<String>;
    /// Creates `path` and any missing parents; opening an existing key is not an error.
    fn create_key(&self, path: &str) -> io::Result<()>;
    /// Writes a string value into an existing key.
    fn write_string(&self, path: &str, name: &str, value: &str) -> io::Result<()>;
    /// Deletes a key without children.
    fn delete_key(&self, path: &str) -> io::Result<()>;
    /// Tells Explorer that shell associations changed.
    fn notify_shell_changed(&self, reason: &str);
}

/// Values stored for one menu entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryValues {
    pub display_name: String,
    pub command_path: String,
    pub icon_path: Option<String>,
}

/// Adapter rooted at `Directory\Background\shell`.
pub struct ShellTree<T> {
    tree: T,
    root: String,
}

impl<T: KeyTree> ShellTree<T> {
    pub fn new(tree: T) -> Self {
        Self {
            tree,
            root: SHELL_ROOT.to_string(),
        }
    }

    pub fn backend(&self) -> &T {
        &self.tree
    }

    fn key_path(&self, key: &str) -> String {
        format!(r"{}\{}", self.root, key)
    }

    /// Lazily lists the immediate subkeys of the shell root.
    pub fn enumerate(&self) -> SubkeyNames<'_, T> {
        SubkeyNames {
            tree: &self.tree,
            path: self.root.clone(),
            index: 0,
            done: false,
        }
    }

    pub fn key_exists(&self, key: &str) -> bool {
        self.tree.key_exists(&self.key_path(key))
    }

    /// Reads one entry. Missing pieces degrade to defaults instead of failing.
    pub fn read_entry(&self, key: &str) -> EntryValues {
        let path = self.key_path(key);
        let display_name = self
            .tree
            .read_string(&path, "")
            .ok()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| key.to_string());
        let icon_path = self
            .tree
            .read_string(&path, ICON_VALUE)
            .ok()
            .filter(|icon| !icon.is_empty());
        let command_path = self
            .tree
            .read_string(&format!(r"{}\{}", path, COMMAND_SUBKEY), "")
            .map(|raw| clean_command_path(&raw))
            .unwrap_or_default();
        EntryValues {
            display_name,
            command_path,
            icon_path,
        }
    }

    /// Creates (or opens) `key` and writes display name, icon and command.
    ///
    /// When a later step fails on a key this call created, the key is
    /// removed again so Explorer never shows a verb without a command.
    pub fn write_entry(&self, key: &str, values: &EntryValues) -> Result<(), RegistryError> {
        let path = self.key_path(key);
        let existed = self.tree.key_exists(&path);

        log_cli(format!("Creating/opening registry key: {}", path));
        self.tree
            .create_key(&path)
            .map_err(|err| RegistryError::new(RegistryOp::CreateKey, key, err))?;

        if let Err(err) = self.fill_entry(key, &path, values) {
            if !existed {
                log_cli(format!("{}; removing half-written key {}", err, key));
                if let Err(cleanup) = self.delete_subtree(key) {
                    log_cli(format!("Rollback of {} failed: {}", key, cleanup));
                }
            }
            return Err(err);
        }
        Ok(())
    }

    fn fill_entry(&self, key: &str, path: &str, values: &EntryValues) -> Result<(), RegistryError> {
        self.tree
            .write_string(path, "", &values.display_name)
            .map_err(|err| RegistryError::new(RegistryOp::SetDisplayName, key, err))?;

        if let Some(icon) = values.icon_path.as_deref().filter(|icon| !icon.is_empty()) {
            if let Err(err) = self.tree.write_string(path, ICON_VALUE, icon) {
                log_cli(format!("Setting icon for {} failed: {}", key, err));
            }
        }

        let command_path = format!(r"{}\{}", path, COMMAND_SUBKEY);
        self.tree
            .create_key(&command_path)
            .map_err(|err| RegistryError::new(RegistryOp::CreateCommand, key, err))?;
        self.tree
            .write_string(&command_path, "", &quote_command(&values.command_path))
            .map_err(|err| RegistryError::new(RegistryOp::SetCommand, key, err))
    }

    /// Rewrites only the default value of an existing key.
    pub fn set_display_name(&self, key: &str, name: &str) -> Result<(), RegistryError> {
        let path = self.key_path(key);
        if !self.tree.key_exists(&path) {
            return Err(RegistryError::new(
                RegistryOp::SetDisplayName,
                key,
                io::Error::from_raw_os_error(2),
            ));
        }
        log_cli(format!("Setting value: {} \\ (Default) = {}", path, name));
        self.tree
            .write_string(&path, "", name)
            .map_err(|err| RegistryError::new(RegistryOp::SetDisplayName, key, err))
    }

    /// Moves an entry to a new key name: stage the new key, verify it, then
    /// retire the old one. A failure before the retire step leaves `old` intact.
    pub fn rename_key(
        &self,
        old: &str,
        new: &str,
        values: &EntryValues,
    ) -> Result<(), RegistryError> {
        if old == new {
            return Ok(());
        }
        if old.to_lowercase() == new.to_lowercase() {
            // Same key to the registry: rewrite in place.
            return self.write_entry(old, values);
        }
        log_cli(format!("Rename key: {} -> {}", old, new));
        self.write_entry(new, values)?;

        let staged = self.key_path(new);
        if !self.tree.key_exists(&staged)
            || !self
                .tree
                .key_exists(&format!(r"{}\{}", staged, COMMAND_SUBKEY))
        {
            return Err(RegistryError::new(
                RegistryOp::VerifyStaged,
                new,
                io::Error::from_raw_os_error(2),
            ));
        }

        self.delete_subtree(old)
    }

    /// Deletes `key` and all its descendants. An absent key counts as deleted.
    pub fn delete_subtree(&self, key: &str) -> Result<(), RegistryError> {
        let path = self.key_path(key);
        self.delete_path(&path)
            .map_err(|err| RegistryError::new(RegistryOp::DeleteKey, key, err))
    }

    fn delete_path(&self, path: &str) -> io::Result<()> {
        loop {
            // Index 0 every time: deleting a child shifts the remaining ones.
            match self.tree.subkey_at(path, 0) {
                Ok(Some(child)) => self.delete_path(&format!(r"{}\{}", path, child))?,
                Ok(None) => break,
                Err(err) if is_not_found(&err) => return Ok(()),
                Err(err) => return Err(err),
            }
        }
        match self.tree.delete_key(path) {
            Err(err) if !is_not_found(&err) => Err(err),
            _ => Ok(()),
        }
    }

    pub fn notify_shell_changed(&self, reason: &str) {
        self.tree.notify_shell_changed(reason);
    }
}

/// Iterator returned by [`ShellTree::enumerate`].
pub struct SubkeyNames<'a, T> {
    tree: &'a T,
    path: String,
    index: usize,
    done: bool,
}

impl<T: KeyTree> Iterator for SubkeyNames<'_, T> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        match self.tree.subkey_at(&self.path, self.index) {
            Ok(Some(name)) => {
                self.index += 1;
                Some(name)
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                if !is_not_found(&err) {
                    log_cli(format!(
                        "Enumerating {} stopped at index {}: {}",
                        self.path, self.index, err
                    ));
                }
                self.done = true;
                None
            }
        }
    }
}

/// Strips quoting and trailing arguments from a command line:
/// `"C:\Tools\app.exe" --flag` becomes `C:\Tools\app.exe`.
pub fn clean_command_path(raw: &str) -> String {
    let mut path = raw.trim();
    if path.len() >= 2 && path.starts_with('"') && path.ends_with('"') {
        path = &path[1..path.len() - 1];
    }
    // ASCII lowercasing keeps byte offsets valid for `path`.
    if let Some(pos) = path.to_ascii_lowercase().find(".exe") {
        path = &path[..pos + ".exe".len()];
    }
    path.trim_matches('"').to_string()
}

/// Command value as stored: the path in quotes, unless the caller already
/// quoted it.
pub fn quote_command(path: &str) -> String {
    if path.contains('"') {
        path.to_string()
    } else {
        format!("\"{}\"", path)
    }
}
