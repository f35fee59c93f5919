pub mod catalog;
pub mod error;
pub mod keys;
pub mod log;
pub mod presenter;
pub mod settings;
pub mod tree;

use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;

pub use catalog::{AppEntry, Catalog, RenameOutcome, Summary};
pub use error::{CatalogError, Direction, FailureKind, RegistryError, ValidationError};
pub use keys::KeyScheme;
pub use presenter::{EditKey, EditorState, Presenter};
pub use settings::{Language, OrderingPolicy, Settings};
pub use tree::{EntryValues, KeyTree, MemoryTree, ShellTree};

/// `%LOCALAPPDATA%\desktop-menu-win\manager.log`, or an error naming why it
/// cannot be resolved.
pub static DESKTOP_LOG_PATH: LazyLock<Result<PathBuf, String>> = LazyLock::new(|| {
    env::var_os("LOCALAPPDATA")
        .map(|base| PathBuf::from(base).join("desktop-menu-win").join("manager.log"))
        .ok_or_else(|| "LOCALAPPDATA is not set".to_string())
});

pub fn log_file_path() -> Option<PathBuf> {
    DESKTOP_LOG_PATH.as_ref().ok().cloned()
}
