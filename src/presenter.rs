//! Front-end state over a [`Catalog`]: the selection, the inline rename
//! editor and the row texts. Any action that can shift indices settles an
//! open editor first; the outcome of that implicit commit is queued for the
//! caller to show. The selection is tracked by key across a commit, since an
//! alphabetical rename re-sorts and re-keys the list.

use crate::catalog::{AppEntry, Catalog, RenameOutcome, Summary};
use crate::error::{CatalogError, Direction, ValidationError};
use crate::tree::KeyTree;

const MAX_ROW_CHARS: usize = 100;
const ROW_HEAD_CHARS: usize = MAX_ROW_CHARS - 10;
const ROW_TAIL_CHARS: usize = 7;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EditorState {
    #[default]
    Idle,
    Editing { index: usize, buffer: String },
}

/// Keystrokes the inline editor understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditKey {
    Char(char),
    Backspace,
    Enter,
    Escape,
}

pub type CommitResult = Result<RenameOutcome, CatalogError>;

pub struct Presenter<T> {
    catalog: Catalog<T>,
    editor: EditorState,
    selected: Option<usize>,
    notice: Option<CommitResult>,
}

impl<T: KeyTree> Presenter<T> {
    /// Wraps `catalog` and loads it from the registry.
    pub fn new(mut catalog: Catalog<T>) -> Self {
        catalog.reload();
        let selected = (!catalog.entries().is_empty()).then_some(0);
        Presenter {
            catalog,
            editor: EditorState::Idle,
            selected,
            notice: None,
        }
    }

    pub fn catalog(&self) -> &Catalog<T> {
        &self.catalog
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.editor, EditorState::Editing { .. })
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&AppEntry> {
        self.selected.and_then(|index| self.catalog.entry(index))
    }

    /// Moves the selection. Clicking elsewhere takes focus from the editor.
    pub fn select(&mut self, index: usize) {
        let Some(key) = self.catalog.entry(index).map(|entry| entry.key.clone()) else {
            self.focus_lost();
            return;
        };
        if self.is_editing() {
            self.focus_lost();
            self.selected = self.follow(&key);
        } else {
            self.selected = Some(index);
        }
    }

    pub fn rows(&self) -> Vec<String> {
        self.catalog.entries().iter().map(row_text).collect()
    }

    /// Opens the editor on `index` with the current display name.
    /// Ignored while another edit is open.
    pub fn begin_edit(&mut self, index: usize) -> Result<(), ValidationError> {
        if self.is_editing() {
            return Ok(());
        }
        let entry = self.catalog.entry(index).ok_or(ValidationError::NoSelection)?;
        if !entry.is_managed {
            return Err(ValidationError::NotManaged(entry.display_name.clone()));
        }
        self.editor = EditorState::Editing {
            index,
            buffer: entry.display_name.clone(),
        };
        self.selected = Some(index);
        Ok(())
    }

    /// Feeds one key to the editor. Returns the result once the edit ends:
    /// Enter commits, Escape discards (reported as `Unchanged`).
    pub fn type_key(&mut self, key: EditKey) -> Option<CommitResult> {
        let EditorState::Editing { buffer, .. } = &mut self.editor else {
            return None;
        };
        match key {
            EditKey::Char(c) => {
                buffer.push(c);
                None
            }
            EditKey::Backspace => {
                buffer.pop();
                None
            }
            EditKey::Enter => self.commit(),
            EditKey::Escape => {
                self.cancel();
                Some(Ok(RenameOutcome::Unchanged))
            }
        }
    }

    /// Closes the editor and applies the buffer. `None` when nothing was open.
    pub fn commit(&mut self) -> Option<CommitResult> {
        match std::mem::take(&mut self.editor) {
            EditorState::Idle => None,
            EditorState::Editing { index, buffer } => {
                let selected_key = self.selected_entry().map(|entry| entry.key.clone());
                let result = self.catalog.rename(index, &buffer);
                match selected_key {
                    Some(key) => self.selected = self.follow(&key),
                    None => self.clamp_selection(),
                }
                Some(result)
            }
        }
    }

    /// Row of the entry that was keyed `key` before the last commit. Only
    /// meaningful right after a commit; the journal is reset by the next one.
    fn follow(&self, key: &str) -> Option<usize> {
        self.catalog.position_of(&self.catalog.current_key(key))
    }

    pub fn cancel(&mut self) {
        self.editor = EditorState::Idle;
    }

    /// Focus left the editor: commit and queue the outcome.
    pub fn focus_lost(&mut self) {
        self.settle();
    }

    fn settle(&mut self) {
        if let Some(result) = self.commit() {
            self.notice = Some(result);
        }
    }

    /// Outcome of the last implicit commit, if any.
    pub fn take_commit_notice(&mut self) -> Option<CommitResult> {
        self.notice.take()
    }

    pub fn add(&mut self, executable_path: &str) -> Result<(), CatalogError> {
        self.settle();
        let result = self.catalog.add(executable_path);
        self.clamp_selection();
        result
    }

    pub fn remove(&mut self, confirmed_unmanaged: bool) -> Result<(), CatalogError> {
        self.settle();
        let index = self.selected.ok_or(ValidationError::NoSelection)?;
        let result = self.catalog.remove(index, confirmed_unmanaged);
        self.clamp_selection();
        result
    }

    /// Moves the selected entry and keeps it selected at its new place.
    pub fn move_selected(&mut self, direction: Direction) -> Result<(), CatalogError> {
        self.settle();
        let index = self.selected.ok_or(ValidationError::NoSelection)?;
        let result = self.catalog.move_entry(index, direction);
        match &result {
            Ok(key) => self.selected = self.catalog.position_of(key),
            Err(_) => self.clamp_selection(),
        }
        result.map(|_| ())
    }

    pub fn reorder(&mut self) -> Result<usize, CatalogError> {
        self.settle();
        let result = self.catalog.reorder();
        self.clamp_selection();
        result
    }

    pub fn reload(&mut self) -> Summary {
        self.settle();
        self.catalog.reload();
        self.clamp_selection();
        self.catalog.summary()
    }

    /// Flips the show-all filter and returns the new value.
    pub fn toggle_show_all(&mut self) -> bool {
        self.settle();
        let key = self.selected_entry().map(|entry| entry.key.clone());
        let show_all = !self.catalog.show_all();
        self.catalog.set_show_all(show_all);
        self.selected = key.and_then(|key| self.catalog.position_of(&key));
        self.clamp_selection();
        show_all
    }

    pub fn refresh_selected(&mut self) -> Result<(), CatalogError> {
        self.settle();
        let index = self.selected.ok_or(ValidationError::NoSelection)?;
        let result = self.catalog.refresh_entry(index);
        self.clamp_selection();
        result
    }

    fn clamp_selection(&mut self) {
        let len = self.catalog.entries().len();
        self.selected = match (self.selected, len) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(index), len) => Some(index.min(len - 1)),
        };
    }
}

/// `✅ name - path` for managed entries, `📌 name - path` otherwise.
pub fn row_text(entry: &AppEntry) -> String {
    let marker = if entry.is_managed { "✅ " } else { "📌 " };
    truncate_row(&format!(
        "{}{} - {}",
        marker, entry.display_name, entry.command_path
    ))
}

fn truncate_row(text: &str) -> String {
    let count = text.chars().count();
    if count <= MAX_ROW_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(ROW_HEAD_CHARS).collect();
    let tail: String = text.chars().skip(count - ROW_TAIL_CHARS).collect();
    format!("{head}...{tail}")
}
