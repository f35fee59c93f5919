use std::io::{self, Write};
use std::path::Path;

use desktop_menu_win::log::{log_cli, log_ui};
use desktop_menu_win::{CatalogError, EditKey, EditorState, RenameOutcome};
use dialoguer::console::{Key, Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::Manager;

pub fn menu_theme() -> ColorfulTheme {
    let mut t = ColorfulTheme::default();
    t.active_item_prefix = style(">".to_string());
    t.inactive_item_prefix = style(" ".to_string());
    t.picked_item_prefix = style(">".to_string());
    t.unpicked_item_prefix = style(" ".to_string());

    t.prompt_prefix = style("$".to_string());

    t.success_prefix = style(">".to_string());
    t.error_prefix = style("!".to_string());
    t
}

pub fn pause(msg: &str) {
    print!("{msg}");
    let _ = io::stdout().flush();
    let mut _buf = String::new();
    let _ = io::stdin().read_line(&mut _buf);
}

pub fn print_entries(manager: &Manager) {
    let catalog = manager.catalog();
    let summary = catalog.summary();
    println!();
    println!(
        "{} ({} order, {} of {} entries managed)",
        style("Desktop context menu").bold(),
        catalog.policy(),
        summary.managed,
        summary.total
    );
    let rows = manager.rows();
    if rows.is_empty() {
        println!("  (no entries; use \"Add program\")");
    }
    for (index, row) in rows.iter().enumerate() {
        let cursor = if manager.selected() == Some(index) { ">" } else { " " };
        println!("{cursor} {:>2}. {row}", index + 1);
    }
    println!();
}

/// Lets the user pick a row and selects it. `None` when the list is empty or
/// the prompt was dismissed.
pub fn pick_entry(manager: &mut Manager, prompt: &str) -> io::Result<Option<usize>> {
    let rows = manager.rows();
    if rows.is_empty() {
        log_ui("The list is empty.");
        return Ok(None);
    }
    let picked = Select::with_theme(&menu_theme())
        .with_prompt(prompt)
        .items(&rows)
        .default(manager.selected().unwrap_or(0))
        .interact_on_opt(&Term::stdout())?;
    if let Some(index) = picked {
        manager.select(index);
    }
    Ok(picked)
}

pub fn confirm(prompt: &str) -> io::Result<bool> {
    Ok(Confirm::with_theme(&menu_theme())
        .with_prompt(prompt)
        .default(false)
        .interact_on(&Term::stdout())?)
}

/// Asks for an executable. Empty input cancels; the file must exist.
pub fn ask_executable() -> io::Result<Option<String>> {
    let raw: String = Input::with_theme(&menu_theme())
        .with_prompt("Path to the program (empty to cancel)")
        .allow_empty(true)
        .interact_text_on(&Term::stdout())?;
    let path = raw.trim().trim_matches('"').trim().to_string();
    if path.is_empty() {
        log_cli("Add: cancelled");
        return Ok(None);
    }
    if !Path::new(&path).is_file() {
        log_ui(format!("File not found: {path}"));
        return Ok(None);
    }
    Ok(Some(path))
}

/// Runs the inline editor on the terminal until Enter or Escape.
pub fn edit_inline(manager: &mut Manager) -> io::Result<()> {
    let term = Term::stdout();
    term.write_line("Enter saves, Esc cancels.")?;
    loop {
        if let EditorState::Editing { buffer, .. } = manager.editor() {
            term.clear_line()?;
            term.write_str(&format!("New name: {buffer}"))?;
        }
        let edit = match term.read_key()? {
            Key::Char(c) if !c.is_control() => EditKey::Char(c),
            Key::Backspace => EditKey::Backspace,
            Key::Enter => EditKey::Enter,
            Key::Escape => EditKey::Escape,
            _ => continue,
        };
        if let Some(result) = manager.type_key(edit) {
            term.write_line("")?;
            report_rename(result);
            return Ok(());
        }
    }
}

pub fn report_rename(result: Result<RenameOutcome, CatalogError>) {
    match result {
        Ok(RenameOutcome::Renamed) => log_ui("Renamed."),
        Ok(RenameOutcome::Unchanged) => log_ui("Name unchanged."),
        Err(err) => report_failure("Rename", &err),
    }
}

pub fn report_failure(action: &str, err: &CatalogError) {
    match err {
        CatalogError::Invalid(err) => {
            log_cli(format!("{action} rejected: {err}"));
            println!("{} {err}", style("!").yellow());
        }
        CatalogError::Registry(err) => {
            log_cli(format!("{action} failed: {err}"));
            println!("{} {action} failed: {err}", style("!").red());
            println!("  {}", err.kind().remedy());
        }
    }
}
