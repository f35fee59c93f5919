use std::io;

use desktop_menu_win::{CatalogError, Direction};
use desktop_menu_win::keys::SHOW_ALL_VALUE_NAME;
use desktop_menu_win::log::{log_cli, log_ui};
use desktop_menu_win::settings::save_flag;

use crate::Manager;
use crate::prompts::{self, report_failure};

const EXPLORER_HINT: &str = "If the menu does not change, use \"Restart Explorer\".";

pub fn add_program(manager: &mut Manager) -> io::Result<()> {
    let Some(path) = prompts::ask_executable()? else {
        return Ok(());
    };
    match manager.add(&path) {
        Ok(()) => {
            log_ui(format!("Added {path}"));
            println!("{EXPLORER_HINT}");
        }
        Err(err) => report_failure("Add", &err),
    }
    Ok(())
}

pub fn remove_entry(manager: &mut Manager) -> io::Result<()> {
    let Some(index) = prompts::pick_entry(manager, "Entry to remove")? else {
        return Ok(());
    };
    let Some(entry) = manager.catalog().entry(index).cloned() else {
        return Ok(());
    };

    let question = if entry.is_managed {
        format!("Remove '{}' from the menu?", entry.display_name)
    } else {
        format!(
            "'{}' was not added by this program and may belong to Windows or another application. Delete it anyway?",
            entry.display_name
        )
    };
    if !prompts::confirm(&question)? {
        log_cli(format!("Remove: '{}' kept", entry.display_name));
        return Ok(());
    }

    match manager.remove(!entry.is_managed) {
        Ok(()) => log_ui(format!("Removed '{}'.", entry.display_name)),
        Err(err) => report_failure("Remove", &err),
    }
    Ok(())
}

pub fn rename_entry(manager: &mut Manager) -> io::Result<()> {
    let Some(index) = prompts::pick_entry(manager, "Entry to rename")? else {
        return Ok(());
    };
    if let Err(err) = manager.begin_edit(index) {
        report_failure("Rename", &CatalogError::from(err));
        return Ok(());
    }
    prompts::edit_inline(manager)
}

pub fn move_entry(manager: &mut Manager, direction: Direction) -> io::Result<()> {
    let title = format!("Entry to move {direction}");
    if prompts::pick_entry(manager, &title)?.is_none() {
        return Ok(());
    }
    match manager.move_selected(direction) {
        Ok(()) => log_ui(format!("Moved {direction}.")),
        Err(err) => report_failure("Move", &err),
    }
    Ok(())
}

pub fn sort_entries(manager: &mut Manager) -> io::Result<()> {
    match manager.reorder() {
        Ok(0) => log_ui("Already in alphabetical order."),
        Ok(renamed) => log_ui(format!("Sorted; {renamed} keys renamed.")),
        Err(err) => report_failure("Sort", &err),
    }
    Ok(())
}

pub fn toggle_show_all(manager: &mut Manager) -> io::Result<()> {
    let show_all = manager.toggle_show_all();
    log_ui(if show_all {
        "Showing all entries, including ones from other programs."
    } else {
        "Showing only entries added by this program."
    });
    if let Err(err) = save_flag(SHOW_ALL_VALUE_NAME, show_all) {
        log_cli(format!("Saving {SHOW_ALL_VALUE_NAME} failed: {err}"));
    }
    Ok(())
}

pub fn refresh_list(manager: &mut Manager) -> io::Result<()> {
    let summary = manager.reload();
    log_ui(format!(
        "Reloaded: {} entries, {} added by this program.",
        summary.total, summary.managed
    ));
    Ok(())
}

pub fn refresh_entry(manager: &mut Manager) -> io::Result<()> {
    if prompts::pick_entry(manager, "Entry to refresh")?.is_none() {
        return Ok(());
    }
    match manager.refresh_selected() {
        Ok(()) => log_ui("Entry refreshed."),
        Err(err) => report_failure("Refresh", &err),
    }
    Ok(())
}
