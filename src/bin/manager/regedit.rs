use std::io;
use std::process::{Command, Stdio};

use desktop_menu_win::keys::regedit_location;
use desktop_menu_win::log::{log_cli, log_ui};
use winreg::RegKey;
use winreg::enums::HKEY_CURRENT_USER;

use crate::Manager;
use crate::prompts;

const REGEDIT_APPLET: &str = r"Software\Microsoft\Windows\CurrentVersion\Applets\Regedit";
const LAST_KEY_VALUE: &str = "LastKey";

/// Opens Registry Editor at the selected entry.
pub fn open_selected(manager: &mut Manager) -> io::Result<()> {
    if prompts::pick_entry(manager, "Entry to show in Registry Editor")?.is_none() {
        return Ok(());
    }
    let Some(key) = manager.selected_entry().map(|entry| entry.key.clone()) else {
        return Ok(());
    };
    if let Err(err) = open_at(&key) {
        log_ui(format!("Could not open Registry Editor: {err}"));
    }
    Ok(())
}

/// Regedit restores `LastKey` on start; `/m` forces a fresh instance so an
/// already open window does not swallow the request.
fn open_at(key: &str) -> io::Result<()> {
    let location = regedit_location(key);
    log_cli(format!("Creating/opening registry key: {}", REGEDIT_APPLET));
    let (applet, _) = RegKey::predef(HKEY_CURRENT_USER).create_subkey(REGEDIT_APPLET)?;
    log_cli(format!(
        "Setting value: {} \\ {} = {}",
        REGEDIT_APPLET, LAST_KEY_VALUE, location
    ));
    applet.set_value(LAST_KEY_VALUE, &location)?;

    Command::new("regedit.exe")
        .arg("/m")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    log_ui(format!("Registry Editor opened at {location}"));
    Ok(())
}
