use std::{fs, io};

use desktop_menu_win::keys::{LOGGING_VALUE_NAME, SETTINGS_SUBKEY};
use desktop_menu_win::log::log_ui;
use desktop_menu_win::settings::{logging_flag, save_flag};

/// Flips the stored logging switch (`HKCU\Software\DesktopMenuWin\LoggingEnabled`).
/// Switching off also deletes the current log file.
pub fn toggle_logging() -> io::Result<()> {
    let current = logging_flag();
    let target = !current;

    log_ui(format!(
        r"Writing HKCU\{} \ {} = {}",
        SETTINGS_SUBKEY,
        LOGGING_VALUE_NAME,
        u32::from(target)
    ));
    if let Err(err) = save_flag(LOGGING_VALUE_NAME, target) {
        if err.raw_os_error() == Some(5) {
            log_ui("Access denied when writing the logging flag.");
        }
        return Err(err);
    }

    if !target {
        match desktop_menu_win::log_file_path() {
            Some(path) => match fs::remove_file(&path) {
                Ok(()) => log_ui(format!("Removed log file {}", path.display())),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => log_ui(format!("Failed to remove log file: {}", e)),
            },
            None => log_ui("Log file path is not configured."),
        }
    }

    log_ui(format!(
        "Logging is now {}.",
        if target { "ENABLED" } else { "DISABLED" }
    ));
    Ok(())
}
