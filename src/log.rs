use crate::{DESKTOP_LOG_PATH, settings};
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

static FORCED: AtomicBool = AtomicBool::new(false);

pub fn log_cli(message: impl Into<String>) {
    let text = message.into();
    if let Err(err) = log_desktop(&text) {
        eprintln!("[log] cannot write '{}': {}", text, err);
    }
}

pub fn log_ui(message: impl AsRef<str>) {
    let msg = message.as_ref();
    log_cli(msg);
    println!("{msg}");
}

pub fn log_desktop(message: impl AsRef<str>) -> Result<(), String> {
    if !log_enabled() {
        return Ok(());
    }
    use chrono::Local;

    let path = DESKTOP_LOG_PATH
        .as_ref()
        .map_err(|err| err.clone())?
        .clone();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create {}: {}", parent.display(), e))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("failed to open {}: {}", path.display(), e))?;

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    writeln!(file, "[{}] {}", timestamp, message.as_ref())
        .map_err(|e| format!("failed to write to {}: {}", path.display(), e))?;

    Ok(())
}

/// Turns logging on for this process regardless of the stored flag (`--log`).
pub fn force_logging() {
    FORCED.store(true, Ordering::Relaxed);
}

pub fn log_enabled() -> bool {
    FORCED.load(Ordering::Relaxed) || settings::logging_flag()
}
