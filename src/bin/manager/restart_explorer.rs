use std::io;
use std::process::{Command, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};

use desktop_menu_win::log::{log_cli, log_ui};

const EXIT_TIMEOUT: Duration = Duration::from_secs(5);
const START_TIMEOUT: Duration = Duration::from_secs(5);
const EXIT_POLL: Duration = Duration::from_millis(200);
const START_POLL: Duration = Duration::from_millis(250);

fn explorer_count() -> usize {
    let output = Command::new("tasklist")
        .args(["/FI", "IMAGENAME eq explorer.exe", "/FO", "CSV", "/NH"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output();
    match output {
        Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| line.to_ascii_lowercase().contains("explorer.exe"))
            .count(),
        Ok(_) => 0,
        Err(err) => {
            log_cli(format!("Restart Explorer: tasklist failed: {err}"));
            0
        }
    }
}

/// Polls until `done` holds or `timeout` passes. Returns whether it held.
fn wait_until(timeout: Duration, poll: Duration, done: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if done() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(poll);
    }
}

fn spawn_detached(program: &str, args: &[&str]) -> io::Result<()> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(drop)
}

/// Kills and restarts Explorer so the desktop menu is rebuilt.
pub fn restart_explorer() -> io::Result<()> {
    log_cli(format!(
        "Restart Explorer: {} explorer.exe running",
        explorer_count()
    ));

    match Command::new("taskkill")
        .args(["/F", "/IM", "explorer.exe"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) => log_cli(format!("Restart Explorer: taskkill exit code {:?}", status.code())),
        Err(err) => log_cli(format!("Restart Explorer: taskkill failed: {err}")),
    }

    if !wait_until(EXIT_TIMEOUT, EXIT_POLL, || explorer_count() == 0) {
        log_cli("Restart Explorer: explorer.exe still running after timeout, proceeding");
    }
    sleep(Duration::from_millis(300));

    if let Err(err) = spawn_detached("explorer.exe", &[]) {
        log_cli(format!(
            "Restart Explorer: direct spawn failed: {err}; trying cmd /C start"
        ));
        spawn_detached("cmd", &["/C", "start", "", "explorer.exe"]).map_err(|err| {
            log_cli(format!("Restart Explorer: cmd start failed: {err}"));
            err
        })?;
    }

    if wait_until(START_TIMEOUT, START_POLL, || explorer_count() > 0) {
        log_ui("Explorer restarted.");
    } else {
        log_ui("Explorer was started but did not appear within 5 seconds.");
    }
    Ok(())
}
