//! Process start-up checks: elevation and single instance.

use std::io;

use desktop_menu_win::keys::{SINGLE_INSTANCE_MUTEX, WINDOW_TITLE};
use desktop_menu_win::log::log_cli;
use windows::Win32::Foundation::{CloseHandle, ERROR_ALREADY_EXISTS, GetLastError, HANDLE};
use windows::Win32::System::Console::SetConsoleTitleW;
use windows::Win32::System::Threading::CreateMutexW;
use windows::Win32::UI::Shell::IsUserAnAdmin;
use windows::Win32::UI::WindowsAndMessaging::{
    FindWindowW, IsIconic, SW_RESTORE, SetForegroundWindow, ShowWindow,
};
use windows::core::{HSTRING, PCWSTR};

pub fn is_elevated() -> bool {
    unsafe { IsUserAnAdmin().as_bool() }
}

/// Holds the named mutex for the lifetime of the process.
pub struct SingleInstance {
    handle: HANDLE,
}

impl Drop for SingleInstance {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

/// `Ok(None)` when another instance already owns the mutex.
pub fn acquire_single_instance() -> io::Result<Option<SingleInstance>> {
    let name = HSTRING::from(SINGLE_INSTANCE_MUTEX);
    let handle = unsafe { CreateMutexW(None, false, &name) }?;
    if unsafe { GetLastError() } == ERROR_ALREADY_EXISTS {
        unsafe {
            let _ = CloseHandle(handle);
        }
        return Ok(None);
    }
    Ok(Some(SingleInstance { handle }))
}

pub fn set_console_title() {
    if let Err(err) = unsafe { SetConsoleTitleW(&HSTRING::from(WINDOW_TITLE)) } {
        log_cli(format!("SetConsoleTitleW failed: {err}"));
    }
}

/// Brings the console of the running instance to the front.
pub fn activate_existing_window() {
    let title = HSTRING::from(WINDOW_TITLE);
    match unsafe { FindWindowW(PCWSTR::null(), &title) } {
        Ok(hwnd) if !hwnd.is_invalid() => unsafe {
            if IsIconic(hwnd).as_bool() {
                let _ = ShowWindow(hwnd, SW_RESTORE);
            }
            let _ = SetForegroundWindow(hwnd);
        },
        _ => log_cli(format!("Window '{WINDOW_TITLE}' not found")),
    }
}
