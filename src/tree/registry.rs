use std::io;

use windows::Win32::UI::Shell::{SHCNE_ASSOCCHANGED, SHCNF_IDLIST, SHChangeNotify};
use winreg::RegKey;
use winreg::enums::{HKEY_CLASSES_ROOT, KEY_READ, KEY_SET_VALUE};

use super::KeyTree;
use crate::log::log_cli;

/// `HKEY_CLASSES_ROOT` through winreg.
pub struct ClassesRootTree {
    hkcr: RegKey,
}

impl ClassesRootTree {
    pub fn open() -> Self {
        Self {
            hkcr: RegKey::predef(HKEY_CLASSES_ROOT),
        }
    }
}

impl Default for ClassesRootTree {
    fn default() -> Self {
        Self::open()
    }
}

impl KeyTree for ClassesRootTree {
    fn subkey_at(&self, path: &str, index: usize) -> io::Result<Option<String>> {
        let key = self.hkcr.open_subkey_with_flags(path, KEY_READ)?;
        key.enum_keys().nth(index).transpose()
    }

    fn key_exists(&self, path: &str) -> bool {
        self.hkcr.open_subkey_with_flags(path, KEY_READ).is_ok()
    }

    fn read_string(&self, path: &str, name: &str) -> io::Result<String> {
        self.hkcr
            .open_subkey_with_flags(path, KEY_READ)?
            .get_value::<String, _>(name)
    }

    fn create_key(&self, path: &str) -> io::Result<()> {
        self.hkcr.create_subkey(path).map(|_| ())
    }

    fn write_string(&self, path: &str, name: &str, value: &str) -> io::Result<()> {
        let key = self.hkcr.open_subkey_with_flags(path, KEY_SET_VALUE)?;
        let result = key.set_value(name, &value.to_string());
        if let Err(err) = &result {
            if err.raw_os_error() == Some(5) {
                log_cli(format!(
                    r"Access denied writing HKCR\{} \ {}. Not running elevated?",
                    path,
                    if name.is_empty() { "(Default)" } else { name }
                ));
            }
        }
        result
    }

    fn delete_key(&self, path: &str) -> io::Result<()> {
        self.hkcr.delete_subkey(path)
    }

    fn notify_shell_changed(&self, reason: &str) {
        log_cli(format!(
            "Shell notify ({reason}): calling SHChangeNotify(SHCNE_ASSOCCHANGED, SHCNF_IDLIST)"
        ));
        unsafe {
            SHChangeNotify(SHCNE_ASSOCCHANGED, SHCNF_IDLIST, None, None);
        }
    }
}
