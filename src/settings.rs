//! Persisted preferences under `HKCU\Software\DesktopMenuWin`, with an HKLM
//! fallback for machine-wide defaults. Command-line flags override them.

use std::fmt;
use std::io;
use std::str::FromStr;

use clap::ValueEnum;

use crate::keys::KeyScheme;

/// How managed entries are ordered and keyed. One policy per deployment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OrderingPolicy {
    /// Manual order through move up/down; keys get a rank prefix on renumbering.
    #[default]
    Positional,
    /// Always sorted by display name; keys carry rank and language suffix.
    Alphabetical,
}

impl OrderingPolicy {
    pub fn name(self) -> &'static str {
        match self {
            OrderingPolicy::Positional => "positional",
            OrderingPolicy::Alphabetical => "alphabetical",
        }
    }
}

impl fmt::Display for OrderingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OrderingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positional" | "manual" => Ok(OrderingPolicy::Positional),
            "alphabetical" | "sorted" => Ok(OrderingPolicy::Alphabetical),
            other => Err(format!("unknown ordering policy '{}'", other)),
        }
    }
}

/// UI language; only affects the key suffix of alphabetical deployments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Language {
    #[default]
    #[value(name = "en")]
    English,
    #[value(name = "zh")]
    Chinese,
}

impl Language {
    pub fn suffix(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
        }
    }

    /// Maps a Windows LANGID; primary language 0x04 is Chinese.
    pub fn from_langid(langid: u16) -> Self {
        if langid & 0x3ff == 0x04 {
            Language::Chinese
        } else {
            Language::English
        }
    }

    #[cfg(windows)]
    pub fn detect() -> Self {
        use windows::Win32::Globalization::GetUserDefaultUILanguage;
        Self::from_langid(unsafe { GetUserDefaultUILanguage() })
    }

    #[cfg(not(windows))]
    pub fn detect() -> Self {
        Language::English
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    pub policy: OrderingPolicy,
    pub language: Language,
    pub show_all: bool,
}

impl Settings {
    pub fn load() -> Self {
        let policy = store::read_string(crate::keys::POLICY_VALUE_NAME)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        Settings {
            policy,
            language: Language::detect(),
            show_all: store::read_flag(crate::keys::SHOW_ALL_VALUE_NAME).unwrap_or(false),
        }
    }

    pub fn key_scheme(&self) -> KeyScheme {
        match self.policy {
            OrderingPolicy::Positional => KeyScheme::new(None),
            OrderingPolicy::Alphabetical => KeyScheme::new(Some(self.language.suffix())),
        }
    }
}

pub fn logging_flag() -> bool {
    store::read_flag(crate::keys::LOGGING_VALUE_NAME).unwrap_or(false)
}

pub fn save_flag(name: &str, value: bool) -> io::Result<()> {
    store::write_flag(name, value)
}

#[cfg(windows)]
mod store {
    use std::io;

    use winreg::RegKey;
    use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

    use crate::keys::SETTINGS_SUBKEY;

    fn read_from<T: winreg::types::FromRegValue>(hive: RegKey, name: &str) -> Option<T> {
        let key = hive.open_subkey(SETTINGS_SUBKEY).ok()?;
        key.get_value::<T, _>(name).ok()
    }

    fn read<T: winreg::types::FromRegValue>(name: &str) -> Option<T> {
        read_from(RegKey::predef(HKEY_CURRENT_USER), name)
            .or_else(|| read_from(RegKey::predef(HKEY_LOCAL_MACHINE), name))
    }

    pub fn read_flag(name: &str) -> Option<bool> {
        read::<u32>(name).map(|value| value != 0)
    }

    pub fn read_string(name: &str) -> Option<String> {
        read::<String>(name)
    }

    pub fn write_flag(name: &str, value: bool) -> io::Result<()> {
        let (key, _) = RegKey::predef(HKEY_CURRENT_USER).create_subkey(SETTINGS_SUBKEY)?;
        key.set_value(name, &u32::from(value))
    }
}

#[cfg(not(windows))]
mod store {
    use std::io;

    pub fn read_flag(_name: &str) -> Option<bool> {
        None
    }

    pub fn read_string(_name: &str) -> Option<String> {
        None
    }

    pub fn write_flag(_name: &str, _value: bool) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "settings are stored in the Windows registry",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_policy_names() {
        assert_eq!("Alphabetical".parse(), Ok(OrderingPolicy::Alphabetical));
        assert_eq!(" manual ".parse(), Ok(OrderingPolicy::Positional));
        assert!("random".parse::<OrderingPolicy>().is_err());
    }

    #[test]
    fn chinese_langids_map_to_zh() {
        assert_eq!(Language::from_langid(0x0804), Language::Chinese);
        assert_eq!(Language::from_langid(0x0404), Language::Chinese);
        assert_eq!(Language::from_langid(0x0409), Language::English);
    }

    #[test]
    fn scheme_suffix_follows_policy() {
        let mut settings = Settings {
            language: Language::Chinese,
            ..Settings::default()
        };
        assert_eq!(settings.key_scheme().suffix(), None);
        settings.policy = OrderingPolicy::Alphabetical;
        assert_eq!(settings.key_scheme().suffix(), Some("zh"));
    }
}
