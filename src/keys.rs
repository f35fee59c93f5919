//! Registry paths, names and the key naming scheme for managed entries.
//! Shared between the library and the manager binary. No duplicated strings.

/// Shell root for desktop-background verbs (under `HKEY_CLASSES_ROOT`).
pub const SHELL_ROOT: &str = r"Directory\Background\shell";

/// Child key holding the command line of a verb.
pub const COMMAND_SUBKEY: &str = "command";

/// Value name of the verb icon.
pub const ICON_VALUE: &str = "Icon";

/// Marker embedded in every key this program creates.
pub const MANAGED_MARKER: &str = "CustomApp_";

/// Prefix of temporary keys used while renumbering.
pub const STAGING_PREFIX: &str = "~";

/// Per-user settings (HKCU\{SETTINGS_SUBKEY}).
pub const SETTINGS_SUBKEY: &str = r"Software\DesktopMenuWin";

/// DWORD: 1 = file logging enabled.
pub const LOGGING_VALUE_NAME: &str = "LoggingEnabled";

/// String: `positional` or `alphabetical`.
pub const POLICY_VALUE_NAME: &str = "OrderingPolicy";

/// DWORD: 1 = list shows unmanaged entries too.
pub const SHOW_ALL_VALUE_NAME: &str = "ShowAllItems";

/// Named mutex guarding against a second instance.
pub const SINGLE_INSTANCE_MUTEX: &str = "DesktopMenuManager_SingleInstance";

/// Console title, also used to find the running instance.
pub const WINDOW_TITLE: &str = "Desktop Context Menu Manager";

/// Built-in shell verbs that are never listed or touched.
pub const SYSTEM_ITEMS: &[&str] = &[
    "New",
    "View",
    "SortBy",
    "Paste",
    "PasteShortcut",
    "DesktopBackground",
    "Settings",
    "Display",
    "GraphicsProperties",
    "NvDriverUpdate",
    "Share",
    "GrantAccess",
    "PinToQuickAccess",
    "IncludeInLibrary",
    "Properties",
    "Open",
    "OpenInNewWindow",
    "Print",
    "ScanWithMicrosoftDefender",
];

#[inline]
pub fn is_system_item(key: &str) -> bool {
    SYSTEM_ITEMS.iter().any(|item| item.eq_ignore_ascii_case(key))
}

/// `Directory\Background\shell\<key>`.
#[inline]
pub fn shell_key_path(key: &str) -> String {
    format!(r"{}\{}", SHELL_ROOT, key)
}

/// `Directory\Background\shell\<key>\command`.
#[inline]
pub fn command_key_path(key: &str) -> String {
    format!(r"{}\{}\{}", SHELL_ROOT, key, COMMAND_SUBKEY)
}

/// Path as Registry Editor shows it in its address bar.
pub fn regedit_location(key: &str) -> String {
    format!(r"Computer\HKEY_CLASSES_ROOT\{}", shell_key_path(key))
}

/// Naming convention of managed keys.
///
/// - positional: `<NN>_CustomApp_<name>[_<suffix>]`
/// - unnumbered: `CustomApp_<name>_<n>[_<suffix>]`
///
/// With a suffix, only keys ending in `_<suffix>` count as managed, so entries
/// written under another UI language are left alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyScheme {
    suffix: Option<String>,
}

impl KeyScheme {
    pub fn new(suffix: Option<&str>) -> Self {
        Self {
            suffix: suffix.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    pub fn is_managed(&self, key: &str) -> bool {
        if !key.contains(MANAGED_MARKER) {
            return false;
        }
        match &self.suffix {
            Some(suffix) => key
                .to_ascii_lowercase()
                .ends_with(&format!("_{}", suffix.to_ascii_lowercase())),
            None => true,
        }
    }

    /// Key for `rank` out of `count` ranked entries. The rank is padded to
    /// the width of `count` (at least two digits) so keys sort as text.
    pub fn positional_key(&self, rank: usize, count: usize, display_name: &str) -> String {
        format!(
            "{:0width$}_{}{}{}",
            rank,
            MANAGED_MARKER,
            display_name,
            self.suffix_part(),
            width = rank_width(count)
        )
    }

    pub fn unnumbered_key(&self, display_name: &str, counter: usize) -> String {
        format!(
            "{}{}_{}{}",
            MANAGED_MARKER,
            display_name,
            counter,
            self.suffix_part()
        )
    }

    pub fn staging_key(&self, target: &str) -> String {
        format!("{}{}", STAGING_PREFIX, target)
    }

    fn suffix_part(&self) -> String {
        self.suffix
            .as_ref()
            .map(|s| format!("_{}", s))
            .unwrap_or_default()
    }
}

fn rank_width(count: usize) -> usize {
    (count.max(1).ilog10() as usize + 1).max(2)
}
