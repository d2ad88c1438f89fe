use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::shared::constants::DEFAULT_LAUNCH_TIMEOUT_SECS;
use crate::shared::platform::Platform;

/// Which protective behaviour runs on entering privacy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectiveActionMode {
    /// Launch a cover application through the ranked fallback chain.
    #[default]
    AppLaunch,
    /// Obstruct the terminal with a privacy banner.
    Banner,
}

impl fmt::Display for ProtectiveActionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtectiveActionMode::AppLaunch => write!(f, "app_launch"),
            ProtectiveActionMode::Banner => write!(f, "banner"),
        }
    }
}

/// One launchable cover application for a platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub name: String,
    /// Either `open -a <App Name>` (macOS launcher) or an executable with args.
    pub command: String,
    /// Launched directly when `command` fails; empty means none.
    #[serde(default)]
    pub fallback_path: String,
}

impl ActionEntry {
    fn new(name: &str, command: &str, fallback_path: &str) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
            fallback_path: fallback_path.to_string(),
        }
    }
}

/// Protective-action table, read once per session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectiveActionConfig {
    pub protective_action: ProtectiveActionMode,
    /// Tried before anything else when non-empty and present on disk.
    pub custom_path: String,
    pub protective_apps: BTreeMap<Platform, ActionEntry>,
    pub fallback_apps: BTreeMap<Platform, ActionEntry>,
    /// Seconds a launcher command may run before it counts as failed.
    pub launch_timeout: f64,
}

impl ProtectiveActionConfig {
    pub fn primary_for(&self, platform: Platform) -> Option<&ActionEntry> {
        self.protective_apps.get(&platform)
    }

    pub fn fallback_for(&self, platform: Platform) -> Option<&ActionEntry> {
        self.fallback_apps.get(&platform)
    }

    /// An empty table: no custom path and no per-platform entries.
    pub fn empty() -> Self {
        Self {
            custom_path: String::new(),
            protective_apps: BTreeMap::new(),
            fallback_apps: BTreeMap::new(),
            ..Self::default()
        }
    }
}

impl Default for ProtectiveActionConfig {
    fn default() -> Self {
        let protective_apps = BTreeMap::from([
            (
                Platform::Macos,
                ActionEntry::new(
                    "Calculator",
                    "open -a Calculator",
                    "/System/Applications/Calculator.app",
                ),
            ),
            (
                Platform::Windows,
                ActionEntry::new(
                    "Notepad",
                    "notepad.exe",
                    r"C:\Windows\System32\notepad.exe",
                ),
            ),
            (
                Platform::Linux,
                ActionEntry::new("Text Editor", "gedit", "/usr/bin/gedit"),
            ),
        ]);
        let fallback_apps = BTreeMap::from([
            (
                Platform::Macos,
                ActionEntry::new(
                    "TextEdit",
                    "open -a TextEdit",
                    "/System/Applications/TextEdit.app",
                ),
            ),
            (
                Platform::Windows,
                ActionEntry::new("Calculator", "calc.exe", r"C:\Windows\System32\calc.exe"),
            ),
            (
                Platform::Linux,
                ActionEntry::new("Terminal", "xterm", "/usr/bin/xterm"),
            ),
        ]);

        Self {
            protective_action: ProtectiveActionMode::AppLaunch,
            custom_path: String::new(),
            protective_apps,
            fallback_apps,
            launch_timeout: DEFAULT_LAUNCH_TIMEOUT_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_platform() {
        let table = ProtectiveActionConfig::default();
        for &p in Platform::ALL {
            assert!(table.primary_for(p).is_some(), "no primary for {p}");
            assert!(table.fallback_for(p).is_some(), "no fallback for {p}");
        }
    }

    #[test]
    fn test_empty_has_no_entries() {
        let table = ProtectiveActionConfig::empty();
        assert!(table.primary_for(Platform::current()).is_none());
        assert!(table.custom_path.is_empty());
    }

    #[test]
    fn test_entry_without_fallback_path_parses() {
        let entry: ActionEntry =
            serde_json::from_str(r#"{"name":"Vim","command":"gvim"}"#).unwrap();
        assert!(entry.fallback_path.is_empty());
    }

    #[test]
    fn test_partial_table_keeps_other_defaults() {
        let table: ProtectiveActionConfig =
            serde_json::from_str(r#"{"custom_path":"/opt/cover"}"#).unwrap();
        assert_eq!(table.custom_path, "/opt/cover");
        assert_eq!(table.protective_action, ProtectiveActionMode::AppLaunch);
        assert_eq!(table.protective_apps.len(), 3);
    }

    #[test]
    fn test_mode_names() {
        let mode: ProtectiveActionMode = serde_json::from_str("\"banner\"").unwrap();
        assert_eq!(mode, ProtectiveActionMode::Banner);
        assert_eq!(ProtectiveActionMode::AppLaunch.to_string(), "app_launch");
    }
}
