use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::action_table::{ActionEntry, ProtectiveActionConfig};
use crate::config::guard_config;
use crate::protection::domain::launch_command::{LaunchCommand, PathLaunch};
use crate::protection::domain::process_launcher::ProcessLauncher;
use crate::protection::domain::protective_action::{
    ActiveProtectionHandle, LaunchStep, ProtectiveAction,
};
use crate::shared::platform::Platform;

/// Launches a cover application through a ranked fallback chain.
///
/// Order, stopping at the first success:
/// 1. `custom_path`, if set and present on disk
/// 2. the platform's primary command, then its `fallback_path`
/// 3. the platform's fallback application command, then its `fallback_path`
///
/// If every rung fails the action reports failure and the session carries on
/// in privacy without a visible response.
pub struct AppLaunchAction {
    table: ProtectiveActionConfig,
    platform: Platform,
    launcher: Box<dyn ProcessLauncher>,
    timeout: Duration,
    handle: Option<ActiveProtectionHandle>,
}

#[derive(Clone, Copy)]
enum Role {
    Primary,
    FallbackApp,
}

impl Role {
    fn steps(self) -> (LaunchStep, LaunchStep) {
        match self {
            Role::Primary => (LaunchStep::PrimaryCommand, LaunchStep::PrimaryFallbackPath),
            Role::FallbackApp => (LaunchStep::FallbackAppCommand, LaunchStep::FallbackAppPath),
        }
    }
}

impl AppLaunchAction {
    pub fn new(
        table: ProtectiveActionConfig,
        platform: Platform,
        launcher: Box<dyn ProcessLauncher>,
    ) -> Self {
        let timeout = guard_config::seconds(table.launch_timeout);
        Self {
            table,
            platform,
            launcher,
            timeout,
            handle: None,
        }
    }

    fn try_custom_path(&self) -> Option<ActiveProtectionHandle> {
        let custom = self.table.custom_path.trim();
        if custom.is_empty() {
            return None;
        }
        let path = Path::new(custom);
        if !path.exists() {
            log::warn!("Custom protective path {} does not exist, skipping", path.display());
            return None;
        }
        self.launch_path(path, "custom application", LaunchStep::CustomPath)
    }

    fn try_entry(&self, entry: &ActionEntry, role: Role) -> Option<ActiveProtectionHandle> {
        let (command_step, path_step) = role.steps();

        if let Some(handle) = self.launch_command(entry, command_step) {
            return Some(handle);
        }

        let fallback = entry.fallback_path.trim();
        if fallback.is_empty() {
            return None;
        }
        let path = Path::new(fallback);
        if !path.exists() {
            log::warn!("{}: fallback path {} does not exist", entry.name, path.display());
            return None;
        }
        self.launch_path(path, &entry.name, path_step)
    }

    fn launch_command(&self, entry: &ActionEntry, step: LaunchStep) -> Option<ActiveProtectionHandle> {
        let Some(command) = LaunchCommand::parse(&entry.command) else {
            log::warn!("{}: unusable command {:?}", entry.name, entry.command);
            return None;
        };
        let (program, args) = command.invocation();
        log::debug!("Trying {step} for {}: {program} {}", entry.name, args.join(" "));

        match self.launcher.run(&program, &args, self.timeout) {
            Ok(outcome) if outcome.succeeded() => Some(self.record(&entry.name, step, None)),
            Ok(outcome) => {
                log::warn!("{}: {step} failed ({outcome:?})", entry.name);
                None
            }
            Err(e) => {
                log::warn!("{}: {step} failed: {e}", entry.name);
                None
            }
        }
    }

    fn launch_path(&self, path: &Path, label: &str, step: LaunchStep) -> Option<ActiveProtectionHandle> {
        log::debug!("Trying {step}: {}", path.display());
        let result = match PathLaunch::for_path(path, self.platform) {
            PathLaunch::ViaLauncher { program, args } => self
                .launcher
                .run(&program, &args, self.timeout)
                .map(|outcome| outcome.succeeded().then_some(None)),
            PathLaunch::Direct { program } => {
                self.launcher.spawn(&program, &[]).map(|pid| Some(Some(pid)))
            }
        };

        match result {
            Ok(Some(pid)) => Some(self.record(label, step, pid)),
            Ok(None) => {
                log::warn!("{label}: {step} {} was rejected by the launcher", path.display());
                None
            }
            Err(e) => {
                log::warn!("{label}: {step} failed: {e}");
                None
            }
        }
    }

    fn record(&self, label: &str, step: LaunchStep, pid: Option<u32>) -> ActiveProtectionHandle {
        log::info!("Protective application {label} started via {step}");
        ActiveProtectionHandle {
            label: label.to_string(),
            step,
            pid,
            started_at: Instant::now(),
        }
    }
}

impl ProtectiveAction for AppLaunchAction {
    fn activate(&mut self) -> bool {
        let launched = self
            .try_custom_path()
            .or_else(|| {
                let entry = self.table.primary_for(self.platform)?;
                self.try_entry(entry, Role::Primary)
            })
            .or_else(|| {
                let entry = self.table.fallback_for(self.platform)?;
                self.try_entry(entry, Role::FallbackApp)
            });

        match launched {
            Some(handle) => {
                self.handle = Some(handle);
                true
            }
            None => {
                log::error!(
                    "Every protective action failed on {}; privacy is tracked but nothing is shown",
                    self.platform
                );
                false
            }
        }
    }

    fn deactivate(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let pid = handle
                    .pid
                    .map(|p| format!(" (pid {p})"))
                    .unwrap_or_default();
                log::info!(
                    "Environment secure; {}{pid} left open for the user",
                    handle.label
                );
            }
            None => log::debug!("No protective application to clear"),
        }
        true
    }

    fn active_handle(&self) -> Option<&ActiveProtectionHandle> {
        self.handle.as_ref()
    }

    fn describe(&self) -> String {
        let primary = self
            .table
            .primary_for(self.platform)
            .map(|e| e.name.as_str())
            .unwrap_or("none");
        format!("app launch on {} (primary: {primary})", self.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protection::domain::process_launcher::{LaunchError, RunOutcome};
    use std::collections::VecDeque;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Run(String, Vec<String>),
        Spawn(String),
    }

    /// Scripted launcher: each call pops the next canned result.
    struct FakeLauncher {
        calls: Arc<Mutex<Vec<Call>>>,
        run_results: Mutex<VecDeque<RunOutcome>>,
        spawn_ok: bool,
    }

    impl ProcessLauncher for FakeLauncher {
        fn run(
            &self,
            program: &str,
            args: &[String],
            _timeout: Duration,
        ) -> Result<RunOutcome, LaunchError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Run(program.to_string(), args.to_vec()));
            Ok(self
                .run_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(RunOutcome::Exited(Some(1))))
        }

        fn spawn(&self, program: &str, _args: &[String]) -> Result<u32, LaunchError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Spawn(program.to_string()));
            if self.spawn_ok {
                Ok(4242)
            } else {
                Err(LaunchError::Spawn {
                    program: program.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                })
            }
        }
    }

    fn launcher(
        run_results: Vec<RunOutcome>,
        spawn_ok: bool,
    ) -> (Box<FakeLauncher>, Arc<Mutex<Vec<Call>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let fake = FakeLauncher {
            calls: calls.clone(),
            run_results: Mutex::new(run_results.into()),
            spawn_ok,
        };
        (Box::new(fake), calls)
    }

    fn entry(name: &str, command: &str, fallback_path: &str) -> ActionEntry {
        ActionEntry {
            name: name.to_string(),
            command: command.to_string(),
            fallback_path: fallback_path.to_string(),
        }
    }

    fn table(primary: Option<ActionEntry>, fallback: Option<ActionEntry>) -> ProtectiveActionConfig {
        let mut t = ProtectiveActionConfig::empty();
        if let Some(e) = primary {
            t.protective_apps.insert(Platform::Linux, e);
        }
        if let Some(e) = fallback {
            t.fallback_apps.insert(Platform::Linux, e);
        }
        t
    }

    fn existing_file(dir: &TempDir, name: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, b"#!/bin/sh\n").unwrap();
        path.to_string_lossy().into_owned()
    }

    const OK: RunOutcome = RunOutcome::Exited(Some(0));
    const FAIL: RunOutcome = RunOutcome::Exited(Some(1));

    #[test]
    fn test_custom_path_wins_and_stops_chain() {
        let tmp = TempDir::new().unwrap();
        let mut t = table(Some(entry("Editor", "gedit", "")), None);
        t.custom_path = existing_file(&tmp, "cover.sh");
        let (l, calls) = launcher(vec![OK], true);
        let mut action = AppLaunchAction::new(t.clone(), Platform::Linux, l);

        assert!(action.activate());
        assert_eq!(*calls.lock().unwrap(), vec![Call::Spawn(t.custom_path.clone())]);
        let handle = action.active_handle().unwrap();
        assert_eq!(handle.step, LaunchStep::CustomPath);
        assert_eq!(handle.pid, Some(4242));
    }

    #[test]
    fn test_missing_custom_path_falls_through_to_primary() {
        let mut t = table(Some(entry("Editor", "gedit --new", "")), None);
        t.custom_path = "/definitely/not/here/cover.sh".to_string();
        let (l, calls) = launcher(vec![OK], true);
        let mut action = AppLaunchAction::new(t, Platform::Linux, l);

        assert!(action.activate());
        assert_eq!(
            *calls.lock().unwrap(),
            vec![Call::Run("gedit".into(), vec!["--new".into()])]
        );
        assert_eq!(action.active_handle().unwrap().step, LaunchStep::PrimaryCommand);
    }

    #[test]
    fn test_primary_failure_uses_fallback_path() {
        let tmp = TempDir::new().unwrap();
        let fallback = existing_file(&tmp, "gedit");
        let t = table(
            Some(entry("Editor", "gedit", &fallback)),
            Some(entry("Terminal", "xterm", "")),
        );
        let (l, calls) = launcher(vec![FAIL], true);
        let mut action = AppLaunchAction::new(t, Platform::Linux, l);

        assert!(action.activate());
        assert_eq!(
            *calls.lock().unwrap(),
            vec![Call::Run("gedit".into(), vec![]), Call::Spawn(fallback)]
        );
        assert_eq!(
            action.active_handle().unwrap().step,
            LaunchStep::PrimaryFallbackPath
        );
    }

    #[test]
    fn test_timeout_counts_as_failure() {
        let t = table(
            Some(entry("Editor", "gedit", "")),
            Some(entry("Terminal", "xterm", "")),
        );
        let (l, calls) = launcher(vec![RunOutcome::TimedOut, OK], true);
        let mut action = AppLaunchAction::new(t, Platform::Linux, l);

        assert!(action.activate());
        assert_eq!(calls.lock().unwrap().len(), 2);
        assert_eq!(
            action.active_handle().unwrap().step,
            LaunchStep::FallbackAppCommand
        );
    }

    #[test]
    fn test_oversized_timeout_is_clamped() {
        let mut t = table(Some(entry("Editor", "gedit", "")), None);
        t.launch_timeout = 1e20;
        let (l, _) = launcher(vec![OK], true);
        let action = AppLaunchAction::new(t, Platform::Linux, l);
        assert_eq!(action.timeout, Duration::from_secs(86_400));
    }

    #[test]
    fn test_fallback_app_path_is_last_resort() {
        let tmp = TempDir::new().unwrap();
        let xterm = existing_file(&tmp, "xterm");
        let t = table(
            Some(entry("Editor", "gedit", "/no/such/gedit")),
            Some(entry("Terminal", "xterm", &xterm)),
        );
        let (l, calls) = launcher(vec![FAIL, FAIL], true);
        let mut action = AppLaunchAction::new(t, Platform::Linux, l);

        assert!(action.activate());
        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                Call::Run("gedit".into(), vec![]),
                Call::Run("xterm".into(), vec![]),
                Call::Spawn(xterm),
            ]
        );
        assert_eq!(action.active_handle().unwrap().step, LaunchStep::FallbackAppPath);
    }

    #[test]
    fn test_nothing_viable_reports_failure() {
        let (l, calls) = launcher(vec![], true);
        let mut action = AppLaunchAction::new(ProtectiveActionConfig::empty(), Platform::Linux, l);

        assert!(!action.activate());
        assert!(calls.lock().unwrap().is_empty());
        assert!(action.active_handle().is_none());
    }

    #[test]
    fn test_all_rungs_failing_reports_failure() {
        let tmp = TempDir::new().unwrap();
        let gedit = existing_file(&tmp, "gedit");
        let t = table(
            Some(entry("Editor", "gedit", &gedit)),
            Some(entry("Terminal", "xterm", "")),
        );
        let (l, calls) = launcher(vec![FAIL, FAIL], false);
        let mut action = AppLaunchAction::new(t, Platform::Linux, l);

        assert!(!action.activate());
        assert_eq!(calls.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_other_platform_entries_are_ignored() {
        let mut t = ProtectiveActionConfig::empty();
        t.protective_apps
            .insert(Platform::Windows, entry("Notepad", "notepad.exe", ""));
        let (l, calls) = launcher(vec![OK], true);
        let mut action = AppLaunchAction::new(t, Platform::Linux, l);

        assert!(!action.activate());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_open_app_command_uses_launcher_name() {
        let mut t = ProtectiveActionConfig::empty();
        t.protective_apps
            .insert(Platform::Macos, entry("Calculator", "open -a Calculator", ""));
        let (l, calls) = launcher(vec![OK], true);
        let mut action = AppLaunchAction::new(t, Platform::Macos, l);

        assert!(action.activate());
        assert_eq!(
            *calls.lock().unwrap(),
            vec![Call::Run(
                "open".into(),
                vec!["-a".into(), "Calculator".into()]
            )]
        );
        assert_eq!(action.active_handle().unwrap().pid, None);
    }

    #[test]
    fn test_deactivate_clears_handle_without_touching_processes() {
        let t = table(Some(entry("Editor", "gedit", "")), None);
        let (l, calls) = launcher(vec![OK], true);
        let mut action = AppLaunchAction::new(t, Platform::Linux, l);
        assert!(action.activate());
        let calls_after_activate = calls.lock().unwrap().len();

        assert!(action.deactivate());
        assert!(action.active_handle().is_none());
        assert_eq!(calls.lock().unwrap().len(), calls_after_activate);
    }

    #[test]
    fn test_deactivate_without_activation_succeeds() {
        let (l, calls) = launcher(vec![], true);
        let mut action = AppLaunchAction::new(ProtectiveActionConfig::empty(), Platform::Linux, l);
        assert!(action.deactivate());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_describe_names_primary() {
        let t = table(Some(entry("Editor", "gedit", "")), None);
        let (l, _) = launcher(vec![], true);
        let action = AppLaunchAction::new(t, Platform::Linux, l);
        assert_eq!(action.describe(), "app launch on Linux (primary: Editor)");
    }
}
