use crate::config::action_table::{ProtectiveActionConfig, ProtectiveActionMode};
use crate::protection::domain::protective_action::ProtectiveAction;
use crate::shared::platform::Platform;

use super::app_launch_action::AppLaunchAction;
use super::banner_action::BannerAction;
use super::system_process_launcher::SystemProcessLauncher;

/// Builds the protective action selected by `protective_action`.
pub fn create_action(table: &ProtectiveActionConfig, platform: Platform) -> Box<dyn ProtectiveAction> {
    let action: Box<dyn ProtectiveAction> = match table.protective_action {
        ProtectiveActionMode::AppLaunch => Box::new(AppLaunchAction::new(
            table.clone(),
            platform,
            Box::new(SystemProcessLauncher::new()),
        )),
        ProtectiveActionMode::Banner => Box::new(BannerAction::new()),
    };
    log::info!("Protective action: {}", action.describe());
    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::app_launch(ProtectiveActionMode::AppLaunch, "app launch on Linux (primary: Text Editor)")]
    #[case::banner(ProtectiveActionMode::Banner, "terminal privacy banner")]
    fn test_mode_selects_action(#[case] mode: ProtectiveActionMode, #[case] expected: &str) {
        let table = ProtectiveActionConfig {
            protective_action: mode,
            ..ProtectiveActionConfig::default()
        };
        let action = create_action(&table, Platform::Linux);
        assert_eq!(action.describe(), expected);
        assert!(action.active_handle().is_none());
    }
}
