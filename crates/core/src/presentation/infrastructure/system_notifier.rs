use crate::presentation::domain::notifier::Notifier;
use crate::protection::domain::process_launcher::ProcessLauncher;
use crate::shared::platform::Platform;

const TITLE: &str = "Privacy Guard Mode";
const MESSAGE: &str = "Someone else detected, please be aware of your privacy.";

/// Desktop notification and alert sound through the platform's own tools.
///
/// Both are started without waiting and any failure is dropped after a debug
/// log.
pub struct SystemNotifier {
    platform: Platform,
    launcher: Box<dyn ProcessLauncher>,
    desktop_notification: bool,
    sound_alert: bool,
}

impl SystemNotifier {
    pub fn new(
        platform: Platform,
        launcher: Box<dyn ProcessLauncher>,
        desktop_notification: bool,
        sound_alert: bool,
    ) -> Self {
        Self {
            platform,
            launcher,
            desktop_notification,
            sound_alert,
        }
    }

    fn fire(&self, what: &str, (program, args): (&str, Vec<String>)) {
        if let Err(e) = self.launcher.spawn(program, &args) {
            log::debug!("Could not play {what}: {e}");
        }
    }
}

impl Notifier for SystemNotifier {
    fn privacy_engaged(&mut self, face_count: usize) {
        if self.desktop_notification {
            self.fire("notification", notification_command(self.platform));
        }
        if self.sound_alert {
            self.fire("alert sound", sound_command(self.platform));
        }
        log::debug!("Alerted user about {face_count} faces");
    }
}

fn notification_command(platform: Platform) -> (&'static str, Vec<String>) {
    match platform {
        Platform::Macos => (
            "osascript",
            vec![
                "-e".to_string(),
                format!("display notification \"{MESSAGE}\" with title \"{TITLE}\""),
            ],
        ),
        Platform::Linux => (
            "notify-send",
            vec![
                "--urgency=critical".to_string(),
                TITLE.to_string(),
                MESSAGE.to_string(),
            ],
        ),
        Platform::Windows => (
            "powershell",
            vec![
                "-NoProfile".to_string(),
                "-Command".to_string(),
                format!(
                    "Add-Type -AssemblyName System.Windows.Forms; \
                     $n = New-Object System.Windows.Forms.NotifyIcon; \
                     $n.Icon = [System.Drawing.SystemIcons]::Warning; \
                     $n.Visible = $true; \
                     $n.ShowBalloonTip(5000, '{TITLE}', '{MESSAGE}', 'Warning'); \
                     Start-Sleep -Seconds 6; $n.Dispose()"
                ),
            ],
        ),
    }
}

fn sound_command(platform: Platform) -> (&'static str, Vec<String>) {
    match platform {
        Platform::Macos => (
            "afplay",
            vec!["/System/Library/Sounds/Sosumi.aiff".to_string()],
        ),
        Platform::Linux => (
            "paplay",
            vec!["/usr/share/sounds/freedesktop/stereo/dialog-warning.oga".to_string()],
        ),
        Platform::Windows => (
            "powershell",
            vec![
                "-NoProfile".to_string(),
                "-Command".to_string(),
                "[console]::beep(880, 300)".to_string(),
            ],
        ),
    }
}
