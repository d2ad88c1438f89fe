use std::io::{self, Write};
use std::time::Instant;

use crate::protection::domain::protective_action::{
    ActiveProtectionHandle, LaunchStep, ProtectiveAction,
};

const BANNER_WIDTH: usize = 60;

/// Obstructs the terminal with a framed banner instead of launching anything.
///
/// Never fails: a write error is logged and the activation still counts.
pub struct BannerAction {
    out: Box<dyn Write + Send>,
    handle: Option<ActiveProtectionHandle>,
}

impl BannerAction {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stderr()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self { out, handle: None }
    }

    fn print(&mut self, lines: &[&str]) {
        if let Err(e) = write_framed(&mut self.out, lines) {
            log::debug!("Could not draw banner: {}", e);
        }
    }
}

impl Default for BannerAction {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtectiveAction for BannerAction {
    fn activate(&mut self) -> bool {
        self.print(&[
            "PRIVACY MODE",
            "Another person is looking at this screen.",
        ]);
        log::info!("Privacy banner shown");
        self.handle = Some(ActiveProtectionHandle {
            label: "privacy banner".to_string(),
            step: LaunchStep::Banner,
            pid: None,
            started_at: Instant::now(),
        });
        true
    }

    fn deactivate(&mut self) -> bool {
        if self.handle.take().is_some() {
            self.print(&["ALL CLEAR", "Environment secure."]);
            log::info!("Privacy banner cleared");
        }
        true
    }

    fn active_handle(&self) -> Option<&ActiveProtectionHandle> {
        self.handle.as_ref()
    }

    fn describe(&self) -> String {
        "terminal privacy banner".to_string()
    }
}

fn write_framed(out: &mut dyn Write, lines: &[&str]) -> io::Result<()> {
    let border = "#".repeat(BANNER_WIDTH);
    let inner = BANNER_WIDTH - 4;
    writeln!(out)?;
    writeln!(out, "{border}")?;
    for line in lines {
        writeln!(out, "# {line:^inner$} #")?;
    }
    writeln!(out, "{border}")?;
    writeln!(out)?;
    out.flush()
}
