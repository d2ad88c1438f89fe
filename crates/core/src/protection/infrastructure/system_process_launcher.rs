use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::protection::domain::process_launcher::{LaunchError, ProcessLauncher, RunOutcome};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Launches processes with `std::process::Command`.
///
/// Bounded runs poll `try_wait` until the deadline. A run that times out is
/// reported as such and its process is left alone.
pub struct SystemProcessLauncher;

impl SystemProcessLauncher {
    pub fn new() -> Self {
        Self
    }

    fn start(program: &str, args: &[String]) -> Result<Child, LaunchError> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| LaunchError::Spawn {
                program: program.to_string(),
                source: e,
            })
    }
}

impl Default for SystemProcessLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLauncher for SystemProcessLauncher {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<RunOutcome, LaunchError> {
        let mut child = Self::start(program, args)?;
        let deadline = Instant::now().checked_add(timeout);

        loop {
            let status = child.try_wait().map_err(|e| LaunchError::Wait {
                program: program.to_string(),
                source: e,
            })?;
            if let Some(status) = status {
                return Ok(RunOutcome::Exited(status.code()));
            }
            let now = Instant::now();
            let pause = match deadline {
                Some(deadline) if now >= deadline => {
                    reap_in_background(child);
                    return Ok(RunOutcome::TimedOut);
                }
                Some(deadline) => POLL_INTERVAL.min(deadline - now),
                None => POLL_INTERVAL,
            };
            thread::sleep(pause);
        }
    }

    fn spawn(&self, program: &str, args: &[String]) -> Result<u32, LaunchError> {
        let child = Self::start(program, args)?;
        let pid = child.id();
        reap_in_background(child);
        Ok(pid)
    }
}

/// Waits for a detached child on its own thread so it never lingers as a zombie.
fn reap_in_background(mut child: Child) {
    thread::spawn(move || {
        let _ = child.wait();
    });
}
