use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed while waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// How a bounded run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Exit code; `None` when terminated by a signal.
    Exited(Option<i32>),
    TimedOut,
}

impl RunOutcome {
    pub fn succeeded(self) -> bool {
        self == RunOutcome::Exited(Some(0))
    }
}

/// Starts external processes.
///
/// Deliberately has no way to stop a process: protective applications are
/// the user's, not ours.
pub trait ProcessLauncher: Send {
    /// Runs `program` and waits at most `timeout` for it to exit.
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<RunOutcome, LaunchError>;

    /// Starts `program` without waiting; returns its process id.
    fn spawn(&self, program: &str, args: &[String]) -> Result<u32, LaunchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_zero_exit_succeeds() {
        assert!(RunOutcome::Exited(Some(0)).succeeded());
        assert!(!RunOutcome::Exited(Some(1)).succeeded());
        assert!(!RunOutcome::Exited(None).succeeded());
        assert!(!RunOutcome::TimedOut.succeeded());
    }
}
