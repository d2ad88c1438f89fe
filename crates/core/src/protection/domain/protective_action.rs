use std::fmt;
use std::time::Instant;

/// Which rung of the activation chain produced a protection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchStep {
    CustomPath,
    PrimaryCommand,
    PrimaryFallbackPath,
    FallbackAppCommand,
    FallbackAppPath,
    Banner,
}

impl fmt::Display for LaunchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LaunchStep::CustomPath => "custom path",
            LaunchStep::PrimaryCommand => "primary command",
            LaunchStep::PrimaryFallbackPath => "primary fallback path",
            LaunchStep::FallbackAppCommand => "fallback app command",
            LaunchStep::FallbackAppPath => "fallback app path",
            LaunchStep::Banner => "privacy banner",
        };
        f.write_str(s)
    }
}

/// Record that a protective application was started.
///
/// Purely informational: the launched application belongs to the user and
/// is never terminated through this handle.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveProtectionHandle {
    pub label: String,
    pub step: LaunchStep,
    /// Present when the process was spawned directly rather than via a launcher.
    pub pid: Option<u32>,
    pub started_at: Instant,
}

/// A user-visible response to multi-occupancy.
///
/// `activate` runs on entering privacy and `deactivate` on leaving it. Both
/// report success as a bool and never propagate errors: a failed activation
/// leaves the session in a degraded but running state.
pub trait ProtectiveAction: Send {
    fn activate(&mut self) -> bool;

    /// Clears the local launch record. Must not terminate anything.
    fn deactivate(&mut self) -> bool;

    fn active_handle(&self) -> Option<&ActiveProtectionHandle>;

    fn describe(&self) -> String;
}
