use std::fmt;

/// Privacy posture derived from recent face counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OccupancyState {
    /// At most one face; no debounce timer running.
    #[default]
    Secure,
    /// More than one face; waiting out the privacy delay.
    Pending,
    /// Protective action engaged.
    Privacy,
}

impl OccupancyState {
    pub fn is_privacy(self) -> bool {
        self == OccupancyState::Privacy
    }
}

impl fmt::Display for OccupancyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OccupancyState::Secure => write!(f, "Secure"),
            OccupancyState::Pending => write!(f, "Pending"),
            OccupancyState::Privacy => write!(f, "Privacy Mode"),
        }
    }
}

/// Externally visible edge emitted by the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionEvent {
    None,
    EnterPrivacy,
    ExitPrivacy,
}
