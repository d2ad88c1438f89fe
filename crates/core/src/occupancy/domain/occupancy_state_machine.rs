use std::time::{Duration, Instant};

use super::occupancy_state::{OccupancyState, TransitionEvent};

/// Hysteretic privacy state driven by per-frame face counts.
///
/// Entering privacy requires more than one face to be observed continuously
/// for `privacy_delay`; any observation of one face or fewer cancels the
/// pending timer immediately and, if privacy was engaged, exits it. Only the
/// privacy edges produce events; moving in and out of `Pending` is silent.
#[derive(Debug)]
pub struct OccupancyStateMachine {
    state: OccupancyState,
    /// When the current uninterrupted multi-face run began.
    watching_since: Option<Instant>,
    privacy_delay: Duration,
}

impl OccupancyStateMachine {
    pub fn new(privacy_delay: Duration) -> Self {
        Self {
            state: OccupancyState::Secure,
            watching_since: None,
            privacy_delay,
        }
    }

    pub fn state(&self) -> OccupancyState {
        self.state
    }

    pub fn watching_since(&self) -> Option<Instant> {
        self.watching_since
    }

    pub fn privacy_delay(&self) -> Duration {
        self.privacy_delay
    }

    pub fn observe(&mut self, face_count: usize, now: Instant) -> TransitionEvent {
        if face_count > 1 {
            self.observe_crowd(now)
        } else {
            self.observe_alone()
        }
    }

    fn observe_crowd(&mut self, now: Instant) -> TransitionEvent {
        match self.state {
            OccupancyState::Secure => {
                self.watching_since.get_or_insert(now);
                self.state = OccupancyState::Pending;
                TransitionEvent::None
            }
            OccupancyState::Pending => {
                let since = *self.watching_since.get_or_insert(now);
                if now.saturating_duration_since(since) >= self.privacy_delay {
                    self.state = OccupancyState::Privacy;
                    TransitionEvent::EnterPrivacy
                } else {
                    TransitionEvent::None
                }
            }
            OccupancyState::Privacy => TransitionEvent::None,
        }
    }

    fn observe_alone(&mut self) -> TransitionEvent {
        self.watching_since = None;
        match self.state {
            OccupancyState::Privacy => {
                self.state = OccupancyState::Secure;
                TransitionEvent::ExitPrivacy
            }
            OccupancyState::Pending | OccupancyState::Secure => {
                self.state = OccupancyState::Secure;
                TransitionEvent::None
            }
        }
    }
}
