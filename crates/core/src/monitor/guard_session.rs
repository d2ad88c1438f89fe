use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::detection::domain::face_counter::FaceCounter;
use crate::occupancy::domain::occupancy_state::{OccupancyState, TransitionEvent};
use crate::occupancy::domain::occupancy_state_machine::OccupancyStateMachine;
use crate::presentation::domain::notifier::Notifier;
use crate::presentation::domain::preview_surface::PreviewSurface;
use crate::protection::domain::protective_action::ProtectiveAction;
use crate::video::domain::frame_source::FrameSource;

use super::session_stats::SessionStats;

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No frame was available; nothing was observed.
    Skipped,
    Observed {
        face_count: usize,
        state: OccupancyState,
        event: TransitionEvent,
    },
}

/// One monitoring session: owns the camera, the counter, the state machine
/// and every downstream collaborator.
///
/// Nothing a collaborator does inside [`tick`](Self::tick) can end the
/// session. Per-tick failures are logged and counted; only the stop channel
/// passed to [`run`](Self::run) ends it.
pub struct GuardSession {
    source: Box<dyn FrameSource>,
    counter: FaceCounter,
    machine: OccupancyStateMachine,
    action: Box<dyn ProtectiveAction>,
    notifier: Box<dyn Notifier>,
    preview: Option<Box<dyn PreviewSurface>>,
    stats: SessionStats,
}

impl GuardSession {
    /// `source` must already be open.
    pub fn new(
        source: Box<dyn FrameSource>,
        counter: FaceCounter,
        machine: OccupancyStateMachine,
        action: Box<dyn ProtectiveAction>,
        notifier: Box<dyn Notifier>,
        preview: Option<Box<dyn PreviewSurface>>,
    ) -> Self {
        Self {
            source,
            counter,
            machine,
            action,
            notifier,
            preview,
            stats: SessionStats::new(),
        }
    }

    pub fn state(&self) -> OccupancyState {
        self.machine.state()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn preview_enabled(&self) -> bool {
        self.preview.is_some()
    }

    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        self.stats.ticks += 1;

        let frame = match self.source.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                self.stats.missed_frames += 1;
                log::debug!("No frame available, skipping tick");
                return TickOutcome::Skipped;
            }
            Err(e) => {
                self.stats.missed_frames += 1;
                log::warn!("Failed to read frame: {e}");
                return TickOutcome::Skipped;
            }
        };

        let started = Instant::now();
        let result = self.counter.count(&frame);
        self.stats.counted(result.face_count, started.elapsed());
        self.stats.inference_failures = self.counter.inference_failures();

        let event = self.machine.observe(result.face_count, now);
        let state = self.machine.state();
        log::info!("Detected {} people | Status: {}", result.face_count, state);

        match event {
            TransitionEvent::EnterPrivacy => self.enter_privacy(result.face_count),
            TransitionEvent::ExitPrivacy => self.exit_privacy(),
            TransitionEvent::None => {}
        }

        if let Some(preview) = self.preview.as_mut() {
            if let Err(e) = preview.show(&frame, &result, state) {
                log::warn!("Preview disabled for the rest of the session: {e}");
                preview.close();
                self.preview = None;
            }
        }

        TickOutcome::Observed {
            face_count: result.face_count,
            state,
            event,
        }
    }

    /// Ticks every `interval` until `stop` receives or disconnects.
    ///
    /// The stop check doubles as the inter-tick sleep, so an interrupt is
    /// seen within one interval.
    pub fn run(&mut self, stop: &Receiver<()>, interval: Duration) {
        log::info!(
            "Monitoring started ({} strategy, threshold {:.2}, delay {:.1}s)",
            self.counter.strategy(),
            self.counter.threshold(),
            self.machine.privacy_delay().as_secs_f64()
        );
        loop {
            self.tick(Instant::now());
            match stop.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        log::info!("Stop requested");
    }

    /// Releases the camera, clears any active protection and closes the
    /// preview. Returns the final statistics after logging them.
    pub fn shutdown(mut self) -> SessionStats {
        self.source.release();

        if self.machine.state().is_privacy() || self.action.active_handle().is_some() {
            self.action.deactivate();
        }
        if let Some(mut preview) = self.preview.take() {
            preview.close();
        }

        self.stats.inference_failures = self.counter.inference_failures();
        self.stats.log_summary();
        self.stats
    }

    fn enter_privacy(&mut self, face_count: usize) {
        log::warn!("{face_count} people detected, entering privacy mode");
        self.stats.activations += 1;
        if !self.action.activate() {
            self.stats.action_failures += 1;
        }
        self.notifier.privacy_engaged(face_count);
    }

    fn exit_privacy(&mut self) {
        log::info!("Environment secure, leaving privacy mode");
        self.stats.deactivations += 1;
        self.action.deactivate();
    }
}
