use crate::foundation::error::{RavenError, RavenResult};
use crate::foundation::math::clamp01;
use crate::playback::host::{FrameHost, TickHandle};

/// Whether a transition is currently running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Nothing scheduled; the rest frame is shown.
    #[default]
    Idle,
    /// A refresh tick is pending and progress advances with host time.
    Playing,
}

/// Snapshot of the playback state machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionState {
    /// Current status.
    pub status: PlaybackStatus,
    /// Host time at which the current (or last) run started.
    pub start_ms: f64,
    /// Length of one run in milliseconds.
    pub duration_ms: f64,
}

/// Result of delivering a refresh callback to the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// The handle was not the pending one (cancelled or superseded); nothing to render.
    Stale,
    /// Render the frame at `t`. When `finished` is set the controller is already Idle.
    Frame {
        /// Normalized progress in `[0, 1]`.
        t: f64,
        /// `true` for the final `t = 1` frame.
        finished: bool,
    },
}

/// Explicit Idle/Playing state machine holding at most one pending tick handle.
#[derive(Debug)]
pub struct PlaybackController {
    state: TransitionState,
    pending: Option<TickHandle>,
}

impl PlaybackController {
    /// Controller for runs lasting `duration_ms`.
    pub fn new(duration_ms: f64) -> RavenResult<Self> {
        validate_duration(duration_ms)?;
        Ok(Self {
            state: TransitionState {
                status: PlaybackStatus::Idle,
                start_ms: 0.0,
                duration_ms,
            },
            pending: None,
        })
    }

    /// Current state snapshot.
    pub fn state(&self) -> TransitionState {
        self.state
    }

    /// Current status.
    pub fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    /// Return `true` while Playing.
    pub fn is_playing(&self) -> bool {
        self.state.status == PlaybackStatus::Playing
    }

    /// Run length in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.state.duration_ms
    }

    /// The tick handle the controller is waiting on, if any.
    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending
    }

    /// Change the run length. Only allowed while Idle.
    pub fn set_duration_ms(&mut self, duration_ms: f64) -> RavenResult<()> {
        validate_duration(duration_ms)?;
        if self.is_playing() {
            return Err(RavenError::validation(
                "duration cannot change while a transition is playing",
            ));
        }
        self.state.duration_ms = duration_ms;
        Ok(())
    }

    /// Start a run at the host's current time. Returns `false` when already Playing.
    pub fn play<H: FrameHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if self.is_playing() {
            return false;
        }
        self.state.status = PlaybackStatus::Playing;
        self.state.start_ms = host.now_ms();
        self.pending = Some(host.request_tick());
        true
    }

    /// Cancel the pending tick and return to Idle. Returns `false` when already Idle.
    pub fn stop<H: FrameHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if let Some(h) = self.pending.take() {
            host.cancel_tick(h);
        }
        let was_playing = self.is_playing();
        self.state.status = PlaybackStatus::Idle;
        was_playing
    }

    /// Normalized progress at host time `now_ms`.
    pub fn progress_at(&self, now_ms: f64) -> f64 {
        let t = (now_ms - self.state.start_ms) / self.state.duration_ms;
        if t.is_nan() { 0.0 } else { clamp01(t) }
    }

    /// Consume a fired tick, reschedule if the run continues, and report what to render.
    pub fn on_tick<H: FrameHost + ?Sized>(
        &mut self,
        handle: TickHandle,
        host: &mut H,
    ) -> TickOutcome {
        if self.pending != Some(handle) || !self.is_playing() {
            return TickOutcome::Stale;
        }
        self.pending = None;
        let t = self.progress_at(host.now_ms());
        if t >= 1.0 {
            self.state.status = PlaybackStatus::Idle;
            return TickOutcome::Frame {
                t: 1.0,
                finished: true,
            };
        }
        self.pending = Some(host.request_tick());
        TickOutcome::Frame { t, finished: false }
    }
}

fn validate_duration(duration_ms: f64) -> RavenResult<()> {
    if !duration_ms.is_finite() || duration_ms <= 0.0 {
        return Err(RavenError::validation(format!(
            "duration must be a positive number of milliseconds, got {duration_ms}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/playback/controller.rs"]
mod tests;
