use std::time::{Duration, Instant};

/// Opaque handle for one requested refresh callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickHandle(pub u64);

/// Host frame/timer facility the playback loop runs on.
///
/// Mirrors a display-refresh callback API: a tick is requested, fires once on the next refresh,
/// and can be cancelled synchronously before it fires. Everything runs on the caller's thread.
pub trait FrameHost {
    /// Current host time in milliseconds.
    fn now_ms(&self) -> f64;
    /// Ask for one callback on the next refresh.
    fn request_tick(&mut self) -> TickHandle;
    /// Cancel a pending callback. Unknown or already-fired handles are ignored.
    fn cancel_tick(&mut self, handle: TickHandle);
    /// Suspend until the next refresh and return the callback due at it, if one was requested.
    fn wait_for_refresh(&mut self) -> Option<TickHandle>;
}

/// Refresh rate used by the built-in hosts unless configured otherwise.
pub const DEFAULT_REFRESH_HZ: f64 = 60.0;

#[derive(Debug, Default)]
struct TickSlot {
    next_id: u64,
    pending: Option<TickHandle>,
}

impl TickSlot {
    fn request(&mut self) -> TickHandle {
        self.next_id = self.next_id.wrapping_add(1);
        let h = TickHandle(self.next_id);
        self.pending = Some(h);
        h
    }

    fn cancel(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    fn fire(&mut self) -> Option<TickHandle> {
        self.pending.take()
    }
}

/// Deterministic host: time only moves when a refresh is awaited, by a fixed step.
#[derive(Debug)]
pub struct VirtualHost {
    now_ms: f64,
    step_ms: f64,
    slot: TickSlot,
}

impl VirtualHost {
    /// Host refreshing at `refresh_hz`, starting at `t = 0 ms`.
    pub fn new(refresh_hz: f64) -> Self {
        let hz = if refresh_hz.is_finite() && refresh_hz > 0.0 {
            refresh_hz
        } else {
            DEFAULT_REFRESH_HZ
        };
        Self {
            now_ms: 0.0,
            step_ms: 1000.0 / hz,
            slot: TickSlot::default(),
        }
    }

    /// Milliseconds between refreshes.
    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }

    /// Move the clock forward without firing callbacks.
    pub fn advance(&mut self, ms: f64) {
        if ms.is_finite() && ms > 0.0 {
            self.now_ms += ms;
        }
    }

    /// Return `true` while a callback is pending.
    pub fn has_pending_tick(&self) -> bool {
        self.slot.pending.is_some()
    }
}

impl Default for VirtualHost {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_HZ)
    }
}

impl FrameHost for VirtualHost {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn request_tick(&mut self) -> TickHandle {
        self.slot.request()
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        self.slot.cancel(handle);
    }

    fn wait_for_refresh(&mut self) -> Option<TickHandle> {
        self.now_ms += self.step_ms;
        self.slot.fire()
    }
}

/// Wall-clock host that sleeps the calling thread until each refresh boundary.
#[derive(Debug)]
pub struct RealtimeHost {
    origin: Instant,
    interval: Duration,
    next_refresh: Instant,
    slot: TickSlot,
}

impl RealtimeHost {
    /// Host refreshing at `refresh_hz` against the monotonic clock.
    pub fn new(refresh_hz: f64) -> Self {
        let hz = if refresh_hz.is_finite() && refresh_hz > 0.0 {
            refresh_hz
        } else {
            DEFAULT_REFRESH_HZ
        };
        let origin = Instant::now();
        let interval = Duration::from_secs_f64(1.0 / hz);
        Self {
            origin,
            interval,
            next_refresh: origin + interval,
            slot: TickSlot::default(),
        }
    }
}

impl Default for RealtimeHost {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_HZ)
    }
}

impl FrameHost for RealtimeHost {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn request_tick(&mut self) -> TickHandle {
        self.slot.request()
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        self.slot.cancel(handle);
    }

    fn wait_for_refresh(&mut self) -> Option<TickHandle> {
        let now = Instant::now();
        if self.next_refresh > now {
            std::thread::sleep(self.next_refresh - now);
        }
        // Skip refreshes we were too slow for instead of bursting to catch up.
        let now = Instant::now();
        while self.next_refresh <= now {
            self.next_refresh += self.interval;
        }
        self.slot.fire()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/host.rs"]
mod tests;
