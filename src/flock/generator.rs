use crate::foundation::core::Canvas;
use crate::foundation::error::{RavenError, RavenResult};
use rand::Rng;
use std::f64::consts::TAU;

/// Number of ravens in a flock unless configured otherwise.
pub const DEFAULT_RAVEN_COUNT: usize = 180;
/// Largest flock a session accepts.
pub const MAX_RAVEN_COUNT: usize = 10_000;

/// Reject flock sizes above [`MAX_RAVEN_COUNT`].
pub fn validate_raven_count(count: usize) -> RavenResult<()> {
    if count > MAX_RAVEN_COUNT {
        return Err(RavenError::validation(format!(
            "raven_count must be at most {MAX_RAVEN_COUNT}, got {count}"
        )));
    }
    Ok(())
}

/// One flock member and its per-raven kinematic parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Raven {
    /// Horizontal start position in surface pixels (off-screen left).
    pub start_x: f64,
    /// Horizontal end position in surface pixels (off-screen right).
    pub end_x: f64,
    /// Vertical anchor in surface pixels.
    pub y: f64,
    /// Relative scale, `[0.35, 1.25]`.
    pub size: f64,
    /// Multiplier on the horizontal interpolation factor, `[0.6, 1.5]`.
    pub speed: f64,
    /// Base rotation bias in radians, `[-0.3, 0.3]`.
    pub rotation: f64,
    /// Phase offset of the vertical wobble, `[0, 2pi)`.
    pub wobble_phase: f64,
    /// Start offset as a fraction of eased progress, `[0, 0.25]`.
    pub delay: f64,
}

/// An immutable, paint-ordered flock.
///
/// Ravens are sorted by ascending `size` so that small ravens are stamped first and end up
/// behind larger ones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Flock {
    ravens: Vec<Raven>,
    generation: u64,
}

impl Flock {
    /// Wrap ravens, sorting them into paint order.
    pub fn from_ravens(mut ravens: Vec<Raven>, generation: u64) -> Self {
        ravens.sort_by(|a, b| a.size.total_cmp(&b.size));
        Self { ravens, generation }
    }

    /// Ravens in paint order.
    pub fn ravens(&self) -> &[Raven] {
        &self.ravens
    }

    /// Number of ravens.
    pub fn len(&self) -> usize {
        self.ravens.len()
    }

    /// Return `true` for an empty flock (the transition degenerates to a hard cut).
    pub fn is_empty(&self) -> bool {
        self.ravens.is_empty()
    }

    /// Monotonic regeneration counter assigned by the owning session.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Draw `count` ravens for a `canvas`-sized surface from `rng`.
///
/// The result is deterministic exactly when `rng` is. Callers validate `count` with
/// [`validate_raven_count`] first; only the up-front allocation is bounded here.
pub fn generate<R: Rng>(count: usize, canvas: Canvas, rng: &mut R) -> Vec<Raven> {
    let w = canvas.width_f64();
    let h = canvas.height_f64();
    let mut ravens = Vec::with_capacity(count.min(MAX_RAVEN_COUNT));
    for _ in 0..count {
        let y_band: f64 = rng.random();
        let size = 0.35 + rng.random::<f64>() * 0.9;
        let speed = 0.6 + rng.random::<f64>() * 0.9;
        let rotation = (rng.random::<f64>() - 0.5) * 0.6;
        let wobble_phase = rng.random::<f64>() * TAU;
        let delay = rng.random::<f64>() * 0.25;
        let start_x = -0.2 * w - rng.random::<f64>() * 0.25 * w;
        let end_x = w * (0.9 + rng.random::<f64>() * 0.5);
        ravens.push(Raven {
            start_x,
            end_x,
            y: (h * (0.1 + 0.8 * y_band)).clamp(0.1 * h, 0.9 * h),
            size,
            speed,
            rotation,
            wobble_phase,
            delay,
        });
    }
    ravens.sort_by(|a, b| a.size.total_cmp(&b.size));
    ravens
}

#[cfg(test)]
#[path = "../../tests/unit/flock/generator.rs"]
mod tests;
