use crate::animation::ease::Ease;
use crate::capture::pipeline::DEFAULT_SAMPLE_FPS;
use crate::encode::encoder::{ChunkEncoder, EncoderKind, create_encoder};
use crate::encode::ffmpeg::FfmpegWebmOpts;
use crate::flock::generator::{DEFAULT_RAVEN_COUNT, validate_raven_count};
use crate::foundation::core::Canvas;
use crate::foundation::error::{RavenError, RavenResult};
use crate::render::renderer::RendererOpts;
use std::fs::File;
use std::io::BufReader;
use std::ops::RangeInclusive;
use std::path::Path;

/// Default transition length in milliseconds.
pub const DEFAULT_DURATION_MS: f64 = 2500.0;
/// Durations outside this range are accepted but logged.
pub const PRACTICAL_DURATION_MS: RangeInclusive<f64> = 800.0..=6000.0;

/// Recording options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    /// Samples taken from the primary surface per second.
    pub sample_fps: u32,
    /// Straight-alpha RGBA8 color transparent pixels are flattened onto.
    pub background_rgba: [u8; 4],
    /// VP9 constant-quality level (0-63).
    pub crf: u8,
    /// Which encoder records the clip.
    pub encoder: EncoderKind,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        let ffmpeg = FfmpegWebmOpts::default();
        Self {
            sample_fps: DEFAULT_SAMPLE_FPS,
            background_rgba: ffmpeg.bg_rgba,
            crf: ffmpeg.crf,
            encoder: EncoderKind::default(),
        }
    }
}

impl CaptureConfig {
    /// Options for the `ffmpeg` encoder derived from this config.
    pub fn ffmpeg_opts(&self) -> FfmpegWebmOpts {
        FfmpegWebmOpts {
            bg_rgba: self.background_rgba,
            crf: self.crf,
        }
    }

    /// Instantiate the configured encoder.
    pub fn create_encoder(&self) -> Box<dyn ChunkEncoder> {
        create_encoder(self.encoder, &self.ffmpeg_opts())
    }
}

/// Session parameters, loadable from JSON.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitionConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Length of one transition in milliseconds.
    pub duration_ms: f64,
    /// Number of ravens in the flock.
    pub raven_count: usize,
    /// Flock seed; a time-based seed is used when absent.
    pub seed: Option<u64>,
    /// Gaussian sigma for softening silhouette edges; `0` disables.
    pub mask_blur_sigma: f64,
    /// Curve mapping transition time to flock progress.
    pub ease: Ease,
    /// Recording options.
    pub capture: CaptureConfig,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        let canvas = Canvas::default();
        let renderer = RendererOpts::default();
        Self {
            width: canvas.width,
            height: canvas.height,
            duration_ms: DEFAULT_DURATION_MS,
            raven_count: DEFAULT_RAVEN_COUNT,
            seed: None,
            mask_blur_sigma: renderer.mask_blur_sigma,
            ease: renderer.ease,
            capture: CaptureConfig::default(),
        }
    }
}

impl TransitionConfig {
    /// Parse a config from a JSON string.
    pub fn from_json_str(s: &str) -> RavenResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| RavenError::serde(format!("parse transition config JSON: {e}")))
    }

    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> RavenResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| RavenError::serde(format!("parse transition config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> RavenResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RavenError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Surface dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Renderer options.
    pub fn renderer_opts(&self) -> RendererOpts {
        RendererOpts {
            ease: self.ease,
            mask_blur_sigma: self.mask_blur_sigma,
        }
    }

    /// Reject values no session can run with.
    pub fn validate(&self) -> RavenResult<()> {
        self.canvas().validate()?;
        validate_duration_ms(self.duration_ms)?;
        validate_raven_count(self.raven_count)?;
        if !self.mask_blur_sigma.is_finite() || self.mask_blur_sigma < 0.0 {
            return Err(RavenError::validation(format!(
                "mask_blur_sigma must be a finite non-negative number, got {}",
                self.mask_blur_sigma
            )));
        }
        if self.capture.sample_fps == 0 {
            return Err(RavenError::validation("capture.sample_fps must be non-zero"));
        }
        if self.capture.crf > 63 {
            return Err(RavenError::validation(format!(
                "capture.crf must be in 0..=63, got {}",
                self.capture.crf
            )));
        }
        Ok(())
    }
}

pub(crate) fn validate_duration_ms(duration_ms: f64) -> RavenResult<()> {
    if !duration_ms.is_finite() || duration_ms <= 0.0 {
        return Err(RavenError::validation(format!(
            "duration_ms must be a positive number, got {duration_ms}"
        )));
    }
    if !PRACTICAL_DURATION_MS.contains(&duration_ms) {
        tracing::warn!(
            duration_ms,
            "duration is outside the practical {}-{} ms range",
            PRACTICAL_DURATION_MS.start(),
            PRACTICAL_DURATION_MS.end()
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
