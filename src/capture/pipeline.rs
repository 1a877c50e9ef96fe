use crate::encode::artifact::MediaArtifact;
use crate::encode::encoder::{ChunkEncoder, EncodedChunk, EncoderConfig};
use crate::foundation::core::Canvas;
use crate::foundation::error::{RavenError, RavenResult};
use crate::render::frame::FrameRGBA;

/// Default sampling rate of the primary surface.
pub const DEFAULT_SAMPLE_FPS: u32 = 60;

// Absorbs float drift between the host clock and the sample grid.
const SLOT_EPSILON: f64 = 1e-6;

/// Most frames a single [`CapturePipeline::sample`] call encodes, in seconds of footage.
/// Slots beyond this are skipped so a large clock jump cannot flood the encoder.
pub const MAX_CATCH_UP_SECONDS: u32 = 1;

/// Whether a recording session is open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaptureStatus {
    /// No encoder session.
    #[default]
    Idle,
    /// Frames are being sampled into the encoder.
    Recording,
}

/// Samples the primary surface on a fixed time grid, feeds the encoder and buffers its chunks.
///
/// The pipeline only observes frames it is handed; it never renders.
pub struct CapturePipeline {
    encoder: Box<dyn ChunkEncoder>,
    sample_fps: u32,
    status: CaptureStatus,
    chunks: Vec<EncodedChunk>,
    started_ms: f64,
    samples_taken: u64,
}

impl std::fmt::Debug for CapturePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturePipeline")
            .field("media_type", &self.encoder.media_type())
            .field("sample_fps", &self.sample_fps)
            .field("status", &self.status)
            .field("buffered_chunks", &self.chunks.len())
            .field("samples_taken", &self.samples_taken)
            .finish()
    }
}

impl CapturePipeline {
    /// Pipeline sampling at `sample_fps` into `encoder`.
    pub fn new(encoder: Box<dyn ChunkEncoder>, sample_fps: u32) -> RavenResult<Self> {
        if sample_fps == 0 {
            return Err(RavenError::validation("capture sample_fps must be non-zero"));
        }
        Ok(Self {
            encoder,
            sample_fps,
            status: CaptureStatus::Idle,
            chunks: Vec::new(),
            started_ms: 0.0,
            samples_taken: 0,
        })
    }

    /// Current status.
    pub fn status(&self) -> CaptureStatus {
        self.status
    }

    /// Return `true` while Recording.
    pub fn is_recording(&self) -> bool {
        self.status == CaptureStatus::Recording
    }

    /// Samples per second.
    pub fn sample_fps(&self) -> u32 {
        self.sample_fps
    }

    /// Media type of the artifacts this pipeline produces.
    pub fn media_type(&self) -> &str {
        self.encoder.media_type()
    }

    /// Chunks received from the encoder and not yet finalized.
    pub fn buffered_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Sample slots consumed in the current (or last) recording, skipped ones included.
    pub fn samples_taken(&self) -> u64 {
        self.samples_taken
    }

    /// Replace the encoder. Only allowed while Idle.
    pub fn set_encoder(&mut self, encoder: Box<dyn ChunkEncoder>) -> RavenResult<()> {
        if self.is_recording() {
            return Err(RavenError::validation(
                "encoder cannot change while recording",
            ));
        }
        self.encoder = encoder;
        Ok(())
    }

    /// Open an encoder session for `canvas`-sized frames starting at host time `now_ms`.
    ///
    /// Returns `Ok(false)` when already recording. On encoder failure the pipeline stays Idle.
    pub fn start(&mut self, now_ms: f64, canvas: Canvas) -> RavenResult<bool> {
        if self.is_recording() {
            return Ok(false);
        }
        self.encoder.begin(EncoderConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.sample_fps,
        })?;
        self.chunks.clear();
        self.started_ms = now_ms;
        self.samples_taken = 0;
        self.status = CaptureStatus::Recording;
        Ok(true)
    }

    fn interval_ms(&self) -> f64 {
        1000.0 / f64::from(self.sample_fps)
    }

    /// Number of sample slots due by `now_ms`, counting the slot at the start time.
    fn slots_due(&self, now_ms: f64) -> u64 {
        let elapsed = now_ms - self.started_ms;
        if elapsed.is_nan() || elapsed < 0.0 {
            return 0;
        }
        (elapsed / self.interval_ms() + SLOT_EPSILON).floor() as u64 + 1
    }

    fn max_catch_up(&self) -> u64 {
        u64::from(self.sample_fps) * u64::from(MAX_CATCH_UP_SECONDS)
    }

    /// Feed `frame` once for every sample slot that came due by `now_ms`.
    ///
    /// Returns the number of frames encoded, at most one second's worth; older missed slots are
    /// skipped. Does nothing while Idle. An encoder error aborts the recording and leaves the
    /// pipeline Idle with its buffer cleared.
    pub fn sample(&mut self, now_ms: f64, frame: &FrameRGBA) -> RavenResult<u64> {
        if !self.is_recording() {
            return Ok(0);
        }
        let due = self.slots_due(now_ms).saturating_sub(self.samples_taken);
        let encode = due.min(self.max_catch_up());
        if encode < due {
            tracing::warn!(due, encode, "capture fell behind, skipping missed samples");
            self.samples_taken += due - encode;
        }
        if let Err(e) = self.feed(frame, encode) {
            self.abort();
            return Err(e);
        }
        Ok(encode)
    }

    fn feed(&mut self, frame: &FrameRGBA, count: u64) -> RavenResult<()> {
        for _ in 0..count {
            self.encoder.encode_frame(frame)?;
            self.samples_taken += 1;
        }
        self.encoder.drain_chunks(&mut self.chunks)
    }

    fn abort(&mut self) {
        self.status = CaptureStatus::Idle;
        self.chunks.clear();
        let mut discarded = Vec::new();
        if let Err(e) = self.encoder.finish(&mut discarded) {
            tracing::debug!(error = %e, "encoder shutdown after failure");
        }
        tracing::warn!(samples = self.samples_taken, "recording aborted");
    }

    /// Finalize the encoder, flush every chunk and return the concatenated artifact.
    ///
    /// Returns `Ok(None)` when not recording. The chunk buffer is empty afterwards either way.
    pub fn stop(&mut self) -> RavenResult<Option<MediaArtifact>> {
        if !self.is_recording() {
            return Ok(None);
        }
        self.status = CaptureStatus::Idle;
        let finished = self.encoder.finish(&mut self.chunks);
        let chunks = std::mem::take(&mut self.chunks);
        finished?;
        let artifact = MediaArtifact::from_chunks(self.encoder.media_type(), &chunks);
        tracing::info!(
            media_type = artifact.media_type(),
            bytes = artifact.len(),
            chunks = artifact.chunk_count(),
            samples = self.samples_taken,
            "recording finalized"
        );
        Ok(Some(artifact))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/pipeline.rs"]
mod tests;
