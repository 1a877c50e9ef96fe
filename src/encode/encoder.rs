use crate::encode::ffmpeg::{FfmpegWebmEncoder, FfmpegWebmOpts};
use crate::foundation::error::{RavenError, RavenResult};
use crate::render::frame::FrameRGBA;

/// Configuration handed to a [`ChunkEncoder`] when a recording starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Samples per second.
    pub fps: u32,
}

impl EncoderConfig {
    /// Reject zero dimensions or a zero sample rate.
    pub fn validate(&self) -> RavenResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RavenError::validation(
                "encoder width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(RavenError::validation("encoder fps must be non-zero"));
        }
        Ok(())
    }

    /// Byte length of one tightly packed RGBA8 frame.
    pub fn frame_len(&self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    pub(crate) fn check_frame(&self, frame: &FrameRGBA) -> RavenResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(RavenError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        if frame.data.len() != self.frame_len() {
            return Err(RavenError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        Ok(())
    }
}

/// One discrete piece of encoded output, in production order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedChunk {
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

/// Encoder contract used by the capture pipeline.
///
/// Chunks may become available at any point after `begin`; the pipeline collects them with
/// `drain_chunks` after every sample and once more through `finish`, which must flush everything
/// the encoder still holds.
pub trait ChunkEncoder: Send {
    /// Media type of the concatenated output, e.g. `video/webm`.
    fn media_type(&self) -> &str;
    /// Start a session. Fails when the encoder cannot be started.
    fn begin(&mut self, cfg: EncoderConfig) -> RavenResult<()>;
    /// Feed one sampled frame.
    fn encode_frame(&mut self, frame: &FrameRGBA) -> RavenResult<()>;
    /// Move every chunk produced so far into `out`.
    fn drain_chunks(&mut self, out: &mut Vec<EncodedChunk>) -> RavenResult<()>;
    /// Finalize the session and move every remaining chunk into `out`.
    fn finish(&mut self, out: &mut Vec<EncodedChunk>) -> RavenResult<()>;
}

/// Media type produced by [`RawFrameEncoder`].
pub const RAW_RGBA_MEDIA_TYPE: &str = "video/x-raw-rgba";

/// In-memory encoder emitting each sampled frame as one premultiplied RGBA8 chunk.
#[derive(Debug, Default)]
pub struct RawFrameEncoder {
    cfg: Option<EncoderConfig>,
    ready: Vec<EncodedChunk>,
    frames_seen: u64,
}

impl RawFrameEncoder {
    /// Create an idle encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured by `begin`, while a session is open.
    pub fn config(&self) -> Option<EncoderConfig> {
        self.cfg
    }

    /// Frames accepted in the current (or last) session.
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }
}

impl ChunkEncoder for RawFrameEncoder {
    fn media_type(&self) -> &str {
        RAW_RGBA_MEDIA_TYPE
    }

    fn begin(&mut self, cfg: EncoderConfig) -> RavenResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.ready.clear();
        self.frames_seen = 0;
        Ok(())
    }

    fn encode_frame(&mut self, frame: &FrameRGBA) -> RavenResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| RavenError::encode("raw encoder not started"))?;
        cfg.check_frame(frame)?;
        self.ready.push(EncodedChunk {
            bytes: frame.data.clone(),
        });
        self.frames_seen += 1;
        Ok(())
    }

    fn drain_chunks(&mut self, out: &mut Vec<EncodedChunk>) -> RavenResult<()> {
        out.append(&mut self.ready);
        Ok(())
    }

    fn finish(&mut self, out: &mut Vec<EncodedChunk>) -> RavenResult<()> {
        if self.cfg.take().is_none() {
            return Err(RavenError::encode("raw encoder not started"));
        }
        out.append(&mut self.ready);
        Ok(())
    }
}

/// Available encoder kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderKind {
    /// VP9 in WebM through the system `ffmpeg`.
    #[default]
    FfmpegWebm,
    /// Uncompressed frames kept in memory.
    Raw,
}

/// Create an encoder implementation.
pub fn create_encoder(kind: EncoderKind, opts: &FfmpegWebmOpts) -> Box<dyn ChunkEncoder> {
    match kind {
        EncoderKind::FfmpegWebm => Box::new(FfmpegWebmEncoder::new(opts.clone())),
        EncoderKind::Raw => Box::new(RawFrameEncoder::new()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/encoder.rs"]
mod tests;
