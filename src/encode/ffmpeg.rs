use crate::encode::encoder::{ChunkEncoder, EncodedChunk, EncoderConfig};
use crate::foundation::error::{RavenError, RavenResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;
use std::io::Read;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;

/// Media type produced by [`FfmpegWebmEncoder`].
pub const WEBM_MEDIA_TYPE: &str = "video/webm";

const STDOUT_READ_BYTES: usize = 64 * 1024;

/// Options for [`FfmpegWebmEncoder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FfmpegWebmOpts {
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// VP9 constant-quality level (0-63, lower is better).
    pub crf: u8,
}

impl Default for FfmpegWebmOpts {
    fn default() -> Self {
        Self {
            bg_rgba: [0, 0, 0, 255],
            crf: 32,
        }
    }
}

/// Encoder that spawns the system `ffmpeg`, streams raw frames to stdin and collects WebM bytes
/// from stdout as they are produced.
///
/// The stdout and stderr pipes are drained on two reader threads owned by the encoder; chunks
/// reach the caller only through [`ChunkEncoder::drain_chunks`] and [`ChunkEncoder::finish`].
pub struct FfmpegWebmEncoder {
    opts: FfmpegWebmOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    chunks_rx: Option<Receiver<Vec<u8>>>,
    stdout_pump: Option<JoinHandle<std::io::Result<()>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<EncoderConfig>,
}

impl FfmpegWebmEncoder {
    /// Create an idle encoder; `ffmpeg` is spawned by `begin`.
    pub fn new(opts: FfmpegWebmOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            chunks_rx: None,
            stdout_pump: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
        }
    }

    fn collect_ready(&mut self, out: &mut Vec<EncodedChunk>) {
        let Some(rx) = self.chunks_rx.as_ref() else {
            return;
        };
        while let Ok(bytes) = rx.try_recv() {
            out.push(EncodedChunk { bytes });
        }
    }
}

impl std::fmt::Debug for FfmpegWebmEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegWebmEncoder")
            .field("opts", &self.opts)
            .field("cfg", &self.cfg)
            .field("running", &self.child.is_some())
            .finish_non_exhaustive()
    }
}

impl ChunkEncoder for FfmpegWebmEncoder {
    fn media_type(&self) -> &str {
        WEBM_MEDIA_TYPE
    }

    fn begin(&mut self, cfg: EncoderConfig) -> RavenResult<()> {
        cfg.validate()?;
        if self.child.is_some() {
            return Err(RavenError::encode("ffmpeg encoder already started"));
        }
        if !is_ffmpeg_on_path() {
            return Err(RavenError::encode(
                "ffmpeg is required for WebM encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Input: flattened RGBA8 frames at the sampling rate.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
        ]);
        // Output: VP9 in a streamable WebM written to stdout.
        cmd.args([
            "-an",
            "-c:v",
            "libvpx-vp9",
            "-pix_fmt",
            "yuv420p",
            "-b:v",
            "0",
            "-crf",
            &self.opts.crf.min(63).to_string(),
            "-deadline",
            "realtime",
            "-cpu-used",
            "8",
            "-f",
            "webm",
            "pipe:1",
        ]);

        let mut child = cmd.spawn().map_err(|e| {
            RavenError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RavenError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| RavenError::encode("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| RavenError::encode("failed to open ffmpeg stderr (unexpected)"))?;

        let (tx, rx) = mpsc::channel();
        let stdout_pump = std::thread::spawn(move || {
            let mut buf = vec![0u8; STDOUT_READ_BYTES];
            loop {
                let n = match stdout.read(&mut buf) {
                    Ok(0) => return Ok(()),
                    Ok(n) => n,
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if tx.send(buf[..n].to_vec()).is_err() {
                    return Ok(());
                }
            }
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps,
            "ffmpeg webm encoder started"
        );
        self.scratch = vec![0u8; cfg.frame_len()];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.chunks_rx = Some(rx);
        self.stdout_pump = Some(stdout_pump);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        Ok(())
    }

    fn encode_frame(&mut self, frame: &FrameRGBA) -> RavenResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| RavenError::encode("ffmpeg encoder not started"))?;
        cfg.check_frame(frame)?;

        if frame.premultiplied {
            flatten_premul_over_bg(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;
        } else {
            let mut premul = frame.data.clone();
            crate::assets::raster::premultiply_rgba8_in_place(&mut premul);
            flatten_premul_over_bg(&mut self.scratch, &premul, self.opts.bg_rgba)?;
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(RavenError::encode("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            RavenError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn drain_chunks(&mut self, out: &mut Vec<EncodedChunk>) -> RavenResult<()> {
        self.collect_ready(out);
        Ok(())
    }

    fn finish(&mut self, out: &mut Vec<EncodedChunk>) -> RavenResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| RavenError::encode("ffmpeg encoder not started"))?;

        let status = child.wait().map_err(|e| {
            RavenError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        if let Some(handle) = self.stdout_pump.take() {
            handle
                .join()
                .map_err(|_| RavenError::encode("ffmpeg stdout reader thread panicked"))?
                .map_err(|e| RavenError::encode(format!("ffmpeg stdout read failed: {e}")))?;
        }
        // The pump has exited, so every chunk it produced is already queued.
        self.collect_ready(out);
        self.chunks_rx = None;

        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| RavenError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| RavenError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        self.cfg = None;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(RavenError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegWebmEncoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Composite premultiplied RGBA8 over an opaque background, producing opaque RGBA8.
pub(crate) fn flatten_premul_over_bg(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> RavenResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(RavenError::validation(
            "flatten_premul_over_bg expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let inv = 255u16 - u16::from(s[3]);
        for c in 0..3 {
            let v = u16::from(s[c]) + mul_div255_u16(bg[c], inv);
            d[c] = v.min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
