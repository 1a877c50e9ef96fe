use crate::assets::raster::RasterImage;
use crate::capture::pipeline::{CapturePipeline, CaptureStatus};
use crate::encode::artifact::MediaArtifact;
use crate::encode::encoder::ChunkEncoder;
use crate::flock::generator::{Flock, generate, validate_raven_count};
use crate::foundation::core::Canvas;
use crate::foundation::error::{RavenError, RavenResult};
use crate::playback::controller::{
    PlaybackController, PlaybackStatus, TickOutcome, TransitionState,
};
use crate::playback::host::{FrameHost, VirtualHost};
use crate::render::frame::FrameRGBA;
use crate::render::renderer::{FrameRenderer, FrameScene};
use crate::session::config::{TransitionConfig, validate_duration_ms};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// A transition between two images, driven by a [`FrameHost`].
///
/// The session owns the flock, the renderer surfaces, the playback state machine and the capture
/// pipeline. All work happens on the caller's thread inside the session methods; [`pump`]
/// processes one host refresh.
///
/// [`pump`]: TransitionSession::pump
pub struct TransitionSession<H: FrameHost = VirtualHost> {
    config: TransitionConfig,
    host: H,
    image_a: Option<RasterImage>,
    image_b: Option<RasterImage>,
    flock: Flock,
    generation: u64,
    renderer: FrameRenderer,
    controller: PlaybackController,
    capture: CapturePipeline,
    artifact: Option<MediaArtifact>,
}

impl<H: FrameHost> std::fmt::Debug for TransitionSession<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionSession")
            .field("config", &self.config)
            .field("image_a", &self.image_a)
            .field("image_b", &self.image_b)
            .field("ravens", &self.flock.len())
            .field("generation", &self.generation)
            .field("state", &self.controller.state())
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}

impl<H: FrameHost> TransitionSession<H> {
    /// Create a session using the encoder selected by `config.capture`.
    pub fn new(config: TransitionConfig, host: H) -> RavenResult<Self> {
        let encoder = config.capture.create_encoder();
        Self::with_encoder(config, host, encoder)
    }

    /// Create a session recording through `encoder`.
    pub fn with_encoder(
        config: TransitionConfig,
        host: H,
        encoder: Box<dyn ChunkEncoder>,
    ) -> RavenResult<Self> {
        config.validate()?;
        let renderer = FrameRenderer::new(config.canvas(), config.renderer_opts())?;
        let controller = PlaybackController::new(config.duration_ms)?;
        let capture = CapturePipeline::new(encoder, config.capture.sample_fps)?;
        let mut session = Self {
            config,
            host,
            image_a: None,
            image_b: None,
            flock: Flock::default(),
            generation: 0,
            renderer,
            controller,
            capture,
            artifact: None,
        };
        session.regenerate_flock();
        session.render_at(0.0)?;
        Ok(session)
    }

    /// Current configuration.
    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    /// Surface dimensions.
    pub fn canvas(&self) -> Canvas {
        self.config.canvas()
    }

    /// The scheduling host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the scheduling host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The current flock.
    pub fn flock(&self) -> &Flock {
        &self.flock
    }

    /// Source image, if set.
    pub fn image_a(&self) -> Option<&RasterImage> {
        self.image_a.as_ref()
    }

    /// Destination image, if set.
    pub fn image_b(&self) -> Option<&RasterImage> {
        self.image_b.as_ref()
    }

    /// Playback state snapshot.
    pub fn state(&self) -> TransitionState {
        self.controller.state()
    }

    /// Playback status.
    pub fn status(&self) -> PlaybackStatus {
        self.controller.status()
    }

    /// Return `true` while a transition is playing.
    pub fn is_playing(&self) -> bool {
        self.controller.is_playing()
    }

    /// Capture status.
    pub fn capture_status(&self) -> CaptureStatus {
        self.capture.status()
    }

    /// Return `true` while recording.
    pub fn is_recording(&self) -> bool {
        self.capture.is_recording()
    }

    /// Normalized time of the frame currently on the primary surface.
    pub fn last_t(&self) -> Option<f64> {
        self.renderer.last_t()
    }

    /// Copy of the primary surface.
    pub fn frame(&self) -> FrameRGBA {
        self.renderer.frame()
    }

    /// Fraction of the surface covered by the most recent mask.
    pub fn mask_coverage(&self) -> f64 {
        self.renderer.mask_coverage()
    }

    /// The artifact of the last finished recording, if not taken yet.
    pub fn artifact(&self) -> Option<&MediaArtifact> {
        self.artifact.as_ref()
    }

    /// Take ownership of the last finished recording.
    pub fn take_artifact(&mut self) -> Option<MediaArtifact> {
        self.artifact.take()
    }

    /// Replace both images.
    pub fn set_images(
        &mut self,
        image_a: Option<RasterImage>,
        image_b: Option<RasterImage>,
    ) -> RavenResult<()> {
        self.interrupt_playback()?;
        self.image_a = image_a;
        self.image_b = image_b;
        self.regenerate_flock();
        self.render_at(0.0)
    }

    /// Replace the source image.
    pub fn set_image_a(&mut self, image: Option<RasterImage>) -> RavenResult<()> {
        let b = self.image_b.clone();
        self.set_images(image, b)
    }

    /// Replace the destination image.
    pub fn set_image_b(&mut self, image: Option<RasterImage>) -> RavenResult<()> {
        let a = self.image_a.clone();
        self.set_images(a, image)
    }

    /// Resize the surfaces. A running recording is finalized first since its frame size changes.
    pub fn set_canvas(&mut self, width: u32, height: u32) -> RavenResult<()> {
        let canvas = Canvas::new(width, height)?;
        if canvas == self.canvas() {
            return Ok(());
        }
        self.interrupt_playback()?;
        if self.is_recording() {
            self.stop_recording()?;
        }
        self.renderer.resize(canvas)?;
        self.config.width = width;
        self.config.height = height;
        self.regenerate_flock();
        self.render_at(0.0)
    }

    /// Change the transition length.
    pub fn set_duration_ms(&mut self, duration_ms: f64) -> RavenResult<()> {
        validate_duration_ms(duration_ms)?;
        self.interrupt_playback()?;
        self.controller.set_duration_ms(duration_ms)?;
        self.config.duration_ms = duration_ms;
        self.regenerate_flock();
        self.render_at(0.0)
    }

    /// Change the flock size.
    pub fn set_raven_count(&mut self, raven_count: usize) -> RavenResult<()> {
        validate_raven_count(raven_count)?;
        self.interrupt_playback()?;
        self.config.raven_count = raven_count;
        self.regenerate_flock();
        self.render_at(0.0)
    }

    fn interrupt_playback(&mut self) -> RavenResult<()> {
        if self.is_playing() {
            tracing::debug!("parameters changed during playback, stopping");
            self.stop()?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn regenerate_flock(&mut self) {
        self.generation += 1;
        let seed = self.config.seed.unwrap_or_else(time_seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let ravens = generate(self.config.raven_count, self.canvas(), &mut rng);
        self.flock = Flock::from_ravens(ravens, self.generation);
        tracing::debug!(
            generation = self.generation,
            ravens = self.flock.len(),
            seed,
            "flock regenerated"
        );
    }

    /// Render the frame at normalized time `t` onto the primary surface.
    pub fn render_at(&mut self, t: f64) -> RavenResult<()> {
        let scene = FrameScene {
            image_a: self.image_a.as_ref(),
            image_b: self.image_b.as_ref(),
            flock: &self.flock,
        };
        self.renderer.render_frame(t, &scene)
    }

    /// Start the transition. Returns `Ok(false)` when an image is missing or already playing.
    #[tracing::instrument(skip(self))]
    pub fn play(&mut self) -> RavenResult<bool> {
        if self.image_a.is_none() || self.image_b.is_none() {
            tracing::debug!("play ignored: both images are required");
            return Ok(false);
        }
        if !self.controller.play(&mut self.host) {
            tracing::debug!("play ignored: already playing");
            return Ok(false);
        }
        tracing::info!(
            start_ms = self.controller.state().start_ms,
            duration_ms = self.controller.duration_ms(),
            "transition started"
        );
        Ok(true)
    }

    /// Cancel the pending tick and show the rest frame. Returns `Ok(false)` when already Idle.
    #[tracing::instrument(skip(self))]
    pub fn stop(&mut self) -> RavenResult<bool> {
        if !self.controller.stop(&mut self.host) {
            tracing::debug!("stop ignored: not playing");
            return Ok(false);
        }
        self.render_at(0.0)?;
        tracing::info!("transition stopped");
        Ok(true)
    }

    /// Open a recording of the primary surface and start playback if Idle.
    ///
    /// Returns `Ok(false)` when already recording, or when Idle without both images since no
    /// transition could be captured. Encoder start failures are returned and leave playback
    /// untouched.
    #[tracing::instrument(skip(self))]
    pub fn start_recording(&mut self) -> RavenResult<bool> {
        if self.is_recording() {
            tracing::debug!("start_recording ignored: already recording");
            return Ok(false);
        }
        if !self.is_playing() && (self.image_a.is_none() || self.image_b.is_none()) {
            tracing::debug!("start_recording ignored: both images are required");
            return Ok(false);
        }
        let now = self.host.now_ms();
        self.capture.start(now, self.canvas())?;
        self.artifact = None;
        self.capture.sample(now, &self.renderer.frame())?;
        tracing::info!(
            media_type = self.capture.media_type(),
            sample_fps = self.capture.sample_fps(),
            "recording started"
        );
        if !self.is_playing() {
            self.play()?;
        }
        Ok(true)
    }

    /// Finalize the recording and expose its artifact. Returns `Ok(None)` when not recording.
    #[tracing::instrument(skip(self))]
    pub fn stop_recording(&mut self) -> RavenResult<Option<&MediaArtifact>> {
        if !self.is_recording() {
            tracing::debug!("stop_recording ignored: not recording");
            return Ok(None);
        }
        self.artifact = self.capture.stop()?;
        Ok(self.artifact.as_ref())
    }

    /// Wait for one host refresh, render the due tick and feed the capture pipeline.
    ///
    /// Returns the normalized time rendered during this refresh, if any.
    pub fn pump(&mut self) -> RavenResult<Option<f64>> {
        let fired = self.host.wait_for_refresh();
        let now = self.host.now_ms();

        let mut rendered = None;
        let mut finished = false;
        if let Some(handle) = fired {
            match self.controller.on_tick(handle, &mut self.host) {
                TickOutcome::Stale => {}
                TickOutcome::Frame { t, finished: done } => {
                    self.render_at(t)?;
                    rendered = Some(t);
                    finished = done;
                }
            }
        }

        if self.is_recording() {
            let frame = self.renderer.frame();
            if let Err(e) = self.capture.sample(now, &frame) {
                tracing::warn!(error = %e, "capture failed, stopping playback");
                self.stop()?;
                return Err(e);
            }
        }

        if finished {
            tracing::info!("transition finished");
            if self.is_recording() {
                self.stop_recording()?;
            }
        }
        Ok(rendered)
    }

    /// Pump refreshes until playback returns to Idle.
    pub fn run_until_idle(&mut self) -> RavenResult<()> {
        while self.is_playing() {
            self.pump()?;
        }
        Ok(())
    }
}

/// Record one complete transition on a [`VirtualHost`] and return the artifact.
///
/// Any running playback is stopped first so the recording covers the whole transition.
pub fn render_to_artifact(
    session: &mut TransitionSession<VirtualHost>,
) -> RavenResult<MediaArtifact> {
    if session.image_a().is_none() || session.image_b().is_none() {
        return Err(RavenError::validation(
            "both images are required to record a transition",
        ));
    }
    session.stop()?;
    if session.is_recording() {
        session.stop_recording()?;
    }
    session.start_recording()?;
    session.run_until_idle()?;
    if session.is_recording() {
        session.stop_recording()?;
    }
    session
        .take_artifact()
        .ok_or_else(|| RavenError::encode("recording finished without an artifact"))
}

fn time_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "../../tests/unit/session/transition_session.rs"]
mod tests;
