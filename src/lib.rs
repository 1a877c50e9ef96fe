//! Raven transition renders a procedural masked transition between two images.
//!
//! A flock of raven silhouettes sweeps across the frame; wherever a raven has passed, the
//! destination image shows through an accumulating mask while the source image stays visible
//! elsewhere, and a closing fade hides residual seams. The public API is session-oriented:
//!
//! - Describe the transition with a [`TransitionConfig`]
//! - Create a [`TransitionSession`] on a [`FrameHost`] ([`VirtualHost`] or [`RealtimeHost`])
//! - Set both images, then `play()` and `pump()` refreshes, or record to a [`MediaArtifact`]
//!   through a [`ChunkEncoder`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod assets;
mod capture;
mod encode;
mod flock;
mod foundation;
mod playback;
mod render;
mod session;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, MAX_SURFACE_EDGE, MAX_SURFACE_PIXELS, Point, Rect, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{RavenError, RavenResult};

pub use crate::animation::ease::{Ease, ease};
pub use crate::assets::decode::{decode_image, load_image};
pub use crate::assets::raster::RasterImage;
pub use crate::assets::silhouette::{SILHOUETTE_BOX, SILHOUETTE_CENTER, Silhouette};
pub use crate::capture::pipeline::{
    CapturePipeline, CaptureStatus, DEFAULT_SAMPLE_FPS, MAX_CATCH_UP_SECONDS,
};
pub use crate::encode::artifact::{DEFAULT_ARTIFACT_STEM, MediaArtifact};
pub use crate::encode::encoder::{
    ChunkEncoder, EncodedChunk, EncoderConfig, EncoderKind, RAW_RGBA_MEDIA_TYPE, RawFrameEncoder,
    create_encoder,
};
pub use crate::encode::ffmpeg::{
    FfmpegWebmEncoder, FfmpegWebmOpts, WEBM_MEDIA_TYPE, is_ffmpeg_on_path,
};
pub use crate::flock::generator::{
    DEFAULT_RAVEN_COUNT, Flock, MAX_RAVEN_COUNT, Raven, generate, validate_raven_count,
};
pub use crate::playback::controller::{
    PlaybackController, PlaybackStatus, TickOutcome, TransitionState,
};
pub use crate::playback::host::{
    DEFAULT_REFRESH_HZ, FrameHost, RealtimeHost, TickHandle, VirtualHost,
};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::mask::{RavenPose, flock_poses};
pub use crate::render::placement::{Placement, contained_fit};
pub use crate::render::renderer::{
    FADE_MAX_OPACITY, FADE_START, FrameRenderer, FrameScene, RendererOpts, fade_opacity,
};
pub use crate::session::config::{
    CaptureConfig, DEFAULT_DURATION_MS, PRACTICAL_DURATION_MS, TransitionConfig,
};
pub use crate::session::transition_session::{TransitionSession, render_to_artifact};
