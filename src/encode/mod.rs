pub(crate) mod artifact;
pub(crate) mod encoder;
pub(crate) mod ffmpeg;
