/// Convenience result type used across the transition engine.
pub type RavenResult<T> = Result<T, RavenError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Redundant requests (play while playing, stop while idle, record while recording) are not
/// errors and never produce one of these.
#[derive(thiserror::Error, Debug)]
pub enum RavenError {
    /// Caller contract violation: invalid configuration, dimensions or image data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure while rasterizing or compositing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Failure while starting, feeding or finalizing an encoder session.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RavenError {
    /// Build a [`RavenError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RavenError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`RavenError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`RavenError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
