/// Result alias that carries the custom [`LipSyncError`] type.
pub type Result<T> = std::result::Result<T, LipSyncError>;

/// Common error type for the core crate.
///
/// Segmentation and synthesis never fail. These variants belong to the
/// collaborators around them: configuration, the character catalog and the
/// text to IPA step.
#[derive(Debug, thiserror::Error)]
pub enum LipSyncError {
    /// Free-form message for conditions without a dedicated variant.
    #[error("{0}")]
    Message(String),
    /// A caller supplied value outside the accepted domain.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON in a config or catalog file.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown character `{0}`")]
    UnknownCharacter(String),
    #[error("character `{character}` has no angle `{angle}`")]
    UnknownAngle { character: String, angle: String },
    /// The text to IPA step did not produce a transcription.
    #[error("transcription failed: {0}")]
    Transcription(String),
}

impl LipSyncError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}
