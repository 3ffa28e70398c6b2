use thiserror::Error;

/// Errors originating from the audio module.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No audio input device found.
    #[error("no audio input device found")]
    NoInputDevice,

    /// Audio stream error.
    #[error("audio stream error: {0}")]
    StreamError(String),

    /// Audio decode error.
    #[error("audio decode error: {0}")]
    DecodeError(String),
}
