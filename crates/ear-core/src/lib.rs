/// Shared types, traits, and configuration for digiear.
///
/// This crate contains the data model (sample buffers, frequency profiles,
/// sounds, recognition events), the collaborator traits implemented by the
/// engine and the app, and the recognition configuration.

pub mod config;
pub mod error;
pub mod signal;
pub mod sound;
pub mod traits;

pub use config::EarConfig;
pub use error::CoreError;
pub use signal::{FrequencyProfile, SampleBuffer};
pub use sound::{RecognitionEvent, ReferenceRecording, Sound};
pub use traits::{
    BufferDecoder, CancelToken, CaptureService, RecognitionSink, SessionControl, SessionState,
    SoundLibrary,
};
