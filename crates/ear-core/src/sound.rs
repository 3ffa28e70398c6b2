use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// A stored clip of a recognition target, resolvable to a `SampleBuffer`
/// through a `BufferDecoder`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceRecording {
    /// Opaque to the engine; only the decoder interprets it.
    pub path: PathBuf,
}

impl ReferenceRecording {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// A named recognition target with its reference recordings and alert flags.
///
/// Owned by the sound library collaborator; the engine reads the name and
/// recordings for the duration of one scan and hands the whole sound to the
/// sink so it can honor the alert flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sound {
    pub name: String,
    pub recordings: Vec<ReferenceRecording>,
    /// Flash the screen/torch when this sound is recognized.
    pub flash_when_recognized: bool,
    /// Vibrate when this sound is recognized.
    pub vibrate_when_recognized: bool,
}

impl Sound {
    #[must_use]
    pub fn new(name: impl Into<String>, recordings: Vec<ReferenceRecording>) -> Self {
        Self {
            name: name.into(),
            recordings,
            flash_when_recognized: false,
            vibrate_when_recognized: false,
        }
    }
}

/// Emitted to the recognition sink when a capture matches a sound.
///
/// The engine keeps no history of past events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecognitionEvent {
    /// Unix seconds at the moment of recognition.
    pub timestamp: u64,
    pub sound_name: String,
}

impl RecognitionEvent {
    /// Event stamped with the current wall clock.
    #[must_use]
    pub fn now(sound_name: impl Into<String>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        Self {
            timestamp,
            sound_name: sound_name.into(),
        }
    }
}
