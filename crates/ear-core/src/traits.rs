use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::signal::SampleBuffer;
use crate::sound::{RecognitionEvent, Sound};

/// Lifecycle of a recognition session.
///
/// Exactly one capture is in flight whenever the session is not `Idle`. A
/// stop request is only observed at the `Capturing` → `Processing` boundary;
/// it never preempts an active scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Idle = 0,
    Capturing = 1,
    Processing = 2,
}

impl SessionState {
    /// Inverse of the `repr(u8)` discriminant, for atomic storage.
    #[must_use]
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Capturing,
            2 => Self::Processing,
            _ => Self::Idle,
        }
    }
}

/// Cooperative cancellation flag shared between a session and its capture.
///
/// # Example
/// ```
/// use ear_core::CancelToken;
/// let token = CancelToken::new();
/// assert!(!token.is_cancelled());
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Default)]
pub struct CancelToken(AtomicBool);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Records a fixed-duration clip from the platform audio subsystem.
///
/// `capture` blocks the calling (session worker) thread until the requested
/// duration has been recorded or `cancel` is raised, and returns whatever was
/// captured so far — possibly empty. Capture failure is not distinguished
/// from silence; the degenerate buffer flows through the pipeline safely.
pub trait CaptureService: Send + 'static {
    fn capture(&mut self, seconds: f32, cancel: &CancelToken) -> SampleBuffer;
}

/// Resolves a stored recording to a normalized sample buffer.
///
/// Infallible surface: implementations log decode failures and return
/// `SampleBuffer::empty()`, which conditions to empty, profiles to an empty
/// profile, and scores as "no match" against anything non-empty.
pub trait BufferDecoder: Send + 'static {
    fn decode(&self, path: &Path) -> SampleBuffer;
}

/// Read-only snapshot source for the sounds to scan.
///
/// The session snapshots once per cycle; mutations made by the owner affect
/// only the next cycle, never the in-flight one.
pub trait SoundLibrary: Send + 'static {
    fn current_sounds(&self) -> Vec<Sound>;
}

/// A plain vector is a fixed library.
impl SoundLibrary for Vec<Sound> {
    fn current_sounds(&self) -> Vec<Sound> {
        self.clone()
    }
}

/// Re-entrant control surface handed to the recognition sink.
///
/// Both calls are safe from within `on_recognized`: `stop` followed by
/// `listen` cancels the pending cycle and starts a fresh one.
pub trait SessionControl {
    fn listen(&self);
    fn stop(&self);
}

/// Receives recognition events, synchronously, from the session worker.
pub trait RecognitionSink: Send + 'static {
    fn on_recognized(
        &mut self,
        event: &RecognitionEvent,
        sound: &Sound,
        session: &dyn SessionControl,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_round_trip() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn session_state_discriminants_round_trip() {
        for state in [
            SessionState::Idle,
            SessionState::Capturing,
            SessionState::Processing,
        ] {
            assert_eq!(SessionState::from_u8(state as u8), state);
        }
    }
}
