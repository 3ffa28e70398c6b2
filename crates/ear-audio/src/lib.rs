// Audio conditioning, frequency profiling, matching, and the recognition
// session for digiear.

pub mod capture;
pub mod condition;
pub mod decode;
pub mod error;
pub mod matcher;
pub mod profile;
pub mod session;

pub use error::AudioError;
pub use session::{RecognitionSession, SessionHandle};
