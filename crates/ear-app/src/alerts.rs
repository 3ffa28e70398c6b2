use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use ear_core::{RecognitionEvent, RecognitionSink, SessionControl, Sound};

use crate::events::EventLog;

/// How long a vibration alert keeps the session paused so the alert itself
/// is not captured as input.
const VIBRATE_PAUSE: Duration = Duration::from_millis(500);

/// Console recognition sink: prints matches, records them in the shared
/// event log, and announces the per-sound alert intents.
///
/// Real flash/vibrate/notification side effects are out of scope; the
/// intents are logged. The vibrate path still exercises the re-entrant
/// pause the real alert needs: stop the session, wait out the alert,
/// listen again.
pub struct ConsoleSink {
    log: Arc<Mutex<EventLog>>,
}

impl ConsoleSink {
    #[must_use]
    pub fn new(log: Arc<Mutex<EventLog>>) -> Self {
        Self { log }
    }
}

impl RecognitionSink for ConsoleSink {
    fn on_recognized(
        &mut self,
        event: &RecognitionEvent,
        sound: &Sound,
        session: &dyn SessionControl,
    ) {
        println!("Sounds like {}", sound.name);
        if let Ok(mut log) = self.log.lock() {
            log.push(event.clone());
        }

        if sound.flash_when_recognized {
            log::info!("alert: flash for \"{}\"", sound.name);
        }
        if sound.vibrate_when_recognized {
            log::info!("alert: vibrate for \"{}\"", sound.name);
            // The vibration must not end up in the next capture.
            session.stop();
            thread::sleep(VIBRATE_PAUSE);
            session.listen();
        }
    }
}
