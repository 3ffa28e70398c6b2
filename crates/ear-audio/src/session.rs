use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;

use anyhow::Result;
use ear_core::{
    BufferDecoder, CancelToken, CaptureService, EarConfig, RecognitionEvent, RecognitionSink,
    SampleBuffer, SessionControl, SessionState, Sound, SoundLibrary,
};

use crate::condition::condition;
use crate::matcher::profile_distance;
use crate::profile::frequency_profile;

enum Cmd {
    Listen,
    Shutdown,
}

struct SessionShared {
    state: AtomicU8,
    stop: CancelToken,
    tx: flume::Sender<Cmd>,
}

impl SessionShared {
    fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: SessionState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    fn listen(&self) {
        self.stop.reset();
        // Mid-cycle, clearing the stop flag is the whole request: the
        // worker re-arms itself with a fresh snapshot. Only an idle
        // session needs a wake-up command.
        if self.state() == SessionState::Idle {
            let _ = self.tx.send(Cmd::Listen);
        }
    }

    fn stop(&self) {
        // Doubles as the cancel request for an in-flight capture. Observed
        // by the worker only at the capture-completion boundary.
        self.stop.cancel();
    }
}

/// Cloneable control surface for a running session.
///
/// Safe to use from any thread, including re-entrantly from within the
/// recognition sink.
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<SessionShared>,
}

impl SessionControl for SessionHandle {
    fn listen(&self) {
        self.shared.listen();
    }

    fn stop(&self) {
        self.shared.stop();
    }
}

/// The capture → condition → profile → match → restart loop.
///
/// A dedicated worker thread runs the cycle as an explicit loop (never
/// recursion): snapshot the sound library, record a fixed-duration clip,
/// scan every sound in order, fire the sink on matches, and re-arm. The
/// stop flag is observed only between a capture completing and the scan
/// starting, and again after the scan; an active scan always finishes.
///
/// # Example
/// ```no_run
/// use ear_audio::capture::MicCapture;
/// use ear_audio::decode::FileDecoder;
/// use ear_audio::session::RecognitionSession;
/// use ear_core::{EarConfig, RecognitionEvent, RecognitionSink, SessionControl, Sound};
///
/// struct PrintSink;
/// impl RecognitionSink for PrintSink {
///     fn on_recognized(&mut self, e: &RecognitionEvent, _: &Sound, _: &dyn SessionControl) {
///         println!("Sounds like {}", e.sound_name);
///     }
/// }
///
/// let config = EarConfig::default();
/// let capture = MicCapture::start(config.sample_rate).unwrap();
/// let session =
///     RecognitionSession::spawn(config, capture, FileDecoder, Vec::<Sound>::new(), PrintSink)
///         .unwrap();
/// session.listen();
/// ```
pub struct RecognitionSession {
    shared: Arc<SessionShared>,
    worker: Option<thread::JoinHandle<()>>,
}

impl RecognitionSession {
    /// Start the worker thread. The session is `Idle` until `listen()`.
    ///
    /// # Errors
    /// Returns an error if the worker thread cannot be spawned.
    pub fn spawn<C, D, L, S>(
        config: EarConfig,
        capture: C,
        decoder: D,
        library: L,
        sink: S,
    ) -> Result<Self>
    where
        C: CaptureService,
        D: BufferDecoder,
        L: SoundLibrary,
        S: RecognitionSink,
    {
        let (tx, rx) = flume::unbounded();
        let shared = Arc::new(SessionShared {
            state: AtomicU8::new(SessionState::Idle as u8),
            stop: CancelToken::new(),
            tx,
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("ear-session".to_string())
            .spawn(move || {
                run_worker(&worker_shared, &rx, &config, capture, &decoder, &library, sink);
            })?;

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Begin (or resume) the continuous capture/recognize cycle.
    pub fn listen(&self) {
        self.shared.listen();
    }

    /// Request a stop at the next cycle boundary and cancel any in-flight
    /// capture.
    pub fn stop(&self) {
        self.shared.stop();
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// A cloneable handle for re-entrant control from other threads.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Drop for RecognitionSession {
    fn drop(&mut self) {
        self.shared.stop.cancel();
        let _ = self.shared.tx.send(Cmd::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker<C, D, L, S>(
    shared: &Arc<SessionShared>,
    rx: &flume::Receiver<Cmd>,
    config: &EarConfig,
    mut capture: C,
    decoder: &D,
    library: &L,
    mut sink: S,
) where
    C: CaptureService,
    D: BufferDecoder,
    L: SoundLibrary,
    S: RecognitionSink,
{
    let handle = SessionHandle {
        shared: Arc::clone(shared),
    };

    loop {
        match rx.recv() {
            Ok(Cmd::Listen) => {}
            Ok(Cmd::Shutdown) | Err(_) => return,
        }
        if run_cycles(shared, rx, config, &mut capture, decoder, library, &mut sink, &handle) {
            return;
        }
    }
}

/// One `listen()` worth of cycles. Returns true on shutdown.
#[allow(clippy::too_many_arguments)]
fn run_cycles<C, D, L, S>(
    shared: &SessionShared,
    rx: &flume::Receiver<Cmd>,
    config: &EarConfig,
    capture: &mut C,
    decoder: &D,
    library: &L,
    sink: &mut S,
    handle: &SessionHandle,
) -> bool
where
    C: CaptureService,
    D: BufferDecoder,
    L: SoundLibrary,
    S: RecognitionSink,
{
    loop {
        // Snapshot per cycle: library mutations affect the next cycle,
        // never the in-flight one.
        let sounds = library.current_sounds();

        shared.set_state(SessionState::Capturing);
        log::info!("capturing {:.1}s clip", config.capture_seconds);
        let clip = capture.capture(config.capture_seconds, &shared.stop);

        // The capture-completion boundary: the only place a stop request
        // is observed before work begins.
        if shared.stop.is_cancelled() {
            log::info!("stop requested; discarding capture");
            return go_idle(shared, rx);
        }

        shared.set_state(SessionState::Processing);
        scan(&clip, &sounds, config, decoder, sink, handle);

        // The sink may have stopped the session re-entrantly.
        if shared.stop.is_cancelled() {
            return go_idle(shared, rx);
        }
    }
}

/// Transition to `Idle`, discarding `Listen` commands that were queued
/// while the cycle ran: a command sent before the stop was observed must
/// not restart the session. Returns true on shutdown.
fn go_idle(shared: &SessionShared, rx: &flume::Receiver<Cmd>) -> bool {
    loop {
        match rx.try_recv() {
            Ok(Cmd::Listen) => {}
            Ok(Cmd::Shutdown) => return true,
            Err(_) => break,
        }
    }
    shared.set_state(SessionState::Idle);
    false
}

/// Scan every sound in library order against one conditioned capture.
///
/// The first sufficiently close recording fires the sink and ends that
/// sound's scan; the outer loop still visits every remaining sound, so one
/// cycle reports each recognizable sound at most once.
fn scan<D, S>(
    clip: &SampleBuffer,
    sounds: &[Sound],
    config: &EarConfig,
    decoder: &D,
    sink: &mut S,
    handle: &SessionHandle,
) where
    D: BufferDecoder,
    S: RecognitionSink,
{
    let clip = condition(clip, config.noise_floor);
    let clip_profile = frequency_profile(&clip, config.chunks_per_second);

    for sound in sounds {
        log::debug!("scanning \"{}\"", sound.name);
        for recording in &sound.recordings {
            let reference = decoder.decode(&recording.path);
            let reference = condition(&reference, config.noise_floor);
            let reference_profile = frequency_profile(&reference, config.chunks_per_second);

            let distance = profile_distance(&clip_profile, &reference_profile);
            log::debug!("  {} -> {distance:.3}", recording.path.display());

            if distance < config.recognition_threshold {
                log::info!("recognized \"{}\" (distance {distance:.3})", sound.name);
                let event = RecognitionEvent::now(sound.name.clone());
                sink.on_recognized(&event, sound, handle);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    use ear_core::ReferenceRecording;

    const RATE: u32 = 100;

    fn test_config() -> EarConfig {
        EarConfig {
            sample_rate: RATE,
            chunks_per_second: 20,
            noise_floor: 0.001,
            recognition_threshold: 0.30,
            capture_seconds: 0.5,
        }
    }

    /// 50 samples of steady positive amplitude: profiles to ten 0 Hz chunks.
    fn steady() -> Vec<f32> {
        vec![0.5; 50]
    }

    /// 50 samples alternating sign every sample: ten 40 Hz chunks.
    fn buzzing() -> Vec<f32> {
        (0..50)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect()
    }

    struct ScriptedCapture {
        clip: Vec<f32>,
        calls: Arc<AtomicUsize>,
    }

    impl CaptureService for ScriptedCapture {
        fn capture(&mut self, _seconds: f32, cancel: &CancelToken) -> SampleBuffer {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if cancel.is_cancelled() {
                return SampleBuffer::empty();
            }
            SampleBuffer::new(self.clip.clone(), RATE)
        }
    }

    /// Capture that takes real time, checking the cancel token as it goes.
    struct SlowCapture {
        clip: Vec<f32>,
        calls: Arc<AtomicUsize>,
    }

    impl CaptureService for SlowCapture {
        fn capture(&mut self, _seconds: f32, cancel: &CancelToken) -> SampleBuffer {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let deadline = Instant::now() + Duration::from_millis(200);
            while Instant::now() < deadline && !cancel.is_cancelled() {
                thread::sleep(Duration::from_millis(5));
            }
            if cancel.is_cancelled() {
                return SampleBuffer::empty();
            }
            SampleBuffer::new(self.clip.clone(), RATE)
        }
    }

    struct MapDecoder {
        map: HashMap<PathBuf, Vec<f32>>,
        decoded: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl BufferDecoder for MapDecoder {
        fn decode(&self, path: &Path) -> SampleBuffer {
            self.decoded.lock().unwrap().push(path.to_path_buf());
            self.map
                .get(path)
                .map_or_else(SampleBuffer::empty, |s| SampleBuffer::new(s.clone(), RATE))
        }
    }

    /// Records events and stops the session after `stop_after` of them,
    /// calling `listen()` re-entrantly in between.
    struct CountingSink {
        events: Arc<Mutex<Vec<RecognitionEvent>>>,
        stop_after: usize,
    }

    impl RecognitionSink for CountingSink {
        fn on_recognized(
            &mut self,
            event: &RecognitionEvent,
            _sound: &Sound,
            session: &dyn SessionControl,
        ) {
            let mut events = self.events.lock().unwrap();
            events.push(event.clone());
            session.stop();
            if events.len() < self.stop_after {
                // Re-entrant restart: cancel the pending cycle, begin fresh.
                session.listen();
            }
        }
    }

    fn wait_for_idle(session: &RecognitionSession) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while session.state() != SessionState::Idle {
            assert!(Instant::now() < deadline, "session never went idle");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn wait_until(deadline_msg: &str, condition: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !condition() {
            assert!(Instant::now() < deadline, "{deadline_msg}");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn second_recording_matches_and_later_sounds_still_scanned() {
        let rec_miss = PathBuf::from("doorbell-a.wav");
        let rec_hit = PathBuf::from("doorbell-b.wav");
        let rec_extra = PathBuf::from("doorbell-c.wav");
        let oven_rec = PathBuf::from("oven.wav");

        let library = vec![
            Sound::new(
                "doorbell",
                vec![
                    ReferenceRecording::new(&rec_miss),
                    ReferenceRecording::new(&rec_hit),
                    ReferenceRecording::new(&rec_extra),
                ],
            ),
            Sound::new("oven", vec![ReferenceRecording::new(&oven_rec)]),
        ];

        let map = HashMap::from([
            (rec_miss.clone(), buzzing()),
            (rec_hit.clone(), steady()),
            (rec_extra.clone(), steady()),
            (oven_rec.clone(), buzzing()),
        ]);

        let decoded = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        let session = RecognitionSession::spawn(
            test_config(),
            ScriptedCapture {
                clip: steady(),
                calls: Arc::clone(&calls),
            },
            MapDecoder {
                map,
                decoded: Arc::clone(&decoded),
            },
            library,
            CountingSink {
                events: Arc::clone(&events),
                stop_after: 1,
            },
        )
        .unwrap();

        session.listen();
        wait_for_idle(&session);
        wait_until("no recognition event", || !events.lock().unwrap().is_empty());

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sound_name, "doorbell");

        let decoded = decoded.lock().unwrap();
        // Match on the second recording skips the rest of that sound...
        assert!(decoded.contains(&rec_hit));
        assert!(!decoded.contains(&rec_extra));
        // ...but the outer loop still visits every remaining sound.
        assert!(decoded.contains(&oven_rec));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_during_capture_discards_the_clip() {
        let rec = PathBuf::from("doorbell.wav");
        let library = vec![Sound::new("doorbell", vec![ReferenceRecording::new(&rec)])];
        let map = HashMap::from([(rec, steady())]);

        let decoded = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        let session = RecognitionSession::spawn(
            test_config(),
            SlowCapture {
                clip: steady(),
                calls: Arc::clone(&calls),
            },
            MapDecoder {
                map,
                decoded: Arc::clone(&decoded),
            },
            library,
            CountingSink {
                events: Arc::clone(&events),
                stop_after: 1,
            },
        )
        .unwrap();

        session.listen();
        thread::sleep(Duration::from_millis(40));
        session.stop();

        wait_until("capture never started", || calls.load(Ordering::SeqCst) >= 1);
        wait_for_idle(&session);

        assert!(events.lock().unwrap().is_empty());
        assert!(decoded.lock().unwrap().is_empty());
    }

    #[test]
    fn reentrant_stop_then_listen_runs_a_fresh_cycle() {
        let rec = PathBuf::from("doorbell.wav");
        let library = vec![Sound::new("doorbell", vec![ReferenceRecording::new(&rec)])];
        let map = HashMap::from([(rec, steady())]);

        let events = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        let session = RecognitionSession::spawn(
            test_config(),
            ScriptedCapture {
                clip: steady(),
                calls: Arc::clone(&calls),
            },
            MapDecoder {
                map,
                decoded: Arc::new(Mutex::new(Vec::new())),
            },
            library,
            CountingSink {
                events: Arc::clone(&events),
                stop_after: 2,
            },
        )
        .unwrap();

        session.listen();
        wait_until("expected two recognitions", || {
            events.lock().unwrap().len() == 2
        });
        wait_for_idle(&session);

        assert_eq!(events.lock().unwrap().len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn listen_after_stop_restarts_cleanly() {
        let rec = PathBuf::from("doorbell.wav");
        let library = vec![Sound::new("doorbell", vec![ReferenceRecording::new(&rec)])];
        let map = HashMap::from([(rec, steady())]);

        let events = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        let session = RecognitionSession::spawn(
            test_config(),
            ScriptedCapture {
                clip: steady(),
                calls: Arc::clone(&calls),
            },
            MapDecoder {
                map,
                decoded: Arc::new(Mutex::new(Vec::new())),
            },
            library,
            CountingSink {
                events: Arc::clone(&events),
                stop_after: 1,
            },
        )
        .unwrap();

        session.listen();
        wait_until("first recognition", || events.lock().unwrap().len() == 1);
        wait_for_idle(&session);

        session.listen();
        wait_until("second recognition", || events.lock().unwrap().len() == 2);
        wait_for_idle(&session);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
