use std::thread;
use std::time::Duration;

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ear_core::{CancelToken, CaptureService, SampleBuffer};
use rtrb::{Consumer, RingBuffer};

use crate::error::AudioError;

/// How long the ring buffer can absorb while the session worker is busy
/// scanning instead of draining.
const RING_SECONDS: usize = 8;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Microphone capture via cpal.
///
/// The stream callback downmixes to mono f32 and pushes into a lock-free
/// ring buffer. The cpal stream is not `Send`, so a dedicated thread builds
/// it and holds it alive until this handle is dropped; the handle itself
/// (consumer side) moves freely into the session worker.
///
/// # Example
/// ```no_run
/// use ear_audio::capture::MicCapture;
/// let capture = MicCapture::start(44_100).unwrap();
/// ```
pub struct MicCapture {
    consumer: Consumer<f32>,
    sample_rate: u32,
    // Dropping this unblocks the holder thread, releasing the stream.
    _keepalive: flume::Sender<()>,
}

impl MicCapture {
    /// Start capturing from the default input device.
    ///
    /// `preferred_rate` is requested first; if the device refuses it, the
    /// device's default configuration is used instead.
    ///
    /// # Errors
    /// Returns an error if no input device exists or the stream cannot be
    /// built at either rate.
    pub fn start(preferred_rate: u32) -> Result<Self> {
        let (ready_tx, ready_rx) = flume::bounded::<Result<(Consumer<f32>, u32)>>(1);
        let (keepalive, park_rx) = flume::bounded::<()>(0);

        thread::Builder::new()
            .name("ear-capture".to_string())
            .spawn(move || match build_input_stream(preferred_rate) {
                Ok((stream, consumer, sample_rate)) => {
                    let _ = ready_tx.send(Ok((consumer, sample_rate)));
                    // Hold the stream on this thread until every keepalive
                    // sender is gone.
                    let _stream = stream;
                    let _ = park_rx.recv();
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })?;

        let (consumer, sample_rate) = ready_rx.recv()??;
        log::info!("Microphone capture started @ {sample_rate}Hz");

        Ok(Self {
            consumer,
            sample_rate,
            _keepalive: keepalive,
        })
    }

    /// The sample rate the stream actually runs at.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl CaptureService for MicCapture {
    fn capture(&mut self, seconds: f32, cancel: &CancelToken) -> SampleBuffer {
        // Discard whatever accumulated between captures; the clip must
        // start now, not during the previous scan.
        while self.consumer.pop().is_ok() {}

        let target = (seconds.max(0.0) * self.sample_rate as f32) as usize;
        let mut samples = Vec::with_capacity(target);

        while samples.len() < target && !cancel.is_cancelled() {
            while samples.len() < target {
                match self.consumer.pop() {
                    Ok(sample) => samples.push(sample),
                    Err(_) => break,
                }
            }
            if samples.len() < target {
                thread::sleep(POLL_INTERVAL);
            }
        }

        SampleBuffer::new(samples, self.sample_rate)
    }
}

type BuiltStream = (cpal::Stream, Consumer<f32>, u32);

fn build_input_stream(preferred_rate: u32) -> Result<BuiltStream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(AudioError::NoInputDevice)?;

    let default_config = device.default_input_config()?;
    let channels = default_config.channels() as usize;
    let mut config: cpal::StreamConfig = default_config.into();
    if preferred_rate > 0 {
        config.sample_rate = cpal::SampleRate(preferred_rate);
    }

    match try_build(&device, &config, channels) {
        Ok(built) => Ok(built),
        Err(e) if preferred_rate > 0 => {
            log::warn!("Input stream @ {preferred_rate}Hz refused ({e}); using device default");
            let default_config = device.default_input_config()?;
            let channels = default_config.channels() as usize;
            try_build(&device, &default_config.into(), channels)
        }
        Err(e) => Err(e),
    }
}

fn try_build(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
) -> Result<BuiltStream> {
    let sample_rate = config.sample_rate.0;
    let (mut producer, consumer) = RingBuffer::new(sample_rate as usize * RING_SECONDS);

    let stream = device
        .build_input_stream(
            config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                // Downmix to mono and push into ring buffer
                for chunk in data.chunks(channels) {
                    let mono: f32 = chunk.iter().sum::<f32>() / channels as f32;
                    let _ = producer.push(mono);
                }
            },
            |err| {
                log::error!("Audio stream error: {err}");
            },
            None,
        )
        .map_err(|e| AudioError::StreamError(e.to_string()))?;

    stream.play()?;

    Ok((stream, consumer, sample_rate))
}
