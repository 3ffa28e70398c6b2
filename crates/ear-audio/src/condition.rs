use ear_core::SampleBuffer;

/// Zero out sub-noise-floor amplitudes, then trim leading and trailing
/// silence.
///
/// At low amplitudes the fluctuation across "zero" due to noise is quite
/// pronounced, which reads as high frequency when it is actually quiet, so
/// every amplitude below the floor becomes exactly 0.0 before trimming.
///
/// A buffer with no amplitude above the floor conditions to the empty
/// buffer. Pure function; idempotent.
///
/// # Example
/// ```
/// use ear_audio::condition::condition;
/// use ear_core::SampleBuffer;
///
/// let buf = SampleBuffer::new(vec![0.0002, 0.5, -0.3, 0.0004], 44_100);
/// let out = condition(&buf, 0.001);
/// assert_eq!(out.samples, vec![0.5, -0.3]);
/// ```
#[must_use]
pub fn condition(buf: &SampleBuffer, noise_floor: f32) -> SampleBuffer {
    let mut cleaned: Vec<f32> = buf
        .samples
        .iter()
        .map(|&a| if a.abs() < noise_floor { 0.0 } else { a })
        .collect();

    let Some(first) = cleaned.iter().position(|&a| a != 0.0) else {
        // Nothing survived denoising: genuine (or effective) silence.
        return SampleBuffer::new(Vec::new(), buf.sample_rate);
    };
    let last = cleaned.iter().rposition(|&a| a != 0.0).unwrap_or(first);

    cleaned.truncate(last + 1);
    cleaned.drain(..first);
    SampleBuffer::new(cleaned, buf.sample_rate)
}
