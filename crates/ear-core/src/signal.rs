/// A mono audio clip: normalized amplitudes in [-1.0, 1.0] paired with the
/// rate they were sampled at.
///
/// Produced by capture or file decoding, consumed by the conditioner and the
/// profiler. The empty buffer (no samples, rate 0) is the safe default for a
/// failed decode or capture.
///
/// # Example
/// ```
/// use ear_core::SampleBuffer;
/// let buf = SampleBuffer::new(vec![0.0, 0.5, -0.5], 44_100);
/// assert_eq!(buf.len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleBuffer {
    /// Normalized mono amplitudes.
    pub samples: Vec<f32>,
    /// Samples per second. 0 only for the degenerate empty buffer.
    pub sample_rate: u32,
}

impl SampleBuffer {
    #[must_use]
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// The degenerate buffer a failed decode or capture resolves to.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Clip duration in seconds. 0 when the sample rate is unknown.
    #[must_use]
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Per-chunk dominant-frequency estimates (Hz, all ≥ 0), in chunk order.
///
/// One entry per fixed-duration chunk of a source buffer. May be empty when
/// the source is shorter than one chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrequencyProfile(Vec<f32>);

impl FrequencyProfile {
    #[must_use]
    pub fn new(frequencies: Vec<f32>) -> Self {
        Self(frequencies)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl From<Vec<f32>> for FrequencyProfile {
    fn from(frequencies: Vec<f32>) -> Self {
        Self(frequencies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_has_zero_duration() {
        assert_eq!(SampleBuffer::empty().duration_secs(), 0.0);
    }

    #[test]
    fn duration_follows_sample_rate() {
        let buf = SampleBuffer::new(vec![0.0; 22_050], 44_100);
        assert!((buf.duration_secs() - 0.5).abs() < 1e-6);
    }
}
