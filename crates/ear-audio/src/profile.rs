use ear_core::{FrequencyProfile, SampleBuffer};

/// Sign of an amplitude: -1, 0, or +1. 0 only for exact zero.
#[inline]
fn sign(amplitude: f32) -> i8 {
    if amplitude > 0.0 {
        1
    } else if amplitude < 0.0 {
        -1
    } else {
        0
    }
}

/// Estimate full cycles in a sample window by counting sign alternations.
///
/// A crossing is a direct + → − or − → + transition. An exact zero resets
/// the sign state: it neither counts itself nor lets the samples around it
/// pair up, so zero runs introduced by conditioning suppress the count.
/// That under-count is a property of the estimator, not a bug.
#[must_use]
pub fn count_cycles(samples: &[f32]) -> u32 {
    let Some(&first) = samples.first() else {
        return 0;
    };

    let mut zero_crossings = 0u32;
    let mut prev_sign = sign(first);

    for &amplitude in samples {
        let current_sign = sign(amplitude);
        if current_sign != 0 && current_sign == -prev_sign {
            zero_crossings += 1;
        }
        prev_sign = current_sign;
    }

    (zero_crossings as f32 / 2.0).round() as u32
}

/// Dominant frequency (Hz) of a window via its zero-crossing rate.
///
/// 0 for an empty window or an unknown sample rate.
#[must_use]
pub fn dominant_frequency(samples: &[f32], sample_rate: u32) -> f32 {
    if samples.is_empty() || sample_rate == 0 {
        return 0.0;
    }
    let seconds = samples.len() as f32 / sample_rate as f32;
    count_cycles(samples) as f32 / seconds
}

/// Build a frequency profile: one dominant-frequency estimate per
/// `1 / chunks_per_second` seconds of audio, in chunk order.
///
/// Only complete chunks are profiled; a trailing remainder is discarded, so
/// the result's length is `len / chunk_size` rounded down. A buffer shorter
/// than one chunk yields an empty profile.
///
/// # Example
/// ```
/// use ear_audio::profile::frequency_profile;
/// use ear_core::SampleBuffer;
///
/// let buf = SampleBuffer::new(vec![0.1; 11_025], 44_100);
/// // 44_100 / 20 = 2_205 samples per chunk -> 5 complete chunks.
/// assert_eq!(frequency_profile(&buf, 20).len(), 5);
/// ```
#[must_use]
pub fn frequency_profile(buf: &SampleBuffer, chunks_per_second: u32) -> FrequencyProfile {
    if chunks_per_second == 0 || buf.sample_rate == 0 {
        return FrequencyProfile::default();
    }
    let chunk_size = (buf.sample_rate / chunks_per_second) as usize;
    if chunk_size == 0 || buf.samples.len() < chunk_size {
        return FrequencyProfile::default();
    }

    buf.samples
        .chunks_exact(chunk_size)
        .map(|chunk| dominant_frequency(chunk, buf.sample_rate))
        .collect::<Vec<f32>>()
        .into()
}
