use ear_core::FrequencyProfile;

/// Distance between two frequency profiles in [0, 1]: the minimum, over all
/// alignments, of the average relative frequency difference per chunk.
///
/// The shorter profile slides across the longer one; at each offset every
/// pair contributes `|a - b| / max(a, b)` (0 when both are exactly 0), the
/// sum is averaged over the shorter length, and the best offset wins. This
/// tolerates leading/trailing silence asymmetry between the two clips.
///
/// Two empty profiles are identical (0): no sound matches no sound. One
/// empty profile against a non-empty one is maximally different (1):
/// absence cannot resemble presence. Symmetric in its arguments.
///
/// # Example
/// ```
/// use ear_audio::matcher::profile_distance;
/// use ear_core::FrequencyProfile;
///
/// let a = FrequencyProfile::new(vec![100.0]);
/// let b = FrequencyProfile::new(vec![400.0]);
/// assert!((profile_distance(&a, &b) - 0.75).abs() < 1e-6);
/// ```
#[must_use]
pub fn profile_distance(a: &FrequencyProfile, b: &FrequencyProfile) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    if a.is_empty() || b.is_empty() {
        return 1.0;
    }

    let (small, large) = if a.len() > b.len() {
        (b.as_slice(), a.as_slice())
    } else {
        (a.as_slice(), b.as_slice())
    };

    let mut min_avg_diff = 1.0f32;
    for offset in 0..=(large.len() - small.len()) {
        let mut diff_sum = 0.0f32;
        for (i, &freq) in small.iter().enumerate() {
            let other = large[i + offset];
            let base = freq.max(other);
            // Both exactly 0 is a perfect match for the chunk; it still
            // counts in the denominator below.
            if base > 0.0 {
                diff_sum += (freq - other).abs() / base;
            }
        }
        let avg_diff = diff_sum / small.len() as f32;
        if avg_diff < min_avg_diff {
            min_avg_diff = avg_diff;
        }
    }

    min_avg_diff
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(freqs: &[f32]) -> FrequencyProfile {
        FrequencyProfile::new(freqs.to_vec())
    }

    #[test]
    fn identical_profiles_have_zero_distance() {
        let p = profile(&[100.0, 105.0, 98.0]);
        assert_eq!(profile_distance(&p, &p), 0.0);
    }

    #[test]
    fn both_empty_is_a_perfect_match() {
        assert_eq!(profile_distance(&profile(&[]), &profile(&[])), 0.0);
    }

    #[test]
    fn one_empty_is_maximally_different() {
        let p = profile(&[100.0]);
        assert_eq!(profile_distance(&profile(&[]), &p), 1.0);
        assert_eq!(profile_distance(&p, &profile(&[])), 1.0);
    }

    #[test]
    fn relative_difference_of_single_chunks() {
        // |100 - 400| / 400 = 0.75, above the 0.30 threshold.
        let d = profile_distance(&profile(&[100.0]), &profile(&[400.0]));
        assert!((d - 0.75).abs() < 1e-6);
    }

    #[test]
    fn sliding_finds_the_best_alignment() {
        // The short profile matches the middle of the long one exactly.
        let long = profile(&[0.0, 100.0, 105.0, 98.0, 0.0]);
        let short = profile(&[100.0, 105.0, 98.0]);
        assert_eq!(profile_distance(&long, &short), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let cases = [
            (vec![100.0, 200.0], vec![150.0]),
            (vec![0.0, 50.0, 80.0], vec![80.0, 50.0]),
            (vec![440.0], vec![440.0, 441.0, 880.0]),
        ];
        for (a, b) in cases {
            let a = profile(&a);
            let b = profile(&b);
            assert_eq!(profile_distance(&a, &b), profile_distance(&b, &a));
        }
    }

    #[test]
    fn zero_pairs_count_as_matching_chunks() {
        // [0, 100] vs [0, 100]: both chunks match exactly.
        let p = profile(&[0.0, 100.0]);
        assert_eq!(profile_distance(&p, &p), 0.0);
        // [0, 100] vs [0, 200]: zero pair contributes 0 but stays in the
        // denominator -> (0 + 0.5) / 2 = 0.25.
        let q = profile(&[0.0, 200.0]);
        assert!((profile_distance(&p, &q) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn distance_never_leaves_unit_interval() {
        let a = profile(&[10_000.0, 0.0, 3.0]);
        let b = profile(&[0.0, 2.0]);
        let d = profile_distance(&a, &b);
        assert!((0.0..=1.0).contains(&d));
    }
}
