//! Nearfield gate (§4.3) — RMS-based chunk admission before a chunk reaches the ASR model.

/// Root-mean-square energy of a chunk of float32 samples.
#[must_use]
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}

/// Outcome of gating one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Chunk is loud enough; submit it to the realtime ASR model.
    Submit,
    /// No active sentence and the chunk is below threshold: drop entirely, no model call.
    DropSilently,
    /// A sentence is active and the chunk is below threshold: treat as an empty ASR
    /// result so endpointing still advances.
    TreatAsEmpty,
}

/// Pure function of `(samples, base_threshold, sentence_active)` — invariant 6 of §8: two
/// equal chunks under the same threshold and activity state always gate the same way.
///
/// The threshold halves^ to `0.6x` of the base while a sentence is active, to avoid
/// clipping mid-utterance.
#[must_use]
pub fn gate(samples: &[f32], base_threshold: f32, sentence_active: bool) -> GateOutcome {
    let threshold = if sentence_active { base_threshold * 0.6 } else { base_threshold };
    let energy = rms(samples);

    if energy >= threshold {
        GateOutcome::Submit
    } else if sentence_active {
        GateOutcome::TreatAsEmpty
    } else {
        GateOutcome::DropSilently
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(rms(&[0.0; 100]), 0.0);
    }

    #[test]
    fn rms_of_constant_signal_equals_its_magnitude() {
        assert!((rms(&[0.5; 100]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn quiet_chunk_with_no_active_sentence_is_dropped() {
        let quiet = vec![0.002_f32; 160];
        assert_eq!(gate(&quiet, 0.01, false), GateOutcome::DropSilently);
    }

    #[test]
    fn quiet_chunk_with_active_sentence_counts_as_empty() {
        let quiet = vec![0.002_f32; 160];
        assert_eq!(gate(&quiet, 0.01, true), GateOutcome::TreatAsEmpty);
    }

    #[test]
    fn loud_chunk_is_always_submitted() {
        let loud = vec![0.5_f32; 160];
        assert_eq!(gate(&loud, 0.01, false), GateOutcome::Submit);
        assert_eq!(gate(&loud, 0.01, true), GateOutcome::Submit);
    }

    #[test]
    fn active_sentence_threshold_is_lower_so_borderline_chunks_still_submit() {
        // 0.007 is below the 0.01 base threshold but above 0.6 * 0.01 = 0.006.
        let borderline = vec![0.007_f32; 160];
        assert_eq!(gate(&borderline, 0.01, false), GateOutcome::DropSilently);
        assert_eq!(gate(&borderline, 0.01, true), GateOutcome::Submit);
    }

    #[test]
    fn gate_is_a_pure_function_of_its_inputs() {
        let chunk = vec![0.02_f32; 160];
        assert_eq!(gate(&chunk, 0.01, true), gate(&chunk, 0.01, true));
    }
}
