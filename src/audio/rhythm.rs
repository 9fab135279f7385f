use serde::Serialize;

/// Pulse statistics derived from short-term frame energy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RhythmStats {
    pub pulse_count: usize,
    /// 1.0 for perfectly even pulse spacing, 0.0 for erratic spacing or fewer than two pulses
    pub regularity: f32,
    pub tempo_bpm: f32,
}

/// Detects energy pulses in a waveform.
///
/// The peak threshold is an absolute gate on per-frame energy, so low-level
/// hiss never registers as rhythm.
pub struct PulseDetector {
    frame_size: usize,
    peak_threshold: f32,
}

impl PulseDetector {
    pub fn new(frame_size: usize, peak_threshold: f32) -> Self {
        Self {
            frame_size: frame_size.max(1),
            peak_threshold,
        }
    }

    pub fn analyze(&self, samples: &[f32], sample_rate: u32) -> RhythmStats {
        let energies = self.frame_energies(samples);
        let peaks = self.detect_peaks(&energies);

        if peaks.len() < 2 || sample_rate == 0 {
            return RhythmStats {
                pulse_count: peaks.len(),
                regularity: 0.0,
                tempo_bpm: 0.0,
            };
        }

        let frame_seconds = self.frame_size as f32 / sample_rate as f32;
        let intervals: Vec<f32> = peaks
            .windows(2)
            .map(|w| (w[1] - w[0]) as f32 * frame_seconds)
            .collect();

        let mean = intervals.iter().sum::<f32>() / intervals.len() as f32;
        let std_dev = Self::std_dev(&intervals, mean);

        RhythmStats {
            pulse_count: peaks.len(),
            regularity: (1.0 - (std_dev / mean).min(1.0)).clamp(0.0, 1.0),
            tempo_bpm: 60.0 / mean,
        }
    }

    /// Sum of squared amplitudes per frame
    pub fn frame_energies(&self, samples: &[f32]) -> Vec<f32> {
        samples
            .chunks(self.frame_size)
            .map(|frame| frame.iter().map(|x| x * x).sum::<f32>())
            .collect()
    }

    /// Indices of strict local maxima above the threshold
    pub fn detect_peaks(&self, energies: &[f32]) -> Vec<usize> {
        if energies.len() < 3 {
            return Vec::new();
        }

        (1..energies.len() - 1)
            .filter(|&i| {
                energies[i] > energies[i - 1] && energies[i] > energies[i + 1] && energies[i] > self.peak_threshold
            })
            .collect()
    }

    fn std_dev(data: &[f32], mean: f32) -> f32 {
        if data.len() < 2 {
            return 0.0;
        }

        let variance = data.iter().map(|&x| (x - mean).powi(2)).sum::<f32>() / data.len() as f32;
        variance.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_detection() {
        let detector = PulseDetector::new(512, 0.1);
        let energies = [0.0, 0.5, 0.2, 0.05, 0.08, 0.04, 0.9, 0.9, 0.3];
        // 0.08 is a local max but under the threshold; the 0.9 plateau is not strict
        assert_eq!(detector.detect_peaks(&energies), vec![1]);
    }

    #[test]
    fn test_regular_pulses() {
        let frame = 512;
        let sample_rate = 44100;
        let mut samples = Vec::new();
        // A loud frame every 20 frames
        for i in 0..200 {
            let amplitude = if i % 20 == 10 { 0.8 } else { 0.05 };
            samples.extend(std::iter::repeat(amplitude).take(frame));
        }

        let stats = PulseDetector::new(frame, 0.1).analyze(&samples, sample_rate);
        assert_eq!(stats.pulse_count, 10);
        assert!((stats.regularity - 1.0).abs() < 1e-6);

        let expected_bpm = 60.0 / (20.0 * frame as f32 / sample_rate as f32);
        assert!((stats.tempo_bpm - expected_bpm).abs() < 0.01);
    }

    #[test]
    fn test_irregular_pulses_lower_regularity() {
        let frame = 512;
        let mut samples = Vec::new();
        let pulse_frames = [5, 8, 30, 33, 70, 120];
        for i in 0..130 {
            let amplitude = if pulse_frames.contains(&i) { 0.8 } else { 0.05 };
            samples.extend(std::iter::repeat(amplitude).take(frame));
        }

        let stats = PulseDetector::new(frame, 0.1).analyze(&samples, 44100);
        assert_eq!(stats.pulse_count, 6);
        assert!(stats.regularity < 0.7);
        assert!(stats.regularity >= 0.0);
    }

    #[test]
    fn test_silence_has_no_rhythm() {
        let stats = PulseDetector::new(512, 0.1).analyze(&vec![0.0; 44100], 44100);
        assert_eq!(stats, RhythmStats::default());

        let stats = PulseDetector::new(512, 0.1).analyze(&[], 44100);
        assert_eq!(stats.pulse_count, 0);
    }

    #[test]
    fn test_frame_energy_is_absolute() {
        let detector = PulseDetector::new(4, 0.1);
        let energies = detector.frame_energies(&[0.5, 0.5, 0.5, 0.5, 0.1, 0.1]);
        assert_eq!(energies.len(), 2);
        assert!((energies[0] - 1.0).abs() < 1e-6);
        assert!((energies[1] - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_low_level_noise_has_no_pulses() {
        let sample_rate = 44100;
        // Deterministic hiss in [-0.005, 0.005]
        let mut state: u32 = 12345;
        let noise: Vec<f32> = (0..3 * sample_rate)
            .map(|_| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                ((state >> 8) as f32 / (1u32 << 24) as f32 - 0.5) * 0.01
            })
            .collect();

        let stats = PulseDetector::new(512, 0.1).analyze(&noise, sample_rate as u32);
        assert_eq!(stats.pulse_count, 0);
        assert_eq!(stats.regularity, 0.0);
        assert_eq!(stats.tempo_bpm, 0.0);
    }

    #[test]
    fn test_single_pulse_defaults() {
        let mut samples = vec![0.0; 512 * 10];
        for s in samples[512 * 4..512 * 5].iter_mut() {
            *s = 0.7;
        }
        let stats = PulseDetector::new(512, 0.1).analyze(&samples, 44100);
        assert_eq!(stats.pulse_count, 1);
        assert_eq!(stats.regularity, 0.0);
        assert_eq!(stats.tempo_bpm, 0.0);
    }
}
