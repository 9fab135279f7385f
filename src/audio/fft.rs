use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Windowed magnitude spectrum over a whole clip.
///
/// The FFT plan and Hann window are built once; `&self` methods only allocate
/// per-call buffers, so one analyzer can serve concurrent analyses.
pub struct SpectrumAnalyzer {
    fft_size: usize,
    hop_size: usize,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
}

impl SpectrumAnalyzer {
    pub fn new(fft_size: usize, hop_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        let window = Self::hann_window(fft_size);

        Self {
            fft_size,
            hop_size: hop_size.max(1),
            fft,
            window,
        }
    }

    fn hann_window(size: usize) -> Vec<f32> {
        if size < 2 {
            return vec![1.0; size];
        }
        (0..size)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32;
                0.5 * (1.0 - phase.cos())
            })
            .collect()
    }

    /// Number of magnitude bins returned per spectrum
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Mean magnitude spectrum across all hop-spaced windows of the signal.
    ///
    /// Signals shorter than one window are analysed as a single zero-padded frame.
    pub fn average_spectrum(&self, audio_data: &[f32]) -> Vec<f32> {
        let mut accumulated = vec![0.0f32; self.num_bins()];
        if audio_data.is_empty() {
            return accumulated;
        }

        let mut frame_count = 0usize;
        let mut start = 0usize;
        loop {
            let end = (start + self.fft_size).min(audio_data.len());
            let spectrum = self.compute_fft(&self.apply_window(&audio_data[start..end]));
            for (acc, magnitude) in accumulated.iter_mut().zip(spectrum) {
                *acc += magnitude;
            }
            frame_count += 1;

            if start + self.fft_size >= audio_data.len() {
                break;
            }
            start += self.hop_size;
        }

        for value in accumulated.iter_mut() {
            *value /= frame_count as f32;
        }
        accumulated
    }

    fn apply_window(&self, audio_data: &[f32]) -> Vec<f32> {
        let len = self.fft_size.min(audio_data.len());
        (0..len).map(|i| audio_data[i] * self.window[i]).collect()
    }

    fn compute_fft(&self, windowed_data: &[f32]) -> Vec<f32> {
        let mut buffer: Vec<Complex<f32>> = windowed_data.iter().map(|&x| Complex::new(x, 0.0)).collect();

        if buffer.len() < self.fft_size {
            buffer.resize(self.fft_size, Complex::new(0.0, 0.0));
        }

        self.fft.process(&mut buffer);

        buffer[..self.num_bins()]
            .iter()
            .map(|c| c.norm() * 2.0 / self.fft_size as f32)
            .collect()
    }

    /// Split a spectrum into `num_bands` equal-width bands of mean magnitude
    pub fn energy_bands(spectrum: &[f32], num_bands: usize) -> Vec<f32> {
        let len = spectrum.len();
        (0..num_bands)
            .map(|band| {
                let start = band * len / num_bands;
                let end = (band + 1) * len / num_bands;
                Self::average_range(spectrum, start, end)
            })
            .collect()
    }

    fn average_range(data: &[f32], start: usize, end: usize) -> f32 {
        if start >= end || start >= data.len() {
            return 0.0;
        }

        let end = end.min(data.len());
        let sum: f32 = data[start..end].iter().sum();
        sum / (end - start) as f32
    }

    /// Frequency of the strongest bin, `bin * sample_rate / (2 * num_bins)`; 0 for a flat-zero spectrum
    pub fn dominant_frequency(spectrum: &[f32], sample_rate: u32) -> f32 {
        let mut best_bin = 0usize;
        let mut best_magnitude = 0.0f32;
        for (i, &magnitude) in spectrum.iter().enumerate() {
            if magnitude > best_magnitude {
                best_magnitude = magnitude;
                best_bin = i;
            }
        }

        if best_magnitude <= 0.0 || spectrum.is_empty() {
            return 0.0;
        }
        best_bin as f32 * sample_rate as f32 / (2.0 * spectrum.len() as f32)
    }
}
