//! Compact spectral fingerprint used for profile matching.
//!
//! Element 0 carries overall RMS energy. Elements `1..K` are cosine projections
//! of the normalized magnitude distribution over `0..max_hz`:
//! `c[k] = Σ p(f) · cos(π·k·f / max_hz)`. A pure tone at `f0` therefore maps to
//! `cos(π·k·f0 / max_hz)`, which is how reference shapes are authored.
//!
//! This is not a cepstral transform; the only contract is that the vector is
//! deterministic, fixed-length and comparable by cosine similarity.

/// Project an averaged magnitude spectrum onto `num_coefficients` shape elements
pub fn spectral_shape(
    spectrum: &[f32],
    sample_rate: u32,
    rms: f32,
    num_coefficients: usize,
    max_hz: f32,
) -> Vec<f32> {
    let mut shape = vec![0.0f32; num_coefficients];
    if num_coefficients == 0 {
        return shape;
    }
    shape[0] = rms;

    if spectrum.is_empty() || sample_rate == 0 {
        return shape;
    }

    let bin_hz = sample_rate as f32 / (2.0 * spectrum.len() as f32);
    let in_range: Vec<(f32, f32)> = spectrum
        .iter()
        .enumerate()
        .map(|(i, &magnitude)| (i as f32 * bin_hz, magnitude))
        .filter(|&(freq, _)| freq <= max_hz)
        .collect();

    let total: f32 = in_range.iter().map(|&(_, m)| m).sum();
    if total <= 0.0 || !total.is_finite() {
        return shape;
    }

    for (k, coefficient) in shape.iter_mut().enumerate().skip(1) {
        *coefficient = in_range
            .iter()
            .map(|&(freq, magnitude)| (magnitude / total) * projection(k, freq, max_hz))
            .sum();
    }
    shape
}

/// Reference shape for an expected energy and a set of weighted spectral peaks
pub fn reference_shape(rms: f32, peaks: &[(f32, f32)], num_coefficients: usize, max_hz: f32) -> Vec<f32> {
    let mut shape = vec![0.0f32; num_coefficients];
    if num_coefficients == 0 {
        return shape;
    }
    shape[0] = rms;

    let total_weight: f32 = peaks.iter().map(|&(_, w)| w).sum();
    if total_weight <= 0.0 {
        return shape;
    }

    for (k, coefficient) in shape.iter_mut().enumerate().skip(1) {
        *coefficient = peaks
            .iter()
            .map(|&(freq, weight)| (weight / total_weight) * projection(k, freq, max_hz))
            .sum();
    }
    shape
}

fn projection(k: usize, freq: f32, max_hz: f32) -> f32 {
    (std::f32::consts::PI * k as f32 * freq / max_hz).cos()
}

/// Cosine similarity over the overlapping prefix of two vectors.
///
/// Returns 0 when the overlap is empty, either prefix has zero norm, or the
/// result is not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }

    let (a, b) = (&a[..len], &b[..len]);
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a * norm_b);
    if similarity.is_finite() {
        similarity.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
