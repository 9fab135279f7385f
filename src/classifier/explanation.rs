use rand::Rng;

use super::CryCategory;
use crate::audio::FeatureVector;

/// Confidence above which the first caregiver tip is appended
const TIP_THRESHOLD: f32 = 0.6;

/// Verbal strength of a confidence value
pub fn confidence_band(confidence: f32) -> &'static str {
    if confidence > 0.75 {
        "high"
    } else if confidence > 0.60 {
        "moderate"
    } else {
        "possible"
    }
}

/// Turns a classification into caregiver-facing text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplanationGenerator;

impl ExplanationGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Feature-backed explanation for the DSP path
    pub fn explain(
        &self,
        primary: CryCategory,
        confidence: f32,
        features: &FeatureVector,
        duration_secs: f32,
    ) -> String {
        let info = primary.info();
        let mut text = format!(
            "In this {:.1}-second recording, the cry shows {} indicators of a {} cry. {} \
             I detected {}, which is typically associated with this type of cry.",
            duration_secs,
            confidence_band(confidence),
            info.title.to_lowercase(),
            info.description,
            Self::callout(primary, features),
        );
        Self::append_tip(&mut text, primary, confidence);
        text
    }

    /// Coarser explanation when no features are available
    pub fn explain_fallback<R: Rng + ?Sized>(
        &self,
        primary: CryCategory,
        confidence: f32,
        duration_secs: f32,
        rng: &mut R,
    ) -> String {
        let info = primary.info();
        let characteristic = if info.characteristics.is_empty() {
            "a pattern typical of this category".to_string()
        } else {
            info.characteristics[rng.gen_range(0..info.characteristics.len())].to_lowercase()
        };
        let mut text = format!(
            "In this {:.1}-second recording, the cry shows {} indicators of a {} cry. {} \
             Based on the recording, the cry may show {}.",
            duration_secs,
            confidence_band(confidence),
            info.title.to_lowercase(),
            info.description,
            characteristic,
        );
        Self::append_tip(&mut text, primary, confidence);
        text
    }

    fn append_tip(text: &mut String, primary: CryCategory, confidence: f32) {
        if confidence <= TIP_THRESHOLD {
            return;
        }
        if let Some(tip) = primary.info().caregiver_tips.first() {
            text.push_str(&format!(" Tip: {}.", tip));
        }
    }

    fn callout(primary: CryCategory, features: &FeatureVector) -> String {
        let rhythm = &features.rhythm;
        let intensity = &features.intensity;
        match primary {
            CryCategory::Hungry => {
                if rhythm.regularity > 0.7 {
                    format!(
                        "rhythmic pulses at about {:.0} beats per minute with {:.0}% regularity",
                        rhythm.tempo_bpm,
                        rhythm.regularity * 100.0
                    )
                } else {
                    "intensity building steadily over the recording".to_string()
                }
            }
            CryCategory::BellyPain => format!(
                "a high pitch around {:.0} Hz with a dynamic range of {:.2}",
                features.pitch_hz, intensity.dynamic_range
            ),
            CryCategory::Burping => format!(
                "short grunting bursts ({} pulses) around {:.0} Hz",
                rhythm.pulse_count, features.pitch_hz
            ),
            CryCategory::Discomfort => format!(
                "an uneven pattern with only {:.0}% rhythmic regularity",
                rhythm.regularity * 100.0
            ),
            CryCategory::ColdHot => format!("a sustained pitch near {:.0} Hz", features.pitch_hz),
            CryCategory::Laugh => format!(
                "bouncing bursts at about {:.0} beats per minute",
                rhythm.tempo_bpm
            ),
            CryCategory::Lonely => {
                if intensity.growth_trend > 0.0 {
                    "a soft cry that builds when left unanswered".to_string()
                } else {
                    "soft whimpers with pauses between them".to_string()
                }
            }
            CryCategory::Noise => "broadband sound with no clear pitch center".to_string(),
            CryCategory::Scared => format!("a sudden loud onset (RMS level {:.2})", intensity.rms),
            CryCategory::Silence => format!("very little energy in the signal (RMS level {:.3})", intensity.rms),
            CryCategory::Tired => format!(
                "a low-energy whiny tone around {:.0} Hz",
                features.pitch_hz
            ),
        }
    }
}
