use log::debug;
use std::sync::Arc;

use super::profiles::{CategoryProfile, PatternFlags, ProfileTable};
use super::{CategoryMap, CryCategory, Distribution, ScoreMap};
use crate::audio::spectral_shape::cosine_similarity;
use crate::audio::FeatureVector;
use crate::config::ScoringWeights;

/// Partial credit given whenever a sub-score's condition does not hold
const PARTIAL_CREDIT: f32 = 0.5;
const REGULARITY_THRESHOLD: f32 = 0.7;
const LOUD_RMS: f32 = 0.3;
const QUIET_RMS: f32 = 0.2;

/// Per-profile sub-scores before weighting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub pitch: f32,
    pub rhythm: f32,
    pub intensity: f32,
    pub spectral: f32,
}

/// Compares features against the injected profile table.
///
/// Scoring never fails: degenerate input falls back to a uniform distribution.
#[derive(Debug, Clone)]
pub struct Scorer {
    profiles: Arc<ProfileTable>,
    weights: ScoringWeights,
}

impl Scorer {
    pub fn new(profiles: Arc<ProfileTable>, weights: ScoringWeights) -> Self {
        Self { profiles, weights }
    }

    pub fn profiles(&self) -> &ProfileTable {
        &self.profiles
    }

    pub fn sub_scores(features: &FeatureVector, profile: &CategoryProfile) -> SubScores {
        let flags = profile.flags;
        let rhythm = &features.rhythm;
        let intensity = &features.intensity;

        let pitch = if profile.pitch_matches(features.pitch_hz) {
            1.0
        } else {
            PARTIAL_CREDIT
        };

        let rhythmic_match = flags.contains(PatternFlags::RHYTHMIC) && rhythm.regularity > REGULARITY_THRESHOLD;
        let buildup_match = flags.contains(PatternFlags::BUILDUP) && intensity.growth_trend > 0.0;
        let rhythm_score = if rhythmic_match || buildup_match {
            1.0
        } else {
            PARTIAL_CREDIT
        };

        let growth_match = flags.contains(PatternFlags::INTENSITY_GROWTH) && intensity.growth_trend > 0.0;
        let sudden_match = flags.contains(PatternFlags::SUDDEN_INTENSITY) && intensity.rms > LOUD_RMS;
        let quiet_match = flags.contains(PatternFlags::LOW_ENERGY) && intensity.rms < QUIET_RMS;
        let intensity_score = if growth_match || sudden_match || quiet_match {
            1.0
        } else {
            PARTIAL_CREDIT
        };

        SubScores {
            pitch,
            rhythm: rhythm_score,
            intensity: intensity_score,
            spectral: cosine_similarity(&features.spectral_shape, &profile.reference_shape),
        }
    }

    fn weighted(&self, sub: SubScores) -> f32 {
        let w = self.weights;
        let raw = w.pitch * sub.pitch + w.rhythm * sub.rhythm + w.intensity * sub.intensity + w.spectral * sub.spectral;
        if raw.is_finite() {
            raw.max(0.0)
        } else {
            0.0
        }
    }

    /// Raw score for every category; categories without a profile score 0
    pub fn score(&self, features: &FeatureVector) -> ScoreMap {
        let mut scores = ScoreMap::default();
        for profile in self.profiles.profiles() {
            let sub = Self::sub_scores(features, profile);
            scores[profile.category] = self.weighted(sub);
            debug!(
                "{}: pitch={:.2} rhythm={:.2} intensity={:.2} spectral={:.3} -> {:.4}",
                profile.category, sub.pitch, sub.rhythm, sub.intensity, sub.spectral, scores[profile.category]
            );
        }
        scores
    }

    /// Scale raw scores to sum to 1; uniform when the total is not positive
    pub fn normalize(scores: &ScoreMap) -> Distribution {
        let total = scores.total();
        if total <= 0.0 || !total.is_finite() {
            return CategoryMap::from_fn(|_| 1.0 / CryCategory::COUNT as f32);
        }
        CategoryMap::from_fn(|c| scores[c] / total)
    }

    /// Score, normalize and pick the primary category with its confidence
    pub fn classify(&self, features: &FeatureVector) -> (ScoreMap, Distribution, CryCategory, f32) {
        let scores = self.score(features);
        let distribution = Self::normalize(&scores);
        let primary = distribution.argmax();
        let confidence = distribution[primary];
        (scores, distribution, primary, confidence)
    }
}
