use bitflags::bitflags;

use super::CryCategory;
use crate::audio::spectral_shape::reference_shape;
use crate::config::AnalyzerConfig;

bitflags! {
    /// Acoustic patterns a category is expected to show
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PatternFlags: u16 {
        const RHYTHMIC = 1 << 0;
        const SUDDEN_ONSET = 1 << 1;
        const SUSTAINED = 1 << 2;
        const LOW_ENERGY = 1 << 3;
        const BUILDUP = 1 << 4;
        const AGITATED = 1 << 5;
        const INTENSITY_GROWTH = 1 << 6;
        const SUDDEN_INTENSITY = 1 << 7;
    }
}

/// Expected acoustic signature of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryProfile {
    pub category: CryCategory,
    pub pitch_range: (f32, f32),
    pub flags: PatternFlags,
    pub reference_shape: Vec<f32>,
}

impl CategoryProfile {
    pub fn pitch_matches(&self, pitch_hz: f32) -> bool {
        pitch_hz >= self.pitch_range.0 && pitch_hz <= self.pitch_range.1
    }
}

/// Immutable set of reference profiles, built once and shared by every analysis.
///
/// A table may cover only some categories; categories without a profile score 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileTable {
    profiles: Vec<CategoryProfile>,
}

/// (category, pitch range, flags, expected RMS, spectral peaks as (Hz, weight))
type ProfileSpec = (CryCategory, (f32, f32), PatternFlags, f32, &'static [(f32, f32)]);

const CANONICAL: [ProfileSpec; CryCategory::COUNT] = [
    (
        CryCategory::Hungry,
        (300.0, 600.0),
        PatternFlags::RHYTHMIC.union(PatternFlags::BUILDUP).union(PatternFlags::INTENSITY_GROWTH),
        0.4,
        &[(450.0, 0.7), (900.0, 0.3)],
    ),
    (
        CryCategory::BellyPain,
        (600.0, 1200.0),
        PatternFlags::SUDDEN_ONSET
            .union(PatternFlags::SUSTAINED)
            .union(PatternFlags::SUDDEN_INTENSITY)
            .union(PatternFlags::AGITATED),
        0.6,
        &[(850.0, 0.6), (1700.0, 0.4)],
    ),
    (
        CryCategory::Burping,
        (150.0, 350.0),
        PatternFlags::RHYTHMIC.union(PatternFlags::SUDDEN_ONSET),
        0.3,
        &[(250.0, 0.6), (2500.0, 0.4)],
    ),
    (
        CryCategory::Discomfort,
        (500.0, 900.0),
        PatternFlags::AGITATED.union(PatternFlags::SUSTAINED).union(PatternFlags::SUDDEN_INTENSITY),
        0.35,
        &[(650.0, 0.5), (1300.0, 0.3), (3000.0, 0.2)],
    ),
    (
        CryCategory::ColdHot,
        (400.0, 800.0),
        PatternFlags::SUSTAINED.union(PatternFlags::LOW_ENERGY),
        0.15,
        &[(600.0, 1.0)],
    ),
    (
        CryCategory::Laugh,
        (800.0, 2000.0),
        PatternFlags::RHYTHMIC.union(PatternFlags::SUDDEN_ONSET),
        0.3,
        &[(1200.0, 0.6), (2400.0, 0.4)],
    ),
    (
        CryCategory::Lonely,
        (200.0, 400.0),
        PatternFlags::BUILDUP.union(PatternFlags::LOW_ENERGY),
        0.12,
        &[(350.0, 0.6), (700.0, 0.4)],
    ),
    (
        CryCategory::Noise,
        (1000.0, 8000.0),
        PatternFlags::SUSTAINED,
        0.2,
        &[],
    ),
    (
        CryCategory::Scared,
        (700.0, 1600.0),
        PatternFlags::SUDDEN_ONSET
            .union(PatternFlags::SUDDEN_INTENSITY)
            .union(PatternFlags::AGITATED),
        0.55,
        &[(1100.0, 0.7), (2200.0, 0.3)],
    ),
    (
        CryCategory::Silence,
        (0.0, 80.0),
        PatternFlags::LOW_ENERGY.union(PatternFlags::SUSTAINED),
        0.01,
        &[(40.0, 1.0)],
    ),
    (
        CryCategory::Tired,
        (200.0, 400.0),
        PatternFlags::LOW_ENERGY.union(PatternFlags::SUSTAINED),
        0.15,
        &[(300.0, 0.8), (600.0, 0.2)],
    ),
];

impl ProfileTable {
    pub fn new(profiles: Vec<CategoryProfile>) -> Self {
        Self { profiles }
    }

    /// The built-in eleven-category table, with reference shapes sized for `config`
    pub fn canonical(config: &AnalyzerConfig) -> Self {
        let profiles = CANONICAL
            .iter()
            .map(|&(category, pitch_range, flags, rms, peaks)| CategoryProfile {
                category,
                pitch_range,
                flags,
                reference_shape: reference_shape(rms, peaks, config.shape_coefficients, config.shape_max_hz),
            })
            .collect();

        Self { profiles }
    }

    pub fn profiles(&self) -> &[CategoryProfile] {
        &self.profiles
    }

    pub fn get(&self, category: CryCategory) -> Option<&CategoryProfile> {
        self.profiles.iter().find(|p| p.category == category)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::canonical(&AnalyzerConfig::default())
    }
}
