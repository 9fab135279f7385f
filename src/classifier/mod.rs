pub mod catalog;
pub mod explanation;
pub mod fallback;
pub mod profiles;
pub mod rng;
pub mod scorer;

pub use catalog::CategoryInfo;
pub use explanation::{confidence_band, ExplanationGenerator};
pub use fallback::FallbackEstimator;
pub use profiles::{CategoryProfile, PatternFlags, ProfileTable};
pub use scorer::Scorer;

use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Need categories a cry can be attributed to, in declaration order.
///
/// Declaration order is significant: it breaks exact ties when picking the
/// primary category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CryCategory {
    Hungry,
    BellyPain,
    Burping,
    Discomfort,
    ColdHot,
    Laugh,
    Lonely,
    Noise,
    Scared,
    Silence,
    Tired,
}

impl CryCategory {
    pub const COUNT: usize = 11;

    pub const ALL: [CryCategory; CryCategory::COUNT] = [
        CryCategory::Hungry,
        CryCategory::BellyPain,
        CryCategory::Burping,
        CryCategory::Discomfort,
        CryCategory::ColdHot,
        CryCategory::Laugh,
        CryCategory::Lonely,
        CryCategory::Noise,
        CryCategory::Scared,
        CryCategory::Silence,
        CryCategory::Tired,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CryCategory::Hungry => "hungry",
            CryCategory::BellyPain => "belly_pain",
            CryCategory::Burping => "burping",
            CryCategory::Discomfort => "discomfort",
            CryCategory::ColdHot => "cold_hot",
            CryCategory::Laugh => "laugh",
            CryCategory::Lonely => "lonely",
            CryCategory::Noise => "noise",
            CryCategory::Scared => "scared",
            CryCategory::Silence => "silence",
            CryCategory::Tired => "tired",
        }
    }

    pub fn info(self) -> &'static CategoryInfo {
        catalog::info(self)
    }
}

impl fmt::Display for CryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `f32` per category, stored in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryMap([f32; CryCategory::COUNT]);

impl CategoryMap {
    pub fn from_fn(f: impl Fn(CryCategory) -> f32) -> Self {
        let mut values = [0.0; CryCategory::COUNT];
        for category in CryCategory::ALL {
            values[category.index()] = f(category);
        }
        Self(values)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CryCategory, f32)> + '_ {
        CryCategory::ALL.iter().map(move |&c| (c, self.0[c.index()]))
    }

    pub fn values(&self) -> &[f32; CryCategory::COUNT] {
        &self.0
    }

    pub fn total(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Highest-valued category; the first declared wins exact ties
    pub fn argmax(&self) -> CryCategory {
        let mut best = CryCategory::ALL[0];
        for category in CryCategory::ALL.iter().skip(1) {
            if self[*category] > self[best] {
                best = *category;
            }
        }
        best
    }

    /// Entries sorted by value, highest first; ties keep declaration order
    pub fn sorted_desc(&self) -> Vec<(CryCategory, f32)> {
        let mut entries: Vec<(CryCategory, f32)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));
        entries
    }
}

impl Index<CryCategory> for CategoryMap {
    type Output = f32;

    fn index(&self, category: CryCategory) -> &f32 {
        &self.0[category.index()]
    }
}

impl IndexMut<CryCategory> for CategoryMap {
    fn index_mut(&mut self, category: CryCategory) -> &mut f32 {
        &mut self.0[category.index()]
    }
}

impl Serialize for CategoryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(c, v)| (c.as_str(), v)))
    }
}

/// Raw, unnormalized score per category
pub type ScoreMap = CategoryMap;

/// Probability per category; always sums to 1 within floating tolerance
pub type Distribution = CategoryMap;

/// Which path produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Features,
    Fallback,
}

/// Final answer handed back to the caller.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AnalysisResult {
    pub primary: CryCategory,
    pub confidence: f32,
    pub distribution: Distribution,
    pub explanation: String,
    pub source: AnalysisSource,
    pub duration_secs: f32,
}
