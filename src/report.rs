//! Plain-text presentation of analysis results and the category catalog.

use std::fmt::Write as _;

use crate::classifier::{AnalysisResult, AnalysisSource, CryCategory, Distribution};

/// `0.734` -> `"73%"`
pub fn format_percent(value: f32) -> String {
    format!("{}%", (value * 100.0).round() as i32)
}

/// Distribution entries, highest probability first
pub fn sorted_distribution(distribution: &Distribution) -> Vec<(CryCategory, f32)> {
    distribution.sorted_desc()
}

pub fn render(result: &AnalysisResult) -> String {
    let info = result.primary.info();
    let mut out = String::new();

    let _ = writeln!(out, "Primary: {} ({})", info.title, format_percent(result.confidence));
    if result.source == AnalysisSource::Fallback {
        let _ = writeln!(out, "(estimated without acoustic features)");
    }
    let _ = writeln!(out, "Duration: {:.1} s", result.duration_secs);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", result.explanation);
    let _ = writeln!(out);

    let _ = writeln!(out, "Distribution:");
    for (category, value) in sorted_distribution(&result.distribution) {
        let _ = writeln!(out, "  {:<18} {:>4}  {}", category.info().title, format_percent(value), bar(value));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Characteristics:");
    for line in info.characteristics {
        let _ = writeln!(out, "  - {}", line);
    }
    let _ = writeln!(out, "Caregiver tips:");
    for line in info.caregiver_tips {
        let _ = writeln!(out, "  - {}", line);
    }
    out
}

/// Every category with its description, characteristics and tips
pub fn render_catalog() -> String {
    let mut out = String::new();
    for category in CryCategory::ALL {
        let info = category.info();
        let _ = writeln!(out, "{} [{}]", info.title, category);
        let _ = writeln!(out, "  {}", info.description);
        for line in info.characteristics {
            let _ = writeln!(out, "  * {}", line);
        }
        for line in info.caregiver_tips {
            let _ = writeln!(out, "  > {}", line);
        }
        let _ = writeln!(out);
    }
    out
}

fn bar(value: f32) -> String {
    "#".repeat((value.clamp(0.0, 1.0) * 30.0).round() as usize)
}
