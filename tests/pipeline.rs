use approx::assert_relative_eq;
use std::f32::consts::PI;
use std::io::Cursor;

use cry_analyzer::{report, AnalysisSource, AnalyzerConfig, CryAnalyzer, CryCategory, FeatureExtractor, SignalDecoder};

const SAMPLE_RATE: u32 = 44100;

fn wav(samples: &[f32]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// 450 Hz tone whose amplitude rises from 0.1 to 0.9
fn rising_tone(seconds: f32) -> Vec<f32> {
    let total = (seconds * SAMPLE_RATE as f32) as usize;
    (0..total)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (0.1 + 0.8 * t / seconds) * (2.0 * PI * 450.0 * t).sin()
        })
        .collect()
}

fn garbage() -> Vec<u8> {
    b"definitely not an audio container, only plain text\n".repeat(80)
}

fn seeded(seed: u32) -> CryAnalyzer {
    CryAnalyzer::new(AnalyzerConfig {
        fallback_seed: Some(seed),
        ..AnalyzerConfig::default()
    })
}

#[tokio::test]
async fn rising_450hz_clip_reads_as_hunger() {
    let analyzer = CryAnalyzer::default();
    let result = analyzer.analyze(&wav(&rising_tone(3.0)), "audio/wav").await;

    assert_eq!(result.source, AnalysisSource::Features);
    assert_eq!(result.primary, CryCategory::Hungry);
    assert_eq!(result.primary, result.distribution.argmax());
    assert_eq!(result.confidence, result.distribution[CryCategory::Hungry]);
    assert_relative_eq!(result.distribution.total(), 1.0, epsilon = 1e-6);
    assert_relative_eq!(result.duration_secs, 3.0, epsilon = 1e-3);
    assert!(result.explanation.contains("3.0-second recording"));
    assert!(result.explanation.contains("hunger cry"));
}

#[tokio::test]
async fn garbage_bytes_still_produce_a_result() {
    for seed in [1, 2, 3, 42, 1000] {
        let result = seeded(seed).analyze(&garbage(), "audio/mpeg").await;

        assert_eq!(result.source, AnalysisSource::Fallback);
        assert_relative_eq!(result.distribution.total(), 1.0, epsilon = 1e-6);
        assert!((0.5..=0.8).contains(&result.confidence));
        assert_eq!(result.distribution[result.primary], result.confidence);
        // No WAV header to read, so the default duration applies
        assert_eq!(result.duration_secs, 10.0);
    }
}

#[tokio::test]
async fn seeded_fallback_is_reproducible() {
    let first = seeded(77).analyze(&garbage(), "").await;
    let second = seeded(77).analyze(&garbage(), "").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_input_falls_back() {
    let result = CryAnalyzer::default().analyze(&[], "audio/wav").await;
    assert_eq!(result.source, AnalysisSource::Fallback);
    assert_relative_eq!(result.distribution.total(), 1.0, epsilon = 1e-6);
}

#[test]
fn extraction_and_scoring_are_bit_identical() {
    let decoder = SignalDecoder::default();
    let sample = decoder.decode(&wav(&rising_tone(1.0)), "audio/wav").unwrap();

    let extractor = FeatureExtractor::default();
    let first = extractor.extract(&sample);
    let second = extractor.extract(&sample);
    assert_eq!(first, second);
    assert_eq!(first.pitch_hz.to_bits(), second.pitch_hz.to_bits());

    let analyzer = CryAnalyzer::default();
    let a = analyzer.analyze_blocking(&wav(&rising_tone(1.0)), "audio/wav");
    let b = analyzer.analyze_blocking(&wav(&rising_tone(1.0)), "audio/wav");
    assert!(a
        .distribution
        .values()
        .iter()
        .zip(b.distribution.values())
        .all(|(x, y)| x.to_bits() == y.to_bits()));
}

#[test]
fn result_serializes_and_renders() {
    let result = CryAnalyzer::default().analyze_blocking(&wav(&rising_tone(2.0)), "audio/wav");

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["source"], "features");
    assert_eq!(json["distribution"].as_object().unwrap().len(), CryCategory::COUNT);
    assert!(json["primary"].is_string());

    let text = report::render(&result);
    assert!(text.starts_with(&format!("Primary: {}", result.primary.info().title)));
    assert!(text.contains(&report::format_percent(result.confidence)));
}
