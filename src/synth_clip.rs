use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;
use rand::Rng;
use std::f32::consts::PI;
use std::path::PathBuf;

use cry_analyzer::classifier::rng::create_rng;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Pattern {
    /// 450 Hz bursts at two per second, getting louder
    Hungry,
    /// Loud sustained 900 Hz wail with harmonics
    Pain,
    /// Quiet 300 Hz whine that fades out
    Tired,
    /// Digital silence
    Silence,
    /// White noise
    Noise,
}

#[derive(Parser)]
#[command(name = "cry-synth")]
#[command(about = "Write synthetic cry-like WAV clips for exercising the analyzer")]
struct Args {
    /// Pattern to synthesize
    #[arg(value_enum)]
    pattern: Pattern,

    /// Output WAV file
    #[arg(short, long, default_value = "synthetic_cry.wav")]
    output: PathBuf,

    /// Clip length in seconds
    #[arg(long, default_value = "3.0")]
    seconds: f32,

    /// Sample rate in Hz
    #[arg(long, default_value = "44100")]
    sample_rate: u32,

    /// Seed for the noise pattern
    #[arg(long, default_value = "7")]
    seed: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let samples = synthesize(args.pattern, args.seconds, args.sample_rate, args.seed);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: args.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(&args.output, spec)?;
    for s in &samples {
        writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;

    info!(
        "Wrote {:?} pattern: {} samples ({:.1} s) to {}",
        args.pattern,
        samples.len(),
        args.seconds,
        args.output.display()
    );
    Ok(())
}

fn synthesize(pattern: Pattern, seconds: f32, sample_rate: u32, seed: u32) -> Vec<f32> {
    let total = (seconds.max(0.0) * sample_rate as f32) as usize;
    let mut rng = create_rng(seed);

    (0..total)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let progress = t / seconds;
            match pattern {
                Pattern::Hungry => {
                    // 0.35 s on, 0.15 s off
                    let gate = if (t % 0.5) < 0.35 { 1.0 } else { 0.0 };
                    let envelope = 0.2 + 0.7 * progress;
                    gate * envelope * (0.7 * (2.0 * PI * 450.0 * t).sin() + 0.3 * (2.0 * PI * 900.0 * t).sin())
                }
                Pattern::Pain => {
                    0.8 * (0.6 * (2.0 * PI * 900.0 * t).sin() + 0.4 * (2.0 * PI * 1800.0 * t).sin())
                }
                Pattern::Tired => 0.15 * (1.0 - 0.7 * progress) * (2.0 * PI * 300.0 * t).sin(),
                Pattern::Silence => 0.0,
                Pattern::Noise => rng.gen_range(-0.3..0.3),
            }
        })
        .collect()
}
