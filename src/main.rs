use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cry_analyzer::audio::capture::encode_wav;
use cry_analyzer::audio::decoder::media_type_for_extension;
use cry_analyzer::audio::MicrophoneCapture;
use cry_analyzer::{report, AnalysisResult, AnalyzerConfig, CryAnalyzer};

#[derive(Parser)]
#[command(name = "cry-analyzer")]
#[command(about = "Analyze infant cry recordings and explain the most likely need")]
struct Args {
    /// Analyzer parameters as JSON (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze an audio file (WAV, MP3, M4A)
    Analyze {
        /// Recording to analyze
        file: PathBuf,

        /// Media type of the file; inferred from the extension when omitted
        #[arg(long)]
        media_type: Option<String>,

        /// Print the result as JSON instead of a report
        #[arg(long)]
        json: bool,

        /// Seed for the fallback estimator
        #[arg(long)]
        seed: Option<u32>,
    },

    /// Record from the default microphone, then analyze the recording
    Record {
        /// Recording length in seconds
        #[arg(long, default_value = "10")]
        seconds: u64,

        /// Also save the recording as WAV
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the result as JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// List every cry category with characteristics and caregiver tips
    Categories,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AnalyzerConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };

    match args.command {
        Command::Analyze {
            file,
            media_type,
            json,
            seed,
        } => {
            if seed.is_some() {
                config.fallback_seed = seed;
            }
            let media_type = media_type.unwrap_or_else(|| infer_media_type(&file).to_string());
            let bytes = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            info!("Analyzing {} ({} bytes, {})", file.display(), bytes.len(), media_type);

            let analyzer = CryAnalyzer::try_new(config)?;
            let result = analyzer.analyze(&bytes, &media_type).await;
            print_result(&result, json)?;
        }
        Command::Record { seconds, output, json } => {
            let capture = MicrophoneCapture::new()?;
            println!("Recording for {} seconds...", seconds);

            let sample = capture.record(Duration::from_secs(seconds), |levels| {
                let meter: String = levels.iter().map(|&l| level_glyph(l)).collect();
                eprint!("\r[{}]", meter);
                let _ = std::io::stderr().flush();
            })?;
            eprintln!();

            let bytes = encode_wav(&sample)?;
            if let Some(path) = &output {
                std::fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
                info!("Saved recording to {}", path.display());
            }

            let analyzer = CryAnalyzer::try_new(config)?;
            let result = analyzer.analyze(&bytes, "audio/wav").await;
            print_result(&result, json)?;
        }
        Command::Categories => {
            print!("{}", report::render_catalog());
        }
    }

    Ok(())
}

fn infer_media_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(media_type_for_extension)
        .unwrap_or("application/octet-stream")
}

fn print_result(result: &AnalysisResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print!("{}", report::render(result));
    }
    Ok(())
}

fn level_glyph(level: f32) -> char {
    const GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    let index = (level.clamp(0.0, 1.0) * (GLYPHS.len() - 1) as f32).round() as usize;
    GLYPHS[index.min(GLYPHS.len() - 1)]
}
