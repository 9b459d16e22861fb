//! Thin CLI around the analysis pipeline: decode a WAV file, print the
//! biomarkers and risk assessment. Presentation only; all analysis lives in
//! the library.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use voicemarkers::{analyze_wav_bytes, AnalysisConfig, RiskCategory};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Profile {
    /// Sustained-vowel recordings ("say aaah"), 10s cap, ZCR-variance metric
    Sustained,
    /// Free conversational speech, 30s cap, pitch-variability metric
    Conversational,
}

/// Extract acoustic voice biomarkers from a recording and apply a
/// threshold-based risk screen. Prototype; not a diagnostic device.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a WAV file to analyze
    input: PathBuf,

    /// Path to a JSON analysis configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in configuration profile (ignored when --config is given)
    #[arg(short, long, value_enum)]
    profile: Option<Profile>,

    /// Override the risk threshold
    #[arg(long)]
    risk_threshold: Option<f32>,

    /// Override the maximum processed duration in seconds
    #[arg(long)]
    max_seconds: Option<f32>,

    /// Print the full report as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let mut config = match (&args.config, args.profile) {
        (Some(path), _) => AnalysisConfig::from_json_file(path)?,
        (None, Some(Profile::Sustained)) => AnalysisConfig::sustained_vowel(),
        (None, Some(Profile::Conversational)) => AnalysisConfig::conversational(),
        (None, None) => AnalysisConfig::default(),
    };
    if let Some(threshold) = args.risk_threshold {
        config.classifier.risk_threshold = threshold;
    }
    if let Some(secs) = args.max_seconds {
        config.max_duration_secs = secs;
    }

    info!(input = ?args.input, "reading audio file");
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {:?}", args.input))?;

    let report = analyze_wav_bytes(&bytes, &config)
        .with_context(|| format!("analysis failed for {:?}", args.input))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let bio = &report.biomarkers;
    println!("--- Biomarkers ---");
    println!("Average pitch:     {:.2} Hz", bio.average_pitch);
    println!("Pitch std dev:     {:.2} Hz", bio.pitch_stddev);
    println!("Voiced frames:     {:.0}%", bio.voiced_ratio * 100.0);
    println!("Roughness score:   {:.2}", bio.roughness_score);
    match bio.spectral_centroid {
        Some(c) => println!("Spectral centroid: {:.0} Hz", c),
        None => println!("Spectral centroid: n/a"),
    }
    println!(
        "Spectrogram:       {} bands x {} frames (peak {:.1} dB)",
        report.spectrogram.n_bands,
        report.spectrogram.n_frames(),
        report.spectrogram.max_db()
    );

    println!("\n--- Risk Assessment ---");
    let label = match report.risk.category {
        RiskCategory::Inconclusive => "INCONCLUSIVE",
        RiskCategory::Normal => "NORMAL",
        RiskCategory::Elevated => "ELEVATED",
    };
    println!("Status:         {} (score {:.2})", label, report.risk.score);
    println!("Recommendation: {}", report.risk.recommendation);

    Ok(())
}
