use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use emoharmony_core::analysis::features::Band;
use emoharmony_core::error::{log_signal_error, ErrorCode};
use emoharmony_core::{AnalysisPipeline, EegSignal, ModelRegistry, PipelineConfig};
use serde::{Deserialize, Serialize};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    name = "emoharmony_cli",
    about = "Offline EEG emotion analysis harness for EmoHarmony"
)]
struct Cli {
    /// Log at DEBUG level (logs go to stderr)
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a signal request file and print the report as JSON
    Analyze {
        #[arg(long)]
        input: PathBuf,
        /// Overrides the request's modelType
        #[arg(long)]
        strategy: Option<String>,
        /// Overrides config.models.models_dir
        #[arg(long)]
        models_dir: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List selectable models and whether a trained artifact is loaded
    Models {
        #[arg(long)]
        models_dir: Option<PathBuf>,
    },
    /// Print the frequency band table
    Bands,
}

/// Signal payload: a flat (optionally interleaved) array or one array per channel
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum SignalPayload {
    Flat(Vec<f64>),
    Channels(Vec<Vec<f64>>),
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SignalRequest {
    signal: SignalPayload,
    sampling_rate: Option<f64>,
    model_type: Option<String>,
    channels: Option<usize>,
}

#[derive(Serialize)]
struct ErrorPayload {
    code: i32,
    message: String,
}

#[derive(Serialize)]
struct BandPayload {
    name: &'static str,
    low_hz: f64,
    high_hz: f64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Analyze {
            input,
            strategy,
            models_dir,
            config,
            output,
        } => run_analyze(&input, strategy, models_dir, config, output),
        Commands::Models { models_dir } => run_models(models_dir),
        Commands::Bands => run_bands(),
    }
}

fn run_analyze(
    input: &Path,
    strategy: Option<String>,
    models_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
) -> Result<ExitCode> {
    let mut config = config_path
        .map(PipelineConfig::load_from_file)
        .unwrap_or_default();
    if models_dir.is_some() {
        config.models.models_dir = models_dir;
    }

    let contents =
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let request: SignalRequest = serde_json::from_str(&contents)
        .with_context(|| format!("parsing signal request {}", input.display()))?;

    let sampling_rate = request.sampling_rate.unwrap_or(config.sampling_rate);
    let signal = match request.signal {
        SignalPayload::Flat(samples) => match request.channels.unwrap_or(1) {
            1 => EegSignal::single(samples, sampling_rate),
            n => EegSignal::from_interleaved(&samples, n, sampling_rate),
        },
        SignalPayload::Channels(channels) => EegSignal::new(channels, sampling_rate),
    };

    let pipeline = AnalysisPipeline::from_config(config);
    let requested = strategy.or(request.model_type);
    let analyzed =
        signal.and_then(|signal| pipeline.analyze_requested(&signal, requested.as_deref()));
    let report = match analyzed {
        Ok(report) => report,
        Err(err) => {
            log_signal_error(&err, "emoharmony_cli analyze");
            let payload = ErrorPayload {
                code: err.code(),
                message: err.message(),
            };
            eprintln!("{}", serde_json::to_string_pretty(&payload)?);
            return Ok(ExitCode::from(2));
        }
    };

    let json = serde_json::to_string_pretty(&report)?;
    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    Ok(ExitCode::from(0))
}

fn run_models(models_dir: Option<PathBuf>) -> Result<ExitCode> {
    let registry = match models_dir {
        Some(dir) => ModelRegistry::load_from_dir(dir),
        None => ModelRegistry::empty(),
    };
    println!("{}", serde_json::to_string_pretty(&registry.status())?);
    Ok(ExitCode::from(0))
}

fn run_bands() -> Result<ExitCode> {
    let bands: Vec<BandPayload> = Band::ALL
        .iter()
        .map(|&band| {
            let (low_hz, high_hz) = band.range();
            BandPayload {
                name: band.name(),
                low_hz,
                high_hz,
            }
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&bands)?);
    Ok(ExitCode::from(0))
}
