use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use phonoscore::audio::decoder;
use phonoscore::{parse_sequence, DurationPriors, PipelineConfig, ScoringPipeline};

/// Phonoscore - phoneme-level pronunciation scoring
///
/// Scores a recorded attempt at a target sentence against reference phoneme
/// fingerprints and prints the result as JSON.
#[derive(Parser, Debug)]
#[command(name = "phonoscore")]
#[command(version)]
#[command(about = "Score a recording against a target phoneme sequence", long_about = None)]
struct Args {
    /// Input audio file (any format symphonia can decode: WAV, MP3, FLAC, ...)
    #[arg(value_name = "INPUT")]
    input_file: PathBuf,

    /// Target phoneme sequence, whitespace-separated ARPABET symbols
    /// (e.g. "DH AH K AE T"), as produced by the G2P collaborator
    #[arg(long, value_name = "PHONEMES")]
    phonemes: String,

    /// Weight segment durations by phonetic class (vowels longer than stops)
    /// instead of uniform division
    #[arg(long)]
    phonetic_priors: bool,

    /// Explicit comma-separated duration weights, one per phoneme
    #[arg(long, value_name = "WEIGHTS", conflicts_with = "phonetic_priors")]
    prior_weights: Option<String>,

    /// Optional pipeline configuration overrides (JSON file)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the JSON result here instead of stdout
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

impl Args {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {:?}", path))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("failed to parse config file {:?}", path))
            }
            None => Ok(PipelineConfig::default()),
        }
    }

    fn priors(&self) -> Result<Option<DurationPriors>> {
        if self.phonetic_priors {
            return Ok(Some(DurationPriors::Phonetic));
        }
        match &self.prior_weights {
            Some(raw) => {
                let weights = raw
                    .split(',')
                    .map(|token| {
                        token
                            .trim()
                            .parse::<f32>()
                            .with_context(|| format!("invalid prior weight '{}'", token.trim()))
                    })
                    .collect::<Result<Vec<f32>>>()?;
                Ok(Some(DurationPriors::Explicit(weights)))
            }
            None => Ok(None),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let phonemes = parse_sequence(&args.phonemes).context("failed to parse phoneme sequence")?;
    let priors = args.priors()?;
    let config = args.pipeline_config()?;

    let raw = decoder::decode_file(&args.input_file)
        .with_context(|| format!("failed to decode {:?}", args.input_file))?;

    let pipeline = ScoringPipeline::new(config).context("failed to build scoring pipeline")?;
    let result = pipeline
        .score_utterance(&raw, &phonemes, priors.as_ref())
        .context("scoring failed")?;

    let json = serde_json::to_string_pretty(&result).context("failed to serialize result")?;
    match &args.output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("failed to write result to {:?}", path))?,
        None => println!("{json}"),
    }
    Ok(())
}
