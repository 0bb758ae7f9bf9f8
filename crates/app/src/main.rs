use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use lipsync_core::{
    CharacterCatalog, LipSyncConfig, PassthroughTranscriber, PhonemeTable, PhoneticTranscriber,
    Segment, Segmenter, Synthesizer,
};
use tracing_subscriber::EnvFilter;

fn main() -> lipsync_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Segment { ipa } => run_segment(&ipa),
        Commands::Timeline {
            ipa,
            duration,
            fps,
            config,
            format,
        } => run_timeline(&ipa, duration, fps, config.as_deref(), format),
        Commands::Assets {
            catalog,
            character,
            angle,
        } => run_assets(&catalog, &character, &angle),
    }
}

fn run_segment(ipa: &str) -> lipsync_core::Result<()> {
    let phonetic = PassthroughTranscriber.transcribe(ipa)?;
    let segments = Segmenter::new(PhonemeTable::global()).segment(&phonetic);
    tracing::info!(segments = segments.len(), "segmented transcription");

    for segment in &segments {
        match segment {
            Segment::Phoneme { symbol, viseme, .. } => println!("{symbol}\t{viseme}"),
            Segment::Pause { duration_ms } => println!(".\tpause {duration_ms}ms"),
        }
    }
    Ok(())
}

fn run_timeline(
    ipa: &str,
    duration: f64,
    fps: Option<f64>,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> lipsync_core::Result<()> {
    let mut config = match config_path {
        Some(path) => LipSyncConfig::from_path(path)?,
        None => LipSyncConfig::default(),
    };
    if let Some(fps) = fps {
        config = config.with_fps(fps);
    }
    config.validate()?;
    config.check_duration(duration)?;

    if duration <= 0.0 {
        tracing::warn!(duration, "non-positive duration, the timeline will be empty");
    }

    let phonetic = PassthroughTranscriber.transcribe(ipa)?;
    let segments = Segmenter::new(PhonemeTable::global())
        .with_pause_ms(config.pause_ms)
        .segment(&phonetic);
    let timeline = Synthesizer::new(&config).synthesize(segments, duration, config.fps);
    tracing::info!(
        frames = timeline.len(),
        ms_per_frame = timeline.ms_per_frame(),
        "generated timeline"
    );

    match format {
        OutputFormat::Frames => {
            for (index, viseme) in timeline.frames().iter().enumerate() {
                println!("{index}\t{viseme}");
            }
        }
        OutputFormat::Runs => {
            for run in timeline.runs() {
                let start_ms = run.start_frame as f64 * timeline.ms_per_frame();
                println!(
                    "{}\t{}\t{start_ms:.1}ms\t{}",
                    run.start_frame, run.frames, run.viseme
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&timeline)?);
        }
    }
    Ok(())
}

fn run_assets(catalog: &Path, character: &str, angle: &str) -> lipsync_core::Result<()> {
    let catalog = CharacterCatalog::load(catalog)?;
    for (viseme, path) in catalog.viseme_assets(character, angle)? {
        println!("{viseme}\t{}", path.display());
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Phoneme to viseme lip sync timelines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split an IPA transcription into phoneme and pause segments.
    Segment {
        /// IPA transcription, sentences separated by `.`.
        ipa: String,
    },
    /// Build the per-frame viseme timeline for an audio clip.
    Timeline {
        /// IPA transcription, sentences separated by `.`.
        ipa: String,
        /// Length of the audio clip in seconds.
        #[arg(short, long)]
        duration: f64,
        /// Frames per second, overrides the config file.
        #[arg(short, long)]
        fps: Option<f64>,
        /// JSON file with timing settings.
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Runs)]
        format: OutputFormat,
    },
    /// List the artwork a renderer needs for one character angle.
    Assets {
        /// Path to `characters.json`.
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long)]
        character: String,
        #[arg(long)]
        angle: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One line per frame.
    Frames,
    /// One line per run of identical frames.
    Runs,
    /// The whole timeline as JSON.
    Json,
}
