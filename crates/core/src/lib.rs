//! Core library for turning IPA transcriptions into lip sync timelines.
//!
//! A transcription is split into phoneme and pause [`Segment`]s by the
//! [`Segmenter`], then the [`Synthesizer`] spreads the clip duration over
//! them and rasterizes the result into one [`Viseme`] per video frame.
//! Everything in that path is pure and infallible; errors only come from
//! configuration, the character catalog and transcription.

pub mod assets;
pub mod config;
pub mod error;
pub mod segment;
pub mod timeline;
pub mod transcribe;
pub mod viseme;

pub use assets::{Character, CharacterCatalog};
pub use config::LipSyncConfig;
pub use error::{LipSyncError, Result};
pub use segment::{segment, Segment, Segmenter};
pub use timeline::{synthesize, PlaybackClock, Synthesizer, Timeline, VisemeRun};
pub use transcribe::{transcription_prompt, PassthroughTranscriber, PhoneticTranscriber};
pub use viseme::{PhonemeTable, Viseme};

/// Runs segmentation and synthesis with the settings in `config`.
pub fn generate(
    table: &PhonemeTable,
    config: &LipSyncConfig,
    phonetic: &str,
    duration_seconds: f64,
) -> Timeline {
    let segments = Segmenter::new(table)
        .with_pause_ms(config.pause_ms)
        .segment(phonetic);
    Synthesizer::new(config).synthesize(segments, duration_seconds, config.fps)
}
