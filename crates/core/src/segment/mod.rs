use serde::{Deserialize, Serialize};

use crate::{PhonemeTable, Viseme};

/// Longest table symbol, in code points.
pub const MAX_SYMBOL_CHARS: usize = 3;

/// Silence inserted for every `.` in the transcription.
pub const DEFAULT_PAUSE_MS: f64 = 500.0;

const PAUSE_MARKER: char = '.';

/// Timed unit of a parsed transcription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment {
    /// A matched (or fallback) symbol. `duration_ms` stays zero until the
    /// synthesizer allocates time.
    Phoneme {
        symbol: String,
        viseme: Viseme,
        duration_ms: f64,
    },
    /// Fixed-length silence between sentences.
    Pause { duration_ms: f64 },
}

impl Segment {
    pub fn phoneme(symbol: impl Into<String>, viseme: Viseme) -> Self {
        Segment::Phoneme {
            symbol: symbol.into(),
            viseme,
            duration_ms: 0.0,
        }
    }

    pub fn pause(duration_ms: f64) -> Self {
        Segment::Pause { duration_ms }
    }

    /// Shape drawn while the segment plays. Pauses keep the mouth closed.
    pub fn viseme(&self) -> Viseme {
        match self {
            Segment::Phoneme { viseme, .. } => *viseme,
            Segment::Pause { .. } => Viseme::MBP,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        match self {
            Segment::Phoneme { duration_ms, .. } | Segment::Pause { duration_ms } => *duration_ms,
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match self {
            Segment::Phoneme { symbol, .. } => Some(symbol),
            Segment::Pause { .. } => None,
        }
    }

    pub fn is_pause(&self) -> bool {
        matches!(self, Segment::Pause { .. })
    }
}

/// Greedy longest-match scanner over an IPA string.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter<'a> {
    table: &'a PhonemeTable,
    pause_ms: f64,
}

impl Default for Segmenter<'static> {
    fn default() -> Self {
        Self::new(PhonemeTable::global())
    }
}

impl<'a> Segmenter<'a> {
    pub fn new(table: &'a PhonemeTable) -> Self {
        Self {
            table,
            pause_ms: DEFAULT_PAUSE_MS,
        }
    }

    pub fn with_pause_ms(mut self, pause_ms: f64) -> Self {
        self.pause_ms = pause_ms;
        self
    }

    /// Splits `phonetic` into segments in reading order.
    ///
    /// At each code point a `.` becomes a pause; otherwise the longest table
    /// symbol (3, 2, then 1 code points) wins. A character that matches
    /// nothing becomes a one-character [`Viseme::MBP`] phoneme, so every step
    /// consumes input and arbitrary text is accepted.
    pub fn segment(&self, phonetic: &str) -> Vec<Segment> {
        let bounds: Vec<usize> = phonetic
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(phonetic.len()))
            .collect();
        let char_count = bounds.len() - 1;

        let mut segments = Vec::new();
        let mut pos = 0;

        while pos < char_count {
            let current = &phonetic[bounds[pos]..bounds[pos + 1]];
            if current.starts_with(PAUSE_MARKER) {
                segments.push(Segment::pause(self.pause_ms));
                pos += 1;
                continue;
            }

            let longest = (1..=MAX_SYMBOL_CHARS.min(char_count - pos))
                .rev()
                .find_map(|len| {
                    let symbol = &phonetic[bounds[pos]..bounds[pos + len]];
                    self.table
                        .classify(symbol)
                        .map(|viseme| (len, symbol, viseme))
                });

            match longest {
                Some((len, symbol, viseme)) => {
                    segments.push(Segment::phoneme(symbol, viseme));
                    pos += len;
                }
                None => {
                    segments.push(Segment::phoneme(current, Viseme::MBP));
                    pos += 1;
                }
            }
        }

        tracing::debug!(
            input_chars = char_count,
            segments = segments.len(),
            "segmented transcription"
        );
        segments
    }
}

/// Segments `phonetic` with the standard table and default pause length.
pub fn segment(phonetic: &str) -> Vec<Segment> {
    Segmenter::default().segment(phonetic)
}
