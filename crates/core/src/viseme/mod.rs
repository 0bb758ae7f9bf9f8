use std::{collections::HashMap, fmt, str::FromStr, sync::OnceLock};

use serde::{Deserialize, Serialize};

use crate::LipSyncError;

/// Mouth shape category used to pick the drawing for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Viseme {
    /// Closed lips. Also the neutral shape for silence and unknown symbols.
    #[default]
    MBP,
    E,
    O,
    A,
    FV,
    TS,
    LN,
}

impl Viseme {
    /// Every category, in the order renderers enumerate their assets.
    pub const ALL: [Viseme; 7] = [
        Viseme::MBP,
        Viseme::E,
        Viseme::O,
        Viseme::A,
        Viseme::FV,
        Viseme::TS,
        Viseme::LN,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Viseme::MBP => "MBP",
            Viseme::E => "E",
            Viseme::O => "O",
            Viseme::A => "A",
            Viseme::FV => "FV",
            Viseme::TS => "TS",
            Viseme::LN => "LN",
        }
    }

    /// Vowel-like shapes are held longer during duration allocation.
    pub fn is_vowel(self) -> bool {
        matches!(self, Viseme::E | Viseme::O | Viseme::A)
    }
}

impl fmt::Display for Viseme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Viseme {
    type Err = LipSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Viseme::ALL
            .into_iter()
            .find(|viseme| viseme.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LipSyncError::msg(format!("unknown viseme `{s}`")))
    }
}

const STANDARD_ENTRIES: &[(&str, Viseme)] = &[
    ("i", Viseme::E),
    ("ɪ", Viseme::E),
    ("e", Viseme::E),
    ("ɛ", Viseme::E),
    ("eɪ", Viseme::E),
    ("ɪə", Viseme::E),
    ("u", Viseme::O),
    ("ʊ", Viseme::O),
    ("uː", Viseme::O),
    ("ʊə", Viseme::O),
    ("o", Viseme::O),
    ("ɔ", Viseme::O),
    ("ɔː", Viseme::O),
    ("oʊ", Viseme::O),
    ("ɔɪ", Viseme::O),
    ("w", Viseme::O),
    ("r", Viseme::O),
    ("ɹ", Viseme::O),
    ("æ", Viseme::A),
    ("a", Viseme::A),
    ("ɑ", Viseme::A),
    ("ɑː", Viseme::A),
    ("ʌ", Viseme::A),
    ("ə", Viseme::A),
    ("ɜ", Viseme::A),
    ("ɜː", Viseme::A),
    ("aɪ", Viseme::A),
    ("aʊ", Viseme::A),
    ("f", Viseme::FV),
    ("v", Viseme::FV),
    ("t", Viseme::TS),
    ("s", Viseme::TS),
    ("z", Viseme::TS),
    ("d", Viseme::TS),
    ("n", Viseme::TS),
    ("ʃ", Viseme::TS),
    ("ʒ", Viseme::TS),
    ("tʃ", Viseme::TS),
    ("dʒ", Viseme::TS),
    ("l", Viseme::LN),
    ("ð", Viseme::LN),
    ("θ", Viseme::LN),
    ("p", Viseme::MBP),
    ("b", Viseme::MBP),
    ("m", Viseme::MBP),
];

/// Read-only lookup from IPA symbol to [`Viseme`].
#[derive(Debug, Clone)]
pub struct PhonemeTable {
    entries: HashMap<&'static str, Viseme>,
}

impl PhonemeTable {
    /// Builds a table from arbitrary entries.
    #[cfg(test)]
    pub(crate) fn from_entries(entries: &[(&'static str, Viseme)]) -> Self {
        Self {
            entries: entries.iter().copied().collect(),
        }
    }

    /// Builds the standard English table.
    pub fn standard() -> Self {
        Self {
            entries: STANDARD_ENTRIES.iter().copied().collect(),
        }
    }

    /// Shared instance of [`PhonemeTable::standard`], built on first use.
    pub fn global() -> &'static PhonemeTable {
        static TABLE: OnceLock<PhonemeTable> = OnceLock::new();
        TABLE.get_or_init(PhonemeTable::standard)
    }

    /// Looks up an exact symbol. Unknown symbols return `None`; the fallback
    /// policy lives in the segmenter.
    pub fn classify(&self, symbol: &str) -> Option<Viseme> {
        self.entries.get(symbol).copied()
    }

    pub fn is_vowel(&self, viseme: Viseme) -> bool {
        viseme.is_vowel()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PhonemeTable {
    fn default() -> Self {
        Self::standard()
    }
}
