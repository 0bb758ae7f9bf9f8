use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{segment::DEFAULT_PAUSE_MS, timeline::MAX_FRAME_COUNT, LipSyncError, Result};

/// Tunables for segmentation and timeline synthesis.
///
/// The defaults reproduce the standard timing: 24 fps, 500 ms per sentence
/// break, vowels weighted 1.3 and consonants 0.8.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LipSyncConfig {
    pub fps: f64,
    pub pause_ms: f64,
    pub vowel_weight: f64,
    pub consonant_weight: f64,
}

impl Default for LipSyncConfig {
    fn default() -> Self {
        Self {
            fps: 24.0,
            pause_ms: DEFAULT_PAUSE_MS,
            vowel_weight: 1.3,
            consonant_weight: 0.8,
        }
    }
}

impl LipSyncConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Rejects values the synthesizer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(LipSyncError::InvalidInput(
                "fps must be a positive, finite number",
            ));
        }
        if !self.pause_ms.is_finite() || self.pause_ms < 0.0 {
            return Err(LipSyncError::InvalidInput(
                "pause_ms must be zero or a positive, finite number",
            ));
        }
        for weight in [self.vowel_weight, self.consonant_weight] {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(LipSyncError::InvalidInput(
                    "duration weights must be positive, finite numbers",
                ));
            }
        }
        Ok(())
    }

    /// Rejects clip lengths that are not finite or that need more than
    /// [`MAX_FRAME_COUNT`] frames at the configured fps. Zero and negative
    /// durations pass and produce an empty timeline.
    pub fn check_duration(&self, duration_seconds: f64) -> Result<()> {
        if !duration_seconds.is_finite() {
            return Err(LipSyncError::InvalidInput("duration must be finite"));
        }
        if duration_seconds * self.fps > MAX_FRAME_COUNT as f64 {
            return Err(LipSyncError::InvalidInput(
                "duration is too long for the configured fps",
            ));
        }
        Ok(())
    }
}
