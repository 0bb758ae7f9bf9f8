use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{LipSyncError, Result, Viseme};

/// A drawable character and the head angles it has artwork for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub angles: Vec<String>,
}

/// Registry of characters, loaded from a `characters.json` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterCatalog {
    #[serde(default)]
    pub characters: Vec<Character>,
}

impl CharacterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a catalog file. A missing file is an empty catalog; any other
    /// IO or parse failure is returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json_str(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(?path, "character catalog not found, using an empty one");
                Ok(Self::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn register(&mut self, character: Character) {
        self.characters.retain(|existing| existing.id != character.id);
        self.characters.push(character);
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|character| character.id == id)
    }

    /// Relative path of the artwork for `viseme`:
    /// `{character}/{angle}/{viseme}.svg` with a lower-case viseme label.
    pub fn asset_path(&self, character: &str, angle: &str, viseme: Viseme) -> Result<PathBuf> {
        let entry = self
            .character(character)
            .ok_or_else(|| LipSyncError::UnknownCharacter(character.to_string()))?;

        if !entry.angles.iter().any(|known| known == angle) {
            return Err(LipSyncError::UnknownAngle {
                character: character.to_string(),
                angle: angle.to_string(),
            });
        }

        Ok(PathBuf::from(character)
            .join(angle)
            .join(format!("{}.svg", viseme.as_str().to_lowercase())))
    }

    /// Paths for every viseme of one character angle, for preloading.
    pub fn viseme_assets(&self, character: &str, angle: &str) -> Result<Vec<(Viseme, PathBuf)>> {
        Viseme::ALL
            .into_iter()
            .map(|viseme| {
                self.asset_path(character, angle, viseme)
                    .map(|path| (viseme, path))
            })
            .collect()
    }
}
