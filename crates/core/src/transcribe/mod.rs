use crate::{LipSyncError, Result};

/// Turns plain text into an IPA transcription. Sentences are separated by
/// `.` so the segmenter can insert pauses.
///
/// Network-backed implementations live in the host application; they must
/// report failures through the returned [`Result`].
pub trait PhoneticTranscriber {
    fn transcribe(&self, text: &str) -> Result<String>;
}

/// Treats its input as an IPA transcription already.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughTranscriber;

impl PhoneticTranscriber for PassthroughTranscriber {
    fn transcribe(&self, text: &str) -> Result<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(LipSyncError::Transcription("no text to transcribe".to_string()));
        }
        Ok(trimmed.to_string())
    }
}

/// Instruction sent to language-model based transcribers.
pub fn transcription_prompt(text: &str) -> String {
    format!(
        "Convert this text to IPA (International Phonetic Alphabet) notation with standard \
         British pronunciation. When there are two or more sentences, use dots (.) to separate \
         them. Do not place a dot at the end. Return only the IPA transcription, nothing else: \
         \"{text}\""
    )
}
