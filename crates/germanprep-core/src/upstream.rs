//! As-received question shapes from the content service.
//!
//! The service is inconsistent across levels and sources: `type` casing
//! varies, optional fields come and go, and one level embeds the reading
//! passage inside the `question` string. Every field is defaulted so a
//! partial payload still deserializes; unknown fields (including the
//! per-question `metadata` object) are ignored. These shapes are transient:
//! only the normalizer consumes them.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawListeningQuestion {
    #[serde(default)]
    pub id: u32,
    #[serde(rename = "type", default)]
    pub question_type: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub translation: String,
    #[serde(rename = "audioDescription", default)]
    pub audio_description: String,
    #[serde(rename = "audioText", default)]
    pub audio_text: Option<String>,
    #[serde(rename = "audioText_translation", default)]
    pub audio_text_translation: Option<String>,
    #[serde(rename = "ttsPrompt", default)]
    pub tts_prompt: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub options_translations: Vec<String>,
    #[serde(rename = "correctAnswer", default)]
    pub correct_answer: String,
    #[serde(rename = "imagePlaceholder", default)]
    pub image_placeholder: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReadingQuestion {
    #[serde(default)]
    pub id: u32,
    #[serde(rename = "type", default)]
    pub question_type: String,
    /// May contain the passage embedded after a literal `\n\nPassage:`
    /// marker on levels whose generator produces a single string.
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "textTranslation", default)]
    pub text_translation: Option<String>,
    /// Explicit passage fields; when present they win over any markers
    /// embedded in `question`.
    #[serde(default)]
    pub passage: Option<String>,
    #[serde(default)]
    pub passage_translation: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer", default)]
    pub correct_answer: String,
    #[serde(rename = "imagePlaceholder", default)]
    pub image_placeholder: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWritingQuestion {
    #[serde(default)]
    pub id: u32,
    #[serde(rename = "type", default)]
    pub question_type: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(rename = "minWords", default)]
    pub min_words: Option<u32>,
    #[serde(rename = "maxWords", default)]
    pub max_words: Option<u32>,
    #[serde(rename = "imagePlaceholder", default)]
    pub image_placeholder: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSpeakingQuestion {
    #[serde(default)]
    pub id: u32,
    #[serde(rename = "type", default)]
    pub question_type: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(rename = "imagePlaceholder", default)]
    pub image_placeholder: Option<String>,
}
