//! Canonical data model for germanprep.
//!
//! These are the stable question shapes handed to consumers (and written to
//! the cache). Wire casing follows the content service's historical JSON
//! field names, including the two odd snake_case holdouts
//! `options_translations` and `audioText_translation`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four exam domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    Listening,
    Reading,
    Writing,
    Speaking,
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skill::Listening => write!(f, "listening"),
            Skill::Reading => write!(f, "reading"),
            Skill::Writing => write!(f, "writing"),
            Skill::Speaking => write!(f, "speaking"),
        }
    }
}

impl FromStr for Skill {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "listening" => Ok(Skill::Listening),
            "reading" => Ok(Skill::Reading),
            "writing" => Ok(Skill::Writing),
            "speaking" => Ok(Skill::Speaking),
            other => Err(format!("unknown skill: {other}")),
        }
    }
}

/// CEFR exam level supported by the content service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::A1 => write!(f, "A1"),
            Level::A2 => write!(f, "A2"),
            Level::B1 => write!(f, "B1"),
            Level::B2 => write!(f, "B2"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A1" => Ok(Level::A1),
            "A2" => Ok(Level::A2),
            "B1" => Ok(Level::B1),
            "B2" => Ok(Level::B2),
            other => Err(format!("unknown level: {other}")),
        }
    }
}

/// Parameters for a question-generation request.
///
/// `topic` and `level` are always required; the optional discriminators are
/// understood by a subset of the endpoints (`prefer_type` by reading,
/// `task_type` by writing, `interaction_type` by speaking, `item_id_start`
/// by everything except listening) and also participate in cache key
/// derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateParams {
    pub topic: String,
    pub level: Level,
    #[serde(default)]
    pub item_id_start: Option<u32>,
    #[serde(default)]
    pub prefer_type: Option<String>,
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub interaction_type: Option<String>,
}

impl GenerateParams {
    pub fn new(topic: impl Into<String>, level: Level) -> Self {
        Self {
            topic: topic.into(),
            level,
            item_id_start: None,
            prefer_type: None,
            task_type: None,
            interaction_type: None,
        }
    }

    pub fn with_item_id_start(mut self, start: u32) -> Self {
        self.item_id_start = Some(start);
        self
    }

    pub fn with_prefer_type(mut self, prefer_type: impl Into<String>) -> Self {
        self.prefer_type = Some(prefer_type.into());
        self
    }

    pub fn with_task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }

    pub fn with_interaction_type(mut self, interaction_type: impl Into<String>) -> Self {
        self.interaction_type = Some(interaction_type.into());
        self
    }
}

/// Listening question sub-types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListeningType {
    MultipleChoice,
    RichtigFalsch,
}

/// A canonical listening comprehension question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningQuestion {
    pub id: u32,
    #[serde(rename = "type")]
    pub question_type: ListeningType,
    pub question: String,
    pub translation: String,
    pub audio_description: String,
    #[serde(default)]
    pub audio_text: Option<String>,
    #[serde(rename = "audioText_translation", default)]
    pub audio_text_translation: Option<String>,
    #[serde(default)]
    pub tts_prompt: Option<String>,
    pub options: Vec<String>,
    #[serde(rename = "options_translations", default)]
    pub options_translations: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub image_placeholder: String,
}

/// Reading question sub-types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingType {
    #[serde(rename = "A_B_C")]
    Abc,
    TextMatch,
    #[serde(rename = "Lückentext")]
    Lueckentext,
}

/// A canonical reading comprehension question: a passage plus one question
/// about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingQuestion {
    pub id: u32,
    #[serde(rename = "type")]
    pub question_type: ReadingType,
    pub text: String,
    pub text_translation: String,
    pub question: String,
    pub translation: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub image_placeholder: String,
}

/// A canonical writing task.
///
/// Form-filling tasks carry the field labels to fill in; free-text tasks
/// (letter or comment) carry a word-count window instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WritingQuestion {
    #[serde(rename_all = "camelCase")]
    Formular {
        id: u32,
        prompt: String,
        translation: String,
        fields: Vec<String>,
        #[serde(default)]
        image_placeholder: String,
    },
    #[serde(rename_all = "camelCase")]
    Brief {
        id: u32,
        prompt: String,
        translation: String,
        min_words: u32,
        max_words: u32,
        #[serde(default)]
        image_placeholder: String,
    },
    #[serde(rename_all = "camelCase")]
    Kommentar {
        id: u32,
        prompt: String,
        translation: String,
        min_words: u32,
        max_words: u32,
        #[serde(default)]
        image_placeholder: String,
    },
}

impl WritingQuestion {
    pub fn id(&self) -> u32 {
        match self {
            WritingQuestion::Formular { id, .. }
            | WritingQuestion::Brief { id, .. }
            | WritingQuestion::Kommentar { id, .. } => *id,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            WritingQuestion::Formular { prompt, .. }
            | WritingQuestion::Brief { prompt, .. }
            | WritingQuestion::Kommentar { prompt, .. } => prompt,
        }
    }
}

/// Speaking question sub-types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeakingType {
    Vorstellen,
    #[serde(rename = "Präsentation")]
    Praesentation,
    Diskussion,
}

/// A canonical speaking prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakingQuestion {
    pub id: u32,
    #[serde(rename = "type")]
    pub question_type: SpeakingType,
    pub prompt: String,
    pub translation: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub image_placeholder: Option<String>,
}

/// Result of a writing or speaking validation round trip.
///
/// The service is free-form here; every field is optional and unknown
/// fields are ignored. `transcription` is only present for speaking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub transcription: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}
