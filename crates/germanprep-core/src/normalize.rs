//! Schema normalizer: upstream question shapes → canonical model.
//!
//! One total function per skill. These never fail: unknown type tags fall
//! back to a per-skill default variant and missing fields get structural
//! defaults, so a degraded payload still yields a renderable question.
//!
//! Known upstream data-quality issue: one source returns `options` text in
//! the wrong language for some levels. That is deliberately passed through
//! unrepaired; this layer does structural repair only.

use crate::model::{
    ListeningQuestion, ListeningType, ReadingQuestion, ReadingType, SpeakingQuestion,
    SpeakingType, WritingQuestion,
};
use crate::upstream::{
    RawListeningQuestion, RawReadingQuestion, RawSpeakingQuestion, RawWritingQuestion,
};

const PASSAGE_MARKER: &str = "\n\nPassage:";
const PASSAGE_TRANSLATION_MARKER: &str = "\n\nPassage Translation:";

/// Map an upstream listening question to its canonical form.
pub fn normalize_listening(raw: RawListeningQuestion) -> ListeningQuestion {
    let question_type = match raw.question_type.to_lowercase().as_str() {
        "richtigfalsch" | "richtig_falsch" | "truefalse" => ListeningType::RichtigFalsch,
        _ => ListeningType::MultipleChoice,
    };

    ListeningQuestion {
        id: raw.id,
        question_type,
        question: raw.question,
        translation: raw.translation,
        audio_description: raw.audio_description,
        audio_text: raw.audio_text,
        audio_text_translation: raw.audio_text_translation,
        tts_prompt: raw.tts_prompt,
        options: raw.options,
        options_translations: raw.options_translations,
        correct_answer: raw.correct_answer,
        image_placeholder: raw.image_placeholder.unwrap_or_default(),
    }
}

/// Map an upstream reading question to its canonical form.
///
/// Some levels embed the passage inside the `question` string behind
/// literal markers; explicit `passage`/`passage_translation` fields take
/// precedence and suppress any marker splitting.
pub fn normalize_reading(raw: RawReadingQuestion) -> ReadingQuestion {
    let question_type = match raw.question_type.to_lowercase().as_str() {
        "textmatch" | "text_match" => ReadingType::TextMatch,
        "lückentext" | "lueckentext" => ReadingType::Lueckentext,
        _ => ReadingType::Abc,
    };

    let (question, text, text_translation) = extract_passage(&raw);

    ReadingQuestion {
        id: raw.id,
        question_type,
        text,
        text_translation,
        question,
        translation: raw.translation,
        options: raw.options,
        correct_answer: raw.correct_answer,
        image_placeholder: raw.image_placeholder.unwrap_or_default(),
    }
}

fn extract_passage(raw: &RawReadingQuestion) -> (String, String, String) {
    if raw.passage.is_some() || raw.passage_translation.is_some() {
        return (
            raw.question.clone(),
            raw.passage.clone().unwrap_or_default(),
            raw.passage_translation.clone().unwrap_or_default(),
        );
    }

    if let Some((question, rest)) = raw.question.split_once(PASSAGE_MARKER) {
        let (text, translation) = match rest.split_once(PASSAGE_TRANSLATION_MARKER) {
            Some((text, translation)) => (text, translation),
            None => (rest, ""),
        };
        return (
            question.trim().to_string(),
            text.trim().to_string(),
            translation.trim().to_string(),
        );
    }

    (
        raw.question.clone(),
        raw.text.clone().unwrap_or_default(),
        raw.text_translation.clone().unwrap_or_default(),
    )
}

/// Map an upstream writing task to its canonical form.
pub fn normalize_writing(raw: RawWritingQuestion) -> WritingQuestion {
    match raw.question_type.to_lowercase().as_str() {
        "formular" => WritingQuestion::Formular {
            id: raw.id,
            prompt: raw.prompt,
            translation: raw.translation,
            fields: raw.fields.unwrap_or_default(),
            image_placeholder: raw.image_placeholder.unwrap_or_default(),
        },
        "kommentar" | "comment" => WritingQuestion::Kommentar {
            id: raw.id,
            prompt: raw.prompt,
            translation: raw.translation,
            min_words: raw.min_words.unwrap_or(0),
            max_words: raw.max_words.unwrap_or(0),
            image_placeholder: raw.image_placeholder.unwrap_or_default(),
        },
        // "brief", "email", and anything unrecognized becomes a letter task.
        _ => WritingQuestion::Brief {
            id: raw.id,
            prompt: raw.prompt,
            translation: raw.translation,
            min_words: raw.min_words.unwrap_or(0),
            max_words: raw.max_words.unwrap_or(0),
            image_placeholder: raw.image_placeholder.unwrap_or_default(),
        },
    }
}

/// Map an upstream speaking prompt to its canonical form.
pub fn normalize_speaking(raw: RawSpeakingQuestion) -> SpeakingQuestion {
    let question_type = match raw.question_type.to_lowercase().as_str() {
        "präsentation" | "praesentation" | "presentation" => SpeakingType::Praesentation,
        "diskussion" | "discussion" => SpeakingType::Diskussion,
        _ => SpeakingType::Vorstellen,
    };

    SpeakingQuestion {
        id: raw.id,
        question_type,
        prompt: raw.prompt,
        translation: raw.translation,
        example: raw.example,
        image_placeholder: raw.image_placeholder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writing_kommentar_synonyms() {
        for tag in ["kommentar", "Kommentar", "comment"] {
            let raw = RawWritingQuestion {
                question_type: tag.into(),
                min_words: Some(80),
                max_words: Some(120),
                ..Default::default()
            };
            assert!(matches!(
                normalize_writing(raw),
                WritingQuestion::Kommentar {
                    min_words: 80,
                    max_words: 120,
                    ..
                }
            ));
        }
    }

    #[test]
    fn writing_formular_defaults_fields_to_empty() {
        let raw = RawWritingQuestion {
            question_type: "formular".into(),
            fields: None,
            ..Default::default()
        };
        match normalize_writing(raw) {
            WritingQuestion::Formular { fields, .. } => assert!(fields.is_empty()),
            other => panic!("expected Formular, got {other:?}"),
        }
    }

    #[test]
    fn writing_email_and_unknown_become_brief() {
        for tag in ["email", "Email", "brief", "something_new"] {
            let raw = RawWritingQuestion {
                question_type: tag.into(),
                ..Default::default()
            };
            match normalize_writing(raw) {
                WritingQuestion::Brief {
                    min_words,
                    max_words,
                    ..
                } => {
                    assert_eq!(min_words, 0);
                    assert_eq!(max_words, 0);
                }
                other => panic!("expected Brief for {tag:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn reading_extracts_embedded_passage() {
        let raw = RawReadingQuestion {
            question: "Was bedeutet das?\n\nPassage: Text hier.\n\nPassage Translation: Text here."
                .into(),
            ..Default::default()
        };
        let q = normalize_reading(raw);
        assert_eq!(q.question, "Was bedeutet das?");
        assert_eq!(q.text, "Text hier.");
        assert_eq!(q.text_translation, "Text here.");
    }

    #[test]
    fn reading_passage_without_translation_marker() {
        let raw = RawReadingQuestion {
            question: "Frage?\n\nPassage: Nur Text.".into(),
            ..Default::default()
        };
        let q = normalize_reading(raw);
        assert_eq!(q.question, "Frage?");
        assert_eq!(q.text, "Nur Text.");
        assert_eq!(q.text_translation, "");
    }

    #[test]
    fn reading_explicit_passage_fields_win_over_markers() {
        let raw = RawReadingQuestion {
            question: "Frage?\n\nPassage: should be ignored".into(),
            passage: Some("Expliziter Text.".into()),
            passage_translation: Some("Explicit text.".into()),
            ..Default::default()
        };
        let q = normalize_reading(raw);
        assert_eq!(q.question, "Frage?\n\nPassage: should be ignored");
        assert_eq!(q.text, "Expliziter Text.");
        assert_eq!(q.text_translation, "Explicit text.");
    }

    #[test]
    fn reading_unknown_type_defaults_to_abc() {
        let raw = RawReadingQuestion {
            question_type: "Zuordnung".into(),
            ..Default::default()
        };
        assert_eq!(normalize_reading(raw).question_type, ReadingType::Abc);
    }

    #[test]
    fn reading_keeps_explicit_text_fields_when_no_markers() {
        let raw = RawReadingQuestion {
            question: "Frage?".into(),
            text: Some("Der Text.".into()),
            text_translation: Some("The text.".into()),
            ..Default::default()
        };
        let q = normalize_reading(raw);
        assert_eq!(q.text, "Der Text.");
        assert_eq!(q.text_translation, "The text.");
    }

    #[test]
    fn listening_type_mapping_and_placeholder_default() {
        let raw = RawListeningQuestion {
            question_type: "richtigfalsch".into(),
            image_placeholder: None,
            options: vec!["Richtig".into(), "Falsch".into()],
            ..Default::default()
        };
        let q = normalize_listening(raw);
        assert_eq!(q.question_type, ListeningType::RichtigFalsch);
        assert_eq!(q.image_placeholder, "");
        assert_eq!(q.options.len(), 2);
    }

    #[test]
    fn speaking_type_synonyms() {
        let raw = RawSpeakingQuestion {
            question_type: "presentation".into(),
            ..Default::default()
        };
        assert_eq!(
            normalize_speaking(raw).question_type,
            SpeakingType::Praesentation
        );

        let raw = RawSpeakingQuestion {
            question_type: "".into(),
            ..Default::default()
        };
        assert_eq!(
            normalize_speaking(raw).question_type,
            SpeakingType::Vorstellen
        );
    }

    #[test]
    fn options_pass_through_unmodified() {
        // Wrong-language options are a known upstream issue; the normalizer
        // must not touch them.
        let raw = RawReadingQuestion {
            options: vec!["the station".into(), "der Bahnhof".into()],
            ..Default::default()
        };
        let q = normalize_reading(raw);
        assert_eq!(q.options, vec!["the station", "der Bahnhof"]);
    }
}
