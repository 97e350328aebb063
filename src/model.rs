use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const MIN_TEXT_CHARS: usize = 10;
pub const MAX_TEXT_CHARS: usize = 50_000;

const WORDS_PER_MINUTE: usize = 200;

/// A shared note, or a note-shaped payload built only for rendering.
///
/// Persisted notes carry `id`, `text`, `password` and `created_at`. `title`
/// and `content` are filled in for Markdown pages, error pages and the stats
/// view; `content` is trusted HTML.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Note {
    pub id: String,
    pub text: String,
    #[serde(skip)]
    pub password: Option<String>,
    pub title: String,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Note {
    pub fn new(text: String, password: Option<String>) -> Self {
        Note {
            text,
            password,
            ..Default::default()
        }
    }

    pub fn page(title: &str, content: String) -> Self {
        Note {
            title: title.to_owned(),
            content,
            ..Default::default()
        }
    }

    /// Builds the payload rendered for a failed request. The message defaults
    /// to the status' reason phrase.
    pub fn error_page(status: StatusCode, message: Option<&str>) -> Self {
        let reason = status.canonical_reason().unwrap_or("Error");
        Note {
            title: format!("{} {}", status.as_u16(), reason),
            content: message.unwrap_or(reason).to_owned(),
            ..Default::default()
        }
    }
}

pub fn text_length_accepted(text: &str) -> bool {
    let len = text.chars().count();
    (MIN_TEXT_CHARS..=MAX_TEXT_CHARS).contains(&len)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct NoteStats {
    pub characters: usize,
    pub bytes: usize,
    pub words: usize,
    pub lines: usize,
    pub reading_minutes: usize,
    pub created_at: Option<DateTime<Utc>>,
}

impl NoteStats {
    pub fn of(note: &Note) -> Self {
        let words = note.text.split_whitespace().count();
        NoteStats {
            characters: note.text.chars().count(),
            bytes: note.text.len(),
            words,
            lines: note.text.lines().count(),
            reading_minutes: words.div_ceil(WORDS_PER_MINUTE).max(1),
            created_at: note.created_at,
        }
    }
}
