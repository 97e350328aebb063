use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;

use crate::db::NoteStore;
use crate::error::FormError;
use crate::model::{Note, NoteStats, text_length_accepted};
use crate::render::{self, Renderer};
use crate::unpack_error;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NoteStore>,
    pub renderer: Arc<Renderer>,
    /// Root holding `public/`, `markdown/` and `templates/`.
    pub assets: Arc<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Submission {
    pub text: String,
    pub password: Option<String>,
}

#[derive(Serialize)]
struct StatsView<'a> {
    note: &'a Note,
    stats: NoteStats,
}

/// Returns the value of `key` only when the form carries it exactly once.
fn field<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
    let mut values = fields.iter().filter(|(k, _)| k == key).map(|(_, v)| v.as_str());
    match (values.next(), values.next()) {
        (Some(value), None) => Some(value),
        _ => None,
    }
}

/// Validates a note submission. Consent is checked before anything else.
pub fn parse_submission(fields: &[(String, String)]) -> Result<Submission, FormError> {
    if field(fields, "tos") != Some("on") {
        return Err(FormError::ConsentRequired);
    }

    let text = field(fields, "text").ok_or(FormError::MissingField("text"))?;
    if !text_length_accepted(text) {
        return Err(FormError::LengthRejected);
    }

    let password = field(fields, "password")
        .filter(|p| !p.is_empty())
        .map(str::to_owned);

    Ok(Submission {
        text: text.to_owned(),
        password,
    })
}

pub(crate) fn render_page<T: Serialize>(
    renderer: &Renderer,
    status: StatusCode,
    template: &str,
    data: &T,
) -> Response {
    match renderer.render(template, data) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %unpack_error(&e), "failed to render page");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub(crate) fn error_page(renderer: &Renderer, status: StatusCode, message: Option<&str>) -> Response {
    render_page(renderer, status, render::NOTE, &Note::error_page(status, message))
}

async fn load_note(state: &AppState, id: &str) -> Result<Note, StatusCode> {
    state.store.load(id).await.map_err(|e| {
        let status = e.status();
        if status == StatusCode::NOT_FOUND {
            tracing::info!(id = %id, "note not found");
        } else {
            tracing::error!(id = %id, error = %unpack_error(&e), "failed to load note");
        }
        status
    })
}

pub async fn view_note(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match load_note(&state, &id).await {
        Ok(note) => render_page(&state.renderer, StatusCode::OK, render::NOTE, &note),
        Err(status) => error_page(&state.renderer, status, None),
    }
}

pub async fn export_note(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let (status, body) = match load_note(&state, &id).await {
        Ok(note) => (StatusCode::OK, note.text),
        Err(status) => (status, Note::error_page(status, None).title),
    };

    (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

pub async fn note_stats(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut note = match load_note(&state, &id).await {
        Ok(note) => note,
        Err(status) => return error_page(&state.renderer, status, None),
    };

    let view = StatsView {
        stats: NoteStats::of(&note),
        note: &note,
    };
    let fragment = match state.renderer.render(render::STATS, &view) {
        Ok(html) => html,
        Err(e) => {
            tracing::error!(id = %id, error = %unpack_error(&e), "failed to render stats");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    note.content = fragment;
    render_page(&state.renderer, StatusCode::OK, render::NOTE, &note)
}

/// An unreadable body (missing, or not url-encoded) counts as an empty form,
/// so it is rejected by the consent check like any other incomplete form.
pub async fn create_note(
    State(state): State<AppState>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    let fields = match form {
        Ok(Form(fields)) => fields,
        Err(e) => {
            tracing::info!(reason = %e, "unreadable note submission");
            Vec::new()
        }
    };

    let submission = match parse_submission(&fields) {
        Ok(s) => s,
        Err(e) => {
            tracing::info!(reason = %e, "note submission rejected");
            let message = match e {
                FormError::ConsentRequired => None,
                _ => Some(e.to_string()),
            };
            return error_page(&state.renderer, e.status(), message.as_deref());
        }
    };

    let note = Note::new(submission.text, submission.password);
    match state.store.save(&note).await {
        Ok(id) => {
            tracing::info!(id = %id, "new note created");
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, format!("/{id}"))]).into_response()
        }
        Err(e) => {
            tracing::error!(error = %unpack_error(&e), "failed to save note");
            error_page(&state.renderer, StatusCode::SERVICE_UNAVAILABLE, None)
        }
    }
}

pub async fn not_found(State(state): State<AppState>) -> Response {
    error_page(&state.renderer, StatusCode::NOT_FOUND, None)
}
