use axum::http::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("note {0} not found")]
    NotFound(String),
    #[error("storage backend failure")]
    Backend(#[from] libsql::Error),
    #[error("corrupt row for note {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

impl StoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Backend(_) | StoreError::Corrupt { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read templates from {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("template {name} failed")]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },
    #[error("required template {0} is missing")]
    Missing(&'static str),
}

/// Rejections produced while reading a note submission form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("terms of service not accepted")]
    ConsentRequired,
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("note length not accepted")]
    LengthRejected,
}

impl FormError {
    pub fn status(&self) -> StatusCode {
        match self {
            FormError::ConsentRequired => StatusCode::PRECONDITION_FAILED,
            FormError::MissingField(_) | FormError::LengthRejected => StatusCode::BAD_REQUEST,
        }
    }
}
