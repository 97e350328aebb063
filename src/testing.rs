use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use tower::ServiceExt;

use crate::db::NoteStore;
use crate::error::StoreError;
use crate::handler::AppState;
use crate::model::Note;
use crate::render::Renderer;
use crate::routes::routes;

/// In-memory stand-in for the database. A failing store rejects every call
/// with a backend error.
#[derive(Default)]
pub struct MemoryStore {
    notes: Mutex<HashMap<String, Note>>,
    fail: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        MemoryStore {
            fail: true,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.notes.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail {
            return Err(libsql::Error::ConnectionFailed("disk unavailable".to_string()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn save(&self, note: &Note) -> Result<String, StoreError> {
        self.check()?;
        let mut notes = self.notes.lock().unwrap();
        let id = format!("note{:08}", notes.len() + 1);
        let mut stored = note.clone();
        stored.id = id.clone();
        notes.insert(id.clone(), stored);
        Ok(id)
    }

    async fn load(&self, id: &str) -> Result<Note, StoreError> {
        self.check()?;
        self.notes
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))
    }
}

pub fn assets_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets")
}

pub fn test_state(store: Arc<dyn NoteStore>) -> AppState {
    test_state_with_assets(store, assets_dir())
}

pub fn test_state_with_assets(store: Arc<dyn NoteStore>, assets: PathBuf) -> AppState {
    let renderer = Renderer::load(&assets_dir().join("templates")).unwrap();
    AppState {
        store,
        renderer: Arc::new(renderer),
        assets: Arc::new(assets),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

pub async fn send(state: &AppState, request: Request<Body>) -> TestResponse {
    let response = routes(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}
