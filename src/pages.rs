use std::path::Path;

use axum::{extract::State, http::StatusCode, response::Response};
use pulldown_cmark::{Options, Parser, html};

use crate::handler::{AppState, error_page, render_page};
use crate::model::Note;
use crate::render;

pub fn markdown_to_html(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options);

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

/// Reads `markdown/<name>.md` below `assets` and wraps the rendered HTML in a
/// page titled `name`.
pub async fn load_page(assets: &Path, name: &str) -> std::io::Result<Note> {
    let path = assets.join("markdown").join(format!("{name}.md"));
    let source = tokio::fs::read_to_string(&path).await?;
    Ok(Note::page(name, markdown_to_html(&source)))
}

pub async fn terms_of_service(State(state): State<AppState>) -> Response {
    match load_page(&state.assets, "TOS").await {
        Ok(page) => render_page(&state.renderer, StatusCode::OK, render::PAGE, &page),
        Err(e) => {
            tracing::error!(page = "TOS", error = %e, "couldn't open markdown page");
            error_page(&state.renderer, StatusCode::SERVICE_UNAVAILABLE, None)
        }
    }
}
