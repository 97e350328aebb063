use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::assets::public_routes;
use crate::handler::{self, AppState};
use crate::pages;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .merge(public_routes(&state.assets))
        .route("/TOS.md", get(pages::terms_of_service))
        // ids are twelve characters, so no note can be named "note"
        .route("/note", get(handler::not_found).post(handler::create_note))
        .route("/:id", get(handler::view_note))
        .route("/:id/export", get(handler::export_note))
        .route("/:id/stats", get(handler::note_stats))
        .fallback(handler::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
