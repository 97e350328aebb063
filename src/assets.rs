use std::path::Path;

use axum::Router;
use tower_http::services::ServeFile;

use crate::handler::AppState;

/// Fixed static routes and the file under `public/` each one serves.
const PUBLIC_FILES: &[(&str, &str)] = &[
    ("/", "index.html"),
    ("/index.html", "index.html"),
    ("/favicon.ico", "favicon.ico"),
    ("/robots.txt", "robots.txt"),
    ("/style.css", "style.css"),
    ("/new", "new.html"),
];

/// Routes for the static files below `<assets>/public`. A file missing on
/// disk is answered with 404.
pub fn public_routes(assets: &Path) -> Router<AppState> {
    let public = assets.join("public");
    PUBLIC_FILES.iter().fold(Router::new(), |router, (route, file)| {
        router.route_service(route, ServeFile::new(public.join(file)))
    })
}
