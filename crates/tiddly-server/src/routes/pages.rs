use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use tiddly_core::scaffold::{self, WikiTemplate};
use tiddly_core::store::{self, WikiList};

use crate::error::AppError;
use crate::state::AppState;

/// GET /wikilist: pages in the wiki directory.
pub async fn list_wiki(State(app): State<AppState>) -> Result<Json<WikiList>, AppError> {
    let store = app.store.clone();
    let list = tokio::task::spawn_blocking(move || store.list_pages())
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(list))
}

/// GET /wikitemplates: templates offered when creating a page.
pub async fn list_templates(
    State(app): State<AppState>,
) -> Result<Json<Vec<WikiTemplate>>, AppError> {
    let dir = app.config.templatedir.clone();
    let list = tokio::task::spawn_blocking(move || scaffold::list_templates(&dir))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(list))
}

/// Fallback: `/<word>.html` is a wiki page, served uncached from the wiki
/// directory. Anything else comes from the public directory.
pub async fn serve_path(State(app): State<AppState>, req: Request<Body>) -> Response {
    let path = req.uri().path().trim_start_matches('/');

    if store::is_wiki_file(path) {
        let file = app.store.wiki_path(path);
        let mut response = match ServeFile::new(file).oneshot(req).await {
            Ok(res) => res.into_response(),
            Err(never) => match never {},
        };
        let headers = response.headers_mut();
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
        return response;
    }

    match ServeDir::new(&app.config.publicdir).oneshot(req).await {
        Ok(res) => res.into_response(),
        Err(never) => match never {},
    }
}
