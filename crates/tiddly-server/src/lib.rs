pub mod error;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/wikilist", get(routes::pages::list_wiki))
        .route("/wikitemplates", get(routes::pages::list_templates))
        .route(
            "/store",
            post(routes::store::store_wiki)
                .layer(DefaultBodyLimit::max(routes::store::MAX_UPLOAD_BYTES)),
        )
        .route("/new", post(routes::create::new_wiki))
        .fallback(routes::pages::serve_path)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Bind `addr` and serve until the listener fails.
pub async fn serve(app_state: AppState, addr: &str, open_browser: bool) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_on(app_state, listener, open_browser).await
}

/// Serve on a pre-bound listener, so the caller can read the actual port
/// first (useful when binding port 0).
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let local = listener.local_addr()?;
    let url = app_state.config.server_url();
    let app = build_router(app_state);

    tracing::info!("listening on {local} ({url})");

    if open_browser {
        if let Err(e) = open::that(&url) {
            tracing::warn!("could not open browser: {e}");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
