use axum::extract::{Form, State};

use tiddly_core::scaffold::{self, TemplateVars, LATEST_TEMPLATE};

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct NewWikiForm {
    #[serde(default)]
    pub wikiname: String,
    #[serde(default)]
    pub wikitemplate: String,
    #[serde(default)]
    pub wikititle: String,
}

/// POST /new: create a page from a template, or from the latest empty
/// TiddlyWiki when the template is `Latest`.
pub async fn new_wiki(
    State(app): State<AppState>,
    Form(form): Form<NewWikiForm>,
) -> Result<&'static str, AppError> {
    let store = app.store.clone();
    let stem = form.wikiname.clone();
    let name = tokio::task::spawn_blocking(move || store.prepare_new(&stem))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    let path = app.store.wiki_path(&name);

    if form.wikitemplate == LATEST_TEMPLATE {
        let body = reqwest::get(&app.latest_url)
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        tokio::fs::write(&path, &body).await?;
        tracing::info!(wiki = %name, "created wiki from latest empty wiki");
        return Ok("Success!");
    }

    let vars = TemplateVars {
        title: form.wikititle,
        wikiname: name.clone(),
        username: app.config.username.clone(),
        store_url: format!("{}/store", app.config.server_url()),
    };
    let dir = app.config.templatedir.clone();
    let template = form.wikitemplate;
    tokio::task::spawn_blocking(move || scaffold::render(&dir, &template, &path, &vars))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    tracing::info!(wiki = %name, "created wiki from template");
    Ok("Success!")
}
