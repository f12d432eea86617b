use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tiddly_core::action::Executor;
use tiddly_core::config::Config;
use tiddly_core::events::EventDispatcher;
use tiddly_core::runner::SystemRunner;
use tiddly_core::store::WikiStore;

/// Where the `Latest` template is downloaded from.
pub const LATEST_WIKI_URL: &str = "https://tiddlywiki.com/empty.html";

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: WikiStore,
    pub events: Arc<EventDispatcher>,
    pub latest_url: String,
}

impl AppState {
    /// Build state from config, parsing its event hooks. Hook processes run
    /// inside the wiki directory.
    pub fn new(config: Config) -> Self {
        let executor = Executor::new(
            Arc::new(SystemRunner::new(config.wikidir.clone())),
            config.git_settings(),
        );
        let events = Arc::new(EventDispatcher::from_events(&config.events, executor));
        Self::with_events(config, events)
    }

    pub fn with_events(config: Config, events: Arc<EventDispatcher>) -> Self {
        Self {
            store: WikiStore::new(config.wikidir.clone()),
            config: Arc::new(config),
            events,
            latest_url: LATEST_WIKI_URL.to_string(),
        }
    }

    /// Poll `path` and re-parse its `events` into the live dispatcher when
    /// the file changes. Other settings need a restart.
    /// Guard: only spawns inside a Tokio runtime.
    pub fn watch_config(&self, path: PathBuf) {
        if tokio::runtime::Handle::try_current().is_err() {
            return;
        }
        let events = self.events.clone();
        tokio::spawn(async move {
            let mut last_mtime = modified(&path).await;
            loop {
                tokio::time::sleep(Duration::from_millis(800)).await;
                let mtime = modified(&path).await;
                if mtime.is_none() || mtime == last_mtime {
                    continue;
                }
                last_mtime = mtime;

                let path = path.clone();
                let events = events.clone();
                let result = tokio::task::spawn_blocking(move || {
                    Config::load(&path).map(|cfg| events.reload(&cfg.events))
                })
                .await;
                match result {
                    Ok(Ok(rejected)) => tracing::info!(
                        rejected = rejected.len(),
                        "reloaded event hooks"
                    ),
                    Ok(Err(e)) => tracing::warn!("config reload failed: {e}"),
                    Err(e) => tracing::warn!("config reload task failed: {e}"),
                }
            }
        });
    }
}

async fn modified(path: &std::path::Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}
