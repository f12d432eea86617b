use anyhow::Context;
use std::path::Path;
use tiddly_core::config::{Config, WarnLevel};
use tiddly_server::AppState;

pub fn run(config_path: &Path, address: Option<String>, open: bool, watch: bool) -> anyhow::Result<()> {
    let mut config = Config::load(config_path)
        .with_context(|| format!("error while reading config file {}", config_path.display()))?;
    if let Some(address) = address {
        config.address = address;
    }

    // Rejected events are logged once, when the dispatcher parses them.
    for w in config.validate() {
        if w.level == WarnLevel::Warning {
            tracing::warn!("{}", w.message);
        }
    }

    let addr = config.bind_addr();
    let rt = tokio::runtime::Runtime::new()?;
    let config_path = config_path.to_path_buf();

    rt.block_on(async move {
        let state = AppState::new(config);
        if watch {
            state.watch_config(config_path);
        }

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("error while listening on {addr}"))?;

        tokio::select! {
            res = tiddly_server::serve_on(state, listener, open) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
