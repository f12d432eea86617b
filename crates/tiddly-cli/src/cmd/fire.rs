use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tiddly_core::action::Executor;
use tiddly_core::config::Config;
use tiddly_core::events::{EventDispatcher, EventRegistry};
use tiddly_core::runner::SystemRunner;

pub fn run(config_path: &Path, event: &str, args: &[String]) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("failed to load config")?;

    let mut registry = EventRegistry::new();
    registry.parse(&config.events);

    let event = event.to_lowercase();
    if registry.get(&event).is_none() {
        println!("No actions registered for '{event}'.");
        return Ok(());
    }

    let executor = Executor::new(
        Arc::new(SystemRunner::new(config.wikidir.clone())),
        config.git_settings(),
    );
    std::fs::create_dir_all(&config.wikidir)
        .with_context(|| format!("failed to create {}", config.wikidir.display()))?;

    EventDispatcher::new(registry, executor).dispatch(&event, args);
    Ok(())
}
