use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use tiddly_core::config::{Config, WarnLevel};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Check event hooks and settings for mistakes
    Validate {
        /// Output as JSON
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Print the effective configuration (defaults filled in, password masked)
    Show,
}

pub fn run(config_path: &Path, subcmd: ConfigSubcommand) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Validate { json } => validate(config_path, json),
        ConfigSubcommand::Show => show(config_path),
    }
}

fn validate(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}

fn show(config_path: &Path) -> anyhow::Result<()> {
    let mut config = Config::load(config_path).context("failed to load config")?;
    if !config.password.is_empty() {
        config.password = "********".to_string();
    }
    print_json(&config)
}
