mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tiddly",
    about = "Personal TiddlyWiki server with upload hooks",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (.json, .yaml or .yml)
    #[arg(long, global = true, env = "TIDDLY_CONFIG", default_value = tiddly_core::config::CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the wiki server
    Serve {
        /// Listen address, overrides the config (e.g. ":8080", "127.0.0.1:9000")
        #[arg(long)]
        address: Option<String>,

        /// Open the browser once listening
        #[arg(long)]
        open: bool,

        /// Reload event hooks when the config file changes
        #[arg(long)]
        watch: bool,
    },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Run the hooks registered for an event, as an upload would
    Fire {
        /// Event name (prestore, poststore)
        event: String,

        /// Runtime arguments, available to actions as $0, $1, ...
        args: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } | Commands::Fire { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Serve {
            address,
            open,
            watch,
        } => cmd::serve::run(&cli.config, address, open, watch),
        Commands::Config { subcommand } => cmd::config::run(&cli.config, subcommand),
        Commands::Fire { event, args } => cmd::fire::run(&cli.config, &event, &args),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
