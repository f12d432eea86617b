use crate::action::{ActionKind, GitSettings};
use crate::error::{Result, TiddlyError};
use crate::events::{EventMap, EventRegistry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "tiddly.json";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update from tiddly";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_wiki_dir")]
    pub wikidir: PathBuf,
    #[serde(default = "default_template_dir")]
    pub templatedir: PathBuf,
    #[serde(default = "default_public_dir")]
    pub publicdir: PathBuf,
    #[serde(default = "default_credential")]
    pub username: String,
    #[serde(default = "default_credential")]
    pub password: String,
    #[serde(default)]
    pub events: EventMap,
    #[serde(default = "default_commit_message")]
    pub commitmessage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commitauthor: Option<String>,
}

fn default_address() -> String {
    ":8080".to_string()
}

fn default_wiki_dir() -> PathBuf {
    PathBuf::from("wikidir")
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("www")
}

fn default_credential() -> String {
    "tiddly".to_string()
}

fn default_commit_message() -> String {
    DEFAULT_COMMIT_MESSAGE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: default_address(),
            wikidir: default_wiki_dir(),
            templatedir: default_template_dir(),
            publicdir: default_public_dir(),
            username: default_credential(),
            password: default_credential(),
            events: EventMap::new(),
            commitmessage: default_commit_message(),
            commitauthor: None,
        }
    }
}

enum Format {
    Json,
    Yaml,
}

fn format_for(path: &Path) -> Result<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("yaml") | Some("yml") => Ok(Format::Yaml),
        _ => Err(TiddlyError::UnsupportedConfigFormat(
            path.display().to_string(),
        )),
    }
}

impl Config {
    /// Read the config at `path`. A missing file means "all defaults".
    pub fn load(path: &Path) -> Result<Self> {
        let format = format_for(path)?;
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(e.into()),
        };
        let cfg = match format {
            Format::Json => serde_json::from_str(&data)?,
            Format::Yaml => serde_yaml::from_str(&data)?,
        };
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = match format_for(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Yaml => serde_yaml::to_string(self)?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn git_settings(&self) -> GitSettings {
        GitSettings {
            message: self.commitmessage.clone(),
            author: self.commitauthor.clone(),
        }
    }

    /// Socket address to listen on; an empty host means all interfaces.
    pub fn bind_addr(&self) -> String {
        let (host, port) = split_address(&self.address);
        let host = if host.is_empty() { "0.0.0.0" } else { host };
        format!("{host}:{port}")
    }

    /// Base URL clients use to reach this server; an empty host means
    /// loopback.
    pub fn server_url(&self) -> String {
        let (host, port) = split_address(&self.address);
        let host = if host.is_empty() { "127.0.0.1" } else { host };
        if port.is_empty() {
            format!("http://{host}")
        } else {
            format!("http://{host}:{port}")
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        // 1. Every event must survive parsing.
        let mut registry = EventRegistry::new();
        for rejection in registry.parse_quietly(&self.events) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("event '{}' dropped: {}", rejection.name, rejection.error),
            });
        }

        // 2. git hooks need a git binary.
        if registry.uses_kind(ActionKind::Git) && which::which("git").is_err() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "git actions are configured but no 'git' executable is on PATH"
                    .to_string(),
            });
        }

        // 3. Shipping defaults for credentials.
        if self.username == default_credential() && self.password == default_credential() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "username and password are still the defaults".to_string(),
            });
        }

        warnings
    }
}

fn split_address(address: &str) -> (&str, &str) {
    match address.rsplit_once(':') {
        Some((host, port)) => (host, port),
        None => (address, ""),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
