//! The wiki directory: name validation, page listing and the upload write
//! path with its `prestore` / `poststore` hooks.

use crate::error::{Result, TiddlyError};
use crate::events::{EventDispatcher, EventType};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const WIKI_EXT: &str = ".html";

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

static WIKI_FILE_RE: OnceLock<Regex> = OnceLock::new();
static WIKI_STEM_RE: OnceLock<Regex> = OnceLock::new();

fn wiki_file_re() -> &'static Regex {
    WIKI_FILE_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+\.html$").unwrap())
}

fn wiki_stem_re() -> &'static Regex {
    WIKI_STEM_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap())
}

/// Last path component of `raw`, treating both `/` and `\` as separators.
pub fn base_name(raw: &str) -> &str {
    raw.rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(raw)
}

/// Validate an uploaded file name and return the base name to store under.
pub fn validate_wiki_name(raw: &str) -> Result<String> {
    let name = base_name(raw);
    if !wiki_file_re().is_match(name) {
        return Err(TiddlyError::InvalidWikiName(raw.to_string()));
    }
    Ok(name.to_string())
}

/// True if `name` is a servable page name (`word.html`).
pub fn is_wiki_file(name: &str) -> bool {
    wiki_file_re().is_match(name)
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiList {
    pub pages: Vec<Page>,
}

// ---------------------------------------------------------------------------
// WikiStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WikiStore {
    dir: PathBuf,
}

impl WikiStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn wiki_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Write `content` to the page `name` (already validated), firing
    /// `prestore` before the file is touched and `poststore` once the data
    /// is flushed to disk. A failed write skips `poststore`.
    pub fn store<R: Read>(
        &self,
        name: &str,
        content: &mut R,
        events: &EventDispatcher,
    ) -> Result<u64> {
        self.ensure_dir()?;
        let path = self.wiki_path(name);
        let args = [name.to_string()];

        events.fire(EventType::PreStore, &args);

        let mut out = File::create(&path)?;
        let written = std::io::copy(content, &mut out)?;
        out.flush()?;
        out.sync_all()?;

        events.fire(EventType::PostStore, &args);

        tracing::info!(wiki = %name, bytes = written, "stored wiki");
        Ok(written)
    }

    /// Validate a new page stem (no extension) and return its file name.
    /// Fails if the page already exists.
    pub fn prepare_new(&self, stem: &str) -> Result<String> {
        if !wiki_stem_re().is_match(stem) {
            return Err(TiddlyError::InvalidWikiName(stem.to_string()));
        }
        let name = format!("{stem}{WIKI_EXT}");
        if self.wiki_path(&name).exists() {
            return Err(TiddlyError::WikiExists(name));
        }
        self.ensure_dir()?;
        Ok(name)
    }

    /// Pages in the wiki directory, sorted by name. A missing directory is
    /// an empty wiki.
    pub fn list_pages(&self) -> Result<WikiList> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(WikiList { pages: Vec::new() })
            }
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.len() > WIKI_EXT.len() && name.ends_with(WIKI_EXT) {
                names.push(name);
            }
        }
        names.sort();

        Ok(WikiList {
            pages: names
                .into_iter()
                .map(|name| Page {
                    url: format!("/{name}"),
                    name,
                })
                .collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
