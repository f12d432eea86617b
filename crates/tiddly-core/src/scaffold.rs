//! New wiki pages from HTML templates.
//!
//! Templates live in the template directory. Rendering copies a template
//! line by line, filling in the `<!--## ... ##-->` markers below.

use crate::error::{Result, TiddlyError};
use crate::store::WIKI_EXT;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Pseudo-template that fetches the current empty wiki instead of rendering
/// a local file.
pub const LATEST_TEMPLATE: &str = "Latest";

pub const TITLE_MARKER: &str = "<!--## Title ##-->";
pub const WIKINAME_MARKER: &str = "<!--## Wikiname ##-->";
pub const USERNAME_MARKER: &str = "<!--## Username ##-->";
pub const STORE_URL_MARKER: &str = "<!--## StoreURL ##-->";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiTemplate {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// `Latest` first, then every `.html` template in `dir` sorted by name, the
/// first of those pre-selected.
pub fn list_templates(dir: &Path) -> Result<Vec<WikiTemplate>> {
    let mut templates = vec![WikiTemplate {
        id: LATEST_TEMPLATE.to_string(),
        name: LATEST_TEMPLATE.to_string(),
        selected: false,
    }];

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(templates),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if name.len() > WIKI_EXT.len() && name.ends_with(WIKI_EXT) {
            names.push(name);
        }
    }
    names.sort();

    templates.extend(names.into_iter().enumerate().map(|(i, name)| WikiTemplate {
        id: name.clone(),
        name,
        selected: i == 0,
    }));
    Ok(templates)
}

/// Values substituted into a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    pub title: String,
    pub wikiname: String,
    pub username: String,
    pub store_url: String,
}

impl TemplateVars {
    pub fn apply(&self, line: &str) -> String {
        line.replace(TITLE_MARKER, &self.title)
            .replace(WIKINAME_MARKER, &self.wikiname)
            .replace(USERNAME_MARKER, &self.username)
            .replace(STORE_URL_MARKER, &self.store_url)
    }
}

/// Resolve a template name inside `dir`. Names are plain file names.
pub fn template_path(dir: &Path, template: &str) -> Result<PathBuf> {
    if template.is_empty()
        || template.contains(['/', '\\'])
        || template == "."
        || template == ".."
    {
        return Err(TiddlyError::TemplateNotFound(template.to_string()));
    }
    let path = dir.join(template);
    if !path.is_file() {
        return Err(TiddlyError::TemplateNotFound(template.to_string()));
    }
    Ok(path)
}

/// Render `template` from `dir` into `out`. Lines are copied byte for byte;
/// markers are only replaced on lines that are valid UTF-8.
pub fn render(dir: &Path, template: &str, out: &Path, vars: &TemplateVars) -> Result<()> {
    let src = template_path(dir, template)?;
    let mut reader = BufReader::new(File::open(&src)?);
    let mut writer = BufWriter::new(File::create(out)?);

    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        match std::str::from_utf8(&line) {
            Ok(text) => writer.write_all(vars.apply(text).as_bytes())?,
            Err(_) => writer.write_all(&line)?,
        }
    }

    writer.flush()?;
    Ok(())
}
