//! Hook action kinds and their executors.
//!
//! Configuration names an action by kind (`cmd`, `git`). At dispatch time
//! the kind and the bound arguments resolve to an [`Invocation`], which is
//! what actually runs.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, TiddlyError};
use crate::runner::ProcessRunner;

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Cmd,
    Git,
}

/// Kind names accepted in configuration. Adding a kind means adding a row.
const ACTION_KINDS: &[(&str, ActionKind)] = &[("cmd", ActionKind::Cmd), ("git", ActionKind::Git)];

impl ActionKind {
    /// Case-insensitive lookup of a configured kind name.
    pub fn lookup(name: &str) -> Option<ActionKind> {
        let name = name.to_lowercase();
        ACTION_KINDS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, kind)| *kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Cmd => "cmd",
            ActionKind::Git => "git",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = TiddlyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ActionKind::lookup(s).ok_or(TiddlyError::InvalidEventActionType)
    }
}

// ---------------------------------------------------------------------------
// BoundAction
// ---------------------------------------------------------------------------

/// One configured action: its kind plus the raw, unbound argument template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundAction {
    pub kind: ActionKind,
    pub template: Vec<String>,
}

impl BoundAction {
    pub fn new(kind: ActionKind, template: Vec<String>) -> Self {
        Self { kind, template }
    }
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// A fully bound action, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Command { program: String, args: Vec<String> },
    GitStage { path: String },
    GitCommit,
}

impl Invocation {
    pub fn resolve(kind: ActionKind, mut bound: Vec<String>) -> Result<Invocation> {
        match kind {
            ActionKind::Cmd => {
                if bound.is_empty() {
                    return Err(TiddlyError::NoCommandSpecified);
                }
                let program = bound.remove(0);
                Ok(Invocation::Command {
                    program,
                    args: bound,
                })
            }
            ActionKind::Git => match bound.first().map(String::as_str) {
                None => Err(TiddlyError::NoCommandSpecified),
                Some("add") => match bound.get(1) {
                    Some(path) => Ok(Invocation::GitStage { path: path.clone() }),
                    None => Err(TiddlyError::ExecutionFailed(
                        "git add requires a file name".into(),
                    )),
                },
                Some("commit") => Ok(Invocation::GitCommit),
                Some(other) => Err(TiddlyError::ExecutionFailed(format!(
                    "unsupported git operation '{other}'"
                ))),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Commit settings shared by every `git commit` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSettings {
    pub message: String,
    pub author: Option<String>,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            message: crate::config::DEFAULT_COMMIT_MESSAGE.to_string(),
            author: None,
        }
    }
}

/// Runs invocations through a shared process runner.
#[derive(Clone)]
pub struct Executor {
    runner: Arc<dyn ProcessRunner>,
    git: GitSettings,
}

impl Executor {
    pub fn new(runner: Arc<dyn ProcessRunner>, git: GitSettings) -> Self {
        Self { runner, git }
    }

    /// Resolve `bound` for `kind` and run it.
    pub fn execute(&self, kind: ActionKind, bound: Vec<String>) -> Result<()> {
        let invocation = Invocation::resolve(kind, bound)?;
        tracing::debug!(?invocation, "running hook action");
        match invocation {
            Invocation::Command { program, args } => self.run_command(&program, &args),
            Invocation::GitStage { path } => self.run_git(vec!["add".into(), path]),
            Invocation::GitCommit => {
                let mut args = vec!["commit".into(), "-m".into(), self.git.message.clone()];
                if let Some(author) = &self.git.author {
                    args.push(format!("--author={author} <system@tiddly>"));
                }
                self.run_git(args)
            }
        }
    }

    /// Only the exit status matters; stderr is dropped.
    fn run_command(&self, program: &str, args: &[String]) -> Result<()> {
        let output = self.runner.run(program, args)?;
        if output.success {
            Ok(())
        } else {
            Err(TiddlyError::ExecutionFailed(format!(
                "'{program}' exited unsuccessfully"
            )))
        }
    }

    /// git signals failure through stderr; its exit status is not consulted.
    fn run_git(&self, args: Vec<String>) -> Result<()> {
        let output = self.runner.run("git", &args)?;
        if output.stderr.is_empty() {
            Ok(())
        } else {
            Err(TiddlyError::ExecutionFailed(output.stderr.trim().to_string()))
        }
    }
}
