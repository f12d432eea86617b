//! Subprocess invocation for hook actions.
//!
//! Executors never touch `std::process` directly; they go through a
//! [`ProcessRunner`] so the wiki directory is applied consistently and tests
//! can observe invocations without spawning anything.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Result, TiddlyError};

/// Captured result of one finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs an external program to completion and captures its output.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput>;
}

/// Runs programs with the wiki directory as the working directory.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    dir: PathBuf,
}

impl SystemRunner {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput> {
        let cwd = std::path::absolute(&self.dir)?;

        let output = Command::new(program)
            .args(args)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| TiddlyError::ExecutionFailed(format!("failed to spawn '{program}': {e}")))?;

        Ok(ProcessOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Records every invocation and replays queued outputs in order.
    /// Once the queue is empty each call succeeds with no output.
    #[derive(Default)]
    pub struct RecordingRunner {
        pub calls: Mutex<Vec<Vec<String>>>,
        outputs: Mutex<VecDeque<ProcessOutput>>,
    }

    impl RecordingRunner {
        pub fn push_output(&self, output: ProcessOutput) {
            self.outputs.lock().unwrap().push_back(output);
        }

        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProcessRunner for RecordingRunner {
        fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput> {
            let mut argv = vec![program.to_string()];
            argv.extend(args.iter().cloned());
            self.calls.lock().unwrap().push(argv);
            Ok(self
                .outputs
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(ProcessOutput {
                    success: true,
                    ..Default::default()
                }))
        }
    }
}
