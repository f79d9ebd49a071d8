//! Test utilities and mocks for macbuild unit tests.
//!
//! The pipeline talks to the outside world through two seams: the
//! [`CommandRunner`] that spawns child processes and the [`Vcs`] that clones
//! and pulls the toolchain. This module provides recording mocks for both,
//! plus project fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use macbuild::test_support::{MockRunner, MockVcs};
//!
//! #[test]
//! fn test_example() {
//!     let runner = MockRunner::new();
//!     runner.on("ninja", 1);
//!
//!     let vcs = MockVcs::new();
//!     // Drive the pipeline with &runner and &vcs...
//!     assert_eq!(vcs.clones().len(), 1);
//! }
//! ```

pub mod fixtures;

use std::cell::Cell;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use url::Url;

use crate::toolchain::depot::Confirm;
use crate::toolchain::vcs::Vcs;
use crate::util::process::{CommandRunner, ProcessBuilder, ProcessStatus};

pub use fixtures::*;

/// Side effect a scripted command has on the filesystem.
pub type Effect = Box<dyn Fn(&ProcessBuilder) + Send>;

/// Pattern for matching command lines in [`MockRunner`].
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Match if the command line contains the substring.
    Contains(String),
    /// Match every command.
    Any,
}

impl CommandPattern {
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Contains(s) => cmd.contains(s.as_str()),
            CommandPattern::Any => true,
        }
    }
}

enum Outcome {
    Exit(i32),
    SpawnError(String),
}

struct Expectation {
    pattern: CommandPattern,
    outcome: Outcome,
    effect: Option<Effect>,
}

/// Mock process runner.
///
/// Every command is recorded. The first matching expectation decides the
/// outcome; commands nothing matches exit successfully without side effects.
#[derive(Default)]
pub struct MockRunner {
    expectations: Mutex<Vec<Expectation>>,
    calls: Mutex<Vec<ProcessBuilder>>,
}

impl MockRunner {
    pub fn new() -> Self {
        MockRunner::default()
    }

    fn push(&self, expectation: Expectation) -> &Self {
        self.expectations.lock().unwrap().push(expectation);
        self
    }

    /// Commands containing `pattern` exit with `code`.
    pub fn on(&self, pattern: &str, code: i32) -> &Self {
        self.push(Expectation {
            pattern: CommandPattern::Contains(pattern.to_string()),
            outcome: Outcome::Exit(code),
            effect: None,
        })
    }

    /// Commands containing `pattern` run `effect`, then exit with `code`.
    pub fn on_with(
        &self,
        pattern: &str,
        code: i32,
        effect: impl Fn(&ProcessBuilder) + Send + 'static,
    ) -> &Self {
        self.push(Expectation {
            pattern: CommandPattern::Contains(pattern.to_string()),
            outcome: Outcome::Exit(code),
            effect: Some(Box::new(effect)),
        })
    }

    /// Commands containing `pattern` fail to start.
    pub fn on_spawn_error(&self, pattern: &str, message: &str) -> &Self {
        self.push(Expectation {
            pattern: CommandPattern::Contains(pattern.to_string()),
            outcome: Outcome::SpawnError(message.to_string()),
            effect: None,
        })
    }

    /// Every recorded invocation, in order.
    pub fn calls(&self) -> Vec<ProcessBuilder> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded command lines, in order.
    pub fn commands(&self) -> Vec<String> {
        self.calls().iter().map(ProcessBuilder::display_command).collect()
    }

    /// Number of recorded command lines containing `pattern`.
    pub fn count(&self, pattern: &str) -> usize {
        self.commands().iter().filter(|c| c.contains(pattern)).count()
    }

    /// First recorded invocation containing `pattern`.
    pub fn find(&self, pattern: &str) -> Option<ProcessBuilder> {
        self.calls()
            .into_iter()
            .find(|c| c.display_command().contains(pattern))
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessStatus> {
        let line = cmd.display_command();
        self.calls.lock().unwrap().push(cmd.clone());

        let expectations = self.expectations.lock().unwrap();
        match expectations.iter().find(|e| e.pattern.matches(&line)) {
            Some(expectation) => {
                if let Some(ref effect) = expectation.effect {
                    effect(cmd);
                }
                match expectation.outcome {
                    Outcome::Exit(code) => Ok(ProcessStatus::from_code(code)),
                    Outcome::SpawnError(ref message) => {
                        bail!("failed to execute `{}`: {}", line, message)
                    }
                }
            }
            None => Ok(ProcessStatus::from_code(0)),
        }
    }
}

/// Files a fresh toolchain checkout contains. Extension-less entries are
/// written without the executable bit, as a clone on a fresh filesystem
/// might leave them.
pub const FAKE_TOOLCHAIN_FILES: &[&str] =
    &["gn", "ninja", "gclient", "ensure_bootstrap", "gclient.py", "README.md"];

/// Mock version control.
///
/// A clone materializes [`FAKE_TOOLCHAIN_FILES`] in the destination.
#[derive(Debug, Default)]
pub struct MockVcs {
    failure: Option<String>,
    clones: Mutex<Vec<(Url, String, PathBuf)>>,
    pulls: Mutex<Vec<PathBuf>>,
}

impl MockVcs {
    pub fn new() -> Self {
        MockVcs::default()
    }

    /// Every clone and pull fails with `reason`.
    pub fn failing(reason: &str) -> Self {
        MockVcs {
            failure: Some(reason.to_string()),
            ..MockVcs::default()
        }
    }

    /// Destinations of every clone, in order.
    pub fn clones(&self) -> Vec<PathBuf> {
        self.clones
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, dest)| dest.clone())
            .collect()
    }

    /// `(url, branch)` of every clone, in order.
    pub fn cloned_sources(&self) -> Vec<(Url, String)> {
        self.clones
            .lock()
            .unwrap()
            .iter()
            .map(|(url, branch, _)| (url.clone(), branch.clone()))
            .collect()
    }

    pub fn pulls(&self) -> Vec<PathBuf> {
        self.pulls.lock().unwrap().clone()
    }
}

impl Vcs for MockVcs {
    fn shallow_clone(&self, url: &Url, branch: &str, dest: &Path) -> Result<()> {
        self.clones
            .lock()
            .unwrap()
            .push((url.clone(), branch.to_string(), dest.to_path_buf()));

        if let Some(ref reason) = self.failure {
            bail!("{}", reason);
        }
        if dest.exists() {
            bail!("destination already exists: {}", dest.display());
        }

        std::fs::create_dir_all(dest)?;
        for name in FAKE_TOOLCHAIN_FILES {
            std::fs::write(dest.join(name), "#!/bin/sh\nexit 0\n")?;
        }
        Ok(())
    }

    fn pull(&self, checkout: &Path, _branch: &str) -> Result<()> {
        self.pulls.lock().unwrap().push(checkout.to_path_buf());

        if let Some(ref reason) = self.failure {
            bail!("{}", reason);
        }
        Ok(())
    }
}

/// Confirmation prompt with a fixed answer.
#[derive(Debug)]
pub struct ScriptedConfirm {
    answer: bool,
    asked: Cell<usize>,
}

impl ScriptedConfirm {
    pub fn answer(answer: bool) -> Self {
        ScriptedConfirm {
            answer,
            asked: Cell::new(0),
        }
    }

    /// How many times the prompt was shown.
    pub fn asked(&self) -> usize {
        self.asked.get()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, _question: &str, _default: bool) -> Result<bool> {
        self.asked.set(self.asked.get() + 1);
        Ok(self.answer)
    }
}

/// Write a trivial shell script with mode 0755, creating parent directories.
pub fn write_executable(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}

/// Shared in-memory sink for captured log output.
#[derive(Debug, Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return its log output.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_records_and_scripts() {
        let runner = MockRunner::new();
        runner.on("ninja", 2);

        let ok = runner.run(&ProcessBuilder::new("gn").arg("gen")).unwrap();
        let failed = runner
            .run(&ProcessBuilder::new("ninja").args(["-C", "out/Debug"]))
            .unwrap();

        assert!(ok.success());
        assert_eq!(failed.code(), Some(2));
        assert_eq!(runner.commands(), vec!["gn gen", "ninja -C out/Debug"]);
        assert_eq!(runner.count("ninja"), 1);
    }

    #[test]
    fn test_mock_runner_effect_and_spawn_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let marker = tmp.path().join("synced");
        let runner = MockRunner::new();
        runner.on_with("gclient sync", 0, {
            let marker = marker.clone();
            move |_: &ProcessBuilder| std::fs::write(&marker, "").unwrap()
        });
        runner.on_spawn_error("missing-tool", "No such file or directory");

        runner.run(&ProcessBuilder::new("gclient").arg("sync")).unwrap();
        assert!(marker.exists());
        assert!(runner.run(&ProcessBuilder::new("missing-tool")).is_err());
    }

    #[test]
    fn test_capture_logs() {
        let (value, logs) = capture_logs(|| {
            tracing::warn!("toolchain looks odd");
            7
        });

        assert_eq!(value, 7);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("toolchain looks odd"));
    }

    #[test]
    fn test_mock_vcs_clone() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dest = tmp.path().join("tools/depot_tools");
        let url = Url::parse("https://example.com/depot_tools.git").unwrap();
        let vcs = MockVcs::new();

        vcs.shallow_clone(&url, "main", &dest).unwrap();

        assert!(dest.join("gn").is_file());
        assert!(vcs.shallow_clone(&url, "main", &dest).is_err());
        assert_eq!(vcs.clones(), vec![dest.clone(), dest]);
        assert_eq!(vcs.cloned_sources()[0].1, "main");
    }
}
