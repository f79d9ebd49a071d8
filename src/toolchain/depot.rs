//! Lifecycle of the vendored `depot_tools` checkout.
//!
//! ```text
//!   Absent ──clone──▶ PresentUninitialized ──ensure_bootstrap──▶ Ready
//!      └──────────── gn already on PATH ─────────────────────────▲
//! ```
//!
//! A checkout without a usable `gn` is corrupt, whatever its marker says,
//! and is cloned again.
//!
//! The state is probed from the filesystem and the search path on every
//! call. Each transition checks its target state first, so re-running after
//! a partial failure picks up where the last run stopped.

use std::fmt;

use anyhow::{Context, Result};
use url::Url;

use crate::core::{ExecEnv, ProjectLayout};
use crate::toolchain::resolve::{Tool, ToolPathResolver};
use crate::toolchain::vcs::Vcs;
use crate::util::errors::BuildError;
use crate::util::fs::{mark_scripts_executable, remove_dir_all_if_exists};
use crate::util::process::{CommandRunner, ProcessBuilder};
use crate::util::shell::Shell;

/// Observed state of the toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainState {
    /// No vendored checkout and no `gn` on the search path.
    Absent,
    /// Vendored checkout exists but its bootstrap marker does not.
    PresentUninitialized,
    /// Vendored checkout is initialized, or `gn` is already on the search path.
    Ready,
}

impl fmt::Display for ToolchainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolchainState::Absent => write!(f, "absent"),
            ToolchainState::PresentUninitialized => write!(f, "present, not initialized"),
            ToolchainState::Ready => write!(f, "ready"),
        }
    }
}

/// Probe the toolchain state. Pure with respect to its inputs; never cached.
pub fn probe(layout: &ProjectLayout, env: &ExecEnv) -> ToolchainState {
    if layout.toolchain_dir().is_dir() {
        if layout.init_marker().exists() {
            ToolchainState::Ready
        } else {
            ToolchainState::PresentUninitialized
        }
    } else if env.which(Tool::Gn.name()).is_some() {
        ToolchainState::Ready
    } else {
        ToolchainState::Absent
    }
}

/// Result of running the one-time bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    AlreadyInitialized,
    Initialized,
    /// The checkout has no `ensure_bootstrap`; nothing was run.
    ScriptMissing,
    /// The script failed. The toolchain may still be partially usable.
    Failed,
}

/// Asks the operator before a network acquisition.
pub trait Confirm {
    fn confirm(&self, question: &str, default: bool) -> Result<bool>;
}

impl Confirm for Shell {
    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        Ok(Shell::confirm(self, question, default)?)
    }
}

/// Owns acquisition, initialization, update and search-path injection of
/// the vendored toolchain.
pub struct ToolchainManager<'a> {
    layout: &'a ProjectLayout,
    repository: Url,
    branch: String,
    vcs: &'a dyn Vcs,
    runner: &'a dyn CommandRunner,
    confirm: Option<&'a dyn Confirm>,
}

impl<'a> ToolchainManager<'a> {
    pub fn new(
        layout: &'a ProjectLayout,
        repository: Url,
        branch: impl Into<String>,
        vcs: &'a dyn Vcs,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        ToolchainManager {
            layout,
            repository,
            branch: branch.into(),
            vcs,
            runner,
            confirm: None,
        }
    }

    /// Ask before cloning. Without this the manager proceeds unprompted.
    pub fn interactive(mut self, confirm: &'a dyn Confirm) -> Self {
        self.confirm = Some(confirm);
        self
    }

    pub fn probe(&self, env: &ExecEnv) -> ToolchainState {
        probe(self.layout, env)
    }

    /// `gn` runs from the vendored checkout or the search path.
    fn is_usable(&self, env: &ExecEnv) -> bool {
        let resolver = ToolPathResolver::new(self.layout, env);
        resolver.find_vendored(Tool::Gn).is_some()
            || resolver.find_on_search_path(Tool::Gn).is_some()
    }

    /// Converge to a usable toolchain and expose it on `env`'s search path.
    ///
    /// Returns `Ok(false)` if the operator declined the download or if `gn` is
    /// still not usable afterwards. A failed clone is an error.
    pub fn ensure_available(&self, env: &mut ExecEnv) -> Result<bool> {
        let state = self.probe(env);
        tracing::debug!("depot_tools state: {}", state);

        match state {
            ToolchainState::Ready if self.is_usable(env) => {
                tracing::info!("depot_tools is available");
            }
            ToolchainState::PresentUninitialized if self.is_usable(env) => {
                tracing::info!("depot_tools is not fully initialized, initializing");
                self.initialize(env);
            }
            ToolchainState::Ready
            | ToolchainState::PresentUninitialized
            | ToolchainState::Absent => {
                if state == ToolchainState::Absent {
                    tracing::warn!("depot_tools is not installed or not on PATH");
                } else {
                    tracing::warn!("depot_tools checkout has no usable `gn`, cloning it again");
                }

                if let Some(confirm) = self.confirm {
                    if !confirm.confirm("Clone and set up depot_tools automatically?", true)? {
                        tracing::info!("Install depot_tools manually and add it to PATH");
                        return Ok(false);
                    }
                }

                self.acquire()?;
                self.initialize(env);
            }
        }

        self.inject(env);

        let usable = self.is_usable(env);
        if !usable {
            tracing::warn!("depot_tools was set up but `gn` is still not usable");
        }
        Ok(usable)
    }

    /// Fresh shallow clone into the vendored directory.
    ///
    /// An existing directory is deleted first; clones are never incremental.
    pub fn acquire(&self) -> Result<()> {
        let dir = self.layout.toolchain_dir();

        if dir.exists() {
            tracing::info!("Removing existing directory: {}", dir.display());
            remove_dir_all_if_exists(dir)?;
        }

        self.vcs
            .shallow_clone(&self.repository, &self.branch, dir)
            .map_err(|e| BuildError::ToolAcquisition {
                url: self.repository.to_string(),
                dest: dir.to_path_buf(),
                reason: format!("{:#}", e),
            })?;

        if cfg!(unix) {
            match mark_scripts_executable(dir) {
                Ok(touched) => tracing::debug!("Marked {} scripts executable", touched.len()),
                Err(e) => tracing::warn!("Failed to set permissions: {:#}", e),
            }
        }

        tracing::info!("depot_tools cloned to {}", dir.display());
        Ok(())
    }

    /// Run `ensure_bootstrap` unless the checkout is already initialized.
    ///
    /// Never fails: a broken bootstrap is reported as a warning.
    pub fn initialize(&self, env: &ExecEnv) -> InitOutcome {
        if self.layout.init_marker().exists() {
            tracing::info!("depot_tools already initialized, skipping");
            return InitOutcome::AlreadyInitialized;
        }

        let script = self.layout.bootstrap_script();
        if !script.is_file() {
            tracing::warn!("{} not found, skipping initialization", script.display());
            return InitOutcome::ScriptMissing;
        }

        tracing::info!("Initializing depot_tools (this may take a few minutes)...");
        let result = env
            .apply(ProcessBuilder::new(&script).cwd(self.layout.toolchain_dir()))
            .and_then(|cmd| self.runner.run(&cmd));

        match result {
            Ok(status) if status.success() => {
                tracing::info!("depot_tools initialized");
                InitOutcome::Initialized
            }
            Ok(status) => {
                let warning = BuildError::ToolInit { script, status };
                tracing::warn!("{}", warning.to_diagnostic().format(false).trim_end());
                InitOutcome::Failed
            }
            Err(e) => {
                tracing::warn!("depot_tools initialization may have failed: {:#}", e);
                InitOutcome::Failed
            }
        }
    }

    /// Expose the vendored checkout to child processes. Idempotent.
    pub fn inject(&self, env: &mut ExecEnv) {
        let dir = self.layout.toolchain_dir();
        if dir.is_dir() && env.prepend_path(dir) {
            tracing::info!("Added {} to PATH", dir.display());
        }
    }

    /// Pull the latest revision into the existing checkout. No retry.
    pub fn update(&self) -> Result<(), BuildError> {
        let dir = self.layout.toolchain_dir();
        if !dir.is_dir() {
            return Err(BuildError::UpdateFailed {
                dir: dir.to_path_buf(),
                reason: "depot_tools directory does not exist".to_string(),
            });
        }

        self.vcs
            .pull(dir, &self.branch)
            .with_context(|| format!("git pull in {}", dir.display()))
            .map_err(|e| BuildError::UpdateFailed {
                dir: dir.to_path_buf(),
                reason: format!("{:#}", e),
            })?;

        tracing::info!("depot_tools updated");
        Ok(())
    }
}
