//! Project dependency convergence.
//!
//! `buildtools/` is fetched by `gclient sync`. Whether the sync runs depends
//! only on that directory existing; the first-build classification below
//! changes what is printed, nothing else.

use std::fmt;

use anyhow::Result;

use crate::core::{ExecEnv, ProjectLayout};
use crate::toolchain::{Tool, ToolPathResolver};
use crate::util::errors::{BuildError, SyncFailure};
use crate::util::process::{CommandRunner, ProcessBuilder};

/// Arguments passed to `gclient`.
pub const SYNC_ARGS: [&str; 3] = ["sync", "--no-history", "--shallow"];

/// Rough classification of the checkout, for messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    FirstBuild,
    Incremental,
}

impl BuildKind {
    /// A checkout counts as fresh when `buildtools/` is missing or neither
    /// `.gclient` nor `.gclient_entries` exists. A leftover `build/` directory
    /// does not make a checkout incremental.
    pub fn classify(layout: &ProjectLayout) -> BuildKind {
        let has_buildtools = layout.buildtools_dir().exists();
        let has_gclient =
            layout.gclient_file().exists() || layout.gclient_entries_file().exists();

        if !has_buildtools || !has_gclient {
            BuildKind::FirstBuild
        } else {
            BuildKind::Incremental
        }
    }

    pub fn is_first_build(&self) -> bool {
        matches!(self, BuildKind::FirstBuild)
    }
}

/// Hint attached to a failed `gn gen` when the dependencies look incomplete.
pub fn generate_failure_hint(layout: &ProjectLayout) -> Option<String> {
    let incomplete = BuildKind::classify(layout).is_first_build()
        || !layout.buildtools_dir().exists();
    incomplete.then(|| "this looks like a first build; dependencies may not be fully downloaded".to_string())
}

/// What [`DependencySync::ensure`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// `buildtools/` already existed; nothing ran.
    AlreadyPresent,
    /// `gclient sync` ran and produced `buildtools/`.
    Synced,
    /// `gclient sync` succeeded but `buildtools/` is still missing.
    StillMissing,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::AlreadyPresent => write!(f, "already present"),
            SyncOutcome::Synced => write!(f, "synced"),
            SyncOutcome::StillMissing => write!(f, "still missing after sync"),
        }
    }
}

/// Brings `buildtools/` into existence.
pub struct DependencySync<'a> {
    layout: &'a ProjectLayout,
    runner: &'a dyn CommandRunner,
}

impl<'a> DependencySync<'a> {
    pub fn new(layout: &'a ProjectLayout, runner: &'a dyn CommandRunner) -> Self {
        DependencySync { layout, runner }
    }

    /// Run `gclient sync` if `buildtools/` is missing.
    ///
    /// A missing `gclient` or a failed sync is fatal. A sync that succeeds
    /// without producing `buildtools/` is only a warning.
    pub fn ensure(&self, env: &ExecEnv) -> Result<SyncOutcome> {
        let kind = BuildKind::classify(self.layout);
        let buildtools = self.layout.buildtools_dir();

        if buildtools.exists() {
            tracing::info!("Dependencies present: {}", buildtools.display());
            return Ok(SyncOutcome::AlreadyPresent);
        }

        if kind.is_first_build() {
            tracing::info!("First build detected, downloading dependencies (this may take several minutes)...");
        } else {
            tracing::info!("buildtools is missing, downloading dependencies...");
        }

        let gclient = ToolPathResolver::new(self.layout, env)
            .resolve(Tool::Gclient)
            .map_err(|_| BuildError::DependencySync {
                reason: SyncFailure::ToolMissing,
            })?;

        let cmd = env.apply(
            ProcessBuilder::new(gclient.path())
                .args(SYNC_ARGS)
                .cwd(self.layout.root()),
        )?;
        let status = self.runner.run(&cmd).map_err(|e| {
            tracing::warn!("failed to run `{}`: {:#}", cmd.display_command(), e);
            BuildError::DependencySync {
                reason: SyncFailure::ToolMissing,
            }
        })?;

        if !status.success() {
            return Err(BuildError::DependencySync {
                reason: SyncFailure::Exited(status),
            }
            .into());
        }

        if buildtools.exists() {
            tracing::info!("Dependencies downloaded");
            Ok(SyncOutcome::Synced)
        } else {
            tracing::warn!(
                "`gclient sync` finished but {} was not created; the build may fail",
                buildtools.display()
            );
            Ok(SyncOutcome::StillMissing)
        }
    }
}
