//! Categorized pipeline errors.
//!
//! Components return `anyhow::Result`; the root cause of every fatal
//! condition is one of these variants so `main` can render a categorized
//! diagnostic with a next action.

use std::fmt;
use std::io;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::process::ProcessStatus;

/// The two external build stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    /// `gn gen`
    Generate,
    /// `ninja -C`
    Compile,
}

impl BuildStage {
    /// Tool that runs this stage.
    pub fn tool(&self) -> &'static str {
        match self {
            BuildStage::Generate => "gn gen",
            BuildStage::Compile => "ninja",
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStage::Generate => write!(f, "generate"),
            BuildStage::Compile => write!(f, "compile"),
        }
    }
}

/// Why the dependency sync failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncFailure {
    /// `gclient` is not on the search path or cannot be started.
    ToolMissing,
    /// `gclient sync` ran and failed.
    Exited(ProcessStatus),
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncFailure::ToolMissing => write!(f, "`gclient` command not found"),
            SyncFailure::Exited(status) => write!(f, "`gclient sync` failed with {}", status),
        }
    }
}

/// Error during toolchain bootstrap, dependency sync, build or packaging.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum BuildError {
    #[error("failed to clone depot_tools from {url}")]
    #[diagnostic(
        code(macbuild::toolchain::acquire),
        help("check your network connection and the repository URL")
    )]
    ToolAcquisition {
        url: String,
        dest: PathBuf,
        reason: String,
    },

    #[error("depot_tools initialization may have failed ({status})")]
    #[diagnostic(
        code(macbuild::toolchain::init),
        help("the toolchain may still be usable; re-run `macbuild --setup-depot-tools` to retry")
    )]
    ToolInit {
        script: PathBuf,
        status: ProcessStatus,
    },

    #[error("could not find `{tool}`")]
    #[diagnostic(
        code(macbuild::toolchain::not_found),
        help("set up depot_tools with `macbuild --setup-depot-tools`")
    )]
    ToolNotFound { tool: String, searched: Vec<PathBuf> },

    #[error("depot_tools setup failed")]
    #[diagnostic(
        code(macbuild::toolchain::unavailable),
        help("install depot_tools manually and add it to PATH")
    )]
    ToolchainUnavailable { dir: PathBuf },

    #[error("dependency check failed: {reason}")]
    #[diagnostic(
        code(macbuild::deps::sync),
        help("if buildtools already exists elsewhere, place it in the project root")
    )]
    DependencySync { reason: SyncFailure },

    #[error("failed to write build configuration {}", .path.display())]
    #[diagnostic(code(macbuild::config::write))]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{}` failed during the {stage} stage ({status})", .stage.tool())]
    #[diagnostic(code(macbuild::build::stage))]
    BuildStage {
        stage: BuildStage,
        status: ProcessStatus,
        hint: Option<String>,
    },

    #[error("build finished but {} was not produced", .path.display())]
    #[diagnostic(
        code(macbuild::build::output_missing),
        help("check the compiler output above for the target that failed to link")
    )]
    OutputMissing { path: PathBuf },

    #[error("failed to assemble {}: {reason}", .bundle.display())]
    #[diagnostic(
        code(macbuild::bundle::package),
        help("remove the partial bundle and re-run the build")
    )]
    Packaging { bundle: PathBuf, reason: String },

    #[error("failed to update depot_tools: {reason}")]
    #[diagnostic(code(macbuild::toolchain::update))]
    UpdateFailed { dir: PathBuf, reason: String },
}

impl BuildError {
    /// Whether this condition terminates the run.
    ///
    /// Only a failed bootstrap script is downgraded to a warning.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, BuildError::ToolInit { .. })
    }

    /// Convert to a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = if self.is_fatal() {
            Diagnostic::error(self.to_string())
        } else {
            Diagnostic::warning(self.to_string())
        };

        if let Some(code) = MietteDiagnostic::code(self) {
            diag = diag.with_code(code.to_string());
        }

        match self {
            BuildError::ToolAcquisition { dest, reason, .. } => {
                diag = diag.with_context(reason.clone()).with_location(dest);
            }
            BuildError::ToolInit { script, .. } => {
                diag = diag.with_location(script).with_suggestion(format!(
                    "refresh the checkout: `{}`",
                    suggestions::UPDATE_DEPOT_TOOLS
                ));
            }
            BuildError::ToolNotFound { tool, searched } => {
                for path in searched {
                    diag = diag.with_context(format!("not found at {}", path.display()));
                }
                if tool == "gn" {
                    diag = diag.with_suggestion(format!(
                        "fetch the project buildtools: `{}`",
                        suggestions::GCLIENT_SYNC
                    ));
                }
            }
            BuildError::ToolchainUnavailable { dir } => {
                diag = diag
                    .with_location(dir)
                    .with_suggestion(format!("`{}`", suggestions::SETUP_DEPOT_TOOLS));
            }
            BuildError::DependencySync { reason } => {
                diag = match reason {
                    SyncFailure::ToolMissing => diag
                        .with_context("depot_tools must be set up before dependencies can be synced")
                        .with_suggestion(format!("`{}`", suggestions::SETUP_DEPOT_TOOLS)),
                    SyncFailure::Exited(_) => diag.with_suggestion(format!(
                        "run it manually: `{}`",
                        suggestions::GCLIENT_SYNC
                    )),
                };
            }
            BuildError::ConfigWrite { path, source } => {
                diag = diag.with_context(source.to_string()).with_location(path);
            }
            BuildError::BuildStage { hint, .. } => {
                if let Some(hint) = hint {
                    diag = diag
                        .with_context(hint.clone())
                        .with_suggestion(format!("`{}`", suggestions::GCLIENT_SYNC));
                }
                diag = diag.with_suggestion(suggestions::VERBOSE);
            }
            BuildError::OutputMissing { path } => {
                diag = diag.with_location(path);
            }
            BuildError::Packaging { bundle, .. } => {
                diag = diag.with_location(bundle);
            }
            BuildError::UpdateFailed { dir, .. } => {
                diag = diag
                    .with_location(dir)
                    .with_suggestion(suggestions::CHECK_NETWORK)
                    .with_suggestion(format!(
                        "re-clone from scratch: `{}`",
                        suggestions::SETUP_DEPOT_TOOLS
                    ));
            }
        }

        if let Some(help) = MietteDiagnostic::help(self) {
            diag = diag.with_suggestion(help.to_string());
        }

        diag
    }
}

/// Find the categorized root cause in an error chain, if there is one.
pub fn find_build_error(err: &anyhow::Error) -> Option<&BuildError> {
    err.chain().find_map(|e| e.downcast_ref::<BuildError>())
}
