//! Implementation of `macbuild --setup-depot-tools`.

use anyhow::Result;

use crate::core::{ExecEnv, ProjectLayout};
use crate::toolchain::{Confirm, ToolchainManager, ToolchainState, Vcs};
use crate::util::config::Config;
use crate::util::errors::BuildError;
use crate::util::process::CommandRunner;

/// Acquire and initialize the vendored toolchain without building.
///
/// With `confirm` set the operator is asked before anything is downloaded.
/// Declining, or ending up without a usable `gn`, is reported as
/// [`BuildError::ToolchainUnavailable`].
pub fn setup(
    layout: &ProjectLayout,
    config: &Config,
    vcs: &dyn Vcs,
    runner: &dyn CommandRunner,
    confirm: Option<&dyn Confirm>,
    env: &mut ExecEnv,
) -> Result<ToolchainState> {
    let mut manager = ToolchainManager::new(
        layout,
        config.toolchain_repository()?,
        config.toolchain_branch(),
        vcs,
        runner,
    );
    if let Some(confirm) = confirm {
        manager = manager.interactive(confirm);
    }

    if !manager.ensure_available(env)? {
        return Err(BuildError::ToolchainUnavailable {
            dir: layout.toolchain_dir().to_path_buf(),
        }
        .into());
    }

    Ok(manager.probe(env))
}
