//! Implementation of `macbuild --update-depot-tools`.

use anyhow::Result;

use crate::core::ProjectLayout;
use crate::toolchain::{ToolchainManager, Vcs};
use crate::util::config::Config;
use crate::util::process::CommandRunner;

/// Pull the latest toolchain revision into the existing checkout.
///
/// Fails with [`BuildError::UpdateFailed`](crate::util::errors::BuildError::UpdateFailed)
/// when there is no checkout or the pull fails. Never clones.
pub fn update(
    layout: &ProjectLayout,
    config: &Config,
    vcs: &dyn Vcs,
    runner: &dyn CommandRunner,
) -> Result<()> {
    ToolchainManager::new(
        layout,
        config.toolchain_repository()?,
        config.toolchain_branch(),
        vcs,
        runner,
    )
    .update()?;
    Ok(())
}
