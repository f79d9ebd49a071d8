//! Command implementations

pub mod build;
pub mod setup;
pub mod update;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::cli::Cli;
use macbuild::core::ProjectLayout;
use macbuild::util::config::{load_project_config, Config};

/// Project root and merged configuration shared by every mode.
pub struct Project {
    pub layout: ProjectLayout,
    pub config: Config,
}

impl Project {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = match cli.project_root {
            Some(ref root) => root.clone(),
            None => std::env::current_dir().context("failed to determine current directory")?,
        };
        let root = absolute(root)?;
        if !root.is_dir() {
            bail!("project root {} is not a directory", root.display());
        }

        let config = load_project_config(&root);
        let layout = ProjectLayout::new(&root).with_toolchain_dir(config.toolchain_dir());
        tracing::debug!("Project root: {}", layout.root().display());

        Ok(Project { layout, config })
    }
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    Ok(cwd.join(path))
}
