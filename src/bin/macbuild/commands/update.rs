//! `--update-depot-tools`

use anyhow::Result;

use super::Project;
use crate::cli::Cli;
use macbuild::ops;
use macbuild::toolchain::GitVcs;
use macbuild::util::shell::{Shell, Status};
use macbuild::util::SystemRunner;

pub fn execute(cli: &Cli, shell: &Shell) -> Result<()> {
    let project = Project::from_cli(cli)?;

    shell.status(
        Status::Fetching,
        format!("latest depot_tools into {}", project.layout.toolchain_dir().display()),
    );
    ops::update(&project.layout, &project.config, &GitVcs, &SystemRunner)?;
    shell.status(Status::Updated, "depot_tools");

    Ok(())
}
