//! `--setup-depot-tools`

use anyhow::Result;

use super::Project;
use crate::cli::Cli;
use macbuild::core::ExecEnv;
use macbuild::ops;
use macbuild::toolchain::{Confirm, GitVcs};
use macbuild::util::shell::{Shell, Status};
use macbuild::util::SystemRunner;

pub fn execute(cli: &Cli, shell: &Shell) -> Result<()> {
    let project = Project::from_cli(cli)?;
    let confirm: Option<&dyn Confirm> = if cli.yes { None } else { Some(shell) };

    shell.status(
        Status::Fetching,
        format!("depot_tools into {}", project.layout.toolchain_dir().display()),
    );

    let mut env = ExecEnv::from_process();
    let state = ops::setup(
        &project.layout,
        &project.config,
        &GitVcs,
        &SystemRunner,
        confirm,
        &mut env,
    )?;

    shell.status(Status::Ready, format!("depot_tools ({})", state));
    Ok(())
}
