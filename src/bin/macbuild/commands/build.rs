//! Full build: toolchain, dependencies, `gn gen`, `ninja`, bundle.

use anyhow::Result;

use super::Project;
use crate::cli::Cli;
use macbuild::core::{BuildContext, ExecEnv, TargetCpu};
use macbuild::ops::{BuildOrchestrator, BuildStep};
use macbuild::toolchain::GitVcs;
use macbuild::util::shell::{Shell, Status};
use macbuild::util::SystemRunner;

pub fn execute(cli: &Cli, shell: &Shell) -> Result<()> {
    let project = Project::from_cli(cli)?;
    let cpu = cli.target_cpu.unwrap_or_else(TargetCpu::host);
    let ctx = BuildContext::new(project.layout, cli.build_type, cpu);

    let span = shell.span(
        Status::Building,
        format!(
            "{} ({}, {})",
            project.config.build_target(),
            ctx.variant(),
            ctx.cpu()
        ),
    );

    let on_step = |step: BuildStep| {
        let status = match step {
            BuildStep::Toolchain | BuildStep::Dependencies => Status::Info,
            BuildStep::Configure | BuildStep::Generate | BuildStep::Compile => Status::Building,
            BuildStep::Package => Status::Created,
        };
        shell.status(status, step);
    };

    let mut env = ExecEnv::from_process();
    let report = BuildOrchestrator::new(&ctx, &project.config, &SystemRunner, &GitVcs)
        .on_step(&on_step)
        .build(&mut env)?;

    span.finish_with_message(format!("{} build", ctx.variant()));
    shell.status(Status::Ready, report.bundle.display());
    shell.note(format!("binary size: {}MB", report.binary_size_mb()));

    Ok(())
}
