//! Implementation of the full build.
//!
//! Sequence, each step aborting the run on failure:
//!
//! 1. Converge the toolchain (non-interactive)
//! 2. Converge `buildtools/`
//! 3. Resolve `gn` and `ninja`
//! 4. Write `out/<Variant>/args.gn`
//! 5. `gn gen out/<Variant>`
//! 6. `ninja -C out/<Variant> <target>`
//! 7. Package `<target>` into the `.app` bundle

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::{BuildArgs, BundleManifest, BundlePackager};
use crate::core::{BuildContext, ExecEnv};
use crate::ops::sync::{generate_failure_hint, DependencySync};
use crate::toolchain::{Tool, ToolPathResolver, ToolchainManager, Vcs};
use crate::util::config::Config;
use crate::util::errors::{BuildError, BuildStage};
use crate::util::fs::{ensure_dir, size_in_mib};
use crate::util::process::{CommandRunner, ProcessBuilder};

/// Pipeline steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    Toolchain,
    Dependencies,
    Configure,
    Generate,
    Compile,
    Package,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStep::Toolchain => write!(f, "checking depot_tools"),
            BuildStep::Dependencies => write!(f, "checking dependencies"),
            BuildStep::Configure => write!(f, "writing build configuration"),
            BuildStep::Generate => write!(f, "generating build files"),
            BuildStep::Compile => write!(f, "compiling"),
            BuildStep::Package => write!(f, "packaging .app bundle"),
        }
    }
}

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub bundle: PathBuf,
    pub binary: PathBuf,
    /// Size of the linked binary in bytes.
    pub binary_size: u64,
}

impl BuildReport {
    /// Binary size in whole megabytes.
    pub fn binary_size_mb(&self) -> u64 {
        size_in_mib(self.binary_size)
    }
}

/// Drives one build from toolchain check to packaged bundle.
pub struct BuildOrchestrator<'a> {
    ctx: &'a BuildContext,
    config: &'a Config,
    runner: &'a dyn CommandRunner,
    vcs: &'a dyn Vcs,
    on_step: Option<&'a dyn Fn(BuildStep)>,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(
        ctx: &'a BuildContext,
        config: &'a Config,
        runner: &'a dyn CommandRunner,
        vcs: &'a dyn Vcs,
    ) -> Self {
        BuildOrchestrator {
            ctx,
            config,
            runner,
            vcs,
            on_step: None,
        }
    }

    /// Called as each step starts.
    pub fn on_step(mut self, callback: &'a dyn Fn(BuildStep)) -> Self {
        self.on_step = Some(callback);
        self
    }

    fn step(&self, step: BuildStep) {
        tracing::debug!("step: {}", step);
        if let Some(callback) = self.on_step {
            callback(step);
        }
    }

    /// Run the pipeline. `env` gains the vendored toolchain on its search path.
    pub fn build(&self, env: &mut ExecEnv) -> Result<BuildReport> {
        let layout = self.ctx.layout();
        let build_dir = self.ctx.build_dir();

        tracing::info!(
            "Building {} ({}, {}) in {}",
            self.config.build_target(),
            self.ctx.variant(),
            self.ctx.cpu(),
            self.ctx.project_root().display()
        );

        self.step(BuildStep::Toolchain);
        let toolchain = ToolchainManager::new(
            layout,
            self.config.toolchain_repository()?,
            self.config.toolchain_branch(),
            self.vcs,
            self.runner,
        );
        if !toolchain.ensure_available(env)? {
            return Err(BuildError::ToolchainUnavailable {
                dir: layout.toolchain_dir().to_path_buf(),
            }
            .into());
        }

        self.step(BuildStep::Dependencies);
        DependencySync::new(layout, self.runner).ensure(env)?;

        let resolver = ToolPathResolver::new(layout, env);
        let gn = resolver.resolve(Tool::Gn)?;
        let ninja = resolver.resolve(Tool::Ninja)?;
        tracing::info!("Using gn: {} ({})", gn.path().display(), gn.tier);
        tracing::info!("Using ninja: {} ({})", ninja.path().display(), ninja.tier);

        self.step(BuildStep::Configure);
        ensure_dir(build_dir)?;
        BuildArgs::new(self.ctx.variant(), self.ctx.cpu())
            .mac_sdk_min(self.config.mac_sdk_min())
            .write(build_dir)?;

        self.step(BuildStep::Generate);
        let generate = ProcessBuilder::new(gn.path())
            .arg("gen")
            .arg(build_dir)
            .cwd(self.ctx.project_root())
            .env("GCLIENT_ROOT", self.ctx.project_root());
        self.run_stage(BuildStage::Generate, env, generate, || {
            generate_failure_hint(layout)
        })?;

        self.step(BuildStep::Compile);
        let compile = ProcessBuilder::new(ninja.path())
            .arg("-C")
            .arg(build_dir)
            .arg(self.config.build_target())
            .cwd(self.ctx.project_root());
        self.run_stage(BuildStage::Compile, env, compile, || None)?;

        let binary = build_dir.join(self.config.build_target());
        let binary_size = output_size(&binary)?;

        self.step(BuildStep::Package);
        let bundle = BundlePackager::new(layout, BundleManifest::from_config(self.config))
            .package(build_dir, &binary)?;

        Ok(BuildReport {
            bundle,
            binary,
            binary_size,
        })
    }

    fn run_stage(
        &self,
        stage: BuildStage,
        env: &ExecEnv,
        cmd: ProcessBuilder,
        hint: impl FnOnce() -> Option<String>,
    ) -> Result<()> {
        let cmd = env.apply(cmd)?;
        tracing::info!("Running `{}`", cmd.display_command());

        let status = self
            .runner
            .run(&cmd)
            .with_context(|| format!("failed to run `{}`", stage.tool()))?;

        if !status.success() {
            return Err(BuildError::BuildStage {
                stage,
                status,
                hint: hint(),
            }
            .into());
        }
        Ok(())
    }
}

fn output_size(binary: &Path) -> Result<u64, BuildError> {
    match std::fs::metadata(binary) {
        Ok(meta) if meta.is_file() => Ok(meta.len()),
        _ => Err(BuildError::OutputMissing {
            path: binary.to_path_buf(),
        }),
    }
}
