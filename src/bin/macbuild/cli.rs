//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use macbuild::core::{BuildVariant, TargetCpu};
use macbuild::util::shell::ColorChoice;

/// macbuild - bootstrap the toolchain and build the macOS PDF viewer
#[derive(Parser, Debug)]
#[command(name = "macbuild")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode").args(["auto", "setup_depot_tools", "update_depot_tools"])
))]
pub struct Cli {
    /// Build with the default configuration, without prompting
    #[arg(long)]
    pub auto: bool,

    /// Only clone and initialize depot_tools
    #[arg(long)]
    pub setup_depot_tools: bool,

    /// Only update an existing depot_tools checkout
    #[arg(long)]
    pub update_depot_tools: bool,

    /// Build variant (Debug or Release)
    #[arg(long, value_name = "TYPE", default_value = "Debug")]
    pub build_type: BuildVariant,

    /// Target CPU (x64 or arm64); defaults to the host architecture
    #[arg(long, value_name = "CPU")]
    pub target_cpu: Option<TargetCpu>,

    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR", env = "MACBUILD_PROJECT_ROOT")]
    pub project_root: Option<PathBuf>,

    /// Answer yes to the depot_tools download prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,
}

/// What a run does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Build,
    Setup,
    Update,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.setup_depot_tools {
            Mode::Setup
        } else if self.update_depot_tools {
            Mode::Update
        } else {
            Mode::Build
        }
    }
}
