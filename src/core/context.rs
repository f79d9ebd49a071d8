//! Per-run build context.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::arch::TargetCpu;
use crate::core::layout::ProjectLayout;

/// Debug/Release axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildVariant {
    #[default]
    Debug,
    Release,
}

impl BuildVariant {
    /// Name used for the output directory (`out/Debug`).
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildVariant::Debug => "Debug",
            BuildVariant::Release => "Release",
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, BuildVariant::Debug)
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(BuildVariant::Debug),
            "release" => Ok(BuildVariant::Release),
            _ => Err(format!(
                "invalid build type '{}'; expected 'Debug' or 'Release'",
                s
            )),
        }
    }
}

/// Immutable inputs of one build: where, what variant, which CPU.
///
/// Created once when the build starts and only ever borrowed afterwards.
#[derive(Debug, Clone)]
pub struct BuildContext {
    layout: ProjectLayout,
    build_dir: PathBuf,
    variant: BuildVariant,
    cpu: TargetCpu,
}

impl BuildContext {
    pub fn new(layout: ProjectLayout, variant: BuildVariant, cpu: TargetCpu) -> Self {
        let build_dir = layout.out_dir(variant);
        BuildContext {
            layout,
            build_dir,
            variant,
            cpu,
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn project_root(&self) -> &Path {
        self.layout.root()
    }

    /// `out/<Variant>` under the project root.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn variant(&self) -> BuildVariant {
        self.variant
    }

    pub fn cpu(&self) -> TargetCpu {
        self.cpu
    }
}
