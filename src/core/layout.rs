//! Filesystem layout of a project checkout.
//!
//! ```text
//! <root>/
//!   tools/depot_tools/          vendored toolchain
//!   buildtools/                 fetched by `gclient sync`
//!   out/<Variant>/args.gn       generated build configuration
//!   platform/mac/Info.plist     optional manifest template
//!   platform/mac/Resources/     optional bundle resources
//!   .gclient, .gclient_entries  dependency-manager markers
//! ```

use std::path::{Path, PathBuf};

use crate::core::context::BuildVariant;
use crate::util::config::DEFAULT_TOOLCHAIN_DIR;

/// Bootstrap entry point inside the vendored toolchain.
pub const BOOTSTRAP_SCRIPT: &str = "ensure_bootstrap";

/// Created by a successful bootstrap; its presence skips re-initialization.
pub const INIT_MARKER: &str = "python-bin/python3";

/// Paths the pipeline reads and writes, all derived from the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
    toolchain_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let toolchain_dir = root.join(DEFAULT_TOOLCHAIN_DIR);
        ProjectLayout {
            root,
            toolchain_dir,
        }
    }

    /// Relocate the vendored toolchain. Relative paths are taken from the root.
    pub fn with_toolchain_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.toolchain_dir = self.root.join(dir);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn toolchain_dir(&self) -> &Path {
        &self.toolchain_dir
    }

    pub fn bootstrap_script(&self) -> PathBuf {
        self.toolchain_dir.join(BOOTSTRAP_SCRIPT)
    }

    pub fn init_marker(&self) -> PathBuf {
        self.toolchain_dir.join(INIT_MARKER)
    }

    pub fn buildtools_dir(&self) -> PathBuf {
        self.root.join("buildtools")
    }

    pub fn gclient_file(&self) -> PathBuf {
        self.root.join(".gclient")
    }

    pub fn gclient_entries_file(&self) -> PathBuf {
        self.root.join(".gclient_entries")
    }

    /// `out/<Variant>`
    pub fn out_dir(&self, variant: BuildVariant) -> PathBuf {
        self.root.join("out").join(variant.as_str())
    }

    pub fn platform_dir(&self) -> PathBuf {
        self.root.join("platform").join("mac")
    }

    pub fn info_plist_template(&self) -> PathBuf {
        self.platform_dir().join("Info.plist")
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.platform_dir().join("Resources")
    }
}
