//! `args.gn` generation.
//!
//! The file is a flat `key = value` list consumed by `gn gen`. It is a pure
//! function of the build variant, the target CPU and the minimum SDK, and is
//! rewritten on every build.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::{BuildVariant, TargetCpu};
use crate::util::config::DEFAULT_MAC_SDK_MIN;
use crate::util::errors::BuildError;

/// File name inside the build directory.
pub const ARGS_FILE: &str = "args.gn";

/// A GN literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Bool(bool),
    Int(u32),
    Str(String),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(b) => write!(f, "{}", b),
            ArgValue::Int(n) => write!(f, "{}", n),
            ArgValue::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Build arguments for one variant and CPU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArgs {
    variant: BuildVariant,
    cpu: TargetCpu,
    mac_sdk_min: String,
}

impl BuildArgs {
    pub fn new(variant: BuildVariant, cpu: TargetCpu) -> Self {
        BuildArgs {
            variant,
            cpu,
            mac_sdk_min: DEFAULT_MAC_SDK_MIN.to_string(),
        }
    }

    pub fn mac_sdk_min(mut self, version: impl Into<String>) -> Self {
        self.mac_sdk_min = version.into();
        self
    }

    /// Every argument in output order.
    pub fn entries(&self) -> Vec<(&'static str, ArgValue)> {
        use ArgValue::*;

        vec![
            ("is_debug", Bool(self.variant.is_debug())),
            ("symbol_level", Int(2)),
            ("pdf_enable_fontations", Bool(false)),
            ("pdf_enable_xfa", Bool(false)),
            ("pdf_enable_v8", Bool(false)),
            ("pdf_is_standalone", Bool(true)),
            ("is_component_build", Bool(false)),
            ("pdf_use_skia", Bool(false)),
            ("target_os", Str("mac".to_string())),
            ("target_cpu", Str(self.cpu.as_str().to_string())),
            ("mac_sdk_min", Str(self.mac_sdk_min.clone())),
            ("clang_use_chrome_plugins", Bool(false)),
            ("treat_warnings_as_errors", Bool(false)),
            ("use_custom_libcxx", Bool(false)),
            ("use_clang_modules", Bool(false)),
        ]
    }

    /// Render the file contents.
    pub fn render(&self) -> String {
        let mut out = String::from("# macOS build configuration, generated by macbuild\n");
        for (key, value) in self.entries() {
            out.push_str(&format!("{} = {}\n", key, value));
        }
        out
    }

    /// Write `<build_dir>/args.gn`, replacing any existing file.
    ///
    /// `build_dir` must already exist.
    pub fn write(&self, build_dir: &Path) -> Result<PathBuf, BuildError> {
        let path = build_dir.join(ARGS_FILE);
        std::fs::write(&path, self.render()).map_err(|source| BuildError::ConfigWrite {
            path: path.clone(),
            source,
        })?;

        tracing::info!(
            "Wrote {} ({}, target_cpu = {})",
            path.display(),
            self.variant,
            self.cpu
        );
        Ok(path)
    }
}
