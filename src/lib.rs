//! macbuild - toolchain bootstrap and build driver for the macOS PDF viewer
//!
//! This crate provides the library behind the `macbuild` CLI: converging the
//! vendored `depot_tools` checkout and the project's `buildtools/`,
//! resolving `gn`/`ninja`/`gclient`, generating `args.gn`, running the
//! two-stage build and packaging the result as an `.app` bundle.

pub mod builder;
pub mod core;
pub mod ops;
pub mod toolchain;
pub mod util;

/// Test utilities and mocks for macbuild unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides recording implementations of the process
/// runner and version control seams, plus project fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{BuildContext, BuildVariant, ExecEnv, ProjectLayout, TargetCpu};
pub use ops::{BuildOrchestrator, BuildReport};
pub use util::{BuildError, Config};
