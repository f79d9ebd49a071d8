//! High-level operations.
//!
//! This module contains the implementation of macbuild's three modes.

pub mod macbuild_build;
pub mod macbuild_setup;
pub mod macbuild_update;
pub mod sync;

pub use macbuild_build::{BuildOrchestrator, BuildReport, BuildStep};
pub use macbuild_setup::setup;
pub use macbuild_update::update;
pub use sync::{BuildKind, DependencySync, SyncOutcome};
