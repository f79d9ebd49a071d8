//! Core data structures for macbuild.
//!
//! - Build inputs (variant, target CPU, project layout)
//! - The execution environment handed to child processes

pub mod arch;
pub mod context;
pub mod env;
pub mod layout;

pub use arch::{HostOs, TargetCpu};
pub use context::{BuildContext, BuildVariant};
pub use env::ExecEnv;
pub use layout::ProjectLayout;
