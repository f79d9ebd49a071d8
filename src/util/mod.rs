//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod errors;
pub mod fs;
pub mod process;
pub mod shell;

pub use config::Config;
pub use diagnostic::Diagnostic;
pub use errors::BuildError;
pub use process::{CommandRunner, ProcessBuilder, ProcessStatus, SystemRunner};
