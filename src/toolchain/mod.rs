//! Build toolchain management.
//!
//! - Locating `gn`, `ninja` and `gclient` ([`resolve`])
//! - Acquiring, initializing and updating the vendored `depot_tools` ([`depot`])
//! - Git access for the vendored checkout ([`vcs`])

pub mod depot;
pub mod resolve;
pub mod vcs;

pub use depot::{probe, Confirm, InitOutcome, ToolchainManager, ToolchainState};
pub use resolve::{Tool, ToolPath, ToolPathResolver, ToolTier};
pub use vcs::{GitVcs, Vcs};
