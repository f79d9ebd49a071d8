//! Build inputs and outputs.
//!
//! This module renders the `gn` argument file and assembles the `.app`
//! bundle from the linked binary.

pub mod args;
pub mod bundle;

pub use args::BuildArgs;
pub use bundle::{verify_bundle, BundleManifest, BundlePackager};
