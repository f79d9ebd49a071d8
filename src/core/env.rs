//! Execution environment threaded into every child process.
//!
//! The vendored toolchain is made visible to child processes by prepending
//! it to this value's search path, never by mutating the process-global
//! `PATH`.

use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::process::ProcessBuilder;

/// Search path and extra variables for child processes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecEnv {
    search_path: Vec<PathBuf>,
    vars: BTreeMap<String, OsString>,
}

impl ExecEnv {
    /// Snapshot the current process `PATH`.
    pub fn from_process() -> Self {
        let search_path = env::var_os("PATH")
            .map(|path| env::split_paths(&path).collect())
            .unwrap_or_default();
        ExecEnv {
            search_path,
            vars: BTreeMap::new(),
        }
    }

    /// An environment with exactly the given search path.
    pub fn with_search_path<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        ExecEnv {
            search_path: paths.into_iter().map(Into::into).collect(),
            vars: BTreeMap::new(),
        }
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Put `dir` in front of the search path unless it is already present.
    ///
    /// Returns `true` if the entry was added.
    pub fn prepend_path(&mut self, dir: impl AsRef<Path>) -> bool {
        let dir = dir.as_ref();
        if self.search_path.iter().any(|p| p == dir) {
            return false;
        }
        self.search_path.insert(0, dir.to_path_buf());
        true
    }

    /// Set a variable passed to every child.
    pub fn set_var(&mut self, key: impl Into<String>, value: impl AsRef<OsStr>) {
        self.vars.insert(key.into(), value.as_ref().to_os_string());
    }

    pub fn var(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(key).map(OsString::as_os_str)
    }

    /// The search path joined with the platform separator.
    pub fn joined_search_path(&self) -> Result<OsString> {
        env::join_paths(&self.search_path).context("search path contains an invalid entry")
    }

    /// First match for `name` on the search path.
    pub fn which(&self, name: &str) -> Option<PathBuf> {
        if self.search_path.is_empty() {
            return None;
        }
        let paths = self.joined_search_path().ok()?;
        let cwd = env::current_dir().unwrap_or_default();
        which::which_in(name, Some(paths), cwd).ok()
    }

    /// Apply the search path and variables to a command.
    pub fn apply(&self, mut cmd: ProcessBuilder) -> Result<ProcessBuilder> {
        cmd = cmd.env("PATH", self.joined_search_path()?);
        for (key, value) in &self.vars {
            cmd = cmd.env(key.clone(), value);
        }
        Ok(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prepend_path_is_idempotent() {
        let mut env = ExecEnv::with_search_path(["/usr/bin", "/bin"]);

        assert!(env.prepend_path("/src/tools/depot_tools"));
        assert!(!env.prepend_path("/src/tools/depot_tools"));
        assert!(!env.prepend_path("/usr/bin"));

        assert_eq!(
            env.search_path(),
            &[
                PathBuf::from("/src/tools/depot_tools"),
                PathBuf::from("/usr/bin"),
                PathBuf::from("/bin"),
            ]
        );
    }

    #[test]
    fn test_apply_sets_path_and_vars() {
        let mut env = ExecEnv::with_search_path(["/opt/tools"]);
        env.set_var("DEPOT_TOOLS_UPDATE", "0");

        let cmd = env.apply(ProcessBuilder::new("gclient")).unwrap();

        assert_eq!(cmd.get_env("PATH"), Some(OsStr::new("/opt/tools")));
        assert_eq!(cmd.get_env("DEPOT_TOOLS_UPDATE"), Some(OsStr::new("0")));
    }

    #[test]
    fn test_empty_search_path_finds_nothing() {
        let env = ExecEnv::default();
        assert_eq!(env.which("sh"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_which_uses_own_search_path() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let tool = tmp.path().join("ninja");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let env = ExecEnv::with_search_path([tmp.path()]);
        assert_eq!(env.which("ninja"), Some(tool));
        assert_eq!(env.which("gn"), None);
    }
}
