//! Tool path resolution.
//!
//! A tool is looked up in three tiers, most specific first:
//!
//! 1. **Project-local**: `buildtools/<host>/<tool>`, fetched by `gclient sync`
//! 2. **Vendored**: `<depot_tools>/<tool>` (Windows uses `.bat`/`.exe` wrappers)
//! 3. **System**: the first match on the [`ExecEnv`] search path
//!
//! The first existing executable wins. Running out of tiers is an error,
//! never a silent fallback.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::{ExecEnv, HostOs, ProjectLayout};
use crate::util::errors::BuildError;
use crate::util::fs::is_executable;

/// Executables the pipeline needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Build-file generator
    Gn,
    /// Compiler driver
    Ninja,
    /// Dependency fetcher
    Gclient,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Gn => "gn",
            Tool::Ninja => "ninja",
            Tool::Gclient => "gclient",
        }
    }

    /// File name inside the vendored toolchain.
    fn vendored_file_name(&self, os: HostOs) -> String {
        if !os.is_windows() {
            return self.name().to_string();
        }
        match self {
            Tool::Ninja => "ninja.exe".to_string(),
            Tool::Gn | Tool::Gclient => format!("{}.bat", self.name()),
        }
    }

    /// File name inside `buildtools/<host>/`.
    fn project_file_name(&self, os: HostOs) -> String {
        if os.is_windows() {
            format!("{}.exe", self.name())
        } else {
            self.name().to_string()
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a tool was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ToolTier {
    ProjectLocal,
    Vendored,
    System,
}

impl fmt::Display for ToolTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolTier::ProjectLocal => write!(f, "project buildtools"),
            ToolTier::Vendored => write!(f, "depot_tools"),
            ToolTier::System => write!(f, "PATH"),
        }
    }
}

/// A resolved executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPath {
    pub path: PathBuf,
    pub tier: ToolTier,
}

impl ToolPath {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Resolves tools against a project layout and an execution environment.
pub struct ToolPathResolver<'a> {
    layout: &'a ProjectLayout,
    env: &'a ExecEnv,
    os: HostOs,
}

impl<'a> ToolPathResolver<'a> {
    pub fn new(layout: &'a ProjectLayout, env: &'a ExecEnv) -> Self {
        ToolPathResolver {
            layout,
            env,
            os: HostOs::current(),
        }
    }

    /// Resolve as if running on `os` (file naming only).
    pub fn with_host_os(mut self, os: HostOs) -> Self {
        self.os = os;
        self
    }

    fn project_local_candidate(&self, tool: Tool) -> PathBuf {
        self.layout
            .buildtools_dir()
            .join(self.os.buildtools_dir())
            .join(tool.project_file_name(self.os))
    }

    fn vendored_candidate(&self, tool: Tool) -> PathBuf {
        self.layout
            .toolchain_dir()
            .join(tool.vendored_file_name(self.os))
    }

    /// Look in the vendored toolchain only.
    pub fn find_vendored(&self, tool: Tool) -> Option<ToolPath> {
        let path = self.vendored_candidate(tool);
        is_executable(&path).then_some(ToolPath {
            path,
            tier: ToolTier::Vendored,
        })
    }

    /// Look on the search path only.
    pub fn find_on_search_path(&self, tool: Tool) -> Option<ToolPath> {
        self.env.which(tool.name()).map(|path| ToolPath {
            path,
            tier: ToolTier::System,
        })
    }

    /// Resolve `tool`, trying project-local, vendored, then system.
    pub fn resolve(&self, tool: Tool) -> Result<ToolPath, BuildError> {
        let project_local = self.project_local_candidate(tool);
        if is_executable(&project_local) {
            tracing::debug!("Using {} from project buildtools: {}", tool, project_local.display());
            return Ok(ToolPath {
                path: project_local,
                tier: ToolTier::ProjectLocal,
            });
        }

        if let Some(found) = self.find_vendored(tool) {
            tracing::debug!("Using {} from depot_tools: {}", tool, found.path.display());
            return Ok(found);
        }

        if let Some(found) = self.find_on_search_path(tool) {
            tracing::debug!("Using {} from PATH: {}", tool, found.path.display());
            return Ok(found);
        }

        Err(BuildError::ToolNotFound {
            tool: tool.name().to_string(),
            searched: vec![project_local, self.vendored_candidate(tool)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_executable;
    use tempfile::TempDir;

    struct Tiers {
        _tmp: TempDir,
        layout: ProjectLayout,
        system_dir: PathBuf,
    }

    fn tiers() -> Tiers {
        let tmp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(tmp.path().join("project"));
        let system_dir = tmp.path().join("usr-bin");
        std::fs::create_dir_all(&system_dir).unwrap();
        Tiers {
            _tmp: tmp,
            layout,
            system_dir,
        }
    }

    fn resolve(t: &Tiers, tool: Tool) -> Result<ToolPath, BuildError> {
        let env = ExecEnv::with_search_path([&t.system_dir]);
        ToolPathResolver::new(&t.layout, &env)
            .with_host_os(HostOs::Mac)
            .resolve(tool)
    }

    #[cfg(unix)]
    #[test]
    fn test_tier_priority() {
        let t = tiers();
        let project_gn = t.layout.buildtools_dir().join("mac/gn");
        let vendored_gn = t.layout.toolchain_dir().join("gn");
        let system_gn = t.system_dir.join("gn");
        write_executable(&project_gn);
        write_executable(&vendored_gn);
        write_executable(&system_gn);

        let found = resolve(&t, Tool::Gn).unwrap();
        assert_eq!(found.tier, ToolTier::ProjectLocal);
        assert_eq!(found.path, project_gn);

        std::fs::remove_file(&project_gn).unwrap();
        let found = resolve(&t, Tool::Gn).unwrap();
        assert_eq!(found.tier, ToolTier::Vendored);
        assert_eq!(found.path, vendored_gn);

        std::fs::remove_file(&vendored_gn).unwrap();
        let found = resolve(&t, Tool::Gn).unwrap();
        assert_eq!(found.tier, ToolTier::System);
        assert_eq!(found.path, system_gn);

        std::fs::remove_file(&system_gn).unwrap();
        let err = resolve(&t, Tool::Gn).unwrap_err();
        assert!(matches!(err, BuildError::ToolNotFound { ref tool, .. } if tool == "gn"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_is_skipped() {
        let t = tiers();
        let vendored_ninja = t.layout.toolchain_dir().join("ninja");
        std::fs::create_dir_all(t.layout.toolchain_dir()).unwrap();
        std::fs::write(&vendored_ninja, "not executable").unwrap();
        write_executable(&t.system_dir.join("ninja"));

        let found = resolve(&t, Tool::Ninja).unwrap();
        assert_eq!(found.tier, ToolTier::System);
    }

    #[test]
    fn test_not_found_lists_file_tiers() {
        let t = tiers();

        match resolve(&t, Tool::Gclient) {
            Err(BuildError::ToolNotFound { searched, .. }) => {
                assert_eq!(
                    searched,
                    vec![
                        t.layout.buildtools_dir().join("mac/gclient"),
                        t.layout.toolchain_dir().join("gclient"),
                    ]
                );
            }
            other => panic!("expected ToolNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_windows_file_names() {
        assert_eq!(Tool::Gn.vendored_file_name(HostOs::Windows), "gn.bat");
        assert_eq!(Tool::Ninja.vendored_file_name(HostOs::Windows), "ninja.exe");
        assert_eq!(Tool::Gclient.vendored_file_name(HostOs::Windows), "gclient.bat");
        assert_eq!(Tool::Gn.project_file_name(HostOs::Windows), "gn.exe");
        assert_eq!(Tool::Gn.vendored_file_name(HostOs::Mac), "gn");
    }
}
