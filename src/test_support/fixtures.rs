//! Test fixtures for common project states.
//!
//! A [`ProjectFixture`] is a throwaway project checkout in a temporary
//! directory, built up with the pieces a scenario needs (synced
//! dependencies, an initialized toolchain, a manifest template).

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::ProjectLayout;
use crate::test_support::{write_executable, MockRunner};
use crate::util::process::ProcessBuilder;

/// Manifest used by fixtures that ship their own `Info.plist`.
pub const TEMPLATE_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>CFBundleExecutable</key>
    <string>PdfWinViewer</string>
    <key>CFBundleIdentifier</key>
    <string>org.example.template</string>
</dict>
</plist>
"#;

/// A project checkout under a temporary directory.
///
/// The project root is `<tmp>/project`; the rest of the temporary directory
/// is free for scratch use such as fake system tool directories.
pub struct ProjectFixture {
    tmp: TempDir,
    layout: ProjectLayout,
}

impl ProjectFixture {
    /// An empty project: no toolchain, no dependencies.
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("project");
        std::fs::create_dir_all(&root).unwrap();
        ProjectFixture {
            layout: ProjectLayout::new(root),
            tmp,
        }
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Scratch directory outside the project root.
    pub fn scratch(&self) -> &Path {
        self.tmp.path()
    }

    /// Dependencies as a previous `gclient sync` leaves them.
    pub fn with_synced_deps(self) -> Self {
        std::fs::create_dir_all(self.layout.buildtools_dir().join("mac")).unwrap();
        std::fs::write(self.layout.gclient_file(), "solutions = []\n").unwrap();
        std::fs::write(self.layout.gclient_entries_file(), "entries = {}\n").unwrap();
        self
    }

    /// An initialized vendored toolchain providing `gn`, `ninja` and `gclient`.
    pub fn with_vendored_toolchain(self) -> Self {
        let dir = self.layout.toolchain_dir();
        for tool in ["gn", "ninja", "gclient", "ensure_bootstrap"] {
            write_executable(&dir.join(tool));
        }
        write_executable(&self.layout.init_marker());
        self
    }

    pub fn with_info_plist(self, contents: &str) -> Self {
        let path = self.layout.info_plist_template();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
        self
    }

    /// A file under `platform/mac/Resources/`.
    pub fn with_resource(self, rel: &str, contents: &str) -> Self {
        let path = self.layout.resources_dir().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
        self
    }

    /// A directory outside the project holding executable stubs of `tools`,
    /// for use as a system search path.
    pub fn system_bin(&self, tools: &[&str]) -> PathBuf {
        let bin = self.tmp.path().join("usr-bin");
        std::fs::create_dir_all(&bin).unwrap();
        for tool in tools {
            write_executable(&bin.join(tool));
        }
        bin
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        ProjectFixture::new()
    }
}

/// A runner whose external tools behave like the real ones on success:
/// `gclient sync` creates `buildtools/` and `ninja` links `<build_dir>/<target>`.
pub fn pipeline_runner(layout: &ProjectLayout, build_dir: &Path, target: &str) -> MockRunner {
    let runner = MockRunner::new();

    runner.on_with("gclient sync", 0, {
        let buildtools = layout.buildtools_dir();
        move |_: &ProcessBuilder| std::fs::create_dir_all(buildtools.join("mac")).unwrap()
    });

    runner.on_with("ninja -C", 0, {
        let binary = build_dir.join(target);
        move |_: &ProcessBuilder| {
            std::fs::create_dir_all(binary.parent().unwrap()).unwrap();
            std::fs::write(&binary, vec![0u8; 2 * 1024 * 1024 + 17]).unwrap();
        }
    });

    runner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_layout() {
        let project = ProjectFixture::new()
            .with_synced_deps()
            .with_info_plist(TEMPLATE_PLIST)
            .with_resource("icons/app.icns", "icns");

        assert!(project.layout().buildtools_dir().is_dir());
        assert!(project.layout().gclient_file().is_file());
        assert!(project.layout().info_plist_template().is_file());
        assert!(project.layout().resources_dir().join("icons/app.icns").is_file());
        assert!(!project.scratch().join("usr-bin").exists());
    }
}
