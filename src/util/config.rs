//! Configuration file support for macbuild.
//!
//! Two locations are read:
//! - Global: `~/.macbuild/config.toml` - user-wide defaults
//! - Project: `.macbuild/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config. Every key is optional;
//! accessors fall back to the built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Toolchain repository cloned into the vendored directory.
pub const DEFAULT_TOOLCHAIN_REPOSITORY: &str = "https://github.com/sunbo008/depot_tools.git";

/// Branch cloned and pulled.
pub const DEFAULT_TOOLCHAIN_BRANCH: &str = "main";

/// Vendored toolchain location, relative to the project root.
pub const DEFAULT_TOOLCHAIN_DIR: &str = "tools/depot_tools";

/// Ninja target that produces the application binary.
pub const DEFAULT_BUILD_TARGET: &str = "mac_pdf_viewer";

pub const DEFAULT_MAC_SDK_MIN: &str = "15";

pub const DEFAULT_BUNDLE_NAME: &str = "PdfWinViewer";
pub const DEFAULT_BUNDLE_IDENTIFIER: &str = "com.zfleng.PdfWinViewer";
pub const DEFAULT_BUNDLE_VERSION: &str = "1";
pub const DEFAULT_BUNDLE_SHORT_VERSION: &str = "1.0";
pub const DEFAULT_MINIMUM_SYSTEM_VERSION: &str = "12.0";

/// macbuild configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vendored toolchain settings
    pub toolchain: ToolchainConfig,

    /// Build settings
    pub build: BuildConfig,

    /// App bundle settings
    pub bundle: BundleConfig,
}

/// Vendored toolchain (`depot_tools`) settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Git URL of the toolchain repository
    pub repository: Option<String>,

    /// Branch to clone and pull
    pub branch: Option<String>,

    /// Checkout directory, relative to the project root
    pub dir: Option<PathBuf>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Ninja target name (also the name of the produced binary)
    pub target: Option<String>,

    /// Minimum macOS SDK passed as `mac_sdk_min`
    pub mac_sdk_min: Option<String>,
}

/// Values written into a synthesized `Info.plist`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Bundle and executable name
    pub name: Option<String>,

    /// Reverse-DNS bundle identifier
    pub identifier: Option<String>,

    /// `CFBundleVersion`
    pub version: Option<String>,

    /// `CFBundleShortVersionString`
    pub short_version: Option<String>,

    /// `LSMinimumSystemVersion`
    pub minimum_system_version: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.toolchain.repository.is_some() {
            self.toolchain.repository = other.toolchain.repository;
        }
        if other.toolchain.branch.is_some() {
            self.toolchain.branch = other.toolchain.branch;
        }
        if other.toolchain.dir.is_some() {
            self.toolchain.dir = other.toolchain.dir;
        }

        if other.build.target.is_some() {
            self.build.target = other.build.target;
        }
        if other.build.mac_sdk_min.is_some() {
            self.build.mac_sdk_min = other.build.mac_sdk_min;
        }

        if other.bundle.name.is_some() {
            self.bundle.name = other.bundle.name;
        }
        if other.bundle.identifier.is_some() {
            self.bundle.identifier = other.bundle.identifier;
        }
        if other.bundle.version.is_some() {
            self.bundle.version = other.bundle.version;
        }
        if other.bundle.short_version.is_some() {
            self.bundle.short_version = other.bundle.short_version;
        }
        if other.bundle.minimum_system_version.is_some() {
            self.bundle.minimum_system_version = other.bundle.minimum_system_version;
        }
    }

    /// Toolchain repository URL, validated.
    pub fn toolchain_repository(&self) -> Result<Url> {
        let raw = self
            .toolchain
            .repository
            .as_deref()
            .unwrap_or(DEFAULT_TOOLCHAIN_REPOSITORY);
        Url::parse(raw).with_context(|| format!("invalid toolchain repository URL `{}`", raw))
    }

    pub fn toolchain_branch(&self) -> &str {
        self.toolchain
            .branch
            .as_deref()
            .unwrap_or(DEFAULT_TOOLCHAIN_BRANCH)
    }

    pub fn toolchain_dir(&self) -> &Path {
        self.toolchain
            .dir
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_TOOLCHAIN_DIR))
    }

    pub fn build_target(&self) -> &str {
        self.build.target.as_deref().unwrap_or(DEFAULT_BUILD_TARGET)
    }

    pub fn mac_sdk_min(&self) -> &str {
        self.build
            .mac_sdk_min
            .as_deref()
            .unwrap_or(DEFAULT_MAC_SDK_MIN)
    }

    pub fn bundle_name(&self) -> &str {
        self.bundle.name.as_deref().unwrap_or(DEFAULT_BUNDLE_NAME)
    }

    pub fn bundle_identifier(&self) -> &str {
        self.bundle
            .identifier
            .as_deref()
            .unwrap_or(DEFAULT_BUNDLE_IDENTIFIER)
    }

    pub fn bundle_version(&self) -> &str {
        self.bundle
            .version
            .as_deref()
            .unwrap_or(DEFAULT_BUNDLE_VERSION)
    }

    pub fn bundle_short_version(&self) -> &str {
        self.bundle
            .short_version
            .as_deref()
            .unwrap_or(DEFAULT_BUNDLE_SHORT_VERSION)
    }

    pub fn minimum_system_version(&self) -> &str {
        self.bundle
            .minimum_system_version
            .as_deref()
            .unwrap_or(DEFAULT_MINIMUM_SYSTEM_VERSION)
    }
}

/// Get the global macbuild config directory (`~/.macbuild`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".macbuild"))
}

/// Get the project config path (`.macbuild/config.toml`).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".macbuild").join("config.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`.macbuild/config.toml`)
/// 2. Global config (`~/.macbuild/config.toml`)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Load configuration for the project rooted at `project_root`.
pub fn load_project_config(project_root: &Path) -> Config {
    let global = global_config_dir().map(|dir| dir.join("config.toml"));
    load_config(global.as_deref(), &project_config_path(project_root))
}
