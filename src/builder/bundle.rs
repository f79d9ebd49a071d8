//! `.app` bundle assembly.
//!
//! ```text
//! <Name>.app/
//!   Contents/
//!     Info.plist
//!     MacOS/<Name>      the linked binary, mode 0755
//!     Resources/        platform/mac/Resources, if present
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::ProjectLayout;
use crate::util::config::{
    Config, DEFAULT_BUNDLE_IDENTIFIER, DEFAULT_BUNDLE_NAME, DEFAULT_BUNDLE_SHORT_VERSION,
    DEFAULT_BUNDLE_VERSION, DEFAULT_MINIMUM_SYSTEM_VERSION,
};
use crate::util::errors::BuildError;
use crate::util::fs::{
    copy_dir_all, ensure_dir, is_executable, remove_dir_all_if_exists, set_executable,
    write_string,
};

/// Values for a synthesized `Info.plist`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleManifest {
    pub name: String,
    pub identifier: String,
    pub version: String,
    pub short_version: String,
    pub minimum_system_version: String,
}

impl Default for BundleManifest {
    fn default() -> Self {
        BundleManifest {
            name: DEFAULT_BUNDLE_NAME.to_string(),
            identifier: DEFAULT_BUNDLE_IDENTIFIER.to_string(),
            version: DEFAULT_BUNDLE_VERSION.to_string(),
            short_version: DEFAULT_BUNDLE_SHORT_VERSION.to_string(),
            minimum_system_version: DEFAULT_MINIMUM_SYSTEM_VERSION.to_string(),
        }
    }
}

impl BundleManifest {
    pub fn from_config(config: &Config) -> Self {
        BundleManifest {
            name: config.bundle_name().to_string(),
            identifier: config.bundle_identifier().to_string(),
            version: config.bundle_version().to_string(),
            short_version: config.bundle_short_version().to_string(),
            minimum_system_version: config.minimum_system_version().to_string(),
        }
    }

    /// Render the XML property list.
    pub fn render(&self) -> String {
        let name = xml_escape(&self.name);
        let string = |key: &str, value: &str| {
            format!(
                "    <key>{}</key>\n    <string>{}</string>\n",
                key,
                xml_escape(value)
            )
        };

        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(
            "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \
             \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
        );
        out.push_str("<plist version=\"1.0\">\n<dict>\n");
        out.push_str(&format!(
            "    <key>CFBundleName</key>\n    <string>{}</string>\n",
            name
        ));
        out.push_str(&format!(
            "    <key>CFBundleDisplayName</key>\n    <string>{}</string>\n",
            name
        ));
        out.push_str(&string("CFBundleIdentifier", &self.identifier));
        out.push_str(&string("CFBundleVersion", &self.version));
        out.push_str(&string("CFBundleShortVersionString", &self.short_version));
        out.push_str(&string("CFBundlePackageType", "APPL"));
        out.push_str(&string("CFBundleExecutable", &self.name));
        out.push_str(&string("LSMinimumSystemVersion", &self.minimum_system_version));
        out.push_str("    <key>NSHighResolutionCapable</key>\n    <true/>\n");
        out.push_str(&string("NSPrincipalClass", "NSApplication"));
        out.push_str(concat!(
            "    <key>CFBundleDocumentTypes</key>\n",
            "    <array>\n",
            "        <dict>\n",
            "            <key>CFBundleTypeName</key>\n",
            "            <string>PDF Document</string>\n",
            "            <key>CFBundleTypeRole</key>\n",
            "            <string>Viewer</string>\n",
            "            <key>LSItemContentTypes</key>\n",
            "            <array>\n",
            "                <string>com.adobe.pdf</string>\n",
            "            </array>\n",
            "        </dict>\n",
            "    </array>\n",
        ));
        out.push_str("</dict>\n</plist>\n");
        out
    }
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Assembles the application bundle next to the build output.
pub struct BundlePackager<'a> {
    layout: &'a ProjectLayout,
    manifest: BundleManifest,
}

impl<'a> BundlePackager<'a> {
    pub fn new(layout: &'a ProjectLayout, manifest: BundleManifest) -> Self {
        BundlePackager { layout, manifest }
    }

    /// `<build_dir>/<Name>.app`
    pub fn bundle_path(&self, build_dir: &Path) -> PathBuf {
        build_dir.join(format!("{}.app", self.manifest.name))
    }

    /// Package `binary` into a fresh bundle under `build_dir`.
    ///
    /// Any previous bundle at the same path is replaced. The returned path
    /// points at a bundle that passed [`verify_bundle`].
    pub fn package(&self, build_dir: &Path, binary: &Path) -> Result<PathBuf, BuildError> {
        let bundle = self.bundle_path(build_dir);

        self.assemble(&bundle, binary)
            .and_then(|()| verify_bundle(&bundle, &self.manifest.name))
            .map_err(|e| BuildError::Packaging {
                bundle: bundle.clone(),
                reason: format!("{:#}", e),
            })?;

        tracing::info!("Packaged {}", bundle.display());
        Ok(bundle)
    }

    fn assemble(&self, bundle: &Path, binary: &Path) -> Result<()> {
        remove_dir_all_if_exists(bundle)?;

        let contents = bundle.join("Contents");
        let macos = contents.join("MacOS");
        let resources = contents.join("Resources");
        ensure_dir(&macos)?;
        ensure_dir(&resources)?;

        let executable = macos.join(&self.manifest.name);
        fs::copy(binary, &executable).with_context(|| {
            format!(
                "failed to copy {} to {}",
                binary.display(),
                executable.display()
            )
        })?;
        set_executable(&executable)?;

        let plist = contents.join("Info.plist");
        let template = self.layout.info_plist_template();
        if template.is_file() {
            tracing::debug!("Using manifest template {}", template.display());
            fs::copy(&template, &plist).with_context(|| {
                format!("failed to copy {} to {}", template.display(), plist.display())
            })?;
        } else {
            tracing::debug!("No manifest template, generating Info.plist");
            write_string(&plist, &self.manifest.render())?;
        }

        let extra = self.layout.resources_dir();
        if extra.is_dir() {
            copy_dir_all(&extra, &resources)?;
        }

        Ok(())
    }
}

/// Check the structural invariant of a bundle: an executable at
/// `Contents/MacOS/<executable>` and a well-formed `Contents/Info.plist`.
pub fn verify_bundle(bundle: &Path, executable: &str) -> Result<()> {
    let contents = bundle.join("Contents");

    let binary = contents.join("MacOS").join(executable);
    if !is_executable(&binary) {
        bail!("{} is missing or not executable", binary.display());
    }

    let plist = contents.join("Info.plist");
    let text = fs::read_to_string(&plist)
        .with_context(|| format!("failed to read {}", plist.display()))?;
    let text = text.trim();
    if !text.starts_with("<?xml") || !text.contains("<plist") || !text.ends_with("</plist>") {
        bail!("{} is not a property list", plist.display());
    }

    if !contents.join("Resources").is_dir() {
        bail!("{} has no Resources directory", contents.display());
    }

    Ok(())
}
