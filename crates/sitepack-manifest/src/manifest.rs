//! Build manifest loading and validation.
//!
//! The manifest (`sitepack.toml`) is the whole description of a build: which
//! file groups exist, where output goes, and which task lists can be run.
//! Everything here is plain data; the pipeline crate interprets it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::glob;
use crate::task::{TaskError, TaskTable};

/// Errors that can occur while loading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Output directory layout. Steps only ever write into these locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputLayout {
    /// Root output directory, deleted wholesale by the clean step
    pub root: PathBuf,
    /// Destination for bundled scripts and compiled templates
    pub scripts: PathBuf,
    /// Destination for concatenated stylesheets
    pub styles: PathBuf,
    /// Destination for vendor fonts
    pub fonts: PathBuf,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            root: PathBuf::from("build"),
            scripts: PathBuf::from("build/js"),
            styles: PathBuf::from("build/css"),
            fonts: PathBuf::from("build/fonts"),
        }
    }
}

/// Application source file groups.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppGroups {
    /// Application scripts (linted and bundled)
    pub scripts: Vec<String>,
    /// Application stylesheets (concatenated into app.css)
    pub styles: Vec<String>,
    /// Application HTML templates (compiled into templates.js)
    pub templates: Vec<String>,
}

impl Default for AppGroups {
    fn default() -> Self {
        Self {
            scripts: vec![
                "src/js/**/*.js".to_string(),
                "!src/vendor/**".to_string(),
            ],
            styles: vec!["src/js/**/*.css".to_string()],
            templates: vec!["src/js/**/*.html".to_string()],
        }
    }
}

/// Vendor dependency file groups. Never linted, never watched.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VendorGroups {
    /// Vendor dependency directory, excluded from watching
    pub root: PathBuf,
    /// Vendor stylesheets (concatenated into vendor.css)
    pub styles: Vec<String>,
    /// Vendor fonts (copied flattened into the fonts directory)
    pub fonts: Vec<String>,
    /// Bootstrap-style shim scripts copied as-is into the scripts directory
    pub shims: Vec<String>,
}

impl Default for VendorGroups {
    fn default() -> Self {
        Self {
            root: PathBuf::from("src/vendor"),
            styles: Vec::new(),
            fonts: Vec::new(),
            shims: Vec::new(),
        }
    }
}

/// Static passthrough files, copied into the output root with their
/// directory structure preserved relative to `dir`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticGroup {
    /// Base directory for passthrough files
    pub dir: PathBuf,
    /// Patterns relative to `dir`
    pub files: Vec<String>,
}

impl Default for StaticGroup {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("src/static"),
            files: vec!["*".to_string()],
        }
    }
}

/// Script bundling settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BundleSettings {
    /// Entry point whose require() graph is bundled
    pub entry: PathBuf,
    /// Output file name inside the scripts directory
    pub output: String,
}

impl Default for BundleSettings {
    fn default() -> Self {
        Self {
            entry: PathBuf::from("src/js/index.js"),
            output: "app.js".to_string(),
        }
    }
}

/// Template compilation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Templates are keyed by their path relative to this directory
    pub base: PathBuf,
    /// Output file name inside the scripts directory
    pub output: String,
    /// Name of the generated umbrella module
    pub module: String,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            base: PathBuf::from("src/js"),
            output: "templates.js".to_string(),
            module: "templates".to_string(),
        }
    }
}

/// On-disk manifest shape.
#[derive(Debug, Clone, Default, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    output: OutputLayout,
    #[serde(default)]
    app: AppGroups,
    #[serde(default)]
    vendor: VendorGroups,
    #[serde(default, rename = "static")]
    statics: StaticGroup,
    #[serde(default)]
    bundle: BundleSettings,
    #[serde(default)]
    templates: TemplateSettings,
    #[serde(default)]
    tasks: TaskTable,
}

/// A loaded, validated build manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Where the manifest was loaded from (watched alongside sources)
    pub path: PathBuf,
    pub output: OutputLayout,
    pub app: AppGroups,
    pub vendor: VendorGroups,
    pub statics: StaticGroup,
    pub bundle: BundleSettings,
    pub templates: TemplateSettings,
    pub tasks: TaskTable,
}

impl Manifest {
    /// Load and validate a manifest from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// Parse a manifest from a TOML string.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let file: ManifestFile =
            toml::from_str(content).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let manifest = Self {
            path: path.to_path_buf(),
            output: file.output,
            app: file.app,
            vendor: file.vendor,
            statics: file.statics,
            bundle: file.bundle,
            templates: file.templates,
            tasks: file.tasks,
        };

        manifest.tasks.validate()?;
        Ok(manifest)
    }

    /// A manifest with all defaults, rooted at the given path.
    pub fn with_defaults(path: &Path) -> Self {
        let file = ManifestFile::default();
        Self {
            path: path.to_path_buf(),
            output: file.output,
            app: file.app,
            vendor: file.vendor,
            statics: file.statics,
            bundle: file.bundle,
            templates: file.templates,
            tasks: file.tasks,
        }
    }

    /// Directories the watcher should observe: the literal prefixes of the
    /// application patterns plus the static passthrough directory. The
    /// manifest file itself is watched separately; the vendor root is
    /// excluded by the watcher.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut roots = Vec::new();

        let patterns = self
            .app
            .scripts
            .iter()
            .chain(&self.app.styles)
            .chain(&self.app.templates)
            .filter(|p| !p.starts_with('!'));

        for pattern in patterns {
            let root = glob::walk_root(pattern);
            if !roots.contains(&root) {
                roots.push(root);
            }
        }

        if !roots.contains(&self.statics.dir) {
            roots.push(self.statics.dir.clone());
        }

        roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_mirror_conventional_layout() {
        let manifest = Manifest::with_defaults(Path::new("sitepack.toml"));

        assert_eq!(manifest.output.root, PathBuf::from("build"));
        assert_eq!(manifest.output.scripts, PathBuf::from("build/js"));
        assert_eq!(manifest.bundle.entry, PathBuf::from("src/js/index.js"));
        assert_eq!(manifest.templates.base, PathBuf::from("src/js"));
        assert_eq!(manifest.statics.dir, PathBuf::from("src/static"));
    }

    #[test]
    fn parses_full_manifest() {
        let toml = r#"
[output]
root = "dist"
scripts = "dist/js"
styles = "dist/css"
fonts = "dist/fonts"

[app]
scripts = ["web/**/*.js", "!web/deps/**"]
styles = ["web/**/*.css"]
templates = ["web/**/*.html"]

[vendor]
root = "web/deps"
styles = ["web/deps/bootstrap/css/*.min.css"]
fonts = ["web/deps/bootstrap/fonts/**"]
shims = ["web/deps/modernizr/modernizr.js"]

[static]
dir = "web/static"

[bundle]
entry = "web/index.js"
output = "main.js"

[templates]
base = "web"
output = "tpl.js"
module = "app.templates"
"#;

        let manifest = Manifest::from_toml(toml, Path::new("sitepack.toml")).unwrap();

        assert_eq!(manifest.output.root, PathBuf::from("dist"));
        assert_eq!(manifest.vendor.root, PathBuf::from("web/deps"));
        assert_eq!(manifest.bundle.output, "main.js");
        assert_eq!(manifest.templates.module, "app.templates");
    }

    #[test]
    fn empty_manifest_uses_defaults() {
        let manifest = Manifest::from_toml("", Path::new("sitepack.toml")).unwrap();
        assert_eq!(manifest.output.root, PathBuf::from("build"));
        assert!(manifest.tasks.resolve("build").is_ok());
    }

    #[test]
    fn rejects_bad_task_reference() {
        let toml = r#"
[tasks]
build = ["lint", "uglify"]
"#;
        let err = Manifest::from_toml(toml, Path::new("sitepack.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Task(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = Manifest::from_toml("[output", Path::new("sitepack.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn watch_roots_cover_app_and_static_dirs() {
        let manifest = Manifest::with_defaults(Path::new("sitepack.toml"));
        let roots = manifest.watch_roots();

        assert_eq!(
            roots,
            vec![PathBuf::from("src/js"), PathBuf::from("src/static")]
        );
    }
}
