//! Initialize a starter manifest and source tree.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing sitepack...");

    let manifest_path = Path::new("sitepack.toml");
    if manifest_path.exists() && !yes {
        tracing::warn!("sitepack.toml already exists. Use --yes to overwrite.");
        return Ok(());
    }
    fs::write(manifest_path, DEFAULT_MANIFEST).context("Failed to write sitepack.toml")?;
    tracing::info!("Created sitepack.toml");

    let js_dir = Path::new("src/js");
    fs::create_dir_all(js_dir).context("Failed to create src/js")?;
    fs::create_dir_all("src/static").context("Failed to create src/static")?;
    fs::create_dir_all("src/vendor").context("Failed to create src/vendor")?;

    let entry_path = js_dir.join("index.js");
    if !entry_path.exists() || yes {
        fs::write(&entry_path, DEFAULT_ENTRY).context("Failed to write src/js/index.js")?;
        tracing::info!("Created src/js/index.js");
    }

    let styles_path = js_dir.join("app.css");
    if !styles_path.exists() || yes {
        fs::write(&styles_path, DEFAULT_STYLES).context("Failed to write src/js/app.css")?;
        tracing::info!("Created src/js/app.css");
    }

    let static_index = Path::new("src/static/index.html");
    if !static_index.exists() || yes {
        fs::write(static_index, DEFAULT_INDEX).context("Failed to write src/static/index.html")?;
        tracing::info!("Created src/static/index.html");
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'sitepack build' to produce the asset bundle.");

    Ok(())
}

const DEFAULT_MANIFEST: &str = r#"# Sitepack build manifest

[output]
# Root output directory, deleted and recreated on every build
root = "build"
scripts = "build/js"
styles = "build/css"
fonts = "build/fonts"

[app]
# Application sources; vendor files are excluded from linting and bundling
scripts = ["src/js/**/*.js", "!src/vendor/**"]
styles = ["src/js/**/*.css"]
templates = ["src/js/**/*.html"]

[vendor]
# Third-party dependency directory, never watched
root = "src/vendor"
styles = []
fonts = []
shims = []

[static]
# Copied into the output root with structure preserved
dir = "src/static"
files = ["*"]

[bundle]
entry = "src/js/index.js"
output = "app.js"

[templates]
base = "src/js"
output = "templates.js"
module = "templates"

[tasks]
build = ["lint", "clean", "bundle", "templates", "concat", "copy"]
default = ["build", "watch"]
"#;

const DEFAULT_ENTRY: &str = r#"'use strict';

console.log('sitepack starter app');
"#;

const DEFAULT_STYLES: &str = r#"body {
  margin: 0;
  font-family: sans-serif;
}
"#;

const DEFAULT_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Starter App</title>
  <link rel="stylesheet" href="css/vendor.css">
  <link rel="stylesheet" href="css/app.css">
</head>
<body>
  <div id="app"></div>
  <script src="js/templates.js"></script>
  <script src="js/app.js"></script>
</body>
</html>
"#;
