//! HTML template compilation.
//!
//! Each HTML file becomes a template-cache registration keyed by its path
//! relative to the configured base directory, all concatenated into one
//! loadable script. The output follows the Angular `$templateCache`
//! convention the application bootstrap expects.

use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while compiling templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Compile HTML files into a single registration script at `dest`.
///
/// Returns the number of templates compiled. An empty file list is a no-op:
/// nothing is written and zero is returned.
pub fn compile_templates(
    files: &[PathBuf],
    base: &Path,
    module: &str,
    dest: &Path,
) -> Result<usize, TemplateError> {
    if files.is_empty() {
        return Ok(0);
    }

    let keys: Vec<String> = files.iter().map(|f| template_key(f, base)).collect();

    let mut out = String::new();
    out.push_str(&format!(
        "angular.module({}, [{}]);\n",
        js_string(module),
        keys.iter()
            .map(|k| js_string(k))
            .collect::<Vec<_>>()
            .join(", ")
    ));

    for (file, key) in files.iter().zip(&keys) {
        let content = fs::read_to_string(file).map_err(|source| TemplateError::Read {
            path: file.clone(),
            source,
        })?;

        out.push_str(&format!(
            "\nangular.module({key}, []).run(['$templateCache', function ($templateCache) {{\n  $templateCache.put({key},\n    {content});\n}}]);\n",
            key = js_string(key),
            content = js_string(&content),
        ));
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|source| TemplateError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
    }
    fs::write(dest, out).map_err(|source| TemplateError::Write {
        path: dest.to_path_buf(),
        source,
    })?;

    Ok(files.len())
}

/// The cache key for a template: its path relative to `base`, with forward
/// slashes regardless of platform.
fn template_key(file: &Path, base: &Path) -> String {
    let relative = file.strip_prefix(base).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Encode a string as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn compiles_templates_keyed_by_relative_path() {
        let temp = tempdir().unwrap();
        let base = temp.path().join("src/js");
        fs::create_dir_all(base.join("widgets")).unwrap();
        fs::write(base.join("widgets/menu.html"), "<ul class=\"menu\"></ul>\n").unwrap();

        let dest = temp.path().join("build/js/templates.js");
        let count = compile_templates(
            &[base.join("widgets/menu.html")],
            &base,
            "templates",
            &dest,
        )
        .unwrap();

        assert_eq!(count, 1);

        let output = fs::read_to_string(&dest).unwrap();
        assert!(output.contains("angular.module(\"templates\", [\"widgets/menu.html\"]);"));
        assert!(output.contains("$templateCache.put(\"widgets/menu.html\""));
        assert!(output.contains("<ul class=\\\"menu\\\"></ul>\\n"));
    }

    #[test]
    fn registers_multiple_templates_in_listed_order() {
        let temp = tempdir().unwrap();
        let base = temp.path().to_path_buf();
        fs::write(base.join("first.html"), "<p>1</p>").unwrap();
        fs::write(base.join("second.html"), "<p>2</p>").unwrap();

        let dest = temp.path().join("templates.js");
        compile_templates(
            &[base.join("first.html"), base.join("second.html")],
            &base,
            "templates",
            &dest,
        )
        .unwrap();

        let output = fs::read_to_string(&dest).unwrap();
        let first = output.find("first.html").unwrap();
        let second = output.find("second.html").unwrap();
        assert!(first < second);
    }

    #[test]
    fn empty_input_writes_nothing() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("templates.js");

        let count =
            compile_templates(&[], Path::new("src/js"), "templates", &dest).unwrap();

        assert_eq!(count, 0);
        assert!(!dest.exists());
    }

    #[test]
    fn missing_template_file_is_fatal() {
        let temp = tempdir().unwrap();
        let err = compile_templates(
            &[temp.path().join("gone.html")],
            temp.path(),
            "templates",
            &temp.path().join("templates.js"),
        )
        .unwrap_err();
        assert!(matches!(err, TemplateError::Read { .. }));
    }
}
