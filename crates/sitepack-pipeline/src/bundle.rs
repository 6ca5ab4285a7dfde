//! CommonJS-style script bundling.
//!
//! Walks `require('./x')` calls from a single entry file and emits one
//! script containing a small module registry plus every discovered module.
//! All module factories are registered before the entry module runs, so a
//! module's dependencies are always available by the time it executes.
//!
//! Dependency scanning is textual, not an AST walk: `//` comment lines are
//! skipped, but a require inside a block comment or string literal is still
//! treated as a dependency.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

/// Errors that can occur while bundling.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("Bundle entry point not found: {0}")]
    MissingEntry(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot resolve require('{spec}') from {from}")]
    Unresolvable { spec: String, from: PathBuf },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result of a bundle operation.
#[derive(Debug)]
pub struct BundleStats {
    /// Number of modules in the bundle, entry included
    pub modules: usize,
}

struct Module {
    /// Path as written in the bundle header comment
    display: String,
    source: String,
    /// require() specifier -> module id
    deps: Vec<(String, usize)>,
}

/// Bundle the require() graph of `entry` into a single script at `dest`.
pub fn bundle(entry: &Path, dest: &Path) -> Result<BundleStats, BundleError> {
    let entry_path = fs::canonicalize(entry)
        .map_err(|_| BundleError::MissingEntry(entry.to_path_buf()))?;

    let require_call =
        Regex::new(r#"require\s*\(\s*['"]([^'"]+)['"]\s*\)"#).expect("require pattern is valid");

    let mut ids: HashMap<PathBuf, usize> = HashMap::new();
    let mut modules: Vec<Option<Module>> = Vec::new();
    let mut pending = vec![entry_path.clone()];

    ids.insert(entry_path, 0);
    modules.push(None);

    while let Some(path) = pending.pop() {
        let id = ids[&path];
        let source = fs::read_to_string(&path).map_err(|source| BundleError::Read {
            path: path.clone(),
            source,
        })?;

        let mut deps = Vec::new();
        for line in source.lines() {
            if line.trim_start().starts_with("//") {
                continue;
            }
            for capture in require_call.captures_iter(line) {
                let spec = capture[1].to_string();
                let resolved = resolve(&spec, &path)?;

                let dep_id = match ids.get(&resolved) {
                    Some(&existing) => existing,
                    None => {
                        let next = modules.len();
                        ids.insert(resolved.clone(), next);
                        modules.push(None);
                        pending.push(resolved);
                        next
                    }
                };
                deps.push((spec, dep_id));
            }
        }

        modules[id] = Some(Module {
            display: relative_display(&path),
            source,
            deps,
        });
    }

    let modules: Vec<Module> = modules.into_iter().flatten().collect();
    let output = emit(&modules);

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|source| BundleError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
    }
    fs::write(dest, output).map_err(|source| BundleError::Write {
        path: dest.to_path_buf(),
        source,
    })?;

    Ok(BundleStats {
        modules: modules.len(),
    })
}

/// Resolve a require() specifier relative to the requiring file.
///
/// Only relative specifiers are supported; bare module names are an error.
/// Tries the literal path, then with a `.js` extension, then as a directory
/// containing `index.js`.
fn resolve(spec: &str, from: &Path) -> Result<PathBuf, BundleError> {
    if !spec.starts_with("./") && !spec.starts_with("../") {
        return Err(BundleError::Unresolvable {
            spec: spec.to_string(),
            from: from.to_path_buf(),
        });
    }

    let dir = from.parent().unwrap_or(Path::new("."));
    let base = dir.join(spec);

    let with_js = PathBuf::from(format!("{}.js", base.display()));
    let candidates = [base.clone(), with_js, base.join("index.js")];

    for candidate in &candidates {
        if candidate.is_file() {
            if let Ok(canonical) = fs::canonicalize(candidate) {
                return Ok(canonical);
            }
        }
    }

    Err(BundleError::Unresolvable {
        spec: spec.to_string(),
        from: from.to_path_buf(),
    })
}

/// Shorten an absolute module path for the bundle header comment.
fn relative_display(path: &Path) -> String {
    match std::env::current_dir() {
        Ok(cwd) => path
            .strip_prefix(&cwd)
            .unwrap_or(path)
            .display()
            .to_string(),
        Err(_) => path.display().to_string(),
    }
}

/// Emit the bundle: a registry prelude followed by the module array.
fn emit(modules: &[Module]) -> String {
    let mut out = String::from(PRELUDE);
    out.push_str("([\n");

    for (id, module) in modules.iter().enumerate() {
        let dep_map = module
            .deps
            .iter()
            .map(|(spec, dep_id)| format!("{}: {}", js_string(spec), dep_id))
            .collect::<Vec<_>>()
            .join(", ");

        out.push_str(&format!("// {} ({})\n", id, module.display));
        out.push_str("[function (require, module, exports) {\n");
        out.push_str(&module.source);
        if !module.source.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&format!("}}, {{{}}}],\n", dep_map));
    }

    out.push_str("]);\n");
    out
}

/// Encode a string as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

const PRELUDE: &str = r#"(function (modules) {
  'use strict';
  var cache = {};
  function load(id) {
    if (cache[id]) { return cache[id].exports; }
    var module = cache[id] = { exports: {} };
    modules[id][0].call(module.exports, function (name) {
      return load(modules[id][1][name]);
    }, module, module.exports);
    return module.exports;
  }
  load(0);
})"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn bundles_entry_with_dependency() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();

        fs::write(src.join("a.js"), "exports.greet = 'hello';\n").unwrap();
        fs::write(
            src.join("b.js"),
            "var a = require('./a');\nconsole.log(a.greet);\n",
        )
        .unwrap();

        let dest = temp.path().join("build/js/app.js");
        let stats = bundle(&src.join("b.js"), &dest).unwrap();

        assert_eq!(stats.modules, 2);

        let output = fs::read_to_string(&dest).unwrap();
        assert!(output.contains("exports.greet = 'hello';"));
        assert!(output.contains("var a = require('./a');"));
        // Entry is module 0; the registry runs it only after every factory
        // in the array literal has been constructed.
        assert!(output.contains("load(0);"));
        assert!(output.contains("{\"./a\": 1}"));
    }

    #[test]
    fn resolves_extensionless_and_index_requires() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("widgets")).unwrap();

        fs::write(src.join("widgets/index.js"), "exports.kind = 'widget';\n").unwrap();
        fs::write(src.join("util.js"), "exports.id = function (x) { return x; };\n").unwrap();
        fs::write(
            src.join("index.js"),
            "var widgets = require('./widgets');\nvar util = require('./util');\n",
        )
        .unwrap();

        let dest = temp.path().join("app.js");
        let stats = bundle(&src.join("index.js"), &dest).unwrap();
        assert_eq!(stats.modules, 3);
    }

    #[test]
    fn shared_dependency_bundles_once() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();

        fs::write(src.join("shared.js"), "exports.n = 1;\n").unwrap();
        fs::write(src.join("a.js"), "require('./shared');\n").unwrap();
        fs::write(src.join("b.js"), "require('./shared');\n").unwrap();
        fs::write(
            src.join("index.js"),
            "require('./a');\nrequire('./b');\n",
        )
        .unwrap();

        let stats = bundle(&src.join("index.js"), &temp.path().join("out.js")).unwrap();
        assert_eq!(stats.modules, 4);
    }

    #[test]
    fn ignores_commented_out_requires() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();

        fs::write(src.join("a.js"), "exports.n = 1;\n").unwrap();
        fs::write(
            src.join("index.js"),
            "// var old = require('./gone');\nvar a = require('./a');\n",
        )
        .unwrap();

        let dest = temp.path().join("out.js");
        let stats = bundle(&src.join("index.js"), &dest).unwrap();

        assert_eq!(stats.modules, 2);
        // The comment line is still in the module source, but no dependency
        // entry was created for it.
        let output = fs::read_to_string(&dest).unwrap();
        assert!(!output.contains("\"./gone\""));
        assert!(output.contains("{\"./a\": 1}"));
    }

    #[test]
    fn missing_entry_is_fatal() {
        let temp = tempdir().unwrap();
        let err = bundle(
            &temp.path().join("nope.js"),
            &temp.path().join("out.js"),
        )
        .unwrap_err();
        assert!(matches!(err, BundleError::MissingEntry(_)));
    }

    #[test]
    fn unresolvable_require_is_fatal() {
        let temp = tempdir().unwrap();
        let entry = temp.path().join("index.js");
        fs::write(&entry, "require('./missing');\n").unwrap();

        let err = bundle(&entry, &temp.path().join("out.js")).unwrap_err();
        assert!(matches!(err, BundleError::Unresolvable { .. }));
    }

    #[test]
    fn bare_module_names_are_rejected() {
        let temp = tempdir().unwrap();
        let entry = temp.path().join("index.js");
        fs::write(&entry, "require('jquery');\n").unwrap();

        let err = bundle(&entry, &temp.path().join("out.js")).unwrap_err();
        assert!(matches!(err, BundleError::Unresolvable { .. }));
    }

    #[test]
    fn circular_requires_terminate() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();

        fs::write(src.join("a.js"), "require('./b');\n").unwrap();
        fs::write(src.join("b.js"), "require('./a');\n").unwrap();

        let stats = bundle(&src.join("a.js"), &temp.path().join("out.js")).unwrap();
        assert_eq!(stats.modules, 2);
    }
}
