//! Application script linting.
//!
//! A small fixed rule set over application JavaScript: loose equality,
//! tab indentation, trailing whitespace, and stray debugger statements.
//! Rules are line-based heuristics; they do not parse the language.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use regex::Regex;

/// Errors that can occur while linting.
#[derive(Debug, thiserror::Error)]
pub enum LintError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A single style violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// File the violation was found in
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
    /// Short rule identifier
    pub rule: &'static str,
    /// Human-readable description
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} ({})",
            self.path.display(),
            self.line,
            self.column,
            self.message,
            self.rule
        )
    }
}

/// Lint a set of files, returning all violations sorted by location.
///
/// An empty file list returns no diagnostics. Unreadable files are a hard
/// error, not a diagnostic.
pub fn lint_files(files: &[PathBuf]) -> Result<Vec<Diagnostic>, LintError> {
    let per_file: Result<Vec<Vec<Diagnostic>>, LintError> = files
        .par_iter()
        .map(|path| {
            let source = fs::read_to_string(path).map_err(|source| LintError::Read {
                path: path.clone(),
                source,
            })?;
            Ok(lint_source(path, &source))
        })
        .collect();

    let mut diagnostics: Vec<Diagnostic> = per_file?.into_iter().flatten().collect();
    diagnostics.sort_by(|a, b| {
        (&a.path, a.line, a.column).cmp(&(&b.path, b.line, b.column))
    });
    Ok(diagnostics)
}

/// Lint a single source text.
pub fn lint_source(path: &Path, source: &str) -> Vec<Diagnostic> {
    let debugger = Regex::new(r"^\s*debugger\b").expect("debugger pattern is valid");
    let mut diagnostics = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        let line_no = idx + 1;

        let indent = &line[..line.len() - line.trim_start().len()];
        if let Some(col) = indent.find('\t') {
            diagnostics.push(Diagnostic {
                path: path.to_path_buf(),
                line: line_no,
                column: col + 1,
                rule: "no-tabs",
                message: "Tab character in indentation".to_string(),
            });
        }

        if line.ends_with(' ') || line.ends_with('\t') {
            let trimmed = line.trim_end();
            diagnostics.push(Diagnostic {
                path: path.to_path_buf(),
                line: line_no,
                column: trimmed.chars().count() + 1,
                rule: "no-trailing-whitespace",
                message: "Trailing whitespace".to_string(),
            });
        }

        if debugger.is_match(line) {
            diagnostics.push(Diagnostic {
                path: path.to_path_buf(),
                line: line_no,
                column: line.len() - line.trim_start().len() + 1,
                rule: "no-debugger",
                message: "Debugger statement".to_string(),
            });
        }

        for column in loose_equality_columns(line) {
            diagnostics.push(Diagnostic {
                path: path.to_path_buf(),
                line: line_no,
                column,
                rule: "eqeqeq",
                message: "Use === / !== instead of == / !=".to_string(),
            });
        }
    }

    diagnostics
}

/// Columns (1-based) of loose `==` / `!=` operators on a line.
///
/// Strict operators (`===`, `!==`) and comparison operators (`<=`, `>=`)
/// are not flagged.
fn loose_equality_columns(line: &str) -> Vec<usize> {
    let bytes = line.as_bytes();
    let mut columns = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        let pair = &bytes[i..i + 2];
        let prev = if i > 0 { bytes[i - 1] } else { 0 };
        let next = if i + 2 < bytes.len() { bytes[i + 2] } else { 0 };

        if pair == b"==" {
            if prev != b'=' && prev != b'!' && prev != b'<' && prev != b'>' && next != b'=' {
                columns.push(line[..i].chars().count() + 1);
            }
            i += 2;
        } else if pair == b"!=" && next != b'=' {
            columns.push(line[..i].chars().count() + 1);
            i += 2;
        } else {
            i += 1;
        }
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn rules_for(source: &str) -> Vec<&'static str> {
        lint_source(Path::new("test.js"), source)
            .into_iter()
            .map(|d| d.rule)
            .collect()
    }

    #[test]
    fn clean_source_has_no_diagnostics() {
        let source = "var x = 1;\nif (x === 1) {\n  run();\n}\n";
        assert!(lint_source(Path::new("ok.js"), source).is_empty());
    }

    #[test]
    fn flags_loose_equality() {
        assert_eq!(rules_for("if (a == b) {}"), vec!["eqeqeq"]);
        assert_eq!(rules_for("if (a != b) {}"), vec!["eqeqeq"]);
    }

    #[test]
    fn allows_strict_equality() {
        assert!(rules_for("if (a === b) {}").is_empty());
        assert!(rules_for("if (a !== b) {}").is_empty());
        assert!(rules_for("if (a <= b || a >= c) {}").is_empty());
    }

    #[test]
    fn flags_tabs_and_trailing_whitespace() {
        assert_eq!(rules_for("\tvar x = 1;"), vec!["no-tabs"]);
        assert_eq!(rules_for(" \tvar x = 1;"), vec!["no-tabs"]);
        assert_eq!(rules_for("var x = 1; "), vec!["no-trailing-whitespace"]);
    }

    #[test]
    fn allows_tabs_outside_indentation() {
        assert!(rules_for("var a = 'col1\tcol2';").is_empty());
    }

    #[test]
    fn flags_debugger_statement() {
        assert_eq!(rules_for("  debugger;"), vec!["no-debugger"]);
        assert!(rules_for("var debuggerish = 1;").is_empty());
    }

    #[test]
    fn reports_location() {
        let diagnostics = lint_source(Path::new("app.js"), "var a = 1;\nif (a == 1) {}\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 2);
        assert_eq!(diagnostics[0].column, 7);
    }

    #[test]
    fn lints_files_sorted_by_location() {
        let temp = tempdir().unwrap();
        let a = temp.path().join("a.js");
        let b = temp.path().join("b.js");
        fs::write(&a, "x == 1;\ny == 2;\n").unwrap();
        fs::write(&b, "z == 3;\n").unwrap();

        let diagnostics = lint_files(&[b.clone(), a.clone()]).unwrap();

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics[0].path, a);
        assert_eq!(diagnostics[0].line, 1);
        assert_eq!(diagnostics[1].line, 2);
        assert_eq!(diagnostics[2].path, b);
    }

    #[test]
    fn empty_file_list_is_clean() {
        assert!(lint_files(&[]).unwrap().is_empty());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let missing = PathBuf::from("/definitely/not/here.js");
        assert!(matches!(
            lint_files(&[missing]),
            Err(LintError::Read { .. })
        ));
    }
}
