//! Glob pattern expansion over the source tree.
//!
//! Path groups in the manifest are lists of glob patterns, processed in
//! order. A leading `!` negates a pattern: files matched so far are dropped
//! again if the negation matches them, and a later include can re-add them.
//! Patterns with no matching files expand to nothing; that is never an
//! error.

use std::path::{Component, Path, PathBuf};

use globset::GlobBuilder;
use walkdir::WalkDir;

/// Errors that can occur while expanding patterns.
#[derive(Debug, thiserror::Error)]
pub enum GlobError {
    #[error("Invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: globset::Error,
    },
}

/// Expand a list of glob patterns into a deduplicated, ordered file list.
///
/// Patterns apply positionally: a negation removes only what earlier
/// patterns matched, and a later include can re-add a negated file. Matches
/// within a single pattern are sorted lexicographically so expansion is
/// deterministic across runs. Only regular files are returned.
pub fn expand(patterns: &[String]) -> Result<Vec<PathBuf>, GlobError> {
    let mut files: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        if let Some(negated) = pattern.strip_prefix('!') {
            let matcher = compile(negated)?.compile_matcher();
            files.retain(|path| !matcher.is_match(path));
        } else {
            for path in expand_one(pattern)? {
                if !files.contains(&path) {
                    files.push(path);
                }
            }
        }
    }

    Ok(files)
}

/// Expand a single (non-negated) pattern.
fn expand_one(pattern: &str) -> Result<Vec<PathBuf>, GlobError> {
    // Literal paths short-circuit the walk. A missing literal is an empty
    // match, mirroring how absent glob matches behave.
    if !has_meta(pattern) {
        let path = PathBuf::from(pattern);
        if path.is_file() {
            return Ok(vec![path]);
        }
        return Ok(Vec::new());
    }

    let glob = compile(pattern)?;
    let matcher = glob.compile_matcher();
    let root = walk_root(pattern);

    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut matches: Vec<PathBuf> = WalkDir::new(&root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| matcher.is_match(p))
        .collect();

    matches.sort();
    Ok(matches)
}

/// Compile one pattern, keeping `*` from crossing directory separators.
fn compile(pattern: &str) -> Result<globset::Glob, GlobError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| GlobError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// The deepest literal directory prefix of a pattern, used as the walk root.
pub(crate) fn walk_root(pattern: &str) -> PathBuf {
    let mut root = PathBuf::new();

    for component in Path::new(pattern).components() {
        let text = match component {
            Component::Normal(os) => os.to_string_lossy(),
            other => {
                root.push(other.as_os_str());
                continue;
            }
        };

        if text.contains(['*', '?', '[', '{']) {
            break;
        }
        root.push(text.as_ref());
    }

    if root.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        root
    }
}

/// Whether a pattern contains glob metacharacters.
fn has_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}
