//! Clean, concatenate, and copy steps.
//!
//! These are the plain filesystem steps of the pipeline. All of them treat
//! an empty input list as a no-op and any filesystem error as fatal.

use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur in filesystem steps.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        source: std::io::Error,
    },

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

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// Recursively delete a directory. An absent path is a no-op.
pub fn clean(root: &Path) -> Result<(), AssetError> {
    if !root.exists() {
        return Ok(());
    }
    fs::remove_dir_all(root).map_err(|source| AssetError::Delete {
        path: root.to_path_buf(),
        source,
    })
}

/// Concatenate files byte-for-byte, in listed order, into `dest`.
///
/// An empty file list writes nothing. Order is caller-controlled and
/// significant.
pub fn concat(files: &[PathBuf], dest: &Path) -> Result<(), AssetError> {
    if files.is_empty() {
        return Ok(());
    }

    let mut combined = Vec::new();
    for file in files {
        let bytes = fs::read(file).map_err(|source| AssetError::Read {
            path: file.clone(),
            source,
        })?;
        combined.extend_from_slice(&bytes);
    }

    write_file(dest, &combined)
}

/// Copy files into `dest_dir`, dropping their source directory structure.
pub fn copy_flat(files: &[PathBuf], dest_dir: &Path) -> Result<usize, AssetError> {
    for file in files {
        let name = file.file_name().unwrap_or(file.as_os_str());
        copy_one(file, &dest_dir.join(name))?;
    }
    Ok(files.len())
}

/// Copy files into `dest_dir`, preserving their structure relative to
/// `base`. Files outside `base` fall back to their file name.
pub fn copy_tree(files: &[PathBuf], base: &Path, dest_dir: &Path) -> Result<usize, AssetError> {
    for file in files {
        let relative = match file.strip_prefix(base) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => PathBuf::from(file.file_name().unwrap_or(file.as_os_str())),
        };
        copy_one(file, &dest_dir.join(relative))?;
    }
    Ok(files.len())
}

fn copy_one(from: &Path, to: &Path) -> Result<(), AssetError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|source| AssetError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })?;
    }
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|source| AssetError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
}

fn write_file(dest: &Path, bytes: &[u8]) -> Result<(), AssetError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|source| AssetError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
    }
    fs::write(dest, bytes).map_err(|source| AssetError::Write {
        path: dest.to_path_buf(),
        source,
    })
}
