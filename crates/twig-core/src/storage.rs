//! Whole-document JSON persistence.
//!
//! The entire project collection is one pretty-printed JSON object (4-space
//! indent, UTF-8). Every save rewrites the file in place; there is no
//! incremental update, backup, or schema version.
//!
//! A missing file is an empty collection, not an error. Anything else that
//! goes wrong surfaces as a [`StorageError`] so the caller can tell storage
//! failures apart from validation and lookup failures.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::Projects;

/// Indentation used for the on-disk document.
const INDENT: &[u8] = b"    ";

/// Errors raised while reading or writing the store file.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read store {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write store {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("store {} is not a valid project document: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode project document: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Read the project collection at `path`.
///
/// # Errors
///
/// [`StorageError::Read`] for I/O failures other than a missing file,
/// [`StorageError::Malformed`] when the content is not a project document.
pub fn load(path: &Path) -> Result<Projects, StorageError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "store file absent, starting empty");
            return Ok(Projects::new());
        }
        Err(source) => {
            return Err(StorageError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if content.trim().is_empty() {
        tracing::warn!(path = %path.display(), "store file is empty, starting empty");
        return Ok(Projects::new());
    }

    let projects = from_json_str(&content).map_err(|source| StorageError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        projects = projects.len(),
        "loaded store"
    );
    Ok(projects)
}

/// Overwrite `path` with the full project collection.
///
/// Missing parent directories are created.
///
/// # Errors
///
/// [`StorageError::Write`] on I/O failure, [`StorageError::Encode`] if the
/// collection cannot be serialized.
pub fn save(path: &Path, projects: &Projects) -> Result<(), StorageError> {
    let body = to_json_string(projects)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, body).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        projects = projects.len(),
        "saved store"
    );
    Ok(())
}

/// Render the collection exactly as [`save`] writes it.
///
/// # Errors
///
/// [`StorageError::Encode`] if serialization fails.
pub fn to_json_string(projects: &Projects) -> Result<String, StorageError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    projects
        .serialize(&mut serializer)
        .map_err(StorageError::Encode)?;
    buf.push(b'\n');
    String::from_utf8(buf)
        .map_err(|err| StorageError::Encode(serde::ser::Error::custom(err)))
}

/// Parse a project document.
///
/// # Errors
///
/// Returns the underlying `serde_json` error for malformed input.
pub fn from_json_str(content: &str) -> Result<Projects, serde_json::Error> {
    serde_json::from_str(content)
}
