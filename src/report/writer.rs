//! Persisting rendered reports

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Unable to create output directory: {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to write report file: {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to render report: {0}")]
    Render(#[from] serde_json::Error),
}

/// Write `contents` to `path`, creating parent directories first
pub fn write_report(path: &Path, contents: &str) -> Result<(), WriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            std::fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    std::fs::write(path, contents).map_err(|source| WriteError::Write {
        path: path.to_path_buf(),
        source,
    })
}
