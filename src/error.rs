//
//  error.rs
//  Retain
//
//  Created by hak (tharun)
//

use std::path::PathBuf;

/// Errors that abort a retained-code pass.
///
/// Resolution misses (unresolved references, unknown foreign classes) are not
/// errors; they are skipped by the walker. Only a broken support library or
/// bad input to the tool itself ends up here.
#[derive(Debug, thiserror::Error)]
pub enum RetainError {
    #[error("Helper type not found in support namespace: {0}")]
    MissingHelper(String),

    #[error("Helper member not found: {type_name}.{member}")]
    MissingHelperMember { type_name: String, member: String },

    #[error("Unknown root: {0}")]
    UnknownRoot(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, RetainError>;

impl RetainError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RetainError::Io {
            path: path.into(),
            source,
        }
    }
}
