//! Station directory error types.

use std::path::PathBuf;

/// Errors that can occur when loading a platform → station table.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The table file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The table file is not a JSON object of string lists
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Two keys name the same platform once canonicalized
    #[error("platform {platform} is listed more than once")]
    DuplicatePlatform { platform: String },

    /// A station ID in the table is blank or malformed
    #[error("platform {platform} has an invalid station ID {value:?}")]
    InvalidStation { platform: String, value: String },
}
