//! Loading the platform table from disk.
//!
//! The file is a JSON object mapping platform names to ordered lists of
//! station IDs:
//!
//! ```json
//! { "EAST": ["20623", "20624", "20621"], "1": ["20623", "20624"] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use super::error::DirectoryError;
use super::table::StationDirectory;

impl StationDirectory {
    /// Load a directory from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| DirectoryError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_json(&contents)
    }

    /// Parse a directory from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let raw: BTreeMap<String, Vec<String>> =
            serde_json::from_str(json).map_err(|e| DirectoryError::Json {
                message: e.to_string(),
            })?;

        Self::from_entries(
            raw.iter()
                .map(|(platform, stations)| (platform.as_str(), stations.iter().map(String::as_str))),
        )
    }
}
