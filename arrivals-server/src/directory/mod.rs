//! Station directory: which upstream stations feed which platform.
//!
//! The mapping is static configuration. It ships with a built-in table and
//! can be replaced by a JSON file at startup.

mod error;
mod file;
mod table;

pub use error::DirectoryError;
pub use table::StationDirectory;
