//! Platform bus-arrival aggregator.
//!
//! Answers "which buses are coming to this platform, and how soon?" by
//! fetching predictions from every upstream station that feeds a platform,
//! merging duplicates, ranking the result and publishing it for readers.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod directory;
pub mod domain;
pub mod session;
pub mod upstream;
pub mod web;
