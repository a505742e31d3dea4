//! Platform arrival sessions.
//!
//! A session ties the pipeline to published state: it marks a platform as
//! loading, runs fetch and merge, and publishes the result or the error
//! flag. Consumers never see an error from `refresh` or `clear`; they read
//! the flags.

mod poller;
mod refresh;
mod state;

pub use poller::{poll_platforms, spawn_poller};
pub use refresh::{ArrivalSession, RefreshOutcome};
pub use state::{BoardState, PlatformSnapshot, PublishedArrivals, PublishedList};
