//! The arrival pipeline: fetch every station feeding a platform, then
//! merge what came back into one ranked list.

mod fetch;
mod merge;

pub use fetch::{FetchReport, fetch_arrivals, fetch_report, fetch_report_at};
pub use merge::{identity_key, merge_arrivals, rank_arrivals};
