// Library root: re-exports all modules so integration tests and the binary
// can access the crate's public API.

pub mod category;
pub mod config;
pub mod ingest;
pub mod league;
pub mod report;
pub mod stats;
pub mod valuation;
