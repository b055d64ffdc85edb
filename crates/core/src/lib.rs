//! Shared domain types for the royalty-ops batch jobs.
//!
//! Holds the environment-derived configuration, the narrowed row and
//! payout record types, and the CSV encoder used by the backup export.

pub mod config;
pub mod csv;
pub mod error;
pub mod payout;
pub mod table;
