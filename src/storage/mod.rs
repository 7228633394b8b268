mod repository;

pub use repository::*;

/// SQL migration for initial schema
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// Day granularity is all the ledger needs; ISO dates also sort correctly as text.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
