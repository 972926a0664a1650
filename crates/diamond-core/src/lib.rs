//! Diamond Core - the tiket workflow engine
//!
//! Everything that advances a tiket through its lifecycle lives here:
//! - assignment resolution over the time-windowed registry
//! - the permission and eligibility resolver
//! - deterministic identifier minting with bounded retry
//! - the transition engine and its atomic side effects
//! - backup and tanda-terima sub-engines
//! - notification dispatch and the task dashboard
//!
//! The engine is stateless between requests; every operation maps to one
//! short database transaction and receives the caller identity and the
//! current time from the HTTP boundary.

pub mod model;
pub mod service;

pub use model::*;

use diamond_common::DiamondError;
use sea_orm::DbErr;

/// Map a database failure into the error taxonomy.
pub(crate) fn db_err(err: DbErr) -> DiamondError {
    DiamondError::Internal(err.to_string())
}
