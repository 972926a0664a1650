//! Diamond Server - HTTP boundary for the tiket workflow engine
//!
//! Thin layer over `diamond-core`: resolves the caller identity from the
//! ambient session store, maps engine errors to the JSON envelope, and
//! exposes one route per workflow operation.

pub mod api;
pub mod auth;
pub mod error;
pub mod model;
pub mod session;
pub mod startup;

pub use error::AppError;
