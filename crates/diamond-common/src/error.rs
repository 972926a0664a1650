//! Error taxonomy and error codes for Diamond
//!
//! This module defines:
//! - `DiamondError`: the application error enum every workflow operation
//!   returns; callers map it to the HTTP surface
//! - `ErrorCode`: structured error codes for API responses

use serde::{Deserialize, Serialize};

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum DiamondError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("prerequisite missing: {0}")]
    PrerequisiteMissing(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DiamondError {
    /// Wrap a database or other infrastructure failure.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        DiamondError::Internal(err.to_string())
    }

    /// True when the failure is a retriable unique-key race on
    /// identifier minting.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DiamondError::Conflict(_))
    }
}

/// Error code structure for API responses
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

pub const SUCCESS: ErrorCode<'static> = ErrorCode {
    code: 0,
    message: "success",
};

pub const AUTHENTICATION_REQUIRED: ErrorCode<'static> = ErrorCode {
    code: 10000,
    message: "authentication required",
};

pub const ACCESS_DENIED: ErrorCode<'static> = ErrorCode {
    code: 10001,
    message: "access denied",
};

pub const PARAMETER_VALIDATE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 10002,
    message: "parameter validate error",
};

pub const INVALID_TRANSITION: ErrorCode<'static> = ErrorCode {
    code: 20001,
    message: "invalid workflow transition",
};

pub const PREREQUISITE_MISSING: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "prerequisite missing",
};

pub const RESOURCE_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20003,
    message: "resource not found",
};

pub const RESOURCE_CONFLICT: ErrorCode<'static> = ErrorCode {
    code: 20004,
    message: "resource conflict",
};

pub const SERVER_ERROR: ErrorCode<'static> = ErrorCode {
    code: 30000,
    message: "server error",
};
