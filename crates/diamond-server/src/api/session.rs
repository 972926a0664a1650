//! Session endpoints over the ambient store
//!
//! Two trivial operations: `refresh` renews the idle window (any
//! authenticated request does too) and `status` reports the remaining
//! idle time without renewing it.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde_json::json;

use diamond_common::DiamondError;

use crate::auth::{AuthenticatedUser, SESSION_TOKEN_HEADER};
use crate::error::AppError;
use crate::model::{AppState, response::ApiResponse};

#[post("/refresh")]
pub async fn refresh(
    _state: web::Data<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    // The extractor already touched the session
    Ok(ApiResponse::ok(""))
}

#[get("/status")]
pub async fn status(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let token = req
        .headers()
        .get(SESSION_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::from(DiamondError::Unauthenticated))?;

    match state.sessions.remaining(token) {
        Some(remaining) => Ok(ApiResponse::data(&json!({
            "active": true,
            "remaining_secs": remaining.as_secs(),
        }))),
        None => Ok(ApiResponse::data(&json!({ "active": false }))),
    }
}
