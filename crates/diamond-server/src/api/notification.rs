//! Notification inbox endpoints

use actix_web::{HttpResponse, get, post, web};
use serde_json::json;

use diamond_core::service::notification;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::model::{AppState, response::ApiResponse};

#[get("/unread")]
pub async fn unread(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let items = notification::unread_for_user(&state.db, user.id).await?;
    Ok(ApiResponse::data(&json!({
        "count": items.len(),
        "items": items,
    })))
}

#[post("/{id}/read")]
pub async fn mark_read(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    notification::mark_read(&state.db, &user, path.into_inner()).await?;
    Ok(ApiResponse::ok(""))
}
