//! Task dashboard endpoint

use actix_web::{HttpResponse, get, web};

use diamond_core::service::dashboard;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::model::{AppState, response::ApiResponse};

#[get("/summary")]
pub async fn summary(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let counts = dashboard::summary(&state.db, &user).await?;
    Ok(ApiResponse::data(&counts))
}
