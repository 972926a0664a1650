//! Backup data endpoints

use actix_web::{HttpResponse, delete, post, web};
use serde::Deserialize;
use serde_json::json;

use diamond_core::service::backup;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::model::{AppState, response::ApiResponse};

#[derive(Debug, Deserialize)]
pub struct CreateBody {
    pub id_tiket: i64,
    pub lokasi_backup: String,
}

#[post("")]
pub async fn create(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    body: web::Json<CreateBody>,
) -> Result<HttpResponse, AppError> {
    let created = backup::rekam_backup(
        &state.db,
        &user,
        body.id_tiket,
        &body.lokasi_backup,
        state.now(),
    )
    .await?;
    Ok(ApiResponse::ok_with(
        "Data Backup berhasil direkam.",
        &json!({ "id": created.id }),
    ))
}

#[delete("/{id}")]
pub async fn delete(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    backup::hapus_backup(&state.db, &user, path.into_inner(), state.now()).await?;
    Ok(ApiResponse::ok("Data Backup berhasil dihapus."))
}
