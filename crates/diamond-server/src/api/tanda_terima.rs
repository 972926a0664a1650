//! Tanda terima endpoints

use actix_web::{HttpResponse, get, post, put, web};
use chrono::Datelike;
use serde::Deserialize;
use serde_json::json;

use diamond_core::model::{TandaTerimaInput, UbahTandaTerimaInput};
use diamond_core::service::{minting, tanda_terima};

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::model::{AppState, response::ApiResponse};

#[derive(Debug, Deserialize)]
pub struct NextNumberQuery {
    pub tanggal: Option<chrono::NaiveDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct EligibleQuery {
    pub id_ilap: String,
    pub editing_receipt_id: Option<i64>,
}

#[post("")]
pub async fn create(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    body: web::Json<TandaTerimaInput>,
) -> Result<HttpResponse, AppError> {
    let receipt = tanda_terima::buat_tanda_terima(&state.db, &user, &body, state.now()).await?;
    Ok(ApiResponse::ok_with(
        format!(
            "Tanda Terima Data \"{}\" berhasil dibuat.",
            receipt.nomor_tanda_terima
        ),
        &json!({ "id": receipt.id, "nomor_tanda_terima": receipt.nomor_tanda_terima }),
    ))
}

#[put("/{id}")]
pub async fn update(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<UbahTandaTerimaInput>,
) -> Result<HttpResponse, AppError> {
    let receipt =
        tanda_terima::ubah_tanda_terima(&state.db, &user, path.into_inner(), &body, state.now())
            .await?;
    Ok(ApiResponse::ok(format!(
        "Tanda Terima Data \"{}\" berhasil diperbarui.",
        receipt.nomor_tanda_terima
    )))
}

#[post("/{id}/batalkan")]
pub async fn cancel(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    tanda_terima::batalkan_tanda_terima(&state.db, &user, path.into_inner(), state.now()).await?;
    Ok(ApiResponse::ok("Tanda Terima Data dibatalkan."))
}

#[get("/next-number")]
pub async fn next_number(
    state: web::Data<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    query: web::Query<NextNumberQuery>,
) -> Result<HttpResponse, AppError> {
    let year = query.tanggal.unwrap_or_else(|| state.now()).year();
    let nomor = minting::next_nomor_tanda_terima(&state.db, year).await?;
    Ok(ApiResponse::data(&json!({ "nomor_tanda_terima": nomor })))
}

#[get("/eligible")]
pub async fn eligible_tikets(
    state: web::Data<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    query: web::Query<EligibleQuery>,
) -> Result<HttpResponse, AppError> {
    let tikets =
        tanda_terima::eligible_tikets(&state.db, &query.id_ilap, query.editing_receipt_id).await?;
    Ok(ApiResponse::data(&tikets))
}
