//! Tiket workflow endpoints

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use serde_json::json;

use diamond_core::model::{
    CreateTiketInput, KirimKePideInput, RekamHasilPenelitianInput, SelesaikanInput,
    TiketListFilter, TransferKePmdeInput,
};
use diamond_core::service::{tiket as tiket_service, workflow};

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::model::{AppState, response::ApiResponse};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub nomor_tiket: Option<String>,
    pub status: Option<i32>,
    pub periode: Option<i32>,
    pub tahun: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CatatanBody {
    pub catatan: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub id_periode_data: i64,
}

#[derive(Debug, Deserialize)]
pub struct CheckExistsQuery {
    pub id_periode_data: i64,
    pub periode: i32,
    pub tahun: i32,
}

#[post("")]
pub async fn create(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    body: web::Json<CreateTiketInput>,
) -> Result<HttpResponse, AppError> {
    let created = workflow::create_tiket(&state.db, &user, &body, state.now()).await?;
    Ok(ApiResponse::ok_with(
        format!("Tiket \"{}\" berhasil dibuat.", created.nomor_tiket),
        &json!({ "id": created.id, "nomor_tiket": created.nomor_tiket }),
    ))
}

#[get("")]
pub async fn list(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = TiketListFilter {
        nomor_tiket: query.nomor_tiket.clone(),
        status: query.status,
        periode: query.periode,
        tahun: query.tahun,
    };
    let page = tiket_service::list(
        &state.db,
        &user,
        &filter,
        state.now().date(),
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(10),
    )
    .await?;
    Ok(ApiResponse::data(&page))
}

#[get("/{id}")]
pub async fn detail(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let found = tiket_service::detail(&state.db, &user, path.into_inner()).await?;
    Ok(ApiResponse::data(&found))
}

#[post("/{id}/hasil-penelitian")]
pub async fn rekam_hasil_penelitian(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<RekamHasilPenelitianInput>,
) -> Result<HttpResponse, AppError> {
    let updated =
        workflow::rekam_hasil_penelitian(&state.db, &user, path.into_inner(), &body, state.now())
            .await?;
    Ok(ApiResponse::ok(format!(
        "Hasil penelitian untuk tiket \"{}\" telah direkam.",
        updated.nomor_tiket
    )))
}

#[post("/kirim")]
pub async fn kirim_ke_pide(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    body: web::Json<KirimKePideInput>,
) -> Result<HttpResponse, AppError> {
    let updated = workflow::kirim_ke_pide(&state.db, &user, &body, state.now()).await?;
    Ok(ApiResponse::redirect(
        format!("{} tiket berhasil dikirim ke PIDE.", updated.len()),
        "/tiket",
    ))
}

#[post("/{id}/kembalikan")]
pub async fn kembalikan(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<CatatanBody>,
) -> Result<HttpResponse, AppError> {
    let catatan = body.catatan.clone().unwrap_or_default();
    let updated =
        workflow::kembalikan(&state.db, &user, path.into_inner(), &catatan, state.now()).await?;
    Ok(ApiResponse::ok(format!(
        "Tiket \"{}\" telah dikembalikan dan notifikasi dikirim ke P3DE.",
        updated.nomor_tiket
    )))
}

#[post("/{id}/identifikasi")]
pub async fn identifikasi(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let updated = workflow::identifikasi(&state.db, &user, path.into_inner(), state.now()).await?;
    Ok(ApiResponse::ok(format!(
        "Tiket \"{}\" masuk proses identifikasi.",
        updated.nomor_tiket
    )))
}

#[post("/{id}/transfer")]
pub async fn transfer_ke_pmde(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<TransferKePmdeInput>,
) -> Result<HttpResponse, AppError> {
    let updated =
        workflow::transfer_ke_pmde(&state.db, &user, path.into_inner(), &body, state.now()).await?;
    Ok(ApiResponse::ok(format!(
        "Tiket \"{}\" telah ditransfer ke PMDE dan notifikasi dikirim.",
        updated.nomor_tiket
    )))
}

#[post("/{id}/selesaikan")]
pub async fn selesaikan(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<SelesaikanInput>,
) -> Result<HttpResponse, AppError> {
    let updated =
        workflow::selesaikan(&state.db, &user, path.into_inner(), &body, state.now()).await?;
    Ok(ApiResponse::ok(format!(
        "Tiket \"{}\" berhasil diselesaikan.",
        updated.nomor_tiket
    )))
}

#[post("/{id}/batalkan")]
pub async fn batalkan(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<CatatanBody>,
) -> Result<HttpResponse, AppError> {
    let catatan = body.catatan.clone().unwrap_or_default();
    let updated =
        workflow::batalkan(&state.db, &user, path.into_inner(), &catatan, state.now()).await?;
    Ok(ApiResponse::ok(format!(
        "Tiket \"{}\" dibatalkan.",
        updated.nomor_tiket
    )))
}

#[get("/preview-nomor")]
pub async fn preview_nomor(
    state: web::Data<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    query: web::Query<PreviewQuery>,
) -> Result<HttpResponse, AppError> {
    let nomor = tiket_service::preview_nomor_tiket(
        &state.db,
        query.id_periode_data,
        state.now().date(),
    )
    .await?;
    Ok(ApiResponse::data(&json!({ "nomor_tiket": nomor })))
}

#[get("/check-exists")]
pub async fn check_exists(
    state: web::Data<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    query: web::Query<CheckExistsQuery>,
) -> Result<HttpResponse, AppError> {
    let numbers = tiket_service::existing_numbers(
        &state.db,
        query.id_periode_data,
        query.periode,
        query.tahun,
    )
    .await?;
    Ok(ApiResponse::data(&json!({
        "exists": !numbers.is_empty(),
        "nomor_tiket": numbers,
    })))
}

#[get("/periode-data/{id_ilap}")]
pub async fn periode_data_for_ilap(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let candidates = tiket_service::periode_data_for_ilap(
        &state.db,
        &user,
        &path.into_inner(),
        state.now().date(),
    )
    .await?;
    Ok(ApiResponse::data(&candidates))
}

#[get("/check-prioritas/{id_sub_jenis_data}/{tahun}")]
pub async fn check_prioritas(
    state: web::Data<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    path: web::Path<(String, i32)>,
) -> Result<HttpResponse, AppError> {
    let (id_sub_jenis_data, tahun) = path.into_inner();
    let has = tiket_service::has_prioritas(&state.db, &id_sub_jenis_data, tahun).await?;
    Ok(ApiResponse::data(&json!({ "has_prioritas": has })))
}
