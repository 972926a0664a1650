//! Tiket entity - one data delivery under processing
//!
//! Status codes and the `backup`/`tanda_terima` flag coupling are
//! governed by the workflow engine; rows are never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tiket")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 9-char sub-jenis code + YYMMDD + 3-digit daily sequence
    #[sea_orm(unique)]
    pub nomor_tiket: String,
    pub id_periode_data: i64,
    pub id_jenis_prioritas_data: Option<i64>,
    /// Delivery period within the year; meaning depends on the period catalog
    pub periode: i32,
    pub tahun: i32,
    /// Workflow status code (1..=8)
    pub status: i32,
    pub tgl_terima_vertikal: Option<DateTime>,
    pub tgl_terima_dip: Option<DateTime>,
    pub tgl_teliti: Option<DateTime>,
    pub baris_p3de: Option<i32>,
    pub nomor_nd_nadine: Option<String>,
    pub tgl_nadine: Option<DateTime>,
    pub tgl_kirim_pide: Option<DateTime>,
    pub tgl_dibatalkan: Option<DateTime>,
    pub tgl_dikembalikan: Option<DateTime>,
    pub baris_i: Option<i32>,
    pub baris_u: Option<i32>,
    pub baris_res: Option<i32>,
    pub baris_cde: Option<i32>,
    pub tgl_transfer: Option<DateTime>,
    pub tgl_rematch: Option<DateTime>,
    pub sudah_qc: Option<i32>,
    pub belum_qc: Option<i32>,
    pub lolos_qc: Option<i32>,
    pub tidak_lolos_qc: Option<i32>,
    pub qc_c: Option<i32>,
    /// True while at least one backup_data row exists for this tiket
    pub backup: bool,
    /// True while the tiket is listed in an active tanda terima
    pub tanda_terima: bool,
    pub id_durasi_jatuh_tempo_pide: Option<i64>,
    pub id_durasi_jatuh_tempo_pmde: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
