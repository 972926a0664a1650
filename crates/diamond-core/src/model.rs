//! Domain models exchanged between the workflow engine and its callers

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use diamond_persistence::entity::{
    backup_data, tanda_terima_data, tiket, tiket_action, tiket_pic,
};

/// Input for tiket creation.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateTiketInput {
    pub id_periode_data: i64,
    pub periode: i32,
    pub tahun: i32,
    pub tgl_terima_vertikal: Option<NaiveDateTime>,
    pub tgl_terima_dip: Option<NaiveDateTime>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RekamHasilPenelitianInput {
    pub baris_p3de: i32,
    pub catatan: Option<String>,
}

/// Batch dispatch of researched tikets to PIDE.
#[derive(Clone, Debug, Deserialize)]
pub struct KirimKePideInput {
    pub tiket_ids: Vec<i64>,
    pub nomor_nd_nadine: String,
    pub tgl_nadine: NaiveDateTime,
    pub tgl_kirim_pide: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TransferKePmdeInput {
    pub baris_i: i32,
    pub baris_u: i32,
    pub baris_res: i32,
    pub baris_cde: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SelesaikanInput {
    pub sudah_qc: i32,
    pub lolos_qc: i32,
    pub tidak_lolos_qc: i32,
    pub qc_c: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TandaTerimaInput {
    pub tanggal: NaiveDateTime,
    pub id_ilap: String,
    pub deskripsi: String,
    pub tiket_ids: Vec<i64>,
}

/// Line-item replacement for an existing receipt. The ILAP binding and
/// nomor are immutable after issuance.
#[derive(Clone, Debug, Deserialize)]
pub struct UbahTandaTerimaInput {
    pub tanggal: NaiveDateTime,
    pub deskripsi: String,
    pub tiket_ids: Vec<i64>,
}

/// One PIC row enriched with the user's display name.
#[derive(Clone, Debug, Serialize)]
pub struct TiketPicInfo {
    #[serde(flatten)]
    pub pic: tiket_pic::Model,
    pub username: String,
    pub nama_lengkap: String,
}

/// Aggregated view returned by `GET tiket detail`.
#[derive(Clone, Debug, Serialize)]
pub struct TiketDetail {
    pub tiket: tiket::Model,
    pub actions: Vec<tiket_action::Model>,
    pub pics: Vec<TiketPicInfo>,
    pub backups: Vec<backup_data::Model>,
    pub tanda_terima: Vec<tanda_terima_data::Model>,
}

/// Per-user pending-count aggregation (task dashboard).
///
/// P3DE counts cover tikets where the user is an active P3DE PIC and the
/// sub-event has not happened yet; the section counts are plain status
/// buckets over the user's active PIC rows for that role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub rekam_backup_data: u64,
    pub buat_tanda_terima: u64,
    pub rekam_hasil_penelitian: u64,
    pub kirim_ke_pide: u64,
    pub identifikasi: u64,
    pub transfer_ke_pmde: u64,
    pub selesaikan: u64,
}

/// Paged query result.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_count: u64,
    pub page_number: u64,
    pub page_size: u64,
    pub page_items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(total_count: u64, page_number: u64, page_size: u64, page_items: Vec<T>) -> Self {
        Self {
            total_count,
            page_number,
            page_size,
            page_items,
        }
    }
}

/// Row of the creation-form feed: one periode-jenis-data candidate for a
/// chosen ILAP, enriched with catalog context and current assignees.
#[derive(Clone, Debug, Serialize)]
pub struct PeriodeDataCandidate {
    pub id: i64,
    pub id_sub_jenis_data: String,
    pub nama_sub_jenis_data: String,
    pub nama_ilap: String,
    pub kategori_ilap: String,
    pub kategori_wilayah: String,
    pub jenis_tabel: String,
    pub jenis_prioritas: bool,
    pub klasifikasi: String,
    pub deskripsi_periode: String,
    pub pic_p3de: String,
    pub pic_pide: String,
    pub pic_pmde: String,
}

/// Filters accepted by the tiket list query; all optional.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TiketListFilter {
    pub nomor_tiket: Option<String>,
    pub status: Option<i32>,
    pub periode: Option<i32>,
    pub tahun: Option<i32>,
}
