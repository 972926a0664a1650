//! Data-type catalog entity
//!
//! One row per (jenis, sub-jenis) pair of an ILAP. The 9-char
//! `id_sub_jenis_data` code is the axis on which PIC assignments and
//! deadline durations are scoped, and the prefix of every nomor tiket.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "jenis_data_ilap")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 7-char jenis code
    pub id_jenis_data: String,
    /// 9-char sub-jenis code
    #[sea_orm(unique)]
    pub id_sub_jenis_data: String,
    pub nama_jenis_data: String,
    pub nama_sub_jenis_data: String,
    pub id_ilap: String,
    pub id_kategori_ilap: i64,
    pub id_jenis_tabel: Option<i64>,
    pub nama_tabel_i: Option<String>,
    pub nama_tabel_u: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
