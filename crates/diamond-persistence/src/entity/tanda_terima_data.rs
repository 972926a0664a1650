//! Tanda terima entity - receipt document issued to an ILAP
//!
//! A receipt owns detil_tanda_terima line items. Cancelling flips
//! `active` to false and reverts the `tanda_terima` flag on every
//! contained tiket.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tanda_terima_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 5-digit yearly sequence + "/" + YYYY
    #[sea_orm(unique)]
    pub nomor_tanda_terima: String,
    pub tanggal_tanda_terima: DateTime,
    pub id_ilap: String,
    pub deskripsi: String,
    pub id_perekam: i64,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
