//! Periode jenis data - binds a sub-jenis to its delivery-period catalog
//! for a validity window. Tiket creation references one of these rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "periode_jenis_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub id_sub_jenis_data_ilap: i64,
    pub id_periode_pengiriman: i64,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
