//! Assignment registry entity - time-windowed PIC assignments
//!
//! An entry is active on date D iff `start_date <= D` and
//! (`end_date` is null or `end_date >= D`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "pic")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Section code: P3DE, PIDE, or PMDE
    pub tipe: String,
    pub id_sub_jenis_data_ilap: i64,
    pub id_user: i64,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
