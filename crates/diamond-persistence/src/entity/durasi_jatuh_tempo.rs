//! Deadline-duration registry - SLA days per (sub-jenis, section)
//!
//! Same activeness window rule as the PIC registry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "durasi_jatuh_tempo")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub id_sub_jenis_data: i64,
    /// Section code: PIDE or PMDE
    pub seksi: String,
    /// SLA in days
    pub durasi: i32,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
