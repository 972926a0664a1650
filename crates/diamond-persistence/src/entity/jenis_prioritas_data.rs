//! Priority designation for a sub-jenis in a given year
//!
//! `tahun` is a 4-char string; matching against a tiket's integer year
//! is by lexical equality of the formatted year.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "jenis_prioritas_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub id_sub_jenis_data_ilap: i64,
    pub no_nd: String,
    pub tahun: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
