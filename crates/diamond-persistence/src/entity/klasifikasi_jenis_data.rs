//! Classification binding for a data type; pair is unique

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "klasifikasi_jenis_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub id_jenis_data_ilap: i64,
    pub id_klasifikasi_tabel: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
