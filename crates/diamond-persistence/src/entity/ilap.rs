//! ILAP entity - external reporting institution registry

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ilap")]
pub struct Model {
    /// 5-char institution code
    #[sea_orm(primary_key, auto_increment = false)]
    pub id_ilap: String,
    pub id_kategori: i64,
    pub id_kategori_wilayah: Option<i64>,
    pub nama_ilap: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
