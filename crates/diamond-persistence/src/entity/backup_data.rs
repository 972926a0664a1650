//! Backup data entity - preserved-copy locations per tiket

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "backup_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub id_tiket: i64,
    pub lokasi_backup: String,
    pub id_user: Option<i64>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
