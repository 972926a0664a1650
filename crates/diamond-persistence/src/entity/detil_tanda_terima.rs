//! Tanda terima line item - (receipt, tiket) pair, unique per receipt

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "detil_tanda_terima")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub id_tanda_terima: i64,
    pub id_tiket: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
