//! Tiket action entity - append-only audit log
//!
//! Rows are never updated or deleted. Within one tiket, timestamps are
//! strictly increasing and reproduce the causal order of operations.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tiket_action")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub id_tiket: i64,
    pub id_user: i64,
    pub timestamp: DateTime,
    /// Action code, see `diamond_common::ActionCode`
    pub action: i32,
    pub catatan: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
