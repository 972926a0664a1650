//! Tiket PIC entity - binding between a tiket and its responsible users
//!
//! Rows are inserted when the tiket is created (snapshot of the
//! assignment registry) and are never re-bound to a different user;
//! only the `active` flag changes as personnel move.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tiket_pic")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub id_tiket: i64,
    pub id_user: i64,
    pub timestamp: DateTime,
    /// 1 = P3DE, 2 = PIDE, 3 = PMDE
    pub role: i32,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
