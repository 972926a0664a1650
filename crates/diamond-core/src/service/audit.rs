//! Audit-log append helpers
//!
//! A transition may emit several actions in one transaction; ordering by
//! timestamp must reproduce insertion order, so the logger hands out
//! strictly increasing timestamps spaced at least one microsecond apart.

use chrono::{Duration, NaiveDateTime};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};

use diamond_common::{ActionCode, CATATAN_MAX_LEN, DiamondError};
use diamond_persistence::entity::tiket_action;

use crate::db_err;

/// Issues audit rows for one transaction on behalf of one user.
pub struct ActionLogger {
    id_user: i64,
    next: NaiveDateTime,
}

impl ActionLogger {
    pub fn new(id_user: i64, now: NaiveDateTime) -> Self {
        Self { id_user, next: now }
    }

    /// Timestamp the next entry would receive.
    pub fn peek(&self) -> NaiveDateTime {
        self.next
    }

    fn take_timestamp(&mut self) -> NaiveDateTime {
        let ts = self.next;
        self.next = ts + Duration::microseconds(1);
        ts
    }

    /// Append one audit entry. Notes longer than the column limit are
    /// truncated rather than rejected.
    pub async fn log<C: ConnectionTrait>(
        &mut self,
        conn: &C,
        id_tiket: i64,
        action: ActionCode,
        catatan: &str,
    ) -> Result<tiket_action::Model, DiamondError> {
        let mut note = catatan.to_string();
        if note.len() > CATATAN_MAX_LEN {
            note.truncate(CATATAN_MAX_LEN);
        }

        tiket_action::ActiveModel {
            id_tiket: Set(id_tiket),
            id_user: Set(self.id_user),
            timestamp: Set(self.take_timestamp()),
            action: Set(action.as_i32()),
            catatan: Set(Some(note)),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(db_err)
    }
}
