//! Notification dispatch
//!
//! Notifications are a fire-and-forget side channel of transitions:
//! inserted in the same transaction, so an aborted transition produces
//! none. Message bodies carry a link fragment to the tiket detail page;
//! every dynamic substitution is HTML-escaped.

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use diamond_common::{DiamondError, PicRole, UserIdentity};
use diamond_persistence::entity::{notification, tiket_pic};

use crate::db_err;

fn escape(text: &str) -> String {
    htmlescape::encode_minimal(text)
}

/// Body for a transition notification: the tiket number as a link plus a
/// short sentence. `detail` is appended verbatim after escaping, e.g.
/// "telah dikembalikan oleh Budi dengan catatan: data kurang".
pub fn tiket_message(id_tiket: i64, nomor_tiket: &str, detail: &str) -> String {
    format!(
        "Tiket <a href=\"/tiket/{}\">{}</a> {}",
        id_tiket,
        escape(nomor_tiket),
        escape(detail)
    )
}

/// Insert one notification per active PIC of `role` on the tiket.
/// Returns how many were created.
pub async fn notify_active_pics<C: ConnectionTrait>(
    conn: &C,
    id_tiket: i64,
    role: PicRole,
    title: &str,
    message: &str,
    now: NaiveDateTime,
) -> Result<u64, DiamondError> {
    let recipients = tiket_pic::Entity::find()
        .filter(tiket_pic::Column::IdTiket.eq(id_tiket))
        .filter(tiket_pic::Column::Role.eq(role.as_i32()))
        .filter(tiket_pic::Column::Active.eq(true))
        .all(conn)
        .await
        .map_err(db_err)?;

    let mut created = 0;
    for pic in &recipients {
        notification::ActiveModel {
            recipient: Set(pic.id_user),
            title: Set(title.to_string()),
            message: Set(message.to_string()),
            is_read: Set(false),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(db_err)?;
        created += 1;
    }

    Ok(created)
}

/// Unread inbox entries for the user, newest first.
pub async fn unread_for_user<C: ConnectionTrait>(
    conn: &C,
    id_user: i64,
) -> Result<Vec<notification::Model>, DiamondError> {
    notification::Entity::find()
        .filter(notification::Column::Recipient.eq(id_user))
        .filter(notification::Column::IsRead.eq(false))
        .order_by_desc(notification::Column::CreatedAt)
        .all(conn)
        .await
        .map_err(db_err)
}

pub async fn unread_count<C: ConnectionTrait>(
    conn: &C,
    id_user: i64,
) -> Result<u64, DiamondError> {
    notification::Entity::find()
        .filter(notification::Column::Recipient.eq(id_user))
        .filter(notification::Column::IsRead.eq(false))
        .count(conn)
        .await
        .map_err(db_err)
}

/// Mark one notification read. Only the recipient may do so.
pub async fn mark_read(
    db: &DatabaseConnection,
    user: &UserIdentity,
    id: i64,
) -> Result<(), DiamondError> {
    let found = notification::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DiamondError::NotFound(format!("notification {}", id)))?;

    if found.recipient != user.id {
        return Err(DiamondError::Forbidden(format!(
            "notification {} does not belong to '{}'",
            id, user.username
        )));
    }

    let mut active: notification::ActiveModel = found.into();
    active.is_read = Set(true);
    active.update(db).await.map_err(db_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiket_message_escapes_substitutions() {
        let message = tiket_message(5, "KM0330101260211001", "telah dikembalikan oleh <admin>");
        assert!(message.contains("<a href=\"/tiket/5\">KM0330101260211001</a>"));
        assert!(message.contains("&lt;admin&gt;"));
        assert!(!message.contains("<admin>"));
    }
}
