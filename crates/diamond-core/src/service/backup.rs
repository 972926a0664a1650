//! Backup sub-engine
//!
//! A tiket accumulates backup locations; the `backup` flag on the parent
//! tiket is true iff at least one backup_data row remains. Both flag
//! directions are maintained under a row lock on the parent tiket.

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use diamond_common::{ActionCode, DiamondError, GROUP_P3DE, PicRole, TiketStatus, UserIdentity};
use diamond_persistence::entity::{backup_data, tiket};

use crate::db_err;
use crate::service::{audit::ActionLogger, permission, workflow::load_tiket_for_update};

/// Record a backup location for a tiket and raise its `backup` flag.
pub async fn rekam_backup(
    db: &DatabaseConnection,
    actor: &UserIdentity,
    id_tiket: i64,
    lokasi_backup: &str,
    now: NaiveDateTime,
) -> Result<backup_data::Model, DiamondError> {
    permission::require_group(actor, GROUP_P3DE)?;

    if lokasi_backup.trim().is_empty() {
        return Err(DiamondError::InvalidInput(
            "lokasi backup is required".to_string(),
        ));
    }

    let txn = db.begin().await.map_err(db_err)?;
    permission::require_active_tiket_pic(&txn, actor, id_tiket, PicRole::P3de).await?;

    let current = load_tiket_for_update(&txn, id_tiket).await?;

    let created = backup_data::ActiveModel {
        id_tiket: Set(id_tiket),
        lokasi_backup: Set(lokasi_backup.trim().to_string()),
        id_user: Set(Some(actor.id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(db_err)?;

    if !current.backup {
        let mut active: tiket::ActiveModel = current.into();
        active.backup = Set(true);
        active.update(&txn).await.map_err(db_err)?;
    }

    ActionLogger::new(actor.id, now)
        .log(
            &txn,
            id_tiket,
            ActionCode::BackupDirekam,
            "backup data direkam",
        )
        .await?;

    txn.commit().await.map_err(db_err)?;
    Ok(created)
}

/// Delete one backup record. The `backup` flag drops back to false only
/// when no other backup remains; the last backup of a dispatched tiket
/// cannot be removed without breaking the dispatch invariant, so that
/// deletion is rejected.
pub async fn hapus_backup(
    db: &DatabaseConnection,
    actor: &UserIdentity,
    id_backup: i64,
    now: NaiveDateTime,
) -> Result<(), DiamondError> {
    permission::require_group(actor, GROUP_P3DE)?;

    let txn = db.begin().await.map_err(db_err)?;

    let record = backup_data::Entity::find_by_id(id_backup)
        .one(&txn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DiamondError::NotFound(format!("backup data {}", id_backup)))?;
    let id_tiket = record.id_tiket;

    permission::require_active_tiket_pic(&txn, actor, id_tiket, PicRole::P3de).await?;
    let current = load_tiket_for_update(&txn, id_tiket).await?;

    let others = backup_data::Entity::find()
        .filter(backup_data::Column::IdTiket.eq(id_tiket))
        .filter(backup_data::Column::Id.ne(id_backup))
        .count(&txn)
        .await
        .map_err(db_err)?;

    if others == 0 && current.status >= TiketStatus::DikirimKePide.as_i32() {
        return Err(DiamondError::InvalidTransition(format!(
            "tiket {} has been dispatched; its last backup cannot be removed",
            current.nomor_tiket
        )));
    }

    record.delete(&txn).await.map_err(db_err)?;

    if others == 0 && current.backup {
        let mut active: tiket::ActiveModel = current.into();
        active.backup = Set(false);
        active.update(&txn).await.map_err(db_err)?;
    }

    ActionLogger::new(actor.id, now)
        .log(
            &txn,
            id_tiket,
            ActionCode::BackupDihapus,
            "backup data dihapus",
        )
        .await?;

    txn.commit().await.map_err(db_err)?;
    Ok(())
}

/// Backups recorded for one tiket, newest first.
pub async fn list_for_tiket<C: ConnectionTrait>(
    conn: &C,
    id_tiket: i64,
) -> Result<Vec<backup_data::Model>, DiamondError> {
    backup_data::Entity::find()
        .filter(backup_data::Column::IdTiket.eq(id_tiket))
        .order_by_desc(backup_data::Column::CreatedAt)
        .all(conn)
        .await
        .map_err(db_err)
}
