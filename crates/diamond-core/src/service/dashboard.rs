//! Task dashboard - per-user pending-count aggregation
//!
//! Each count intersects the user's *active* TiketPIC rows for a role
//! with a tiket predicate. Terminal tikets never appear.

use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use diamond_common::{
    DiamondError, GROUP_P3DE, GROUP_PIDE, GROUP_PMDE, PicRole, TiketStatus, UserIdentity,
};
use diamond_persistence::entity::{tiket, tiket_pic};

use crate::db_err;
use crate::model::DashboardCounts;

async fn active_pic_tiket_ids<C: ConnectionTrait>(
    conn: &C,
    id_user: i64,
    role: PicRole,
) -> Result<Vec<i64>, DiamondError> {
    Ok(tiket_pic::Entity::find()
        .filter(tiket_pic::Column::IdUser.eq(id_user))
        .filter(tiket_pic::Column::Role.eq(role.as_i32()))
        .filter(tiket_pic::Column::Active.eq(true))
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|r| r.id_tiket)
        .collect())
}

async fn count_tikets<C: ConnectionTrait>(
    conn: &C,
    ids: &[i64],
    predicate: Condition,
) -> Result<u64, DiamondError> {
    if ids.is_empty() {
        return Ok(0);
    }
    tiket::Entity::find()
        .filter(tiket::Column::Id.is_in(ids.to_vec()))
        .filter(tiket::Column::Status.lt(TiketStatus::Dibatalkan.as_i32()))
        .filter(predicate)
        .count(conn)
        .await
        .map_err(db_err)
}

/// The seven pending-count fields for the authenticated user.
pub async fn summary<C: ConnectionTrait>(
    conn: &C,
    user: &UserIdentity,
) -> Result<DashboardCounts, DiamondError> {
    let mut counts = DashboardCounts::default();

    if user.in_group(GROUP_P3DE) {
        let ids = active_pic_tiket_ids(conn, user.id, PicRole::P3de).await?;
        counts.rekam_backup_data =
            count_tikets(conn, &ids, Condition::all().add(tiket::Column::Backup.eq(false)))
                .await?;
        counts.buat_tanda_terima = count_tikets(
            conn,
            &ids,
            Condition::all().add(tiket::Column::TandaTerima.eq(false)),
        )
        .await?;
        counts.rekam_hasil_penelitian = count_tikets(
            conn,
            &ids,
            Condition::all().add(tiket::Column::TglTeliti.is_null()),
        )
        .await?;
        counts.kirim_ke_pide = count_tikets(
            conn,
            &ids,
            Condition::all().add(tiket::Column::TglKirimPide.is_null()),
        )
        .await?;
    }

    if user.in_group(GROUP_PIDE) {
        let ids = active_pic_tiket_ids(conn, user.id, PicRole::Pide).await?;
        counts.identifikasi = count_tikets(
            conn,
            &ids,
            Condition::all().add(tiket::Column::Status.eq(TiketStatus::DikirimKePide.as_i32())),
        )
        .await?;
        counts.transfer_ke_pmde = count_tikets(
            conn,
            &ids,
            Condition::all().add(tiket::Column::Status.eq(TiketStatus::Identifikasi.as_i32())),
        )
        .await?;
    }

    if user.in_group(GROUP_PMDE) {
        let ids = active_pic_tiket_ids(conn, user.id, PicRole::Pmde).await?;
        counts.selesaikan = count_tikets(
            conn,
            &ids,
            Condition::all().add(tiket::Column::Status.eq(TiketStatus::PengendalianMutu.as_i32())),
        )
        .await?;
    }

    Ok(counts)
}
