//! Permission and eligibility resolver
//!
//! Decides (user, tiket, operation) -> allow/deny. Transition
//! permissions combine a section-group membership with an *active*
//! TiketPIC row for the right role; admins only bypass the view and
//! list scopes, never the transition gates.

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use diamond_common::{DiamondError, PicRole, UserIdentity};
use diamond_persistence::entity::{jenis_data_ilap, periode_jenis_data, tiket, tiket_pic};

use crate::db_err;
use crate::service::assignment;

/// Deny unless the caller belongs to the section group.
pub fn require_group(user: &UserIdentity, group: &str) -> Result<(), DiamondError> {
    if user.in_group(group) {
        Ok(())
    } else {
        Err(DiamondError::Forbidden(format!(
            "user '{}' is not in group {}",
            user.username, group
        )))
    }
}

/// Deny unless the caller holds an active TiketPIC row of `role` for the
/// tiket.
pub async fn require_active_tiket_pic<C: ConnectionTrait>(
    conn: &C,
    user: &UserIdentity,
    id_tiket: i64,
    role: PicRole,
) -> Result<(), DiamondError> {
    let found = tiket_pic::Entity::find()
        .filter(tiket_pic::Column::IdTiket.eq(id_tiket))
        .filter(tiket_pic::Column::IdUser.eq(user.id))
        .filter(tiket_pic::Column::Role.eq(role.as_i32()))
        .filter(tiket_pic::Column::Active.eq(true))
        .one(conn)
        .await
        .map_err(db_err)?;

    if found.is_some() {
        Ok(())
    } else {
        Err(DiamondError::Forbidden(format!(
            "user '{}' is not an active {} PIC of tiket {}",
            user.username,
            role.label(),
            id_tiket
        )))
    }
}

/// View permission: admins, or anyone ever bound to the tiket (active or
/// not).
pub async fn can_view_tiket<C: ConnectionTrait>(
    conn: &C,
    user: &UserIdentity,
    id_tiket: i64,
) -> Result<bool, DiamondError> {
    if user.is_admin() {
        return Ok(true);
    }

    let bound = tiket_pic::Entity::find()
        .filter(tiket_pic::Column::IdTiket.eq(id_tiket))
        .filter(tiket_pic::Column::IdUser.eq(user.id))
        .count(conn)
        .await
        .map_err(db_err)?;
    Ok(bound > 0)
}

/// List permission: admins, any section member, or anyone with at least
/// one TiketPIC row.
pub async fn can_list_tikets<C: ConnectionTrait>(
    conn: &C,
    user: &UserIdentity,
) -> Result<bool, DiamondError> {
    if user.is_admin() || user.in_any_section() {
        return Ok(true);
    }

    let bound = tiket_pic::Entity::find()
        .filter(tiket_pic::Column::IdUser.eq(user.id))
        .count(conn)
        .await
        .map_err(db_err)?;
    Ok(bound > 0)
}

/// Tiket ids visible to the caller, or `None` when unrestricted (admin).
///
/// Non-admins see the tikets they are bound to plus, for P3DE members,
/// every tiket whose ILAP falls inside their active assignment set.
pub async fn visible_tiket_ids<C: ConnectionTrait>(
    conn: &C,
    user: &UserIdentity,
    today: NaiveDate,
) -> Result<Option<Vec<i64>>, DiamondError> {
    if user.is_admin() {
        return Ok(None);
    }

    let mut ids: Vec<i64> = tiket_pic::Entity::find()
        .filter(tiket_pic::Column::IdUser.eq(user.id))
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|r| r.id_tiket)
        .collect();

    if user.in_group(diamond_common::GROUP_P3DE) {
        let ilap_ids = assignment::eligible_ilap_ids(conn, user.id, today).await?;
        if !ilap_ids.is_empty() {
            let sub_jenis: Vec<i64> = jenis_data_ilap::Entity::find()
                .filter(jenis_data_ilap::Column::IdIlap.is_in(ilap_ids))
                .all(conn)
                .await
                .map_err(db_err)?
                .into_iter()
                .map(|r| r.id)
                .collect();

            if !sub_jenis.is_empty() {
                let periode_ids: Vec<i64> = periode_jenis_data::Entity::find()
                    .filter(periode_jenis_data::Column::IdSubJenisDataIlap.is_in(sub_jenis))
                    .all(conn)
                    .await
                    .map_err(db_err)?
                    .into_iter()
                    .map(|r| r.id)
                    .collect();

                if !periode_ids.is_empty() {
                    let scoped: Vec<i64> = tiket::Entity::find()
                        .filter(tiket::Column::IdPeriodeData.is_in(periode_ids))
                        .all(conn)
                        .await
                        .map_err(db_err)?
                        .into_iter()
                        .map(|r| r.id)
                        .collect();
                    ids.extend(scoped);
                }
            }
        }
    }

    ids.sort_unstable();
    ids.dedup();
    Ok(Some(ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use diamond_common::GROUP_P3DE;

    fn p3de_user() -> UserIdentity {
        UserIdentity {
            id: 7,
            username: "sari".to_string(),
            nama_lengkap: "Sari Dewi".to_string(),
            groups: vec![GROUP_P3DE.to_string()],
            is_superuser: false,
        }
    }

    #[test]
    fn test_require_group() {
        let user = p3de_user();
        assert!(require_group(&user, GROUP_P3DE).is_ok());
        let err = require_group(&user, diamond_common::GROUP_PMDE).unwrap_err();
        assert!(matches!(err, DiamondError::Forbidden(_)));
    }
}
