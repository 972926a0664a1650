//! Tanda terima sub-engine
//!
//! A receipt binds one ILAP to one or more tikets. A tiket may sit in at
//! most one *active* receipt per ILAP at a time; cancelling the receipt
//! reverts the `tanda_terima` flag on every contained tiket, while
//! removing a single line item does not.

use chrono::{Datelike, NaiveDateTime};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use diamond_common::{ActionCode, DiamondError, GROUP_P3DE, PicRole, TiketStatus, UserIdentity};
use diamond_persistence::entity::{
    detil_tanda_terima, jenis_data_ilap, periode_jenis_data, tanda_terima_data, tiket,
};

use crate::db_err;
use crate::model::{TandaTerimaInput, UbahTandaTerimaInput};
use crate::service::{audit::ActionLogger, minting, permission, workflow::load_tiket_for_update};

/// Tikets eligible for a receipt of `id_ilap`: status before dispatch
/// and not already listed in another active receipt for that ILAP.
/// When editing, the receipt's own line items stay eligible.
pub async fn eligible_tikets<C: ConnectionTrait>(
    conn: &C,
    id_ilap: &str,
    editing_receipt: Option<i64>,
) -> Result<Vec<tiket::Model>, DiamondError> {
    let sub_jenis_ids: Vec<i64> = jenis_data_ilap::Entity::find()
        .filter(jenis_data_ilap::Column::IdIlap.eq(id_ilap))
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|r| r.id)
        .collect();
    if sub_jenis_ids.is_empty() {
        return Ok(Vec::new());
    }

    let periode_ids: Vec<i64> = periode_jenis_data::Entity::find()
        .filter(periode_jenis_data::Column::IdSubJenisDataIlap.is_in(sub_jenis_ids))
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|r| r.id)
        .collect();
    if periode_ids.is_empty() {
        return Ok(Vec::new());
    }

    let taken = reserved_tiket_ids(conn, id_ilap, editing_receipt).await?;

    let candidates = tiket::Entity::find()
        .filter(tiket::Column::IdPeriodeData.is_in(periode_ids))
        .filter(tiket::Column::Status.lt(TiketStatus::DikirimKePide.as_i32()))
        .order_by_asc(tiket::Column::Id)
        .all(conn)
        .await
        .map_err(db_err)?;

    Ok(candidates
        .into_iter()
        .filter(|t| !taken.contains(&t.id))
        .collect())
}

/// Tiket ids already held by an active receipt of the ILAP, optionally
/// ignoring one receipt (the one being edited).
async fn reserved_tiket_ids<C: ConnectionTrait>(
    conn: &C,
    id_ilap: &str,
    ignore_receipt: Option<i64>,
) -> Result<Vec<i64>, DiamondError> {
    let mut receipts = tanda_terima_data::Entity::find()
        .filter(tanda_terima_data::Column::IdIlap.eq(id_ilap))
        .filter(tanda_terima_data::Column::Active.eq(true));
    if let Some(id) = ignore_receipt {
        receipts = receipts.filter(tanda_terima_data::Column::Id.ne(id));
    }
    let receipt_ids: Vec<i64> = receipts
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|r| r.id)
        .collect();
    if receipt_ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(detil_tanda_terima::Entity::find()
        .filter(detil_tanda_terima::Column::IdTandaTerima.is_in(receipt_ids))
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|r| r.id_tiket)
        .collect())
}

async fn add_line_item(
    txn: &DatabaseTransaction,
    actor: &UserIdentity,
    receipt: &tanda_terima_data::Model,
    id_tiket: i64,
    logger: &mut ActionLogger,
) -> Result<(), DiamondError> {
    permission::require_active_tiket_pic(txn, actor, id_tiket, PicRole::P3de).await?;
    let current = load_tiket_for_update(txn, id_tiket).await?;

    detil_tanda_terima::ActiveModel {
        id_tanda_terima: Set(receipt.id),
        id_tiket: Set(id_tiket),
        ..Default::default()
    }
    .insert(txn)
    .await
    .map_err(db_err)?;

    if !current.tanda_terima {
        let mut active: tiket::ActiveModel = current.into();
        active.tanda_terima = Set(true);
        active.update(txn).await.map_err(db_err)?;
    }

    logger
        .log(
            txn,
            id_tiket,
            ActionCode::TandaTerimaDirekam,
            &format!("tanda terima {} direkam", receipt.nomor_tanda_terima),
        )
        .await?;
    Ok(())
}

/// Issue a receipt for the ILAP over the selected tikets, minting its
/// yearly number inside the transaction with bounded retry.
pub async fn buat_tanda_terima(
    db: &DatabaseConnection,
    actor: &UserIdentity,
    input: &TandaTerimaInput,
    now: NaiveDateTime,
) -> Result<tanda_terima_data::Model, DiamondError> {
    permission::require_group(actor, GROUP_P3DE)?;

    if input.tiket_ids.is_empty() {
        return Err(DiamondError::InvalidInput("no tiket selected".to_string()));
    }

    let mut last_err = None;
    for _attempt in 1..=minting::MAX_MINT_RETRIES {
        let txn = db.begin().await.map_err(db_err)?;

        let eligible = eligible_tikets(&txn, &input.id_ilap, None).await?;
        for &id_tiket in &input.tiket_ids {
            if !eligible.iter().any(|t| t.id == id_tiket) {
                return Err(DiamondError::InvalidInput(format!(
                    "tiket {} is not eligible for a tanda terima of ILAP {}",
                    id_tiket, input.id_ilap
                )));
            }
        }

        let nomor = minting::next_nomor_tanda_terima(&txn, input.tanggal.year()).await?;
        let inserted = tanda_terima_data::ActiveModel {
            nomor_tanda_terima: Set(nomor.clone()),
            tanggal_tanda_terima: Set(input.tanggal),
            id_ilap: Set(input.id_ilap.clone()),
            deskripsi: Set(input.deskripsi.clone()),
            id_perekam: Set(actor.id),
            active: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await;

        let receipt = match inserted {
            Ok(model) => model,
            Err(err) if minting::is_unique_violation(&err) => {
                txn.rollback().await.map_err(db_err)?;
                last_err = Some(DiamondError::Conflict(format!(
                    "nomor tanda terima {} already minted",
                    nomor
                )));
                continue;
            }
            Err(err) => return Err(db_err(err)),
        };

        let mut logger = ActionLogger::new(actor.id, now);
        for &id_tiket in &input.tiket_ids {
            add_line_item(&txn, actor, &receipt, id_tiket, &mut logger).await?;
        }

        txn.commit().await.map_err(db_err)?;
        info!(nomor = %receipt.nomor_tanda_terima, "tanda terima issued");
        return Ok(receipt);
    }

    Err(last_err.unwrap_or_else(|| {
        DiamondError::Conflict("nomor tanda terima minting retries exhausted".to_string())
    }))
}

/// Replace the line items of an active receipt. Newly added tikets are
/// audited and flagged; removed tikets keep their historical audit entry
/// and are not reverted.
pub async fn ubah_tanda_terima(
    db: &DatabaseConnection,
    actor: &UserIdentity,
    id: i64,
    input: &UbahTandaTerimaInput,
    now: NaiveDateTime,
) -> Result<tanda_terima_data::Model, DiamondError> {
    permission::require_group(actor, GROUP_P3DE)?;

    if input.tiket_ids.is_empty() {
        return Err(DiamondError::InvalidInput("no tiket selected".to_string()));
    }

    let txn = db.begin().await.map_err(db_err)?;

    let receipt = tanda_terima_data::Entity::find_by_id(id)
        .one(&txn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DiamondError::NotFound(format!("tanda terima {}", id)))?;
    if !receipt.active {
        return Err(DiamondError::InvalidTransition(format!(
            "tanda terima {} has been cancelled",
            receipt.nomor_tanda_terima
        )));
    }

    let existing: Vec<i64> = detil_tanda_terima::Entity::find()
        .filter(detil_tanda_terima::Column::IdTandaTerima.eq(id))
        .all(&txn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|r| r.id_tiket)
        .collect();

    let added: Vec<i64> = input
        .tiket_ids
        .iter()
        .copied()
        .filter(|t| !existing.contains(t))
        .collect();
    let removed: Vec<i64> = existing
        .iter()
        .copied()
        .filter(|t| !input.tiket_ids.contains(t))
        .collect();

    if !added.is_empty() {
        let eligible = eligible_tikets(&txn, &receipt.id_ilap, Some(id)).await?;
        for &id_tiket in &added {
            if !eligible.iter().any(|t| t.id == id_tiket) {
                return Err(DiamondError::InvalidInput(format!(
                    "tiket {} is not eligible for tanda terima {}",
                    id_tiket, receipt.nomor_tanda_terima
                )));
            }
        }
    }

    let mut active: tanda_terima_data::ActiveModel = receipt.clone().into();
    active.tanggal_tanda_terima = Set(input.tanggal);
    active.deskripsi = Set(input.deskripsi.clone());
    let updated = active.update(&txn).await.map_err(db_err)?;

    if !removed.is_empty() {
        detil_tanda_terima::Entity::delete_many()
            .filter(detil_tanda_terima::Column::IdTandaTerima.eq(id))
            .filter(detil_tanda_terima::Column::IdTiket.is_in(removed))
            .exec(&txn)
            .await
            .map_err(db_err)?;
    }

    let mut logger = ActionLogger::new(actor.id, now);
    for &id_tiket in &added {
        add_line_item(&txn, actor, &updated, id_tiket, &mut logger).await?;
    }

    txn.commit().await.map_err(db_err)?;
    Ok(updated)
}

/// Cancel a receipt: flip it inactive and revert the `tanda_terima`
/// flag on every contained tiket, each with its own audit entry.
/// Rejected while any contained tiket has already been dispatched.
pub async fn batalkan_tanda_terima(
    db: &DatabaseConnection,
    actor: &UserIdentity,
    id: i64,
    now: NaiveDateTime,
) -> Result<(), DiamondError> {
    permission::require_group(actor, GROUP_P3DE)?;

    let txn = db.begin().await.map_err(db_err)?;

    let receipt = tanda_terima_data::Entity::find_by_id(id)
        .one(&txn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DiamondError::NotFound(format!("tanda terima {}", id)))?;
    if !receipt.active {
        return Err(DiamondError::InvalidTransition(format!(
            "tanda terima {} is already cancelled",
            receipt.nomor_tanda_terima
        )));
    }

    let items = detil_tanda_terima::Entity::find()
        .filter(detil_tanda_terima::Column::IdTandaTerima.eq(id))
        .all(&txn)
        .await
        .map_err(db_err)?;

    let mut logger = ActionLogger::new(actor.id, now);
    for item in &items {
        let current = load_tiket_for_update(&txn, item.id_tiket).await?;
        if current.status >= TiketStatus::DikirimKePide.as_i32() {
            return Err(DiamondError::InvalidTransition(format!(
                "tiket {} has been dispatched; tanda terima {} cannot be cancelled",
                current.nomor_tiket, receipt.nomor_tanda_terima
            )));
        }

        let mut active: tiket::ActiveModel = current.into();
        active.tanda_terima = Set(false);
        active.update(&txn).await.map_err(db_err)?;

        logger
            .log(
                &txn,
                item.id_tiket,
                ActionCode::TandaTerimaDibatalkan,
                &format!("tanda terima {} dibatalkan", receipt.nomor_tanda_terima),
            )
            .await?;
    }

    let mut active: tanda_terima_data::ActiveModel = receipt.into();
    active.active = Set(false);
    active.update(&txn).await.map_err(db_err)?;

    txn.commit().await.map_err(db_err)?;
    Ok(())
}

/// Line items of one receipt.
pub async fn line_items<C: ConnectionTrait>(
    conn: &C,
    id_tanda_terima: i64,
) -> Result<Vec<detil_tanda_terima::Model>, DiamondError> {
    detil_tanda_terima::Entity::find()
        .filter(detil_tanda_terima::Column::IdTandaTerima.eq(id_tanda_terima))
        .order_by_asc(detil_tanda_terima::Column::Id)
        .all(conn)
        .await
        .map_err(db_err)
}

/// Receipts containing the tiket, newest first.
pub async fn receipts_for_tiket<C: ConnectionTrait>(
    conn: &C,
    id_tiket: i64,
) -> Result<Vec<tanda_terima_data::Model>, DiamondError> {
    let receipt_ids: Vec<i64> = detil_tanda_terima::Entity::find()
        .filter(detil_tanda_terima::Column::IdTiket.eq(id_tiket))
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|r| r.id_tanda_terima)
        .collect();
    if receipt_ids.is_empty() {
        return Ok(Vec::new());
    }

    tanda_terima_data::Entity::find()
        .filter(tanda_terima_data::Column::Id.is_in(receipt_ids))
        .order_by_desc(tanda_terima_data::Column::TanggalTandaTerima)
        .all(conn)
        .await
        .map_err(db_err)
}
