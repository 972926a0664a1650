//! The tiket transition engine
//!
//! Every operation here is one transaction: permission check, transition
//! table lookup, field guards, tiket update, audit append, notification
//! dispatch. On any failure the whole transaction rolls back and no side
//! effect survives.

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};

use diamond_common::{
    ActionCode, DiamondError, GROUP_P3DE, GROUP_PIDE, GROUP_PMDE, Operation, PicRole, Section,
    TiketStatus, UserIdentity, target_status,
};
use diamond_persistence::entity::{
    jenis_data_ilap, jenis_prioritas_data, periode_jenis_data, pic, tiket, tiket_pic, users,
};

use crate::db_err;
use crate::model::{
    CreateTiketInput, KirimKePideInput, RekamHasilPenelitianInput, SelesaikanInput,
    TransferKePmdeInput,
};
use crate::service::{assignment, audit::ActionLogger, minting, notification, permission};

/// Load a tiket under a row-level exclusive lock (no-op on sqlite, where
/// the connection serialises writes anyway).
pub(crate) async fn load_tiket_for_update<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<tiket::Model, DiamondError> {
    tiket::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DiamondError::NotFound(format!("tiket {}", id)))
}

/// Resolve the target status from the transition table, rejecting
/// anything outside it.
fn require_transition(
    current_status: i32,
    op: Operation,
    id_tiket: i64,
) -> Result<TiketStatus, DiamondError> {
    let current = TiketStatus::from_i32(current_status).ok_or_else(|| {
        DiamondError::Internal(format!(
            "tiket {} carries invalid status {}",
            id_tiket, current_status
        ))
    })?;
    target_status(current, op).ok_or_else(|| {
        DiamondError::InvalidTransition(format!(
            "{} is not allowed from status {} ({})",
            op,
            current.as_i32(),
            current
        ))
    })
}

/// Create a new tiket in status DIREKAM.
///
/// Resolves deadlines and the priority designation, snapshots all active
/// assignees into TiketPIC rows, and mints the nomor tiket inside the
/// insert transaction. Unique-key races on the nomor are retried with a
/// fresh mint up to the bounded retry limit.
pub async fn create_tiket(
    db: &DatabaseConnection,
    actor: &UserIdentity,
    input: &CreateTiketInput,
    now: NaiveDateTime,
) -> Result<tiket::Model, DiamondError> {
    permission::require_group(actor, GROUP_P3DE)?;

    if !(1..=53).contains(&input.periode) {
        return Err(DiamondError::InvalidInput(format!(
            "periode {} outside 1..=53",
            input.periode
        )));
    }

    let today = now.date();

    let periode_data = periode_jenis_data::Entity::find_by_id(input.id_periode_data)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| {
            DiamondError::NotFound(format!("periode jenis data {}", input.id_periode_data))
        })?;

    let sub_jenis = jenis_data_ilap::Entity::find_by_id(periode_data.id_sub_jenis_data_ilap)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| {
            DiamondError::NotFound(format!(
                "jenis data ilap {}",
                periode_data.id_sub_jenis_data_ilap
            ))
        })?;

    if !assignment::is_active_assignee(db, actor.id, sub_jenis.id, Section::P3de, today).await? {
        return Err(DiamondError::Forbidden(format!(
            "user '{}' is not an active P3DE assignee for {}",
            actor.username, sub_jenis.id_sub_jenis_data
        )));
    }

    let durasi_pide = assignment::active_durasi(db, sub_jenis.id, Section::Pide, today)
        .await?
        .ok_or_else(|| {
            DiamondError::PrerequisiteMissing(format!(
                "Durasi Jatuh Tempo PIDE for {}",
                sub_jenis.nama_sub_jenis_data
            ))
        })?;
    let durasi_pmde = assignment::active_durasi(db, sub_jenis.id, Section::Pmde, today)
        .await?
        .ok_or_else(|| {
            DiamondError::PrerequisiteMissing(format!(
                "Durasi Jatuh Tempo PMDE for {}",
                sub_jenis.nama_sub_jenis_data
            ))
        })?;

    // 4-char year string compared lexically against the formatted year
    let prioritas = jenis_prioritas_data::Entity::find()
        .filter(jenis_prioritas_data::Column::IdSubJenisDataIlap.eq(sub_jenis.id))
        .filter(jenis_prioritas_data::Column::Tahun.eq(format!("{}", input.tahun)))
        .one(db)
        .await
        .map_err(db_err)?;

    let mut last_err = None;
    for attempt in 1..=minting::MAX_MINT_RETRIES {
        let txn = db.begin().await.map_err(db_err)?;

        let nomor_tiket =
            minting::next_nomor_tiket(&txn, &sub_jenis.id_sub_jenis_data, today).await?;

        let inserted = tiket::ActiveModel {
            nomor_tiket: Set(nomor_tiket.clone()),
            id_periode_data: Set(periode_data.id),
            id_jenis_prioritas_data: Set(prioritas.as_ref().map(|p| p.id)),
            periode: Set(input.periode),
            tahun: Set(input.tahun),
            status: Set(TiketStatus::Direkam.as_i32()),
            tgl_terima_vertikal: Set(input.tgl_terima_vertikal),
            tgl_terima_dip: Set(input.tgl_terima_dip),
            backup: Set(false),
            tanda_terima: Set(false),
            id_durasi_jatuh_tempo_pide: Set(Some(durasi_pide.id)),
            id_durasi_jatuh_tempo_pmde: Set(Some(durasi_pmde.id)),
            ..Default::default()
        }
        .insert(&txn)
        .await;

        let created = match inserted {
            Ok(model) => model,
            Err(err) if minting::is_unique_violation(&err) => {
                txn.rollback().await.map_err(db_err)?;
                warn!(attempt, nomor_tiket = %nomor_tiket, "nomor tiket race, reminting");
                last_err = Some(DiamondError::Conflict(format!(
                    "nomor tiket {} already minted",
                    nomor_tiket
                )));
                continue;
            }
            Err(err) => return Err(db_err(err)),
        };

        let mut logger = ActionLogger::new(actor.id, now);
        logger
            .log(&txn, created.id, ActionCode::Direkam, "tiket direkam")
            .await?;

        assign_tiket_pics(&txn, actor, &created, sub_jenis.id, now, &mut logger).await?;

        txn.commit().await.map_err(db_err)?;
        info!(id = created.id, nomor_tiket = %created.nomor_tiket, "tiket created");
        return Ok(created);
    }

    Err(last_err.unwrap_or_else(|| {
        DiamondError::Conflict("nomor tiket minting retries exhausted".to_string())
    }))
}

/// Snapshot all active assignments into TiketPIC rows and audit each as
/// PIC_ADDED. The creator gets a P3DE row even when not listed in the
/// registry, so the tiket is never orphaned for its own section.
async fn assign_tiket_pics<C: ConnectionTrait>(
    conn: &C,
    actor: &UserIdentity,
    created: &tiket::Model,
    id_sub_jenis_data_ilap: i64,
    now: NaiveDateTime,
    logger: &mut ActionLogger,
) -> Result<(), DiamondError> {
    let today = now.date();
    let mut assignees: Vec<(PicRole, i64)> = Vec::new();

    for section in [Section::P3de, Section::Pide, Section::Pmde] {
        let pics: Vec<pic::Model> =
            assignment::active_pics(conn, id_sub_jenis_data_ilap, section, today).await?;
        for entry in pics {
            assignees.push((section.role(), entry.id_user));
        }
    }

    let creator_listed = assignees
        .iter()
        .any(|(role, id_user)| *role == PicRole::P3de && *id_user == actor.id);
    if !creator_listed {
        assignees.push((PicRole::P3de, actor.id));
    }

    let user_ids: Vec<i64> = assignees.iter().map(|(_, id)| *id).collect();
    let names: Vec<users::Model> = users::Entity::find()
        .filter(users::Column::Id.is_in(user_ids))
        .all(conn)
        .await
        .map_err(db_err)?;

    for (role, id_user) in &assignees {
        tiket_pic::ActiveModel {
            id_tiket: Set(created.id),
            id_user: Set(*id_user),
            timestamp: Set(now),
            role: Set(role.as_i32()),
            active: Set(true),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(db_err)?;

        let username = names
            .iter()
            .find(|u| u.id == *id_user)
            .map(|u| u.username.as_str())
            .unwrap_or("?");
        logger
            .log(
                conn,
                created.id,
                ActionCode::PicDitambahkan,
                &format!("PIC {} ditambahkan: {}", role.label(), username),
            )
            .await?;
    }

    Ok(())
}

/// Record (or re-record) research results; moves the tiket to DITELITI.
/// Re-recording is an edit, never a no-op: the research timestamp is
/// rewritten and a fresh audit entry appended.
pub async fn rekam_hasil_penelitian(
    db: &DatabaseConnection,
    actor: &UserIdentity,
    id_tiket: i64,
    input: &RekamHasilPenelitianInput,
    now: NaiveDateTime,
) -> Result<tiket::Model, DiamondError> {
    permission::require_group(actor, GROUP_P3DE)?;

    let txn = db.begin().await.map_err(db_err)?;
    permission::require_active_tiket_pic(&txn, actor, id_tiket, PicRole::P3de).await?;

    let current = load_tiket_for_update(&txn, id_tiket).await?;
    let was_returned = current.status == TiketStatus::Dikembalikan.as_i32();
    let target = require_transition(current.status, Operation::RekamHasilPenelitian, id_tiket)?;

    let mut active: tiket::ActiveModel = current.into();
    active.status = Set(target.as_i32());
    active.tgl_teliti = Set(Some(now));
    active.baris_p3de = Set(Some(input.baris_p3de));
    if was_returned {
        // A new research round supersedes the return
        active.tgl_dikembalikan = Set(None);
    }
    let updated = active.update(&txn).await.map_err(db_err)?;

    let catatan = input
        .catatan
        .clone()
        .unwrap_or_else(|| "hasil penelitian direkam".to_string());
    ActionLogger::new(actor.id, now)
        .log(&txn, id_tiket, ActionCode::Diteliti, &catatan)
        .await?;

    txn.commit().await.map_err(db_err)?;
    Ok(updated)
}

/// Dispatch researched tikets to PIDE. All-or-nothing over the batch;
/// each tiket must have its backup recorded and receipt issued.
pub async fn kirim_ke_pide(
    db: &DatabaseConnection,
    actor: &UserIdentity,
    input: &KirimKePideInput,
    now: NaiveDateTime,
) -> Result<Vec<tiket::Model>, DiamondError> {
    permission::require_group(actor, GROUP_P3DE)?;

    if input.tiket_ids.is_empty() {
        return Err(DiamondError::InvalidInput("no tiket selected".to_string()));
    }
    if input.nomor_nd_nadine.trim().is_empty() {
        return Err(DiamondError::InvalidInput(
            "nomor ND Nadine is required".to_string(),
        ));
    }

    let txn = db.begin().await.map_err(db_err)?;
    let mut logger = ActionLogger::new(actor.id, now);
    let mut updated = Vec::with_capacity(input.tiket_ids.len());

    for &id_tiket in &input.tiket_ids {
        permission::require_active_tiket_pic(&txn, actor, id_tiket, PicRole::P3de).await?;

        let current = load_tiket_for_update(&txn, id_tiket).await?;
        let target = require_transition(current.status, Operation::KirimKePide, id_tiket)?;

        if !current.backup {
            return Err(DiamondError::PrerequisiteMissing(format!(
                "backup for tiket {}",
                current.nomor_tiket
            )));
        }
        if !current.tanda_terima {
            return Err(DiamondError::PrerequisiteMissing(format!(
                "tanda terima for tiket {}",
                current.nomor_tiket
            )));
        }

        let mut active: tiket::ActiveModel = current.into();
        active.status = Set(target.as_i32());
        active.nomor_nd_nadine = Set(Some(input.nomor_nd_nadine.clone()));
        active.tgl_nadine = Set(Some(input.tgl_nadine));
        active.tgl_kirim_pide = Set(Some(input.tgl_kirim_pide));
        let model = active.update(&txn).await.map_err(db_err)?;

        logger
            .log(
                &txn,
                id_tiket,
                ActionCode::DikirimKePide,
                "tiket dikirim ke PIDE",
            )
            .await?;

        let message = notification::tiket_message(
            model.id,
            &model.nomor_tiket,
            &format!("telah dikirim ke PIDE oleh {}", actor.display_name()),
        );
        notification::notify_active_pics(
            &txn,
            model.id,
            PicRole::Pide,
            "Tiket Dikirim ke PIDE",
            &message,
            now,
        )
        .await?;

        updated.push(model);
    }

    txn.commit().await.map_err(db_err)?;
    Ok(updated)
}

/// PIDE returns a tiket to P3DE for revision.
pub async fn kembalikan(
    db: &DatabaseConnection,
    actor: &UserIdentity,
    id_tiket: i64,
    catatan: &str,
    now: NaiveDateTime,
) -> Result<tiket::Model, DiamondError> {
    permission::require_group(actor, GROUP_PIDE)?;

    let txn = db.begin().await.map_err(db_err)?;
    permission::require_active_tiket_pic(&txn, actor, id_tiket, PicRole::Pide).await?;

    let current = load_tiket_for_update(&txn, id_tiket).await?;
    let target = require_transition(current.status, Operation::Kembalikan, id_tiket)?;

    let mut active: tiket::ActiveModel = current.into();
    active.status = Set(target.as_i32());
    active.tgl_dikembalikan = Set(Some(now));
    let updated = active.update(&txn).await.map_err(db_err)?;

    let note = if catatan.trim().is_empty() {
        "tiket dikembalikan oleh PIDE"
    } else {
        catatan
    };
    ActionLogger::new(actor.id, now)
        .log(&txn, id_tiket, ActionCode::Dikembalikan, note)
        .await?;

    let message = notification::tiket_message(
        updated.id,
        &updated.nomor_tiket,
        &format!(
            "telah dikembalikan oleh {} dengan catatan: {}",
            actor.display_name(),
            note
        ),
    );
    notification::notify_active_pics(
        &txn,
        updated.id,
        PicRole::P3de,
        "Tiket Dikembalikan",
        &message,
        now,
    )
    .await?;

    txn.commit().await.map_err(db_err)?;
    Ok(updated)
}

/// PIDE marks a dispatched tiket as identified.
pub async fn identifikasi(
    db: &DatabaseConnection,
    actor: &UserIdentity,
    id_tiket: i64,
    now: NaiveDateTime,
) -> Result<tiket::Model, DiamondError> {
    permission::require_group(actor, GROUP_PIDE)?;

    let txn = db.begin().await.map_err(db_err)?;
    permission::require_active_tiket_pic(&txn, actor, id_tiket, PicRole::Pide).await?;

    let current = load_tiket_for_update(&txn, id_tiket).await?;
    let target = require_transition(current.status, Operation::Identifikasi, id_tiket)?;

    let mut active: tiket::ActiveModel = current.into();
    active.status = Set(target.as_i32());
    let updated = active.update(&txn).await.map_err(db_err)?;

    ActionLogger::new(actor.id, now)
        .log(
            &txn,
            id_tiket,
            ActionCode::Identifikasi,
            "mulai proses identifikasi",
        )
        .await?;

    txn.commit().await.map_err(db_err)?;
    Ok(updated)
}

/// PIDE transfers an identified tiket to PMDE with its research-output
/// counts. All four counts are required by the transition guard.
pub async fn transfer_ke_pmde(
    db: &DatabaseConnection,
    actor: &UserIdentity,
    id_tiket: i64,
    input: &TransferKePmdeInput,
    now: NaiveDateTime,
) -> Result<tiket::Model, DiamondError> {
    permission::require_group(actor, GROUP_PIDE)?;

    let txn = db.begin().await.map_err(db_err)?;
    permission::require_active_tiket_pic(&txn, actor, id_tiket, PicRole::Pide).await?;

    let current = load_tiket_for_update(&txn, id_tiket).await?;
    let target = require_transition(current.status, Operation::TransferKePmde, id_tiket)?;

    let mut active: tiket::ActiveModel = current.into();
    active.status = Set(target.as_i32());
    active.baris_i = Set(Some(input.baris_i));
    active.baris_u = Set(Some(input.baris_u));
    active.baris_res = Set(Some(input.baris_res));
    active.baris_cde = Set(Some(input.baris_cde));
    active.tgl_transfer = Set(Some(now));
    let updated = active.update(&txn).await.map_err(db_err)?;

    ActionLogger::new(actor.id, now)
        .log(
            &txn,
            id_tiket,
            ActionCode::DitransferKePmde,
            &format!(
                "Transfer ke PMDE - I:{}, U:{}, Res:{}, CDE:{}",
                input.baris_i, input.baris_u, input.baris_res, input.baris_cde
            ),
        )
        .await?;

    let message = notification::tiket_message(
        updated.id,
        &updated.nomor_tiket,
        &format!(
            "telah ditransfer ke Pengendalian Mutu oleh {}",
            actor.display_name()
        ),
    );
    notification::notify_active_pics(
        &txn,
        updated.id,
        PicRole::Pmde,
        "Tiket Ditransfer ke Pengendalian Mutu",
        &message,
        now,
    )
    .await?;

    txn.commit().await.map_err(db_err)?;
    Ok(updated)
}

/// PMDE closes the tiket with its QC counts. Emits PENGENDALIAN_MUTU
/// and SELESAI audit entries with strictly increasing timestamps.
pub async fn selesaikan(
    db: &DatabaseConnection,
    actor: &UserIdentity,
    id_tiket: i64,
    input: &SelesaikanInput,
    now: NaiveDateTime,
) -> Result<tiket::Model, DiamondError> {
    permission::require_group(actor, GROUP_PMDE)?;

    let txn = db.begin().await.map_err(db_err)?;
    permission::require_active_tiket_pic(&txn, actor, id_tiket, PicRole::Pmde).await?;

    let current = load_tiket_for_update(&txn, id_tiket).await?;
    let target = require_transition(current.status, Operation::Selesaikan, id_tiket)?;

    let mut active: tiket::ActiveModel = current.into();
    active.status = Set(target.as_i32());
    active.sudah_qc = Set(Some(input.sudah_qc));
    active.lolos_qc = Set(Some(input.lolos_qc));
    active.tidak_lolos_qc = Set(Some(input.tidak_lolos_qc));
    active.qc_c = Set(Some(input.qc_c));
    let updated = active.update(&txn).await.map_err(db_err)?;

    let mut logger = ActionLogger::new(actor.id, now);
    logger
        .log(
            &txn,
            id_tiket,
            ActionCode::PengendalianMutu,
            &format!(
                "Sudah QC:{}, Lolos QC:{}, Tidak Lolos QC:{}, QC C:{}",
                input.sudah_qc, input.lolos_qc, input.tidak_lolos_qc, input.qc_c
            ),
        )
        .await?;
    logger
        .log(&txn, id_tiket, ActionCode::Selesai, "tiket selesai diproses")
        .await?;

    txn.commit().await.map_err(db_err)?;
    Ok(updated)
}

/// P3DE cancels a tiket before it leaves the section.
pub async fn batalkan(
    db: &DatabaseConnection,
    actor: &UserIdentity,
    id_tiket: i64,
    catatan: &str,
    now: NaiveDateTime,
) -> Result<tiket::Model, DiamondError> {
    permission::require_group(actor, GROUP_P3DE)?;

    let txn = db.begin().await.map_err(db_err)?;
    permission::require_active_tiket_pic(&txn, actor, id_tiket, PicRole::P3de).await?;

    let current = load_tiket_for_update(&txn, id_tiket).await?;
    let target = require_transition(current.status, Operation::Batalkan, id_tiket)?;

    let mut active: tiket::ActiveModel = current.into();
    active.status = Set(target.as_i32());
    active.tgl_dibatalkan = Set(Some(now));
    let updated = active.update(&txn).await.map_err(db_err)?;

    let note = if catatan.trim().is_empty() {
        "tiket dibatalkan"
    } else {
        catatan
    };
    ActionLogger::new(actor.id, now)
        .log(&txn, id_tiket, ActionCode::Dibatalkan, note)
        .await?;

    txn.commit().await.map_err(db_err)?;
    Ok(updated)
}
