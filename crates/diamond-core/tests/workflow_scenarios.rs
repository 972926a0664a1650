//! End-to-end workflow scenarios over an in-memory database
//!
//! Covers the seed scenarios (happy path, blocked dispatch, receipt
//! uniqueness, return cycle, completion, dashboard) plus the audit and
//! sub-event invariants.

mod common;

use chrono::NaiveDateTime;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};

use common::{Fixture, SUB_JENIS_CODE, at, fixture};
use diamond_common::{ActionCode, DiamondError, TiketStatus};
use diamond_core::model::{
    CreateTiketInput, KirimKePideInput, RekamHasilPenelitianInput, SelesaikanInput,
    TandaTerimaInput, TransferKePmdeInput,
};
use diamond_core::service::{backup, dashboard, minting, notification, tanda_terima, workflow};
use diamond_persistence::entity::{notification as notification_entity, tiket, tiket_action, tiket_pic};

fn create_input(f: &Fixture) -> CreateTiketInput {
    CreateTiketInput {
        id_periode_data: f.id_periode_data,
        periode: 2,
        tahun: 2026,
        tgl_terima_vertikal: Some(at(2026, 2, 10, 9, 0, 0)),
        tgl_terima_dip: Some(at(2026, 2, 11, 10, 0, 0)),
    }
}

async fn create(f: &Fixture, now: NaiveDateTime) -> tiket::Model {
    workflow::create_tiket(&f.db, &f.p3de, &create_input(f), now)
        .await
        .unwrap()
}

async fn actions_of(f: &Fixture, id_tiket: i64) -> Vec<tiket_action::Model> {
    tiket_action::Entity::find()
        .filter(tiket_action::Column::IdTiket.eq(id_tiket))
        .order_by_asc(tiket_action::Column::Timestamp)
        .all(&f.db)
        .await
        .unwrap()
}

async fn reload(f: &Fixture, id: i64) -> tiket::Model {
    tiket::Entity::find_by_id(id).one(&f.db).await.unwrap().unwrap()
}

/// Research + backup + receipt + dispatch, returning the tiket in
/// status DIKIRIM_KE_PIDE.
async fn drive_to_dispatched(f: &Fixture, id: i64, base_hour: u32) -> tiket::Model {
    workflow::rekam_hasil_penelitian(
        &f.db,
        &f.p3de,
        id,
        &RekamHasilPenelitianInput {
            baris_p3de: 120,
            catatan: None,
        },
        at(2026, 2, 11, base_hour, 5, 0),
    )
    .await
    .unwrap();

    backup::rekam_backup(&f.db, &f.p3de, id, "\\\\nas\\backup\\km03", at(2026, 2, 11, base_hour, 10, 0))
        .await
        .unwrap();

    tanda_terima::buat_tanda_terima(
        &f.db,
        &f.p3de,
        &TandaTerimaInput {
            tanggal: at(2026, 2, 11, base_hour, 15, 0),
            id_ilap: "KM001".to_string(),
            deskripsi: "Penyerahan data bulanan".to_string(),
            tiket_ids: vec![id],
        },
        at(2026, 2, 11, base_hour, 15, 0),
    )
    .await
    .unwrap();

    workflow::kirim_ke_pide(
        &f.db,
        &f.p3de,
        &KirimKePideInput {
            tiket_ids: vec![id],
            nomor_nd_nadine: "ND-17/2026".to_string(),
            tgl_nadine: at(2026, 2, 11, base_hour, 20, 0),
            tgl_kirim_pide: at(2026, 2, 11, base_hour, 20, 0),
        },
        at(2026, 2, 11, base_hour, 20, 0),
    )
    .await
    .unwrap();

    reload(f, id).await
}

// Happy-path creation
#[tokio::test]
async fn test_create_tiket_mints_number_and_snapshots_pics() {
    let f = fixture().await;
    let created = create(&f, at(2026, 2, 11, 10, 0, 0)).await;

    assert_eq!(created.nomor_tiket, format!("{}260211001", SUB_JENIS_CODE));
    assert_eq!(created.status, TiketStatus::Direkam.as_i32());
    assert!(!created.backup);
    assert!(!created.tanda_terima);
    assert!(created.id_durasi_jatuh_tempo_pide.is_some());
    assert!(created.id_durasi_jatuh_tempo_pmde.is_some());

    let actions = actions_of(&f, created.id).await;
    assert_eq!(actions[0].action, ActionCode::Direkam.as_i32());
    let pic_added = actions
        .iter()
        .filter(|a| a.action == ActionCode::PicDitambahkan.as_i32())
        .count();
    assert_eq!(pic_added, 3);

    let pics = tiket_pic::Entity::find()
        .filter(tiket_pic::Column::IdTiket.eq(created.id))
        .all(&f.db)
        .await
        .unwrap();
    assert_eq!(pics.len(), 3);
    assert!(pics.iter().all(|p| p.active));
}

#[tokio::test]
async fn test_second_tiket_same_day_gets_next_sequence() {
    let f = fixture().await;
    create(&f, at(2026, 2, 11, 10, 0, 0)).await;
    let second = create(&f, at(2026, 2, 11, 11, 0, 0)).await;
    assert_eq!(second.nomor_tiket, format!("{}260211002", SUB_JENIS_CODE));
}

#[tokio::test]
async fn test_create_requires_active_assignment() {
    let f = fixture().await;
    // PIDE member is not a P3DE assignee, and not even in the group
    let err = workflow::create_tiket(&f.db, &f.pide, &create_input(&f), at(2026, 2, 11, 10, 0, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, DiamondError::Forbidden(_)));
}

// Dispatch is blocked while the backup is missing
#[tokio::test]
async fn test_kirim_blocked_without_backup() {
    let f = fixture().await;
    let created = create(&f, at(2026, 2, 11, 10, 0, 0)).await;
    workflow::rekam_hasil_penelitian(
        &f.db,
        &f.p3de,
        created.id,
        &RekamHasilPenelitianInput {
            baris_p3de: 10,
            catatan: None,
        },
        at(2026, 2, 11, 10, 5, 0),
    )
    .await
    .unwrap();

    let before = actions_of(&f, created.id).await.len();
    let err = workflow::kirim_ke_pide(
        &f.db,
        &f.p3de,
        &KirimKePideInput {
            tiket_ids: vec![created.id],
            nomor_nd_nadine: "ND-1/2026".to_string(),
            tgl_nadine: at(2026, 2, 11, 10, 10, 0),
            tgl_kirim_pide: at(2026, 2, 11, 10, 10, 0),
        },
        at(2026, 2, 11, 10, 10, 0),
    )
    .await
    .unwrap_err();

    match err {
        DiamondError::PrerequisiteMissing(message) => assert!(message.contains("backup")),
        other => panic!("expected PrerequisiteMissing, got {:?}", other),
    }

    let after = reload(&f, created.id).await;
    assert_eq!(after.status, TiketStatus::Diteliti.as_i32());
    assert_eq!(actions_of(&f, created.id).await.len(), before);
    let notifications = notification_entity::Entity::find()
        .count(&f.db)
        .await
        .unwrap();
    assert_eq!(notifications, 0);
}

// A tiket sits in at most one active receipt per ILAP
#[tokio::test]
async fn test_tiket_in_one_active_receipt_per_ilap() {
    let f = fixture().await;
    let t1 = create(&f, at(2026, 2, 11, 9, 0, 0)).await;
    let t2 = create(&f, at(2026, 2, 11, 9, 30, 0)).await;

    tanda_terima::buat_tanda_terima(
        &f.db,
        &f.p3de,
        &TandaTerimaInput {
            tanggal: at(2026, 2, 11, 10, 0, 0),
            id_ilap: "KM001".to_string(),
            deskripsi: "R1".to_string(),
            tiket_ids: vec![t1.id, t2.id],
        },
        at(2026, 2, 11, 10, 0, 0),
    )
    .await
    .unwrap();

    let err = tanda_terima::buat_tanda_terima(
        &f.db,
        &f.p3de,
        &TandaTerimaInput {
            tanggal: at(2026, 2, 11, 11, 0, 0),
            id_ilap: "KM001".to_string(),
            deskripsi: "R2".to_string(),
            tiket_ids: vec![t2.id],
        },
        at(2026, 2, 11, 11, 0, 0),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DiamondError::InvalidInput(_)));
}

#[tokio::test]
async fn test_receipt_numbers_restart_per_year() {
    let f = fixture().await;
    let t1 = create(&f, at(2026, 2, 11, 9, 0, 0)).await;

    let receipt = tanda_terima::buat_tanda_terima(
        &f.db,
        &f.p3de,
        &TandaTerimaInput {
            tanggal: at(2026, 2, 11, 10, 0, 0),
            id_ilap: "KM001".to_string(),
            deskripsi: "first of the year".to_string(),
            tiket_ids: vec![t1.id],
        },
        at(2026, 2, 11, 10, 0, 0),
    )
    .await
    .unwrap();
    assert_eq!(receipt.nomor_tanda_terima, "00001/2026");

    let next_2027 = minting::next_nomor_tanda_terima(&f.db, 2027).await.unwrap();
    assert_eq!(next_2027, "00001/2027");
}

// Issue-then-cancel round-trip
#[tokio::test]
async fn test_cancel_receipt_reverts_flags_and_audits() {
    let f = fixture().await;
    let t1 = create(&f, at(2026, 2, 11, 9, 0, 0)).await;

    let receipt = tanda_terima::buat_tanda_terima(
        &f.db,
        &f.p3de,
        &TandaTerimaInput {
            tanggal: at(2026, 2, 11, 10, 0, 0),
            id_ilap: "KM001".to_string(),
            deskripsi: "to cancel".to_string(),
            tiket_ids: vec![t1.id],
        },
        at(2026, 2, 11, 10, 0, 0),
    )
    .await
    .unwrap();
    assert!(reload(&f, t1.id).await.tanda_terima);

    tanda_terima::batalkan_tanda_terima(&f.db, &f.p3de, receipt.id, at(2026, 2, 11, 11, 0, 0))
        .await
        .unwrap();

    assert!(!reload(&f, t1.id).await.tanda_terima);
    let actions = actions_of(&f, t1.id).await;
    let recorded = actions
        .iter()
        .filter(|a| a.action == ActionCode::TandaTerimaDirekam.as_i32())
        .count();
    let cancelled = actions
        .iter()
        .filter(|a| a.action == ActionCode::TandaTerimaDibatalkan.as_i32())
        .count();
    assert_eq!((recorded, cancelled), (1, 1));
}

// The backup flag tracks the remaining rows
#[tokio::test]
async fn test_backup_flag_follows_remaining_rows() {
    let f = fixture().await;
    let t = create(&f, at(2026, 2, 11, 9, 0, 0)).await;

    let b1 = backup::rekam_backup(&f.db, &f.p3de, t.id, "lokasi-1", at(2026, 2, 11, 9, 10, 0))
        .await
        .unwrap();
    let b2 = backup::rekam_backup(&f.db, &f.p3de, t.id, "lokasi-2", at(2026, 2, 11, 9, 20, 0))
        .await
        .unwrap();
    assert!(reload(&f, t.id).await.backup);

    backup::hapus_backup(&f.db, &f.p3de, b1.id, at(2026, 2, 11, 9, 30, 0))
        .await
        .unwrap();
    assert!(reload(&f, t.id).await.backup);

    backup::hapus_backup(&f.db, &f.p3de, b2.id, at(2026, 2, 11, 9, 40, 0))
        .await
        .unwrap();
    assert!(!reload(&f, t.id).await.backup);
}

#[tokio::test]
async fn test_last_backup_of_dispatched_tiket_cannot_be_deleted() {
    let f = fixture().await;
    let t = create(&f, at(2026, 2, 11, 9, 0, 0)).await;
    drive_to_dispatched(&f, t.id, 10).await;

    let backups = backup::list_for_tiket(&f.db, t.id).await.unwrap();
    let err = backup::hapus_backup(&f.db, &f.p3de, backups[0].id, at(2026, 2, 11, 12, 0, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, DiamondError::InvalidTransition(_)));
    assert!(reload(&f, t.id).await.backup);
}

// PIDE return cycle
#[tokio::test]
async fn test_return_cycle_notifies_and_allows_rework() {
    let f = fixture().await;
    let t = create(&f, at(2026, 2, 11, 9, 0, 0)).await;
    let dispatched = drive_to_dispatched(&f, t.id, 10).await;
    assert_eq!(dispatched.status, TiketStatus::DikirimKePide.as_i32());

    workflow::kembalikan(&f.db, &f.pide, t.id, "incomplete", at(2026, 2, 12, 9, 0, 0))
        .await
        .unwrap();

    let returned = reload(&f, t.id).await;
    assert_eq!(returned.status, TiketStatus::Dikembalikan.as_i32());
    assert_eq!(returned.tgl_dikembalikan, Some(at(2026, 2, 12, 9, 0, 0)));

    let inbox = notification::unread_for_user(&f.db, f.p3de.id).await.unwrap();
    assert!(
        inbox
            .iter()
            .any(|n| n.message.contains(&returned.nomor_tiket))
    );

    workflow::rekam_hasil_penelitian(
        &f.db,
        &f.p3de,
        t.id,
        &RekamHasilPenelitianInput {
            baris_p3de: 130,
            catatan: Some("revisi".to_string()),
        },
        at(2026, 2, 12, 10, 0, 0),
    )
    .await
    .unwrap();

    let reworked = reload(&f, t.id).await;
    assert_eq!(reworked.status, TiketStatus::Diteliti.as_i32());
    assert_eq!(reworked.tgl_dikembalikan, None);

    let diteliti = actions_of(&f, t.id)
        .await
        .iter()
        .filter(|a| a.action == ActionCode::Diteliti.as_i32())
        .count();
    assert_eq!(diteliti, 2);
}

// Re-research is an edit, never a no-op
#[tokio::test]
async fn test_research_twice_rewrites_timestamp() {
    let f = fixture().await;
    let t = create(&f, at(2026, 2, 11, 9, 0, 0)).await;

    workflow::rekam_hasil_penelitian(
        &f.db,
        &f.p3de,
        t.id,
        &RekamHasilPenelitianInput {
            baris_p3de: 10,
            catatan: None,
        },
        at(2026, 2, 11, 9, 10, 0),
    )
    .await
    .unwrap();
    workflow::rekam_hasil_penelitian(
        &f.db,
        &f.p3de,
        t.id,
        &RekamHasilPenelitianInput {
            baris_p3de: 10,
            catatan: None,
        },
        at(2026, 2, 11, 9, 20, 0),
    )
    .await
    .unwrap();

    let after = reload(&f, t.id).await;
    assert_eq!(after.tgl_teliti, Some(at(2026, 2, 11, 9, 20, 0)));
    let diteliti = actions_of(&f, t.id)
        .await
        .iter()
        .filter(|a| a.action == ActionCode::Diteliti.as_i32())
        .count();
    assert_eq!(diteliti, 2);
}

// Completion emits two ordered audit entries
#[tokio::test]
async fn test_complete_with_qc_counts() {
    let f = fixture().await;
    let t = create(&f, at(2026, 2, 11, 9, 0, 0)).await;
    drive_to_dispatched(&f, t.id, 10).await;

    workflow::identifikasi(&f.db, &f.pide, t.id, at(2026, 2, 12, 9, 0, 0))
        .await
        .unwrap();
    workflow::transfer_ke_pmde(
        &f.db,
        &f.pide,
        t.id,
        &TransferKePmdeInput {
            baris_i: 100,
            baris_u: 20,
            baris_res: 5,
            baris_cde: 1,
        },
        at(2026, 2, 12, 10, 0, 0),
    )
    .await
    .unwrap();

    // PMDE sees the transfer notification
    let inbox = notification::unread_count(&f.db, f.pmde.id).await.unwrap();
    assert_eq!(inbox, 1);

    workflow::selesaikan(
        &f.db,
        &f.pmde,
        t.id,
        &SelesaikanInput {
            sudah_qc: 100,
            lolos_qc: 90,
            tidak_lolos_qc: 8,
            qc_c: 2,
        },
        at(2026, 2, 13, 9, 0, 0),
    )
    .await
    .unwrap();

    let done = reload(&f, t.id).await;
    assert_eq!(done.status, TiketStatus::Selesai.as_i32());
    assert_eq!(done.sudah_qc, Some(100));

    let actions = actions_of(&f, t.id).await;
    let mutu_pos = actions
        .iter()
        .position(|a| a.action == ActionCode::PengendalianMutu.as_i32())
        .unwrap();
    let selesai_pos = actions
        .iter()
        .position(|a| a.action == ActionCode::Selesai.as_i32())
        .unwrap();
    assert!(mutu_pos < selesai_pos);
    assert!(actions[mutu_pos].timestamp < actions[selesai_pos].timestamp);

    // Terminal state accepts nothing further
    let err = workflow::batalkan(&f.db, &f.p3de, t.id, "", at(2026, 2, 13, 10, 0, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, DiamondError::InvalidTransition(_)));
}

// Audit timestamps strictly increase per tiket
#[tokio::test]
async fn test_audit_timestamps_strictly_increasing() {
    let f = fixture().await;
    let t = create(&f, at(2026, 2, 11, 9, 0, 0)).await;
    drive_to_dispatched(&f, t.id, 10).await;

    let actions = actions_of(&f, t.id).await;
    assert!(actions.len() >= 6);
    for pair in actions.windows(2) {
        assert!(
            pair[0].timestamp < pair[1].timestamp,
            "audit order broken: {:?} !< {:?}",
            pair[0].timestamp,
            pair[1].timestamp
        );
    }
}

// Dispatched tikets carry both sub-event flags
#[tokio::test]
async fn test_dispatched_tiket_has_both_flags() {
    let f = fixture().await;
    let t = create(&f, at(2026, 2, 11, 9, 0, 0)).await;
    let dispatched = drive_to_dispatched(&f, t.id, 10).await;
    assert!(dispatched.backup && dispatched.tanda_terima);
}

#[tokio::test]
async fn test_cancel_from_recorded() {
    let f = fixture().await;
    let t = create(&f, at(2026, 2, 11, 9, 0, 0)).await;

    workflow::batalkan(&f.db, &f.p3de, t.id, "salah rekam", at(2026, 2, 11, 9, 30, 0))
        .await
        .unwrap();

    let cancelled = reload(&f, t.id).await;
    assert_eq!(cancelled.status, TiketStatus::Dibatalkan.as_i32());
    assert_eq!(cancelled.tgl_dibatalkan, Some(at(2026, 2, 11, 9, 30, 0)));
}

// The 1000th tiket of a prefix is rejected, never collided
#[tokio::test]
async fn test_sequence_exhaustion_surfaces_conflict() {
    let f = fixture().await;

    let seeds: Vec<tiket::ActiveModel> = (1..=999)
        .map(|seq| tiket::ActiveModel {
            nomor_tiket: Set(format!("{}260211{:03}", SUB_JENIS_CODE, seq)),
            id_periode_data: Set(f.id_periode_data),
            periode: Set(1),
            tahun: Set(2026),
            status: Set(TiketStatus::Direkam.as_i32()),
            backup: Set(false),
            tanda_terima: Set(false),
            ..Default::default()
        })
        .collect();
    for chunk in seeds.chunks(100) {
        tiket::Entity::insert_many(chunk.to_vec())
            .exec(&f.db)
            .await
            .unwrap();
    }

    let err = workflow::create_tiket(&f.db, &f.p3de, &create_input(&f), at(2026, 2, 11, 10, 0, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, DiamondError::Conflict(_)));
}

// Dashboard pending counts
#[tokio::test]
async fn test_dashboard_counts() {
    let f = fixture().await;

    let mut ids = Vec::new();
    for hour in 9..14 {
        ids.push(create(&f, at(2026, 2, 11, hour, 0, 0)).await.id);
    }

    // Backups on two tikets, receipt on three, research on one
    backup::rekam_backup(&f.db, &f.p3de, ids[0], "l-0", at(2026, 2, 11, 14, 0, 0))
        .await
        .unwrap();
    backup::rekam_backup(&f.db, &f.p3de, ids[1], "l-1", at(2026, 2, 11, 14, 5, 0))
        .await
        .unwrap();
    tanda_terima::buat_tanda_terima(
        &f.db,
        &f.p3de,
        &TandaTerimaInput {
            tanggal: at(2026, 2, 11, 14, 10, 0),
            id_ilap: "KM001".to_string(),
            deskripsi: "batch".to_string(),
            tiket_ids: vec![ids[0], ids[1], ids[2]],
        },
        at(2026, 2, 11, 14, 10, 0),
    )
    .await
    .unwrap();
    workflow::rekam_hasil_penelitian(
        &f.db,
        &f.p3de,
        ids[0],
        &RekamHasilPenelitianInput {
            baris_p3de: 12,
            catatan: None,
        },
        at(2026, 2, 11, 14, 15, 0),
    )
    .await
    .unwrap();

    let counts = dashboard::summary(&f.db, &f.p3de).await.unwrap();
    assert_eq!(counts.rekam_backup_data, 3);
    assert_eq!(counts.buat_tanda_terima, 2);
    assert_eq!(counts.rekam_hasil_penelitian, 4);
    assert_eq!(counts.kirim_ke_pide, 5);
    assert_eq!(counts.identifikasi, 0);

    // PIDE sees the status-4 bucket once something is dispatched;
    // ids[0] already has its backup, receipt, and research recorded
    workflow::kirim_ke_pide(
        &f.db,
        &f.p3de,
        &KirimKePideInput {
            tiket_ids: vec![ids[0]],
            nomor_nd_nadine: "ND-99/2026".to_string(),
            tgl_nadine: at(2026, 2, 11, 15, 0, 0),
            tgl_kirim_pide: at(2026, 2, 11, 15, 0, 0),
        },
        at(2026, 2, 11, 15, 0, 0),
    )
    .await
    .unwrap();
    let pide_counts = dashboard::summary(&f.db, &f.pide).await.unwrap();
    assert_eq!(pide_counts.identifikasi, 1);
    assert_eq!(pide_counts.transfer_ke_pmde, 0);
}

// Permission gates on transitions
#[tokio::test]
async fn test_wrong_section_is_forbidden() {
    let f = fixture().await;
    let t = create(&f, at(2026, 2, 11, 9, 0, 0)).await;
    drive_to_dispatched(&f, t.id, 10).await;

    // P3DE member cannot run the PIDE identification step
    let err = workflow::identifikasi(&f.db, &f.p3de, t.id, at(2026, 2, 12, 9, 0, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, DiamondError::Forbidden(_)));
}

#[tokio::test]
async fn test_receipt_edit_adds_and_removes_line_items() {
    let f = fixture().await;
    let t1 = create(&f, at(2026, 2, 11, 9, 0, 0)).await;
    let t2 = create(&f, at(2026, 2, 11, 9, 30, 0)).await;

    let receipt = tanda_terima::buat_tanda_terima(
        &f.db,
        &f.p3de,
        &TandaTerimaInput {
            tanggal: at(2026, 2, 11, 10, 0, 0),
            id_ilap: "KM001".to_string(),
            deskripsi: "v1".to_string(),
            tiket_ids: vec![t1.id],
        },
        at(2026, 2, 11, 10, 0, 0),
    )
    .await
    .unwrap();

    tanda_terima::ubah_tanda_terima(
        &f.db,
        &f.p3de,
        receipt.id,
        &diamond_core::model::UbahTandaTerimaInput {
            tanggal: at(2026, 2, 11, 10, 0, 0),
            deskripsi: "v2".to_string(),
            tiket_ids: vec![t2.id],
        },
        at(2026, 2, 11, 11, 0, 0),
    )
    .await
    .unwrap();

    let items = tanda_terima::line_items(&f.db, receipt.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id_tiket, t2.id);

    // Removal keeps the historical audit entry and does not revert
    let t1_after = reload(&f, t1.id).await;
    assert!(t1_after.tanda_terima);
    let t1_actions = actions_of(&f, t1.id).await;
    assert!(
        t1_actions
            .iter()
            .any(|a| a.action == ActionCode::TandaTerimaDirekam.as_i32())
    );
    assert!(
        !t1_actions
            .iter()
            .any(|a| a.action == ActionCode::TandaTerimaDibatalkan.as_i32())
    );

    // The added tiket is flagged and audited
    assert!(reload(&f, t2.id).await.tanda_terima);
}
