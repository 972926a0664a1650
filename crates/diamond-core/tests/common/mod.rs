//! Shared fixtures for workflow engine tests
//!
//! Builds an in-memory sqlite database seeded with one ILAP, one
//! sub-jenis (KM0330101), an active assignee per section, and both
//! deadline durations.

use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

use diamond_common::{GROUP_P3DE, GROUP_PIDE, GROUP_PMDE, UserIdentity};
use diamond_persistence::entity::{
    durasi_jatuh_tempo, ilap, jenis_data_ilap, kategori_ilap, periode_jenis_data,
    periode_pengiriman, pic, user_group, users,
};

pub const SUB_JENIS_CODE: &str = "KM0330101";

pub struct Fixture {
    pub db: DatabaseConnection,
    pub p3de: UserIdentity,
    pub pide: UserIdentity,
    pub pmde: UserIdentity,
    pub id_periode_data: i64,
    pub id_sub_jenis: i64,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, s).unwrap()
}

async fn seed_user(
    db: &DatabaseConnection,
    username: &str,
    nama: &str,
    group: &str,
) -> UserIdentity {
    let user = users::ActiveModel {
        username: Set(username.to_string()),
        nama_lengkap: Set(nama.to_string()),
        is_superuser: Set(false),
        active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    user_group::ActiveModel {
        id_user: Set(user.id),
        group_name: Set(group.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    UserIdentity {
        id: user.id,
        username: user.username,
        nama_lengkap: user.nama_lengkap,
        groups: vec![group.to_string()],
        is_superuser: false,
    }
}

async fn seed_pic(db: &DatabaseConnection, tipe: &str, id_sub_jenis: i64, id_user: i64) {
    pic::ActiveModel {
        tipe: Set(tipe.to_string()),
        id_sub_jenis_data_ilap: Set(id_sub_jenis),
        id_user: Set(id_user),
        start_date: Set(date(2026, 1, 1)),
        end_date: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
}

async fn seed_durasi(db: &DatabaseConnection, seksi: &str, id_sub_jenis: i64, days: i32) {
    durasi_jatuh_tempo::ActiveModel {
        id_sub_jenis_data: Set(id_sub_jenis),
        seksi: Set(seksi.to_string()),
        durasi: Set(days),
        start_date: Set(date(2026, 1, 1)),
        end_date: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
}

pub async fn fixture() -> Fixture {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    diamond_persistence::create_schema(&db).await.unwrap();

    let p3de = seed_user(&db, "p3de_a", "Budi Santoso", GROUP_P3DE).await;
    let pide = seed_user(&db, "pide_a", "Sari Dewi", GROUP_PIDE).await;
    let pmde = seed_user(&db, "pmde_a", "Agus Wibowo", GROUP_PMDE).await;

    let kategori = kategori_ilap::ActiveModel {
        nama_kategori: Set("Kementerian".to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    ilap::ActiveModel {
        id_ilap: Set("KM001".to_string()),
        id_kategori: Set(kategori.id),
        id_kategori_wilayah: Set(None),
        nama_ilap: Set("Kementerian Keuangan".to_string()),
    }
    .insert(&db)
    .await
    .unwrap();

    let sub_jenis = jenis_data_ilap::ActiveModel {
        id_jenis_data: Set("KM03301".to_string()),
        id_sub_jenis_data: Set(SUB_JENIS_CODE.to_string()),
        nama_jenis_data: Set("Laporan Keuangan".to_string()),
        nama_sub_jenis_data: Set("Laporan Realisasi Anggaran".to_string()),
        id_ilap: Set("KM001".to_string()),
        id_kategori_ilap: Set(kategori.id),
        id_jenis_tabel: Set(None),
        nama_tabel_i: Set(None),
        nama_tabel_u: Set(None),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let periode = periode_pengiriman::ActiveModel {
        deskripsi: Set("Bulanan".to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let periode_data = periode_jenis_data::ActiveModel {
        id_sub_jenis_data_ilap: Set(sub_jenis.id),
        id_periode_pengiriman: Set(periode.id),
        start_date: Set(date(2026, 1, 1)),
        end_date: Set(None),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    seed_pic(&db, "P3DE", sub_jenis.id, p3de.id).await;
    seed_pic(&db, "PIDE", sub_jenis.id, pide.id).await;
    seed_pic(&db, "PMDE", sub_jenis.id, pmde.id).await;
    seed_durasi(&db, "PIDE", sub_jenis.id, 14).await;
    seed_durasi(&db, "PMDE", sub_jenis.id, 30).await;

    Fixture {
        db,
        p3de,
        pide,
        pmde,
        id_periode_data: periode_data.id,
        id_sub_jenis: sub_jenis.id,
    }
}
