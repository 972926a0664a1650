//! Schema bootstrap
//!
//! Creates every table from its entity definition plus the composite
//! unique indexes the entity derive cannot express. Used by sqlite
//! deployments on first start and by the test suites; postgres
//! deployments are expected to run the same statements via their
//! provisioning tooling.

use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};

use crate::entity::*;

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Create all Diamond tables and indexes. Idempotent.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Identity
    create_table(db, users::Entity).await?;
    create_table(db, user_group::Entity).await?;

    // Reference catalog
    create_table(db, kategori_ilap::Entity).await?;
    create_table(db, kategori_wilayah::Entity).await?;
    create_table(db, ilap::Entity).await?;
    create_table(db, jenis_tabel::Entity).await?;
    create_table(db, klasifikasi_tabel::Entity).await?;
    create_table(db, jenis_data_ilap::Entity).await?;
    create_table(db, klasifikasi_jenis_data::Entity).await?;
    create_table(db, periode_pengiriman::Entity).await?;
    create_table(db, periode_jenis_data::Entity).await?;
    create_table(db, jenis_prioritas_data::Entity).await?;

    // Assignment registry
    create_table(db, pic::Entity).await?;
    create_table(db, durasi_jatuh_tempo::Entity).await?;

    // Workflow
    create_table(db, tiket::Entity).await?;
    create_table(db, tiket_action::Entity).await?;
    create_table(db, tiket_pic::Entity).await?;
    create_table(db, backup_data::Entity).await?;
    create_table(db, tanda_terima_data::Entity).await?;
    create_table(db, detil_tanda_terima::Entity).await?;
    create_table(db, notification::Entity).await?;

    let backend = db.get_database_backend();

    let mut detil_unique = Index::create();
    detil_unique
        .name("uq_detil_tanda_terima")
        .table(detil_tanda_terima::Entity)
        .col(detil_tanda_terima::Column::IdTandaTerima)
        .col(detil_tanda_terima::Column::IdTiket)
        .unique()
        .if_not_exists();
    db.execute(backend.build(&detil_unique)).await?;

    let mut klasifikasi_unique = Index::create();
    klasifikasi_unique
        .name("uq_klasifikasi_jenis_data")
        .table(klasifikasi_jenis_data::Entity)
        .col(klasifikasi_jenis_data::Column::IdJenisDataIlap)
        .col(klasifikasi_jenis_data::Column::IdKlasifikasiTabel)
        .unique()
        .if_not_exists();
    db.execute(backend.build(&klasifikasi_unique)).await?;

    let mut prioritas_unique = Index::create();
    prioritas_unique
        .name("uq_jenis_prioritas_subjenis_tahun")
        .table(jenis_prioritas_data::Entity)
        .col(jenis_prioritas_data::Column::IdSubJenisDataIlap)
        .col(jenis_prioritas_data::Column::Tahun)
        .unique()
        .if_not_exists();
    db.execute(backend.build(&prioritas_unique)).await?;

    let mut pic_lookup = Index::create();
    pic_lookup
        .name("idx_pic_tipe_sub_jenis")
        .table(pic::Entity)
        .col(pic::Column::Tipe)
        .col(pic::Column::IdSubJenisDataIlap)
        .if_not_exists();
    db.execute(backend.build(&pic_lookup)).await?;

    let mut action_lookup = Index::create();
    action_lookup
        .name("idx_tiket_action_tiket_timestamp")
        .table(tiket_action::Entity)
        .col(tiket_action::Column::IdTiket)
        .col(tiket_action::Column::Timestamp)
        .if_not_exists();
    db.execute(backend.build(&action_lookup)).await?;

    Ok(())
}
