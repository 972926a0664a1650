//! SeaORM entity definitions
//!
//! Workflow tables are written exclusively by the workflow engine; the
//! reference catalog and assignment registry are read-only from its
//! perspective and mutated by administrative tooling outside this crate.

pub mod backup_data;
pub mod detil_tanda_terima;
pub mod durasi_jatuh_tempo;
pub mod ilap;
pub mod jenis_data_ilap;
pub mod jenis_prioritas_data;
pub mod jenis_tabel;
pub mod kategori_ilap;
pub mod kategori_wilayah;
pub mod klasifikasi_jenis_data;
pub mod klasifikasi_tabel;
pub mod notification;
pub mod periode_jenis_data;
pub mod periode_pengiriman;
pub mod pic;
pub mod tanda_terima_data;
pub mod tiket;
pub mod tiket_action;
pub mod tiket_pic;
pub mod user_group;
pub mod users;

pub mod prelude {
    pub use super::backup_data::Entity as BackupData;
    pub use super::detil_tanda_terima::Entity as DetilTandaTerima;
    pub use super::durasi_jatuh_tempo::Entity as DurasiJatuhTempo;
    pub use super::ilap::Entity as Ilap;
    pub use super::jenis_data_ilap::Entity as JenisDataIlap;
    pub use super::jenis_prioritas_data::Entity as JenisPrioritasData;
    pub use super::jenis_tabel::Entity as JenisTabel;
    pub use super::kategori_ilap::Entity as KategoriIlap;
    pub use super::kategori_wilayah::Entity as KategoriWilayah;
    pub use super::klasifikasi_jenis_data::Entity as KlasifikasiJenisData;
    pub use super::klasifikasi_tabel::Entity as KlasifikasiTabel;
    pub use super::notification::Entity as Notification;
    pub use super::periode_jenis_data::Entity as PeriodeJenisData;
    pub use super::periode_pengiriman::Entity as PeriodePengiriman;
    pub use super::pic::Entity as Pic;
    pub use super::tanda_terima_data::Entity as TandaTerimaData;
    pub use super::tiket::Entity as Tiket;
    pub use super::tiket_action::Entity as TiketAction;
    pub use super::tiket_pic::Entity as TiketPic;
    pub use super::user_group::Entity as UserGroup;
    pub use super::users::Entity as Users;
}
