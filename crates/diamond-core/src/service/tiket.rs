//! Tiket read side: detail aggregation, scoped listing, previews
//!
//! Nothing here mutates state. List queries are transparently narrowed
//! to the caller's visible set; admins see everything.

use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use diamond_common::{DiamondError, Section, UserIdentity};
use diamond_persistence::entity::{
    ilap, jenis_data_ilap, jenis_prioritas_data, kategori_ilap, kategori_wilayah, jenis_tabel,
    klasifikasi_jenis_data, klasifikasi_tabel, periode_jenis_data, periode_pengiriman, tiket,
    tiket_action, tiket_pic, users,
};

use crate::db_err;
use crate::model::{Page, PeriodeDataCandidate, TiketDetail, TiketListFilter, TiketPicInfo};
use crate::service::{assignment, backup, minting, permission, tanda_terima};

/// Full detail view: tiket + audit log + PICs + backups + receipts.
pub async fn detail<C: ConnectionTrait>(
    conn: &C,
    user: &UserIdentity,
    id: i64,
) -> Result<TiketDetail, DiamondError> {
    if !permission::can_view_tiket(conn, user, id).await? {
        return Err(DiamondError::Forbidden(format!(
            "user '{}' may not view tiket {}",
            user.username, id
        )));
    }

    let record = tiket::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DiamondError::NotFound(format!("tiket {}", id)))?;

    let actions = tiket_action::Entity::find()
        .filter(tiket_action::Column::IdTiket.eq(id))
        .order_by_asc(tiket_action::Column::Timestamp)
        .all(conn)
        .await
        .map_err(db_err)?;

    let pic_rows = tiket_pic::Entity::find()
        .filter(tiket_pic::Column::IdTiket.eq(id))
        .order_by_asc(tiket_pic::Column::Id)
        .all(conn)
        .await
        .map_err(db_err)?;

    let user_ids: Vec<i64> = pic_rows.iter().map(|p| p.id_user).collect();
    let names = users::Entity::find()
        .filter(users::Column::Id.is_in(user_ids))
        .all(conn)
        .await
        .map_err(db_err)?;

    let pics = pic_rows
        .into_iter()
        .map(|p| {
            let found = names.iter().find(|u| u.id == p.id_user);
            TiketPicInfo {
                username: found.map(|u| u.username.clone()).unwrap_or_default(),
                nama_lengkap: found.map(|u| u.nama_lengkap.clone()).unwrap_or_default(),
                pic: p,
            }
        })
        .collect();

    let backups = backup::list_for_tiket(conn, id).await?;
    let receipts = tanda_terima::receipts_for_tiket(conn, id).await?;

    Ok(TiketDetail {
        tiket: record,
        actions,
        pics,
        backups,
        tanda_terima: receipts,
    })
}

/// Paged tiket listing, narrowed to the caller's visible set.
pub async fn list<C: ConnectionTrait>(
    conn: &C,
    user: &UserIdentity,
    filter: &TiketListFilter,
    today: NaiveDate,
    page_number: u64,
    page_size: u64,
) -> Result<Page<tiket::Model>, DiamondError> {
    if !permission::can_list_tikets(conn, user).await? {
        return Err(DiamondError::Forbidden(format!(
            "user '{}' may not list tikets",
            user.username
        )));
    }

    let mut query = tiket::Entity::find();

    if let Some(scope) = permission::visible_tiket_ids(conn, user, today).await? {
        if scope.is_empty() {
            return Ok(Page::new(0, page_number, page_size, Vec::new()));
        }
        query = query.filter(tiket::Column::Id.is_in(scope));
    }

    if let Some(ref nomor) = filter.nomor_tiket {
        query = query.filter(tiket::Column::NomorTiket.contains(nomor));
    }
    if let Some(status) = filter.status {
        query = query.filter(tiket::Column::Status.eq(status));
    }
    if let Some(periode) = filter.periode {
        query = query.filter(tiket::Column::Periode.eq(periode));
    }
    if let Some(tahun) = filter.tahun {
        query = query.filter(tiket::Column::Tahun.eq(tahun));
    }

    query = query.order_by_desc(tiket::Column::Id);

    let total_count = query.clone().count(conn).await.map_err(db_err)?;
    let page_size = page_size.max(1);
    let offset = page_number.saturating_sub(1) * page_size;

    let page_items = query
        .offset(offset)
        .limit(page_size)
        .all(conn)
        .await
        .map_err(db_err)?;

    Ok(Page::new(total_count, page_number, page_size, page_items))
}

/// Preview the nomor tiket the next creation would mint, without
/// committing anything. Concurrent creations can invalidate the preview.
pub async fn preview_nomor_tiket<C: ConnectionTrait>(
    conn: &C,
    id_periode_data: i64,
    today: NaiveDate,
) -> Result<String, DiamondError> {
    let periode_data = periode_jenis_data::Entity::find_by_id(id_periode_data)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DiamondError::NotFound(format!("periode jenis data {}", id_periode_data)))?;

    let sub_jenis = jenis_data_ilap::Entity::find_by_id(periode_data.id_sub_jenis_data_ilap)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| {
            DiamondError::NotFound(format!(
                "jenis data ilap {}",
                periode_data.id_sub_jenis_data_ilap
            ))
        })?;

    minting::next_nomor_tiket(conn, &sub_jenis.id_sub_jenis_data, today).await
}

/// Existing tiket numbers for the same (sub-jenis, periode, tahun) -
/// the duplicate probe used by the creation form.
pub async fn existing_numbers<C: ConnectionTrait>(
    conn: &C,
    id_periode_data: i64,
    periode: i32,
    tahun: i32,
) -> Result<Vec<String>, DiamondError> {
    let periode_data = periode_jenis_data::Entity::find_by_id(id_periode_data)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DiamondError::NotFound(format!("periode jenis data {}", id_periode_data)))?;

    // Every periode_jenis_data row of the same sub-jenis counts
    let sibling_ids: Vec<i64> = periode_jenis_data::Entity::find()
        .filter(
            periode_jenis_data::Column::IdSubJenisDataIlap.eq(periode_data.id_sub_jenis_data_ilap),
        )
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|r| r.id)
        .collect();

    Ok(tiket::Entity::find()
        .filter(tiket::Column::IdPeriodeData.is_in(sibling_ids))
        .filter(tiket::Column::Periode.eq(periode))
        .filter(tiket::Column::Tahun.eq(tahun))
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|t| t.nomor_tiket)
        .collect())
}

/// Whether a priority designation exists for (sub-jenis code, year).
pub async fn has_prioritas<C: ConnectionTrait>(
    conn: &C,
    id_sub_jenis_data: &str,
    tahun: i32,
) -> Result<bool, DiamondError> {
    let sub_jenis = jenis_data_ilap::Entity::find()
        .filter(jenis_data_ilap::Column::IdSubJenisData.eq(id_sub_jenis_data))
        .one(conn)
        .await
        .map_err(db_err)?;
    let Some(sub_jenis) = sub_jenis else {
        return Ok(false);
    };

    let count = jenis_prioritas_data::Entity::find()
        .filter(jenis_prioritas_data::Column::IdSubJenisDataIlap.eq(sub_jenis.id))
        .filter(jenis_prioritas_data::Column::Tahun.eq(format!("{}", tahun)))
        .count(conn)
        .await
        .map_err(db_err)?;
    Ok(count > 0)
}

async fn pic_names<C: ConnectionTrait>(
    conn: &C,
    id_sub_jenis: i64,
    section: Section,
    today: NaiveDate,
) -> Result<String, DiamondError> {
    let pics = assignment::active_pics(conn, id_sub_jenis, section, today).await?;
    let ids: Vec<i64> = pics.iter().take(3).map(|p| p.id_user).collect();
    if ids.is_empty() {
        return Ok("-".to_string());
    }
    let rows = users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(conn)
        .await
        .map_err(db_err)?;
    let joined = rows
        .iter()
        .map(|u| {
            let name = u.nama_lengkap.trim();
            if name.is_empty() { u.username.as_str() } else { name }
        })
        .collect::<Vec<_>>()
        .join(", ");
    Ok(if joined.is_empty() { "-".to_string() } else { joined })
}

/// Creation-form feed: periode-data candidates for the ILAP that carry
/// an active PIDE and PMDE deadline, narrowed to the caller's eligible
/// ILAP set for non-admins, enriched with catalog context and the
/// current assignees per section.
pub async fn periode_data_for_ilap<C: ConnectionTrait>(
    conn: &C,
    user: &UserIdentity,
    id_ilap: &str,
    today: NaiveDate,
) -> Result<Vec<PeriodeDataCandidate>, DiamondError> {
    if !user.is_admin() {
        let allowed = assignment::eligible_ilap_ids(conn, user.id, today).await?;
        if !allowed.iter().any(|i| i == id_ilap) {
            return Ok(Vec::new());
        }
    }

    let institution = ilap::Entity::find_by_id(id_ilap.to_string())
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DiamondError::NotFound(format!("ILAP {}", id_ilap)))?;

    let kategori = kategori_ilap::Entity::find_by_id(institution.id_kategori)
        .one(conn)
        .await
        .map_err(db_err)?;
    let wilayah = match institution.id_kategori_wilayah {
        Some(id) => kategori_wilayah::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(db_err)?,
        None => None,
    };

    let sub_jenis_rows = jenis_data_ilap::Entity::find()
        .filter(jenis_data_ilap::Column::IdIlap.eq(id_ilap))
        .all(conn)
        .await
        .map_err(db_err)?;

    let mut candidates = Vec::new();
    for sub_jenis in &sub_jenis_rows {
        // Only sub-jenis with both deadlines configured can open tikets
        let pide = assignment::active_durasi(conn, sub_jenis.id, Section::Pide, today).await?;
        let pmde = assignment::active_durasi(conn, sub_jenis.id, Section::Pmde, today).await?;
        if pide.is_none() || pmde.is_none() {
            continue;
        }

        let tabel = match sub_jenis.id_jenis_tabel {
            Some(id) => jenis_tabel::Entity::find_by_id(id)
                .one(conn)
                .await
                .map_err(db_err)?,
            None => None,
        };

        let klasifikasi_ids: Vec<i64> = klasifikasi_jenis_data::Entity::find()
            .filter(klasifikasi_jenis_data::Column::IdJenisDataIlap.eq(sub_jenis.id))
            .all(conn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|r| r.id_klasifikasi_tabel)
            .collect();
        let klasifikasi = if klasifikasi_ids.is_empty() {
            "-".to_string()
        } else {
            klasifikasi_tabel::Entity::find()
                .filter(klasifikasi_tabel::Column::Id.is_in(klasifikasi_ids))
                .all(conn)
                .await
                .map_err(db_err)?
                .iter()
                .map(|k| k.deskripsi.clone())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let prioritas = jenis_prioritas_data::Entity::find()
            .filter(jenis_prioritas_data::Column::IdSubJenisDataIlap.eq(sub_jenis.id))
            .count(conn)
            .await
            .map_err(db_err)?
            > 0;

        let periode_rows = periode_jenis_data::Entity::find()
            .filter(periode_jenis_data::Column::IdSubJenisDataIlap.eq(sub_jenis.id))
            .all(conn)
            .await
            .map_err(db_err)?;

        for periode_row in periode_rows {
            let deskripsi_periode =
                periode_pengiriman::Entity::find_by_id(periode_row.id_periode_pengiriman)
                    .one(conn)
                    .await
                    .map_err(db_err)?
                    .map(|p| p.deskripsi)
                    .unwrap_or_else(|| "-".to_string());

            candidates.push(PeriodeDataCandidate {
                id: periode_row.id,
                id_sub_jenis_data: sub_jenis.id_sub_jenis_data.clone(),
                nama_sub_jenis_data: sub_jenis.nama_sub_jenis_data.clone(),
                nama_ilap: institution.nama_ilap.clone(),
                kategori_ilap: kategori
                    .as_ref()
                    .map(|k| k.nama_kategori.clone())
                    .unwrap_or_else(|| "-".to_string()),
                kategori_wilayah: wilayah
                    .as_ref()
                    .map(|w| w.deskripsi.clone())
                    .unwrap_or_else(|| "-".to_string()),
                jenis_tabel: tabel
                    .as_ref()
                    .map(|t| t.deskripsi.clone())
                    .unwrap_or_else(|| "-".to_string()),
                jenis_prioritas: prioritas,
                klasifikasi: klasifikasi.clone(),
                deskripsi_periode,
                pic_p3de: pic_names(conn, sub_jenis.id, Section::P3de, today).await?,
                pic_pide: pic_names(conn, sub_jenis.id, Section::Pide, today).await?,
                pic_pmde: pic_names(conn, sub_jenis.id, Section::Pmde, today).await?,
            });
        }
    }

    Ok(candidates)
}
