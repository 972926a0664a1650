//! Assignment registry resolution
//!
//! Active PICs and deadline durations are a pure function of
//! (date, registry); nothing here is cached across requests. Tikets
//! snapshot their assignees at creation, so later registry changes do
//! not touch open tikets.

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use diamond_common::{DiamondError, Section};
use diamond_persistence::entity::{durasi_jatuh_tempo, jenis_data_ilap, pic};

use crate::db_err;

/// Window rule shared by every time-scoped registry table: active on
/// `on` iff `start_date <= on` and (`end_date` is null or `>= on`).
pub fn is_active_window(start: NaiveDate, end: Option<NaiveDate>, on: NaiveDate) -> bool {
    start <= on && end.map_or(true, |e| e >= on)
}

fn window_condition(
    start: impl ColumnTrait,
    end: impl ColumnTrait + Copy,
    on: NaiveDate,
) -> Condition {
    Condition::all()
        .add(start.lte(on))
        .add(Condition::any().add(end.is_null()).add(end.gte(on)))
}

/// All PIC assignments of a section active for the sub-jenis on `on`.
pub async fn active_pics<C: ConnectionTrait>(
    conn: &C,
    id_sub_jenis_data_ilap: i64,
    section: Section,
    on: NaiveDate,
) -> Result<Vec<pic::Model>, DiamondError> {
    pic::Entity::find()
        .filter(pic::Column::Tipe.eq(section.as_str()))
        .filter(pic::Column::IdSubJenisDataIlap.eq(id_sub_jenis_data_ilap))
        .filter(window_condition(
            pic::Column::StartDate,
            pic::Column::EndDate,
            on,
        ))
        .order_by_asc(pic::Column::Id)
        .all(conn)
        .await
        .map_err(db_err)
}

/// Whether the user holds an active assignment of `section` for the
/// sub-jenis on `on`.
pub async fn is_active_assignee<C: ConnectionTrait>(
    conn: &C,
    id_user: i64,
    id_sub_jenis_data_ilap: i64,
    section: Section,
    on: NaiveDate,
) -> Result<bool, DiamondError> {
    let found = pic::Entity::find()
        .filter(pic::Column::Tipe.eq(section.as_str()))
        .filter(pic::Column::IdSubJenisDataIlap.eq(id_sub_jenis_data_ilap))
        .filter(pic::Column::IdUser.eq(id_user))
        .filter(window_condition(
            pic::Column::StartDate,
            pic::Column::EndDate,
            on,
        ))
        .one(conn)
        .await
        .map_err(db_err)?;
    Ok(found.is_some())
}

/// The active deadline duration for (sub-jenis, section), if any.
/// The registry is expected to hold at most one active row per pair;
/// when administrators overlap windows the earliest row wins.
pub async fn active_durasi<C: ConnectionTrait>(
    conn: &C,
    id_sub_jenis_data: i64,
    section: Section,
    on: NaiveDate,
) -> Result<Option<durasi_jatuh_tempo::Model>, DiamondError> {
    durasi_jatuh_tempo::Entity::find()
        .filter(durasi_jatuh_tempo::Column::Seksi.eq(section.as_str()))
        .filter(durasi_jatuh_tempo::Column::IdSubJenisData.eq(id_sub_jenis_data))
        .filter(window_condition(
            durasi_jatuh_tempo::Column::StartDate,
            durasi_jatuh_tempo::Column::EndDate,
            on,
        ))
        .order_by_asc(durasi_jatuh_tempo::Column::Id)
        .one(conn)
        .await
        .map_err(db_err)
}

/// Sub-jenis ids (catalog surrogate keys) the user may act on today for
/// the given section.
pub async fn eligible_sub_jenis_ids<C: ConnectionTrait>(
    conn: &C,
    id_user: i64,
    section: Section,
    on: NaiveDate,
) -> Result<Vec<i64>, DiamondError> {
    let rows = pic::Entity::find()
        .filter(pic::Column::Tipe.eq(section.as_str()))
        .filter(pic::Column::IdUser.eq(id_user))
        .filter(window_condition(
            pic::Column::StartDate,
            pic::Column::EndDate,
            on,
        ))
        .all(conn)
        .await
        .map_err(db_err)?;

    let mut ids: Vec<i64> = rows.iter().map(|r| r.id_sub_jenis_data_ilap).collect();
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Distinct ILAP ids reachable from the user's active P3DE assignments
/// via the sub-jenis -> jenis -> ILAP path. Drives list narrowing and
/// creation eligibility for non-admins.
pub async fn eligible_ilap_ids<C: ConnectionTrait>(
    conn: &C,
    id_user: i64,
    on: NaiveDate,
) -> Result<Vec<String>, DiamondError> {
    let sub_jenis_ids = eligible_sub_jenis_ids(conn, id_user, Section::P3de, on).await?;
    if sub_jenis_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = jenis_data_ilap::Entity::find()
        .filter(jenis_data_ilap::Column::Id.is_in(sub_jenis_ids))
        .all(conn)
        .await
        .map_err(db_err)?;

    let mut ids: Vec<String> = rows.into_iter().map(|r| r.id_ilap).collect();
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}
