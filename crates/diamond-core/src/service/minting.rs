//! Deterministic identifier minting
//!
//! Both numbers are read-then-insert inside the caller's transaction.
//! Uniqueness is ultimately guaranteed by the unique index on the
//! column; callers remint on unique-key conflict up to
//! `MAX_MINT_RETRIES` times before surfacing `Conflict`.

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter};

use diamond_common::DiamondError;
use diamond_persistence::entity::{tanda_terima_data, tiket};

use crate::db_err;

/// Bounded retry count for unique-key races on identifier minting.
pub const MAX_MINT_RETRIES: usize = 3;

/// Highest daily sequence a nomor tiket can carry (3 digits).
pub const MAX_TIKET_SEQ: u64 = 999;

/// `<sub-jenis (9)><YYMMDD (6)><seq (3)>`
pub fn format_nomor_tiket(id_sub_jenis_data: &str, date: NaiveDate, seq: u64) -> String {
    format!("{}{}{:03}", id_sub_jenis_data, date.format("%y%m%d"), seq)
}

/// `<seq (5)>/<YYYY>`; the sequence restarts each calendar year.
pub fn format_nomor_tanda_terima(seq: u64, year: i32) -> String {
    format!("{:05}/{}", seq, year)
}

/// Parse the 5-digit sequence out of an existing receipt number.
/// Malformed legacy rows are skipped by returning `None`.
pub fn parse_tanda_terima_seq(nomor: &str) -> Option<u64> {
    nomor.split('/').next()?.parse().ok()
}

/// Mint the next nomor tiket for (sub-jenis, date): count the rows
/// sharing the 15-char prefix and take count + 1.
pub async fn next_nomor_tiket<C: ConnectionTrait>(
    conn: &C,
    id_sub_jenis_data: &str,
    today: NaiveDate,
) -> Result<String, DiamondError> {
    let prefix = format!("{}{}", id_sub_jenis_data, today.format("%y%m%d"));
    let count = tiket::Entity::find()
        .filter(tiket::Column::NomorTiket.starts_with(&prefix))
        .count(conn)
        .await
        .map_err(db_err)?;

    let seq = count + 1;
    if seq > MAX_TIKET_SEQ {
        return Err(DiamondError::Conflict(format!(
            "nomor tiket sequence exhausted for prefix {}",
            prefix
        )));
    }

    Ok(format_nomor_tiket(id_sub_jenis_data, today, seq))
}

/// Mint the next nomor tanda terima for the calendar year: scan existing
/// numbers ending in `/<year>`, take max sequence + 1.
pub async fn next_nomor_tanda_terima<C: ConnectionTrait>(
    conn: &C,
    year: i32,
) -> Result<String, DiamondError> {
    let suffix = format!("/{}", year);
    let existing = tanda_terima_data::Entity::find()
        .filter(tanda_terima_data::Column::NomorTandaTerima.ends_with(&suffix))
        .all(conn)
        .await
        .map_err(db_err)?;

    let max_seq = existing
        .iter()
        .filter_map(|r| parse_tanda_terima_seq(&r.nomor_tanda_terima))
        .max()
        .unwrap_or(0);

    Ok(format_nomor_tanda_terima(max_seq + 1, year))
}

/// Whether a database error is a unique-index violation, i.e. another
/// worker minted the same number first and a retry is worthwhile.
pub fn is_unique_violation(err: &DbErr) -> bool {
    let text = err.to_string();
    text.contains("UNIQUE constraint failed")
        || text.contains("duplicate key value violates unique constraint")
}
