//! Workflow enumerations and the tiket transition table
//!
//! Every status, audit action code, and PIC role is persisted as an
//! integer; the enums here are the only place those integers are given
//! meaning. The transition table (`target_status`) is the single source
//! of truth for which operation may move a tiket from which status.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Lifecycle states of a tiket. The integer code is the persisted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TiketStatus {
    Direkam = 1,
    Diteliti = 2,
    Dikembalikan = 3,
    DikirimKePide = 4,
    Identifikasi = 5,
    PengendalianMutu = 6,
    Dibatalkan = 7,
    Selesai = 8,
}

impl TiketStatus {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(TiketStatus::Direkam),
            2 => Some(TiketStatus::Diteliti),
            3 => Some(TiketStatus::Dikembalikan),
            4 => Some(TiketStatus::DikirimKePide),
            5 => Some(TiketStatus::Identifikasi),
            6 => Some(TiketStatus::PengendalianMutu),
            7 => Some(TiketStatus::Dibatalkan),
            8 => Some(TiketStatus::Selesai),
            _ => None,
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, TiketStatus::Dibatalkan | TiketStatus::Selesai)
    }

    pub fn label(self) -> &'static str {
        match self {
            TiketStatus::Direkam => "Direkam",
            TiketStatus::Diteliti => "Diteliti",
            TiketStatus::Dikembalikan => "Dikembalikan",
            TiketStatus::DikirimKePide => "Dikirim ke PIDE",
            TiketStatus::Identifikasi => "Identifikasi",
            TiketStatus::PengendalianMutu => "Pengendalian Mutu",
            TiketStatus::Dibatalkan => "Dibatalkan",
            TiketStatus::Selesai => "Selesai",
        }
    }
}

impl Display for TiketStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Operations the workflow engine accepts against an existing tiket.
///
/// Creation is not listed: it has no source status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RekamHasilPenelitian,
    KirimKePide,
    Kembalikan,
    Identifikasi,
    TransferKePmde,
    Selesaikan,
    Batalkan,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::RekamHasilPenelitian => "rekam_hasil_penelitian",
            Operation::KirimKePide => "kirim_ke_pide",
            Operation::Kembalikan => "kembalikan",
            Operation::Identifikasi => "identifikasi",
            Operation::TransferKePmde => "transfer_ke_pmde",
            Operation::Selesaikan => "selesaikan",
            Operation::Batalkan => "batalkan",
        }
    }

    pub const ALL: [Operation; 7] = [
        Operation::RekamHasilPenelitian,
        Operation::KirimKePide,
        Operation::Kembalikan,
        Operation::Identifikasi,
        Operation::TransferKePmde,
        Operation::Selesaikan,
        Operation::Batalkan,
    ];
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The transition table: `(current status, operation) -> target status`.
///
/// Returns `None` for every pair outside the table; callers surface that
/// as an invalid-transition error. Guards that depend on tiket fields
/// (backup recorded, receipt issued, counts provided) are enforced by
/// the engine on top of this table.
pub fn target_status(current: TiketStatus, operation: Operation) -> Option<TiketStatus> {
    use Operation::*;
    use TiketStatus::*;

    match (current, operation) {
        (Direkam, RekamHasilPenelitian) => Some(Diteliti),
        // Re-recording research in status 2 is an edit, not a no-op
        (Diteliti, RekamHasilPenelitian) => Some(Diteliti),
        (Dikembalikan, RekamHasilPenelitian) => Some(Diteliti),
        (Diteliti, KirimKePide) => Some(DikirimKePide),
        (DikirimKePide, Kembalikan) => Some(Dikembalikan),
        (DikirimKePide, Operation::Identifikasi) => Some(TiketStatus::Identifikasi),
        (TiketStatus::Identifikasi, Kembalikan) => Some(Dikembalikan),
        (TiketStatus::Identifikasi, TransferKePmde) => Some(PengendalianMutu),
        (PengendalianMutu, Selesaikan) => Some(Selesai),
        (Direkam, Batalkan) | (Diteliti, Batalkan) | (Dikembalikan, Batalkan) => Some(Dibatalkan),
        _ => None,
    }
}

/// Audit-log action codes. The tiket range (1..=9) mirrors workflow
/// transitions; the 1xx, 2xx, and 3xx ranges cover backup, tanda-terima,
/// and PIC sub-events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionCode {
    Direkam = 1,
    Diteliti = 2,
    Dikembalikan = 3,
    DikirimKePide = 4,
    Identifikasi = 5,
    PengendalianMutu = 6,
    Dibatalkan = 7,
    Selesai = 8,
    DitransferKePmde = 9,
    BackupDirekam = 101,
    BackupDihapus = 102,
    TandaTerimaDirekam = 201,
    TandaTerimaDibatalkan = 202,
    PicDitambahkan = 301,
    PicTidakAktif = 302,
    PicDiaktifkanKembali = 303,
}

impl ActionCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(ActionCode::Direkam),
            2 => Some(ActionCode::Diteliti),
            3 => Some(ActionCode::Dikembalikan),
            4 => Some(ActionCode::DikirimKePide),
            5 => Some(ActionCode::Identifikasi),
            6 => Some(ActionCode::PengendalianMutu),
            7 => Some(ActionCode::Dibatalkan),
            8 => Some(ActionCode::Selesai),
            9 => Some(ActionCode::DitransferKePmde),
            101 => Some(ActionCode::BackupDirekam),
            102 => Some(ActionCode::BackupDihapus),
            201 => Some(ActionCode::TandaTerimaDirekam),
            202 => Some(ActionCode::TandaTerimaDibatalkan),
            301 => Some(ActionCode::PicDitambahkan),
            302 => Some(ActionCode::PicTidakAktif),
            303 => Some(ActionCode::PicDiaktifkanKembali),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActionCode::Direkam => "Direkam",
            ActionCode::Diteliti => "Diteliti",
            ActionCode::Dikembalikan => "Dikembalikan",
            ActionCode::DikirimKePide => "Dikirim ke PIDE",
            ActionCode::Identifikasi => "Identifikasi",
            ActionCode::PengendalianMutu => "Pengendalian Mutu",
            ActionCode::Dibatalkan => "Dibatalkan",
            ActionCode::Selesai => "Selesai",
            ActionCode::DitransferKePmde => "Ditransfer ke PMDE",
            ActionCode::BackupDirekam => "Backup Direkam",
            ActionCode::BackupDihapus => "Backup Dihapus",
            ActionCode::TandaTerimaDirekam => "Tanda Terima Direkam",
            ActionCode::TandaTerimaDibatalkan => "Tanda Terima Dibatalkan",
            ActionCode::PicDitambahkan => "PIC Ditambahkan",
            ActionCode::PicTidakAktif => "PIC Tidak Aktif",
            ActionCode::PicDiaktifkanKembali => "PIC Diaktifkan Kembali",
        }
    }
}

/// Role of a TiketPIC binding. Persisted as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PicRole {
    P3de = 1,
    Pide = 2,
    Pmde = 3,
}

impl PicRole {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(PicRole::P3de),
            2 => Some(PicRole::Pide),
            3 => Some(PicRole::Pmde),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PicRole::P3de => "P3DE",
            PicRole::Pide => "PIDE",
            PicRole::Pmde => "PMDE",
        }
    }

    pub fn section(self) -> Section {
        match self {
            PicRole::P3de => Section::P3de,
            PicRole::Pide => Section::Pide,
            PicRole::Pmde => Section::Pmde,
        }
    }
}

/// Organizational section. The string form is persisted by the
/// assignment registry (`pic.tipe`, `durasi_jatuh_tempo.seksi`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    P3de,
    Pide,
    Pmde,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::P3de => "P3DE",
            Section::Pide => "PIDE",
            Section::Pmde => "PMDE",
        }
    }

    pub fn role(self) -> PicRole {
        match self {
            Section::P3de => PicRole::P3de,
            Section::Pide => PicRole::Pide,
            Section::Pmde => PicRole::Pmde,
        }
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P3DE" => Ok(Section::P3de),
            "PIDE" => Ok(Section::Pide),
            "PMDE" => Ok(Section::Pmde),
            _ => Err(format!("Invalid section: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for code in 1..=8 {
            let status = TiketStatus::from_i32(code).unwrap();
            assert_eq!(status.as_i32(), code);
        }
        assert!(TiketStatus::from_i32(0).is_none());
        assert!(TiketStatus::from_i32(9).is_none());
    }

    #[test]
    fn test_terminal_states_have_no_transitions() {
        for op in Operation::ALL {
            assert_eq!(target_status(TiketStatus::Dibatalkan, op), None);
            assert_eq!(target_status(TiketStatus::Selesai, op), None);
        }
    }

    #[test]
    fn test_transition_table() {
        use Operation::*;
        use TiketStatus::*;

        assert_eq!(target_status(Direkam, RekamHasilPenelitian), Some(Diteliti));
        assert_eq!(target_status(Diteliti, RekamHasilPenelitian), Some(Diteliti));
        assert_eq!(
            target_status(Dikembalikan, RekamHasilPenelitian),
            Some(Diteliti)
        );
        assert_eq!(target_status(Diteliti, KirimKePide), Some(DikirimKePide));
        assert_eq!(target_status(DikirimKePide, Kembalikan), Some(Dikembalikan));
        assert_eq!(target_status(DikirimKePide, Operation::Identifikasi), Some(TiketStatus::Identifikasi));
        assert_eq!(target_status(TiketStatus::Identifikasi, Kembalikan), Some(Dikembalikan));
        assert_eq!(
            target_status(TiketStatus::Identifikasi, TransferKePmde),
            Some(PengendalianMutu)
        );
        assert_eq!(target_status(PengendalianMutu, Selesaikan), Some(Selesai));
        assert_eq!(target_status(Direkam, Batalkan), Some(Dibatalkan));
        assert_eq!(target_status(Diteliti, Batalkan), Some(Dibatalkan));
        assert_eq!(target_status(Dikembalikan, Batalkan), Some(Dibatalkan));
    }

    #[test]
    fn test_rejected_transitions() {
        use Operation::*;
        use TiketStatus::*;

        assert_eq!(target_status(Direkam, KirimKePide), None);
        assert_eq!(target_status(DikirimKePide, Batalkan), None);
        assert_eq!(target_status(TiketStatus::Identifikasi, Selesaikan), None);
        assert_eq!(target_status(PengendalianMutu, Kembalikan), None);
    }

    #[test]
    fn test_every_status_reachable_from_direkam() {
        // Breadth-first closure over the transition table
        let mut reachable = vec![TiketStatus::Direkam];
        let mut frontier = vec![TiketStatus::Direkam];
        while let Some(status) = frontier.pop() {
            for op in Operation::ALL {
                if let Some(next) = target_status(status, op) {
                    if !reachable.contains(&next) {
                        reachable.push(next);
                        frontier.push(next);
                    }
                }
            }
        }
        for code in 1..=8 {
            let status = TiketStatus::from_i32(code).unwrap();
            assert!(reachable.contains(&status), "status {} unreachable", code);
        }
    }

    #[test]
    fn test_action_code_roundtrip() {
        for code in [1, 2, 3, 4, 5, 6, 7, 8, 9, 101, 102, 201, 202, 301, 302, 303] {
            let action = ActionCode::from_i32(code).unwrap();
            assert_eq!(action.as_i32(), code);
        }
        assert!(ActionCode::from_i32(100).is_none());
    }

    #[test]
    fn test_section_parse() {
        assert_eq!("P3DE".parse::<Section>().unwrap(), Section::P3de);
        assert_eq!("PMDE".parse::<Section>().unwrap(), Section::Pmde);
        assert!("p3de".parse::<Section>().is_err());
    }

    #[test]
    fn test_role_section_mapping() {
        assert_eq!(PicRole::P3de.section(), Section::P3de);
        assert_eq!(Section::Pide.role(), PicRole::Pide);
        assert_eq!(PicRole::from_i32(3), Some(PicRole::Pmde));
    }
}
