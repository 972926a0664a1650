//! Diamond Common - Shared types and constants
//!
//! This crate provides the foundational types used across all Diamond
//! components:
//! - Error taxonomy and error codes
//! - Workflow enumerations (tiket status, action codes, PIC roles)
//! - Group and section constants

pub mod error;
pub mod workflow;

// Re-exports for convenience
pub use error::{DiamondError, ErrorCode};
pub use workflow::{ActionCode, Operation, PicRole, Section, TiketStatus, target_status};

/// Group name for administrators
pub const GROUP_ADMIN: &str = "admin";

/// Group name for the intake/review section
pub const GROUP_P3DE: &str = "user_p3de";

/// Group name for the identification/transfer section
pub const GROUP_PIDE: &str = "user_pide";

/// Group name for the quality-control/closure section
pub const GROUP_PMDE: &str = "user_pmde";

/// Maximum length of an audit-log note
pub const CATATAN_MAX_LEN: usize = 255;

/// Length of the sub-jenis data code embedded in a nomor tiket
pub const SUB_JENIS_DATA_LEN: usize = 9;

/// Number of digits in the daily tiket sequence
pub const NOMOR_TIKET_SEQ_DIGITS: usize = 3;

/// Number of digits in the yearly tanda-terima sequence
pub const NOMOR_TANDA_TERIMA_SEQ_DIGITS: usize = 5;

/// Identity of the authenticated caller as resolved by the ambient
/// session layer. The workflow engine never loads this itself; every
/// operation receives it from the HTTP boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: i64,
    pub username: String,
    pub nama_lengkap: String,
    pub groups: Vec<String>,
    pub is_superuser: bool,
}

impl UserIdentity {
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    /// Admins and superusers bypass PIC-scoped permission checks.
    pub fn is_admin(&self) -> bool {
        self.is_superuser || self.in_group(GROUP_ADMIN)
    }

    pub fn in_any_section(&self) -> bool {
        self.in_group(GROUP_P3DE) || self.in_group(GROUP_PIDE) || self.in_group(GROUP_PMDE)
    }

    /// Display name used in notifications: full name, falling back to
    /// the username when the full name is blank.
    pub fn display_name(&self) -> &str {
        let trimmed = self.nama_lengkap.trim();
        if trimmed.is_empty() {
            &self.username
        } else {
            trimmed
        }
    }
}
