//! Typed classification of storage failures.
//!
//! SQLite reports "structure already present" conditions as generic errors, so
//! this is the one place that knows how the engine phrases them. Callers only
//! ever see [`FailureKind`].

use sea_orm::{DbErr, SqlErr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// `ALTER TABLE .. ADD COLUMN` for a column that is already there.
    DuplicateColumn,

    /// `CREATE TABLE` / `CREATE INDEX` for an object that already exists.
    AlreadyExists,

    /// A UNIQUE constraint or unique index rejected the write.
    UniqueViolation,

    Other,
}

impl FailureKind {
    #[must_use]
    pub fn classify(err: &DbErr) -> Self {
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            return Self::UniqueViolation;
        }

        let message = err.to_string().to_ascii_lowercase();

        if message.contains("duplicate column name") {
            Self::DuplicateColumn
        } else if message.contains("already exists") {
            Self::AlreadyExists
        } else if message.contains("unique constraint failed") {
            Self::UniqueViolation
        } else {
            Self::Other
        }
    }

    /// True when the failure proves the change had already been applied.
    #[must_use]
    pub const fn is_structure_present(self) -> bool {
        matches!(self, Self::DuplicateColumn | Self::AlreadyExists)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateColumn => write!(f, "duplicate column"),
            Self::AlreadyExists => write!(f, "already exists"),
            Self::UniqueViolation => write!(f, "unique violation"),
            Self::Other => write!(f, "other"),
        }
    }
}
