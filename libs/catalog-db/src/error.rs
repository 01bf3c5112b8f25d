//! Driver-independent classification of store failures.

use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

/// What went wrong at the store, independent of the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// A unique constraint rejected the write (SQLSTATE 23505).
    UniqueViolation,
    /// A referenced row does not exist (SQLSTATE 23503).
    ForeignKeyViolation,
    /// A value could not be parsed by the engine (SQLSTATE 22P02).
    InvalidTextRepresentation,
    /// Any other data exception (SQLSTATE class 22).
    DataException,
    /// The store reported that the targeted row is absent.
    NotFound,
    Other,
}

/// A classified store failure. `detail` is for logs only.
#[derive(Clone, Debug, Error)]
#[error("{detail}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub code: Option<String>,
    pub detail: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            detail: detail.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        let code = sqlstate(&err);
        let kind = classify(&err, code.as_deref());
        Self {
            kind,
            code,
            detail: err.to_string(),
        }
    }
}

fn classify(err: &DbErr, code: Option<&str>) -> StoreErrorKind {
    if matches!(err, DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated) {
        return StoreErrorKind::NotFound;
    }

    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => return StoreErrorKind::UniqueViolation,
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            return StoreErrorKind::ForeignKeyViolation
        }
        _ => {}
    }

    match code {
        Some("23505") => StoreErrorKind::UniqueViolation,
        Some("23503") => StoreErrorKind::ForeignKeyViolation,
        Some("22P02") => StoreErrorKind::InvalidTextRepresentation,
        Some(c) if c.starts_with("22") => StoreErrorKind::DataException,
        _ => StoreErrorKind::Other,
    }
}

/// Engine error code carried by the driver, if any.
fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db)))
        | DbErr::Conn(RuntimeErr::SqlxError(sqlx::Error::Database(db))) => {
            db.code().map(|c| c.into_owned())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_not_found_maps_to_not_found() {
        let err = StoreError::from(DbErr::RecordNotFound("products".into()));
        assert_eq!(err.kind, StoreErrorKind::NotFound);
        assert_eq!(err.code, None);

        let err = StoreError::from(DbErr::RecordNotUpdated);
        assert_eq!(err.kind, StoreErrorKind::NotFound);
    }

    #[test]
    fn sqlstate_codes_drive_classification() {
        let custom = DbErr::Custom("boom".into());
        assert_eq!(classify(&custom, Some("23505")), StoreErrorKind::UniqueViolation);
        assert_eq!(
            classify(&custom, Some("23503")),
            StoreErrorKind::ForeignKeyViolation
        );
        assert_eq!(
            classify(&custom, Some("22P02")),
            StoreErrorKind::InvalidTextRepresentation
        );
        assert_eq!(classify(&custom, Some("22003")), StoreErrorKind::DataException);
        assert_eq!(classify(&custom, Some("42P01")), StoreErrorKind::Other);
        assert_eq!(classify(&custom, None), StoreErrorKind::Other);
    }

    #[test]
    fn unrecognized_errors_keep_detail_for_logs() {
        let err = StoreError::from(DbErr::Custom("connection reset by peer".into()));
        assert_eq!(err.kind, StoreErrorKind::Other);
        assert!(err.to_string().contains("connection reset by peer"));
    }
}
